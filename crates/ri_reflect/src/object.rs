use core::fmt;

use ri_os::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use ri_os::sync::{Arc, Mutex, Weak, lock_unpoisoned};

use crate::ty::TypeRef;
use crate::{ReflectError, Value};

// -----------------------------------------------------------------------------
// ObjectId

/// A process-unique object identifier, shown in labels of unnamed objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ObjectCell

enum ObjectData {
    Fields(Box<[Value]>),
    List(Vec<Value>),
}

struct ObjectCell {
    id: ObjectId,
    ty: TypeRef,
    name: Mutex<Option<String>>,
    destroyed: AtomicBool,
    data: Mutex<ObjectData>,
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared reference to a live instance of a reference type.
///
/// The host may destroy an object while references to it remain, the way
/// engine objects die when their scene unloads. Member access on a destroyed
/// object fails with [`ReflectError::Destroyed`].
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// Creates an object of type `ty` with default field values.
    pub fn new(ty: &TypeRef) -> Self {
        Self::with_data(ty, ObjectData::Fields(ty.default_instance_fields()))
    }

    /// Creates a list object holding `items`.
    pub fn new_list(ty: &TypeRef, items: Vec<Value>) -> Self {
        Self::with_data(ty, ObjectData::List(items))
    }

    fn with_data(ty: &TypeRef, data: ObjectData) -> Self {
        Self(Arc::new(ObjectCell {
            id: ObjectId::next(),
            ty: ty.clone(),
            name: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            data: Mutex::new(data),
        }))
    }

    /// Gives the object an engine-level name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.0.ty
    }

    /// Returns the engine-level name, if any.
    pub fn name(&self) -> Option<String> {
        lock_unpoisoned(&self.0.name).clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *lock_unpoisoned(&self.0.name) = Some(name.into());
    }

    /// Marks the object as destroyed by the host.
    pub fn destroy(&self) {
        self.0.destroyed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.0.destroyed.load(Ordering::Acquire)
    }

    /// Creates a non-owning reference.
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Arc::downgrade(&self.0),
            id: self.0.id,
        }
    }

    /// Returns `true` if both references point to the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns `true` if the object stores list items rather than fields.
    pub fn is_list(&self) -> bool {
        matches!(*lock_unpoisoned(&self.0.data), ObjectData::List(_))
    }

    fn ensure_alive(&self) -> Result<(), ReflectError> {
        if self.is_destroyed() {
            Err(ReflectError::Destroyed(self.0.ty.name().into()))
        } else {
            Ok(())
        }
    }

    fn not_a_container(&self) -> ReflectError {
        ReflectError::NotAContainer(self.0.ty.name().into())
    }

    pub(crate) fn read_slot(&self, slot: usize) -> Result<Value, ReflectError> {
        self.ensure_alive()?;
        match &*lock_unpoisoned(&self.0.data) {
            ObjectData::Fields(fields) => fields
                .get(slot)
                .cloned()
                .ok_or(ReflectError::IndexOutOfRange { index: slot, len: fields.len() }),
            ObjectData::List(_) => Err(self.not_a_container()),
        }
    }

    pub(crate) fn write_slot(&self, slot: usize, value: Value) -> Result<(), ReflectError> {
        self.ensure_alive()?;
        match &mut *lock_unpoisoned(&self.0.data) {
            ObjectData::Fields(fields) => {
                let len = fields.len();
                let target = fields
                    .get_mut(slot)
                    .ok_or(ReflectError::IndexOutOfRange { index: slot, len })?;
                *target = value;
                Ok(())
            }
            ObjectData::List(_) => Err(self.not_a_container()),
        }
    }

    /// Returns the number of list items.
    pub fn list_len(&self) -> Result<usize, ReflectError> {
        self.ensure_alive()?;
        match &*lock_unpoisoned(&self.0.data) {
            ObjectData::List(items) => Ok(items.len()),
            ObjectData::Fields(_) => Err(self.not_a_container()),
        }
    }

    /// Returns a copy of the list item at `index`.
    pub fn list_get(&self, index: usize) -> Result<Value, ReflectError> {
        self.ensure_alive()?;
        match &*lock_unpoisoned(&self.0.data) {
            ObjectData::List(items) => items
                .get(index)
                .cloned()
                .ok_or(ReflectError::IndexOutOfRange { index, len: items.len() }),
            ObjectData::Fields(_) => Err(self.not_a_container()),
        }
    }

    /// Replaces the list item at `index`, checking the element type.
    pub fn list_set(&self, index: usize, value: Value) -> Result<(), ReflectError> {
        self.ensure_alive()?;
        if let Some(element) = self.0.ty.element_type() {
            value.expect_type(element)?;
        }
        match &mut *lock_unpoisoned(&self.0.data) {
            ObjectData::List(items) => {
                let len = items.len();
                let target = items
                    .get_mut(index)
                    .ok_or(ReflectError::IndexOutOfRange { index, len })?;
                *target = value;
                Ok(())
            }
            ObjectData::Fields(_) => Err(self.not_a_container()),
        }
    }
}

impl PartialEq for ObjectRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::object_label(self))
    }
}

// -----------------------------------------------------------------------------
// WeakObject

/// A non-owning reference to an object.
///
/// The inspector only ever holds these: it must never keep a dead game
/// object alive, and every access re-checks validity.
#[derive(Clone)]
pub struct WeakObject {
    inner: Weak<ObjectCell>,
    id: ObjectId,
}

impl WeakObject {
    /// Returns the object if it is still allocated, destroyed or not.
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.inner.upgrade().map(ObjectRef)
    }

    /// Returns the object if it is still allocated and not destroyed.
    pub fn upgrade_live(&self) -> Result<ObjectRef, ReflectError> {
        match self.upgrade() {
            Some(obj) if !obj.is_destroyed() => Ok(obj),
            Some(obj) => Err(ReflectError::Destroyed(obj.ty().name().into())),
            None => Err(ReflectError::Destroyed(format!("object #{}", self.id))),
        }
    }

    /// Returns `true` if the object was dropped or destroyed by the host.
    pub fn is_destroyed(&self) -> bool {
        self.upgrade().is_none_or(|obj| obj.is_destroyed())
    }

    /// Returns the id of the referenced object.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns `true` if both references point to the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "Weak({obj:?})"),
            None => write!(f, "Weak(#{} dropped)", self.id),
        }
    }
}
