use ri_os::sync::{Arc, Mutex, lock_unpoisoned};

use super::MemberId;
use crate::ty::{TypeHandle, TypeInfo, TypeRef};
use crate::{ReflectError, Receiver, Value};

// -----------------------------------------------------------------------------
// StaticCell

/// Storage of one static field.
struct StaticCell {
    value: Mutex<Value>,
    owner: Arc<str>,
    init_error: Option<Arc<str>>,
}

impl StaticCell {
    fn read(&self) -> Result<Value, ReflectError> {
        self.check_initialized()?;
        Ok(lock_unpoisoned(&self.value).clone())
    }

    fn write(&self, value: Value) -> Result<(), ReflectError> {
        self.check_initialized()?;
        *lock_unpoisoned(&self.value) = value;
        Ok(())
    }

    fn check_initialized(&self) -> Result<(), ReflectError> {
        match &self.init_error {
            Some(message) => Err(ReflectError::TypeInitialization {
                ty: self.owner.to_string(),
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
enum FieldStorage {
    Instance(usize),
    Static(Arc<StaticCell>),
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A field of a type.
///
/// Cloning is cheap; clones of a static field share its storage.
#[derive(Clone)]
pub struct FieldInfo {
    id: MemberId,
    declaring: TypeHandle,
    name: Box<str>,
    field_type: TypeRef,
    storage: FieldStorage,
    readonly: bool,
    literal: bool,
}

impl FieldInfo {
    #[inline]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the handle of the type that declares the field.
    #[inline]
    pub const fn declaring_type(&self) -> TypeHandle {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self.storage, FieldStorage::Static(_))
    }

    /// Returns `true` for fields only assignable during construction.
    #[inline]
    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Returns `true` for compile-time constants.
    #[inline]
    pub const fn is_literal(&self) -> bool {
        self.literal
    }

    /// Returns the instance slot, or `None` for static fields.
    #[inline]
    pub fn instance_slot(&self) -> Option<usize> {
        match self.storage {
            FieldStorage::Instance(slot) => Some(slot),
            FieldStorage::Static(_) => None,
        }
    }

    /// Reads the field.
    ///
    /// Static fields ignore the receiver. Instance fields fail with
    /// [`ReflectError::NullReference`] on a static receiver.
    pub fn get(&self, receiver: Receiver<'_>) -> Result<Value, ReflectError> {
        match &self.storage {
            FieldStorage::Static(cell) => cell.read(),
            FieldStorage::Instance(slot) => match receiver {
                Receiver::Static => Err(ReflectError::NullReference(self.name.to_string())),
                Receiver::Object(obj) => obj.read_slot(*slot),
                Receiver::Struct(value) => value.slot(*slot).cloned(),
            },
        }
    }

    /// Writes the field.
    ///
    /// Like the runtime's own reflection, this writes readonly fields;
    /// only constants are rejected.
    pub fn set(&self, receiver: Receiver<'_>, value: Value) -> Result<(), ReflectError> {
        if self.literal {
            return Err(ReflectError::ReadOnly(self.name.to_string()));
        }
        value.expect_type(&self.field_type)?;
        match &self.storage {
            FieldStorage::Static(cell) => cell.write(value),
            FieldStorage::Instance(slot) => match receiver {
                Receiver::Static => Err(ReflectError::NullReference(self.name.to_string())),
                Receiver::Object(obj) => obj.write_slot(*slot, value),
                Receiver::Struct(target) => target.set_slot(*slot, value),
            },
        }
    }
}

impl core::fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::display::field_signature(self))
    }
}

// -----------------------------------------------------------------------------
// FieldBuilder

/// Describes a field for [`TypeBuilder::with_field`](crate::ty::TypeBuilder::with_field).
pub struct FieldBuilder {
    name: Box<str>,
    ty: TypeRef,
    is_static: bool,
    readonly: bool,
    literal: bool,
    initial: Option<Value>,
}

impl FieldBuilder {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            readonly: false,
            literal: false,
            initial: None,
        }
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Makes the field a constant. Constants are always static.
    pub fn literal(mut self) -> Self {
        self.literal = true;
        self.is_static = true;
        self
    }

    /// Sets the initial value of a static field.
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    pub(crate) fn build(
        self,
        id: MemberId,
        declaring: TypeHandle,
        next_slot: &mut usize,
        owner: &Arc<str>,
        init_error: Option<Arc<str>>,
    ) -> FieldInfo {
        let storage = if self.is_static {
            let value = self
                .initial
                .unwrap_or_else(|| TypeInfo::default_value(&self.ty));
            FieldStorage::Static(Arc::new(StaticCell {
                value: Mutex::new(value),
                owner: owner.clone(),
                init_error,
            }))
        } else {
            let slot = *next_slot;
            *next_slot += 1;
            FieldStorage::Instance(slot)
        };

        FieldInfo {
            id,
            declaring,
            name: self.name,
            field_type: self.ty,
            storage,
            readonly: self.readonly,
            literal: self.literal,
        }
    }
}
