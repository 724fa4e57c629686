use core::fmt;
use core::num::NonZeroU64;

use ri_os::sync::Arc;
use ri_os::sync::atomic::{AtomicU64, Ordering};

use crate::Value;
use crate::member::{EventInfo, FieldInfo, MethodInfo, PropertyInfo};
use crate::value::StructValue;

// -----------------------------------------------------------------------------
// TypeHandle

/// A process-unique identifier of a loaded type.
///
/// Handles are never reused; types are not unloaded during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeHandle(NonZeroU64);

impl TypeHandle {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        // The counter starts at one and would need centuries to wrap.
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Returns the raw handle value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// The storage category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    Float,
    Pointer,
    String,
    ValueType,
    Class,
}

impl TypeKind {
    /// Returns `true` for kinds whose instances are shared references.
    #[inline]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::String | Self::Class)
    }

    /// Returns `true` for the scalar kinds.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float | Self::Pointer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Special {
    None,
    ObjectRoot,
    SystemType,
}

// -----------------------------------------------------------------------------
// TypeInfo

/// A shared reference to a [`TypeInfo`].
pub type TypeRef = Arc<TypeInfo>;

/// A loaded type: its identity, base type and declared members.
///
/// Members are listed in declaration order and only include what this type
/// declares. Use the `find_*` methods to search the base chain as well.
pub struct TypeInfo {
    pub(crate) handle: TypeHandle,
    pub(crate) name: Box<str>,
    pub(crate) namespace: Option<Box<str>>,
    pub(crate) kind: TypeKind,
    pub(crate) special: Special,
    pub(crate) base: Option<TypeRef>,
    pub(crate) element: Option<TypeRef>,
    pub(crate) fields: Box<[FieldInfo]>,
    pub(crate) properties: Box<[PropertyInfo]>,
    pub(crate) methods: Box<[MethodInfo]>,
    pub(crate) events: Box<[EventInfo]>,
    pub(crate) instance_slots: usize,
    pub(crate) generic_parameters: bool,
    pub(crate) init_error: Option<Arc<str>>,
}

impl TypeInfo {
    /// Returns the type's unique handle.
    #[inline]
    pub const fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Returns the short type name, e.g. `GameObject`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace, if any.
    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the namespace-qualified name, e.g. `UnityEngine.GameObject`.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.to_string(),
        }
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the direct base type, if any.
    #[inline]
    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    /// Returns the element type of a list type.
    #[inline]
    pub fn element_type(&self) -> Option<&TypeRef> {
        self.element.as_ref()
    }

    /// Returns `true` if the type still has unbound generic parameters.
    #[inline]
    pub const fn contains_generic_parameters(&self) -> bool {
        self.generic_parameters
    }

    /// Returns the message of a failed static initialization, if any.
    ///
    /// Every static member read of such a type fails.
    #[inline]
    pub fn initialization_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    #[inline]
    pub fn is_object_root(&self) -> bool {
        self.special == Special::ObjectRoot
    }

    #[inline]
    pub fn is_system_type(&self) -> bool {
        self.special == Special::SystemType
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    #[inline]
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    #[inline]
    pub fn events(&self) -> &[EventInfo] {
        &self.events
    }

    /// Returns the number of instance field slots, base types included.
    #[inline]
    pub const fn instance_slots(&self) -> usize {
        self.instance_slots
    }

    /// Returns an iterator over this type followed by its base chain.
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeInfo> {
        core::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    /// Returns `true` if `self` is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &TypeInfo) -> bool {
        other.is_object_root() || self.ancestors().any(|ty| ty.handle == other.handle)
    }

    /// Finds a field by name, searching base types too.
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.ancestors()
            .find_map(|ty| ty.fields.iter().find(|f| f.name() == name))
    }

    /// Finds a property by name, searching base types too.
    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.ancestors()
            .find_map(|ty| ty.properties.iter().find(|p| p.name() == name))
    }

    /// Finds the first method with the given name, searching base types too.
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        self.ancestors()
            .find_map(|ty| ty.methods.iter().find(|m| m.name() == name))
    }

    /// Finds an event by name, searching base types too.
    pub fn find_event(&self, name: &str) -> Option<&EventInfo> {
        self.ancestors()
            .find_map(|ty| ty.events.iter().find(|e| e.name() == name))
    }

    /// Finds a field declared on this exact type.
    pub fn declared_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the value a member of type `ty` holds before being assigned.
    pub fn default_value(ty: &TypeRef) -> Value {
        match ty.kind {
            TypeKind::Bool => Value::Bool(false),
            TypeKind::Int => Value::Int(0),
            TypeKind::Float => Value::Float(0.0),
            TypeKind::Pointer => Value::Ptr(0),
            TypeKind::String | TypeKind::Class => Value::Null,
            TypeKind::ValueType => Value::Struct(StructValue::new(ty)),
        }
    }

    /// Returns default values for every instance slot, base types included.
    pub(crate) fn default_instance_fields(&self) -> Box<[Value]> {
        let mut slots = vec![Value::Null; self.instance_slots];
        for ty in self.ancestors() {
            for field in ty.fields.iter() {
                if let Some(slot) = field.instance_slot() {
                    slots[slot] = Self::default_value(field.field_type());
                }
            }
        }
        slots.into_boxed_slice()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("handle", &self.handle)
            .field("name", &self.full_name())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::Value;
    use crate::ty::{TypeBuilder, builtin};

    #[test]
    fn slots_include_base_fields() {
        let base = TypeBuilder::class("Engine", "Behaviour")
            .field("enabled", builtin::bool())
            .build();
        let derived = TypeBuilder::class("Game", "Mover")
            .base(&base)
            .field("speed", builtin::float())
            .static_field("instances", builtin::int())
            .build();

        assert_eq!(derived.instance_slots(), 2);
        assert_eq!(derived.find_field("enabled").unwrap().instance_slot(), Some(0));
        assert_eq!(derived.find_field("speed").unwrap().instance_slot(), Some(1));
        assert_eq!(
            &*derived.default_instance_fields(),
            &[Value::Bool(false), Value::Float(0.0)]
        );
    }

    #[test]
    fn subclass_chain() {
        let a = TypeBuilder::class("", "A").build();
        let b = TypeBuilder::class("", "B").base(&a).build();
        let c = TypeBuilder::class("", "C").base(&b).build();

        assert!(c.is_subclass_of(&a));
        assert!(!a.is_subclass_of(&c));
        assert!(a.is_subclass_of(&builtin::object()));
        assert_eq!(c.ancestors().count(), 3);
        assert_eq!(a.full_name(), "A");
    }
}
