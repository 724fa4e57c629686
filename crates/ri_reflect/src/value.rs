use core::fmt;

use ri_os::sync::{Arc, Mutex, lock_unpoisoned};

use crate::ty::{TypeKind, TypeRef};
use crate::{ObjectRef, ReflectError};

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed managed value.
///
/// [`Value::Struct`] follows value-type semantics: cloning a `Value` copies
/// the whole struct. [`Value::Object`] is a shared reference, cloning it
/// clones the reference only.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ptr(usize),
    Struct(StructValue),
    Object(ObjectRef),
    Type(TypeRef),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value has no members worth drilling into.
    ///
    /// `null`, strings and the scalar kinds are primitive.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        !matches!(self, Self::Struct(_) | Self::Object(_) | Self::Type(_))
    }

    /// Returns the display name of the value's runtime type.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Bool(_) => "bool".into(),
            Self::Int(_) => "long".into(),
            Self::Float(_) => "float".into(),
            Self::Str(_) => "string".into(),
            Self::Ptr(_) => "IntPtr".into(),
            Self::Struct(s) => s.ty().name().into(),
            Self::Object(o) => o.ty().name().into(),
            Self::Type(_) => "Type".into(),
        }
    }

    /// Returns `true` if this value may be stored in a member declared as `ty`.
    ///
    /// Every value conforms to the root `object` type, `null` conforms to
    /// reference types, objects conform to their own type and its bases.
    pub fn conforms_to(&self, ty: &TypeRef) -> bool {
        if ty.is_object_root() {
            return true;
        }
        match (self, ty.kind()) {
            (Self::Null, kind) => kind.is_reference(),
            (Self::Bool(_), TypeKind::Bool)
            | (Self::Int(_), TypeKind::Int)
            | (Self::Float(_), TypeKind::Float)
            | (Self::Str(_), TypeKind::String)
            | (Self::Ptr(_), TypeKind::Pointer) => true,
            (Self::Struct(s), TypeKind::ValueType) => s.ty().handle() == ty.handle(),
            (Self::Object(o), TypeKind::Class) => o.ty().is_subclass_of(ty),
            (Self::Type(_), TypeKind::Class) => ty.is_system_type(),
            _ => false,
        }
    }

    /// Fails with [`ReflectError::TypeMismatch`] unless the value conforms to `ty`.
    pub fn expect_type(&self, ty: &TypeRef) -> Result<(), ReflectError> {
        if self.conforms_to(ty) {
            Ok(())
        } else {
            Err(ReflectError::TypeMismatch {
                expected: crate::display::type_display_name(ty),
                found: self.type_name(),
            })
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Ptr(a), Self::Ptr(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => a.handle() == b.handle(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::value_preview(self))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Self::Struct(value)
    }
}

// -----------------------------------------------------------------------------
// StructValue

/// An instance of a value type.
///
/// Fields are stored by slot, in declaration order.
#[derive(Clone)]
pub struct StructValue {
    ty: TypeRef,
    fields: Box<[Value]>,
}

impl StructValue {
    /// Creates a struct of type `ty` with every field set to its default.
    pub fn new(ty: &TypeRef) -> Self {
        Self {
            ty: ty.clone(),
            fields: ty.default_instance_fields(),
        }
    }

    /// Returns the struct's type.
    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Returns the value stored in `slot`.
    pub fn slot(&self, slot: usize) -> Result<&Value, ReflectError> {
        let len = self.fields.len();
        self.fields
            .get(slot)
            .ok_or(ReflectError::IndexOutOfRange { index: slot, len })
    }

    /// Replaces the value stored in `slot`.
    pub fn set_slot(&mut self, slot: usize, value: Value) -> Result<(), ReflectError> {
        let len = self.fields.len();
        let target = self
            .fields
            .get_mut(slot)
            .ok_or(ReflectError::IndexOutOfRange { index: slot, len })?;
        *target = value;
        Ok(())
    }

    /// Returns the field values in slot order.
    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.handle() == other.ty.handle() && self.fields == other.fields
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::struct_preview(self))
    }
}

// -----------------------------------------------------------------------------
// BoxedStruct

/// A shared, mutable copy of a struct value.
///
/// Reading a value-type member yields a copy. To edit members of that copy
/// in place and later write the whole copy back, the inspector keeps it in a
/// box that every entry inspecting it shares.
#[derive(Clone)]
pub struct BoxedStruct(Arc<Mutex<StructValue>>);

impl BoxedStruct {
    /// Boxes a copy of `value`.
    pub fn new(value: StructValue) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> StructValue {
        lock_unpoisoned(&self.0).clone()
    }

    /// Returns the boxed struct's type.
    pub fn ty(&self) -> TypeRef {
        lock_unpoisoned(&self.0).ty().clone()
    }

    /// Runs `f` with mutable access to the contents.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut StructValue) -> R) -> R {
        f(&mut lock_unpoisoned(&self.0))
    }

    /// Returns an identifier stable for the lifetime of the box.
    #[inline]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0).addr()
    }

    /// Returns `true` if both handles share the same box.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BoxedStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedStruct").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxedStruct, StructValue, Value};
    use crate::ty::{TypeBuilder, builtin};

    #[test]
    fn struct_copies_are_independent() {
        let vec2 = TypeBuilder::value_type("Engine", "Vector2")
            .field("x", builtin::float())
            .field("y", builtin::float())
            .build();

        let original = Value::Struct(StructValue::new(&vec2));
        let mut copy = original.clone();
        if let Value::Struct(s) = &mut copy {
            s.set_slot(0, Value::Float(3.0)).unwrap();
        }

        assert_ne!(original, copy);
        let Value::Struct(s) = original else {
            unreachable!();
        };
        assert_eq!(s.fields()[0], Value::Float(0.0));
    }

    #[test]
    fn boxed_struct_is_shared() {
        let vec2 = TypeBuilder::value_type("Engine", "Vector2")
            .field("x", builtin::float())
            .build();

        let boxed = BoxedStruct::new(StructValue::new(&vec2));
        let alias = boxed.clone();
        alias.with_mut(|s| s.set_slot(0, Value::Float(1.5))).unwrap();

        assert!(boxed.ptr_eq(&alias));
        assert_eq!(boxed.snapshot().fields()[0], Value::Float(1.5));
    }

    #[test]
    fn conformance() {
        let base = TypeBuilder::class("Engine", "Component").build();
        let derived = TypeBuilder::class("Game", "Health").base(&base).build();
        let obj = crate::ObjectRef::new(&derived);

        assert!(Value::Object(obj.clone()).conforms_to(&base));
        assert!(Value::Null.conforms_to(&base));
        assert!(!Value::Null.conforms_to(&builtin::int()));
        assert!(Value::Int(3).conforms_to(&builtin::object()));
        assert!(!Value::Int(3).conforms_to(&builtin::float()));
        assert!(Value::Type(base.clone()).conforms_to(&builtin::system_type()));
    }
}
