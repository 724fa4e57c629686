use crate::value::StructValue;
use crate::{ObjectRef, ReflectError, Value};

// -----------------------------------------------------------------------------
// Receiver

/// The `this` of a member access.
///
/// Static members are accessed through [`Receiver::Static`]. Members of a
/// value type are accessed on a mutable struct so that setters can change it
/// in place.
pub enum Receiver<'a> {
    Static,
    Object(&'a ObjectRef),
    Struct(&'a mut StructValue),
}

impl Receiver<'_> {
    /// Returns `true` for [`Receiver::Static`].
    #[inline]
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Static)
    }

    /// Returns a shorter-lived copy of this receiver.
    pub fn reborrow(&mut self) -> Receiver<'_> {
        match self {
            Self::Static => Receiver::Static,
            Self::Object(obj) => Receiver::Object(obj),
            Self::Struct(value) => Receiver::Struct(value),
        }
    }

    /// Returns the object, if this is an object receiver.
    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Reads a field of the receiver by name, searching base types too.
    ///
    /// Intended for host getters and methods that forward to fields.
    pub fn read(&mut self, field: &str) -> Result<Value, ReflectError> {
        let ty = self.receiver_type(field)?;
        let info = ty
            .find_field(field)
            .ok_or_else(|| ReflectError::invocation(format!("{} has no field {field}", ty.name())))?;
        info.get(self.reborrow())
    }

    /// Writes a field of the receiver by name, searching base types too.
    pub fn write(&mut self, field: &str, value: Value) -> Result<(), ReflectError> {
        let ty = self.receiver_type(field)?;
        let info = ty
            .find_field(field)
            .ok_or_else(|| ReflectError::invocation(format!("{} has no field {field}", ty.name())))?;
        info.set(self.reborrow(), value)
    }

    fn receiver_type(&self, member: &str) -> Result<crate::TypeRef, ReflectError> {
        match self {
            Self::Static => Err(ReflectError::NullReference(member.into())),
            Self::Object(obj) => Ok(obj.ty().clone()),
            Self::Struct(value) => Ok(value.ty().clone()),
        }
    }
}
