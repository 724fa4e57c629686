//! Reflected members: fields, properties, methods and events.
//!
//! Every member carries a [`MemberId`] unique within its declaring type and
//! the [`TypeHandle`](crate::TypeHandle) of that type. Accessors of generated
//! interop wrappers also record which static fields their body loads, see
//! [`MethodBody`].

// -----------------------------------------------------------------------------
// Modules

mod event;
mod field;
mod method;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub use event::{EventBuilder, EventInfo};
pub use field::{FieldBuilder, FieldInfo};
pub use method::{Invoker, MethodBuilder, MethodInfo, ParameterInfo};
pub use property::{Getter, PropertyBuilder, PropertyInfo, Setter};

use core::fmt;

use ri_os::sync::Arc;

// -----------------------------------------------------------------------------
// MemberId

/// The kind of a reflected member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Event,
}

/// Identifies a member within its declaring type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId {
    kind: MemberKind,
    index: usize,
}

impl MemberId {
    #[inline]
    pub const fn new(kind: MemberKind, index: usize) -> Self {
        Self { kind, index }
    }

    #[inline]
    pub const fn kind(self) -> MemberKind {
        self.kind
    }

    /// Returns the declaration index among members of the same kind.
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.index)
    }
}

// -----------------------------------------------------------------------------
// MethodBody

/// What is known about the body of a method.
///
/// Generated interop wrappers do little more than load a static pointer
/// field and call through it, so the names of the static fields a body loads
/// are enough to find the native function backing a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodBody {
    loads: Box<[Arc<str>]>,
}

impl MethodBody {
    /// A body that loads the given static fields, in order.
    pub fn loading<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            loads: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the names of the static fields the body loads.
    #[inline]
    pub fn loads(&self) -> &[Arc<str>] {
        &self.loads
    }

    pub(crate) fn push(&mut self, field: Arc<str>) {
        let mut loads = core::mem::take(&mut self.loads).into_vec();
        loads.push(field);
        self.loads = loads.into_boxed_slice();
    }
}
