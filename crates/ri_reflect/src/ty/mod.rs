//! Runtime type descriptions.
//!
//! - [`TypeInfo`]: a loaded type and its members, shared as [`TypeRef`].
//! - [`TypeBuilder`]: assembles a [`TypeInfo`] and assigns member ids and storage slots.
//! - [`builtin`]: the primitive and root types every runtime provides.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod type_info;

pub mod builtin;

// -----------------------------------------------------------------------------
// Exports

pub use builder::TypeBuilder;
pub use type_info::{TypeHandle, TypeInfo, TypeKind, TypeRef};
