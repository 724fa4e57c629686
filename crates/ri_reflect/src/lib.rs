//! The managed object model the inspector reflects over.
//!
//! A host runtime exposes its loaded types as [`TypeInfo`] values holding
//! fields, properties, methods and events. Live instances are [`ObjectRef`]s
//! (shared reference types) or [`StructValue`]s (value types, copied on every
//! read). Members are read and written through a [`Receiver`].
//!
//! # Example
//!
//! ```
//! use ri_reflect::ty::{TypeBuilder, builtin};
//! use ri_reflect::{ObjectRef, Receiver, Value};
//!
//! let player = TypeBuilder::class("Game", "Player")
//!     .field("health", builtin::int())
//!     .build();
//!
//! let obj = ObjectRef::new(&player);
//! let health = player.find_field("health").unwrap();
//!
//! health.set(Receiver::Object(&obj), Value::Int(80)).unwrap();
//! assert_eq!(health.get(Receiver::Object(&obj)).unwrap(), Value::Int(80));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod error;
mod object;
mod receiver;
mod runtime;
mod value;

pub mod display;
pub mod member;
pub mod ty;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::ReflectError;
pub use object::{ObjectId, ObjectRef, WeakObject};
pub use receiver::Receiver;
pub use runtime::{ParseRuntimeError, RuntimeFlavor};
pub use ty::{TypeHandle, TypeInfo, TypeKind, TypeRef};
pub use value::{BoxedStruct, StructValue, Value};
