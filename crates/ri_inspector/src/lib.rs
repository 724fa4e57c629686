//! The inspector core.
//!
//! - [`entry`]: cache entries, the uniform read/write/enter rows over the
//!   members of an inspected target.
//! - [`interop`]: the native pointers behind members under IL2CPP.
//! - [`InspectorStack`]: drill-down navigation, one per [`Inspector`] tab.
//! - [`history`]: the log of every write made through the inspector, with
//!   undo and export.
//!
//! Options are explicit: every entry reads them from the [`EntryEnv`] it was
//! created with, see [`settings::InspectorSettings`].
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod env;
mod inspector;
mod members;
mod stack;

pub mod entry;
pub mod history;
pub mod interop;
pub mod logging;
pub mod settings;

// -----------------------------------------------------------------------------
// Top-level exports

pub use env::EntryEnv;
pub use inspector::Inspector;
pub use members::{collect_entries, filter_entries};
pub use stack::{
    InspectorStack, InspectorStackEntry, InstanceTarget, ScrollPosition, StackError, StackTarget,
};
