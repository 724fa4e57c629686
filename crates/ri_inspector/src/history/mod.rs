//! The change history: an ordered, undoable log of every mutation made
//! through the inspector.
//!
//! - [`Change`]: one record, either an assignment or a named action.
//! - [`ChangeHistory`]: the ordered log, with same-member coalescing.
//! - [`ChangeLog`]: a shared handle to a history, including the
//!   process-wide one returned by [`ChangeLog::global`].

// -----------------------------------------------------------------------------
// Modules

mod change;
mod export;
mod history;

// -----------------------------------------------------------------------------
// Exports

pub use change::{Change, ChangeKind, ChangeTarget, UndoFn};
pub use export::pseudo_code;
pub use history::{ChangeHistory, ChangeLog};

use ri_reflect::ReflectError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ChangeError

/// A failed undo.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChangeError {
    /// The record was created without an undo delegate.
    #[error("this change cannot be undone")]
    NotUndoable,

    #[error("no change at index {index}, the log holds {len}")]
    NoSuchRecord { index: usize, len: usize },

    /// The undo delegate ran and failed.
    #[error("undo failed: {0}")]
    Failed(#[from] ReflectError),
}
