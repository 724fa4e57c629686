//! An in-process object inspector core: reflected member entries,
//! drill-down navigation and an undoable change history.
//!
//! This crate only re-exports the member crates of the workspace.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use ri_inspector as inspector;
pub use ri_os as os;
pub use ri_reflect as reflect;
pub use ri_utils as utils;
