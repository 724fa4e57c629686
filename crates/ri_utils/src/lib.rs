//! Small shared utilities for the inspector crates.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod text;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use text::contains_ignore_case;
