//! Platform shims shared by the inspector crates.
//!
//! The inspector always runs inside a host process with a full standard
//! library, so these modules re-export `std` and add the few helpers the
//! other crates need on top of it.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

pub mod sync;
pub mod time;
