//! Temporal quantification.
//!
//! Re-exports the standard library's `time` module and adds a small
//! [`Clock`] abstraction so that code stamping records with wall-clock time
//! can be driven deterministically.

// -----------------------------------------------------------------------------
// Modules

mod clock;

// -----------------------------------------------------------------------------
// Exports

pub use core::time::Duration;
pub use std::time::{Instant, SystemTime, SystemTimeError, UNIX_EPOCH};

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
