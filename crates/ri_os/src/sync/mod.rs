//! Synchronization primitives.
//!
//! All inspector state is driven from the host's frame callback, so nothing
//! here is contended in practice. Process-wide tables still need `Sync`
//! containers to live in a `static`, which is what these re-exports are for.

// -----------------------------------------------------------------------------
// Modules

mod lock;

pub mod atomic {
    //! Re-exports of `core::sync::atomic`.
    pub use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
}

// -----------------------------------------------------------------------------
// Exports

pub use std::sync::{Arc, Weak};
pub use std::sync::{LazyLock, OnceLock};
pub use std::sync::{Mutex, MutexGuard, PoisonError};

pub use lock::lock_unpoisoned;
