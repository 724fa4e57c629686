//! Native pointer resolution for the IL2CPP runtime.
//!
//! Under IL2CPP every managed member is a generated wrapper that loads a
//! static `IntPtr` field and calls through it. The inspector shows those
//! pointers next to the member for debugging. Fields are backed by a field
//! named `NativeFieldInfoPtr_<name>`; methods and accessors by the first
//! static pointer field their body loads.
//!
//! Under Mono none of this applies and entries bind to the managed members
//! directly.

// -----------------------------------------------------------------------------
// Modules

mod entry;
mod lookup;

// -----------------------------------------------------------------------------
// Exports

pub use entry::{Il2CppCacheEntry, NativePointers, enhance};
pub use lookup::{NativeHandle, PtrLookupTable, get_ptr_lookup_table, safe_get_ptr};
