//! Cache entries: the rows of the inspector.
//!
//! A cache entry wraps one member of an inspected target, or a synthetic
//! value that is not backed by a member at all, behind the uniform
//! [`CacheEntry`] interface. Entries are created each time a target's
//! members are listed and are dropped with the listing.
//!
//! Reading never fails: a member that throws, or whose instance was
//! destroyed, reads as a `"ERROR: <message>"` string. Writes through
//! [`CacheEntry::set_value`] are reported to the entry's
//! [`ChangeLog`](crate::history::ChangeLog).
//!
//! # Value types
//!
//! Reading a struct member yields a copy. When the inspector drills into
//! such a copy, the entries of its members hold the entry the copy came
//! from as their *parent*. Writing a member of the copy then writes the
//! whole copy back through the parent, which may itself be a member of
//! another copy, up to the first real object or static member.

// -----------------------------------------------------------------------------
// Modules

mod base;
mod callback;
mod event;
mod field;
mod list;
mod method;
mod property;
mod readonly;

// -----------------------------------------------------------------------------
// Exports

pub use callback::CallbackCacheEntry;
pub use event::EventCacheEntry;
pub use field::FieldCacheEntry;
pub use list::ListCacheEntry;
pub use method::MethodCacheEntry;
pub use property::PropertyCacheEntry;
pub use readonly::ReadonlyCacheEntry;

pub(crate) use base::{EntryCore, error_value};

use core::fmt;

use ri_reflect::display::value_preview;
use ri_reflect::{BoxedStruct, ObjectRef, ReflectError, Receiver, TypeRef, Value, WeakObject};

use crate::history::ChangeTarget;
use crate::interop::Il2CppCacheEntry;

// -----------------------------------------------------------------------------
// CacheEntry

/// What the display layer shows for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDisplay {
    pub text: String,
    pub tooltip: String,
}

/// The uniform interface over reflected and synthetic members.
pub trait CacheEntry {
    /// Returns the display name. Static members listed without an instance
    /// are prefixed with `S/`.
    fn name(&self) -> &str;

    /// Returns the friendly name of the member's declared type.
    fn type_name(&self) -> String;

    /// Returns the type declaring the member, if any.
    fn owner(&self) -> Option<&TypeRef>;

    /// Returns `false` for members inherited from a base type.
    fn is_declared(&self) -> bool {
        true
    }

    /// Returns the current value, or an error string if reading failed.
    ///
    /// With value caching on, a successful read is remembered and returned
    /// until the next write or [`reset_cache`](Self::reset_cache).
    fn get_value(&mut self) -> Value;

    /// Writes a new value.
    ///
    /// Does nothing when [`can_set_value`](Self::can_set_value) is false.
    /// Failures are logged, never returned.
    fn set_value(&mut self, value: Value);

    /// Returns the value to drill into.
    fn enter_value(&mut self) -> Value {
        self.get_value()
    }

    /// Returns `true` if [`set_value`](Self::set_value) may change anything.
    fn can_set_value(&self) -> bool;

    /// Returns `true` if entering yields something worth inspecting.
    fn can_enter_value(&mut self) -> bool {
        !self.get_value().is_primitive()
    }

    /// Forgets the cached value, if any.
    fn reset_cache(&mut self) {}

    /// Returns a longer description for tooltips.
    fn tooltip(&self) -> String;

    /// Returns the displayed text and tooltip.
    fn display(&mut self) -> EntryDisplay {
        EntryDisplay {
            text: value_preview(&self.get_value()),
            tooltip: self.tooltip(),
        }
    }
}

// -----------------------------------------------------------------------------
// EntryInstance

/// The instance a member entry reads from.
#[derive(Clone)]
pub enum EntryInstance {
    /// No instance: the member is static.
    Static,
    /// A live object, held weakly.
    Object(WeakObject),
    /// The inspected copy of a struct.
    Struct(BoxedStruct),
}

impl EntryInstance {
    /// Creates an instance referring weakly to `obj`.
    #[inline]
    pub fn object(obj: &ObjectRef) -> Self {
        Self::Object(obj.downgrade())
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Static)
    }

    /// Returns `true` if the instance was destroyed by the host.
    pub fn is_destroyed(&self) -> bool {
        match self {
            Self::Object(weak) => weak.is_destroyed(),
            Self::Static | Self::Struct(_) => false,
        }
    }

    /// Runs `f` with a receiver for this instance.
    pub fn access<R>(
        &self,
        f: impl FnOnce(Receiver<'_>) -> Result<R, ReflectError>,
    ) -> Result<R, ReflectError> {
        match self {
            Self::Static => f(Receiver::Static),
            Self::Object(weak) => {
                let obj = weak.upgrade_live()?;
                f(Receiver::Object(&obj))
            }
            Self::Struct(boxed) => boxed.with_mut(|value| f(Receiver::Struct(value))),
        }
    }

    /// Returns the change-log target for members of this instance.
    pub(crate) fn change_target(&self, owner: Option<&TypeRef>) -> ChangeTarget {
        match self {
            Self::Static => owner.map_or(ChangeTarget::None, |ty| ChangeTarget::Static(ty.clone())),
            Self::Object(weak) => ChangeTarget::Object(weak.clone()),
            Self::Struct(boxed) => ChangeTarget::Struct {
                ty: boxed.ty(),
                id: boxed.id(),
            },
        }
    }
}

impl fmt::Debug for EntryInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("Static"),
            Self::Object(weak) => fmt::Debug::fmt(weak, f),
            Self::Struct(boxed) => fmt::Debug::fmt(boxed, f),
        }
    }
}

// -----------------------------------------------------------------------------
// AnyCacheEntry

/// Every kind of cache entry.
///
/// The variant is chosen once, when members are listed.
#[derive(Clone)]
pub enum AnyCacheEntry {
    Field(FieldCacheEntry),
    Property(PropertyCacheEntry),
    Method(MethodCacheEntry),
    Event(EventCacheEntry),
    Callback(CallbackCacheEntry),
    List(ListCacheEntry),
    Readonly(ReadonlyCacheEntry),
    /// A reflected member with the native pointers backing it.
    Il2Cpp(Box<Il2CppCacheEntry>),
}

macro_rules! dispatch {
    ($self:expr, $entry:ident => $body:expr) => {
        match $self {
            AnyCacheEntry::Field($entry) => $body,
            AnyCacheEntry::Property($entry) => $body,
            AnyCacheEntry::Method($entry) => $body,
            AnyCacheEntry::Event($entry) => $body,
            AnyCacheEntry::Callback($entry) => $body,
            AnyCacheEntry::List($entry) => $body,
            AnyCacheEntry::Readonly($entry) => $body,
            AnyCacheEntry::Il2Cpp($entry) => $body,
        }
    };
}

impl AnyCacheEntry {
    /// Returns `true` for entries backed by a reflected member.
    pub fn is_member(&self) -> bool {
        match self {
            Self::Field(_) | Self::Property(_) | Self::Method(_) | Self::Event(_) => true,
            Self::Il2Cpp(_) => true,
            Self::Callback(_) | Self::List(_) | Self::Readonly(_) => false,
        }
    }

    /// Returns the interop details, if this entry has any.
    pub fn as_il2cpp(&self) -> Option<&Il2CppCacheEntry> {
        match self {
            Self::Il2Cpp(entry) => Some(&**entry),
            _ => None,
        }
    }
}

impl CacheEntry for AnyCacheEntry {
    fn name(&self) -> &str {
        dispatch!(self, e => e.name())
    }

    fn type_name(&self) -> String {
        dispatch!(self, e => e.type_name())
    }

    fn owner(&self) -> Option<&TypeRef> {
        dispatch!(self, e => e.owner())
    }

    fn is_declared(&self) -> bool {
        dispatch!(self, e => e.is_declared())
    }

    fn get_value(&mut self) -> Value {
        dispatch!(self, e => e.get_value())
    }

    fn set_value(&mut self, value: Value) {
        dispatch!(self, e => e.set_value(value))
    }

    fn enter_value(&mut self) -> Value {
        dispatch!(self, e => e.enter_value())
    }

    fn can_set_value(&self) -> bool {
        dispatch!(self, e => e.can_set_value())
    }

    fn can_enter_value(&mut self) -> bool {
        dispatch!(self, e => e.can_enter_value())
    }

    fn reset_cache(&mut self) {
        dispatch!(self, e => e.reset_cache())
    }

    fn tooltip(&self) -> String {
        dispatch!(self, e => e.tooltip())
    }

    fn display(&mut self) -> EntryDisplay {
        dispatch!(self, e => e.display())
    }
}

impl fmt::Debug for AnyCacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCacheEntry")
            .field("name", &self.name())
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

macro_rules! impl_from_entry {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for AnyCacheEntry {
                #[inline]
                fn from(entry: $ty) -> Self {
                    Self::$variant(entry)
                }
            }
        )*
    };
}

impl_from_entry!(
    Field(FieldCacheEntry),
    Property(PropertyCacheEntry),
    Method(MethodCacheEntry),
    Event(EventCacheEntry),
    Callback(CallbackCacheEntry),
    List(ListCacheEntry),
    Readonly(ReadonlyCacheEntry),
);

impl From<Il2CppCacheEntry> for AnyCacheEntry {
    #[inline]
    fn from(entry: Il2CppCacheEntry) -> Self {
        Self::Il2Cpp(Box::new(entry))
    }
}
