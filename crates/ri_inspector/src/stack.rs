use core::fmt;

use ri_reflect::display::{object_label, type_display_name};
use ri_reflect::{BoxedStruct, ObjectRef, StructValue, TypeRef, WeakObject};
use thiserror::Error;

use crate::entry::AnyCacheEntry;

// -----------------------------------------------------------------------------
// StackError

/// A navigation request that does not match the current state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("stack index {index} is out of range for a stack of depth {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("there is no tab {index}, {len} tab(s) open")]
    NoSuchTab { index: usize, len: usize },
}

// -----------------------------------------------------------------------------
// InspectorStackEntry

/// The scroll offset of a listing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub x: f32,
    pub y: f32,
}

impl ScrollPosition {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An inspected instance.
#[derive(Clone)]
pub enum InstanceTarget {
    /// A live object, held weakly.
    Object(WeakObject),
    /// A copy of a struct.
    ///
    /// `parent` is the entry the copy was read from. Writing a member of the
    /// copy writes the whole copy back through it.
    Struct {
        value: BoxedStruct,
        parent: Option<Box<AnyCacheEntry>>,
    },
}

/// What a stack entry shows.
#[derive(Clone)]
pub enum StackTarget {
    Instance(InstanceTarget),
    /// The static members of a type.
    StaticType(TypeRef),
    /// The built-in help page.
    Help,
}

/// One level of drill-down navigation.
///
/// Every entry keeps its own search filter and scroll offset, so going back
/// to it restores what the user saw.
#[derive(Clone)]
pub struct InspectorStackEntry {
    name: String,
    target: StackTarget,
    search: String,
    scroll: ScrollPosition,
}

impl InspectorStackEntry {
    fn with_target(name: String, target: StackTarget) -> Self {
        Self {
            name,
            target,
            search: String::new(),
            scroll: ScrollPosition::ZERO,
        }
    }

    /// An entry inspecting `obj`.
    pub fn object(obj: &ObjectRef) -> Self {
        Self::with_target(
            object_label(obj),
            StackTarget::Instance(InstanceTarget::Object(obj.downgrade())),
        )
    }

    /// An entry inspecting a copy of a struct, read through `parent`.
    pub fn structure(name: &str, value: StructValue, parent: Option<AnyCacheEntry>) -> Self {
        let target = InstanceTarget::Struct {
            value: BoxedStruct::new(value),
            parent: parent.map(Box::new),
        };
        Self::with_target(name.into(), StackTarget::Instance(target))
    }

    /// An entry inspecting the static members of `ty`.
    pub fn static_type(ty: TypeRef) -> Self {
        Self::with_target(
            format!("{} [static]", type_display_name(&ty)),
            StackTarget::StaticType(ty),
        )
    }

    pub fn help() -> Self {
        Self::with_target("Help".into(), StackTarget::Help)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn target(&self) -> &StackTarget {
        &self.target
    }

    /// Returns `false` once the inspected object was destroyed.
    ///
    /// Objects may die between two frames; callers check this on every
    /// draw and show a placeholder instead of the listing.
    pub fn is_valid(&self) -> bool {
        match &self.target {
            StackTarget::Instance(InstanceTarget::Object(weak)) => !weak.is_destroyed(),
            StackTarget::Instance(InstanceTarget::Struct { .. }) => true,
            StackTarget::StaticType(_) | StackTarget::Help => true,
        }
    }

    /// Returns the inspected type, if the target is still alive.
    pub fn target_type(&self) -> Option<TypeRef> {
        match &self.target {
            StackTarget::Instance(InstanceTarget::Object(weak)) => weak.upgrade().map(|obj| obj.ty().clone()),
            StackTarget::Instance(InstanceTarget::Struct { value, .. }) => Some(value.ty()),
            StackTarget::StaticType(ty) => Some(ty.clone()),
            StackTarget::Help => None,
        }
    }

    #[inline]
    pub fn search_string(&self) -> &str {
        &self.search
    }

    /// Sets the search filter; `None` clears it.
    pub fn set_search_string(&mut self, search: Option<&str>) {
        self.search.clear();
        self.search.push_str(search.unwrap_or_default());
    }

    #[inline]
    pub fn scroll_position(&self) -> ScrollPosition {
        self.scroll
    }

    #[inline]
    pub fn set_scroll_position(&mut self, scroll: ScrollPosition) {
        self.scroll = scroll;
    }
}

impl fmt::Debug for InspectorStackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectorStackEntry")
            .field("name", &self.name)
            .field("valid", &self.is_valid())
            .field("search", &self.search)
            .field("scroll", &self.scroll)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// InspectorStack

/// The drill-down history of one inspector tab. The top is displayed.
#[derive(Debug, Default, Clone)]
pub struct InspectorStack {
    entries: Vec<InspectorStackEntry>,
}

impl InspectorStack {
    #[inline]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, entry: InspectorStackEntry) {
        log::debug!("inspecting {}", entry.name());
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<InspectorStackEntry> {
        self.entries.pop()
    }

    /// Drops every entry above `index`, making it the top.
    pub fn pop_to(&mut self, index: usize) -> Result<(), StackError> {
        let len = self.entries.len();
        if index >= len {
            return Err(StackError::IndexOutOfRange { index, len });
        }
        self.entries.truncate(index + 1);
        Ok(())
    }

    #[inline]
    pub fn top(&self) -> Option<&InspectorStackEntry> {
        self.entries.last()
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut InspectorStackEntry> {
        self.entries.last_mut()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&InspectorStackEntry> {
        self.entries.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut InspectorStackEntry> {
        self.entries.get_mut(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates from the bottom (the root target) to the top.
    pub fn iter(&self) -> impl Iterator<Item = &InspectorStackEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops the first invalid entry and everything above it.
    ///
    /// Returns the number of entries dropped.
    pub fn truncate_invalid(&mut self) -> usize {
        let len = self.entries.len();
        match self.entries.iter().position(|entry| !entry.is_valid()) {
            Some(first) => {
                self.entries.truncate(first);
                len - first
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use ri_reflect::ObjectRef;
    use ri_reflect::ty::TypeBuilder;

    use super::{InspectorStack, InspectorStackEntry, ScrollPosition, StackError};

    #[test]
    fn pop_to_keeps_earlier_state() {
        let ty = TypeBuilder::class("UnityEngine", "GameObject").build();
        let objects: Vec<_> = ["E1", "E2", "E3"]
            .iter()
            .map(|name| ObjectRef::new(&ty).with_name(*name))
            .collect();
        let mut stack = InspectorStack::new();
        for obj in &objects {
            stack.push(InspectorStackEntry::object(obj));
        }
        let second = stack.get_mut(1).unwrap();
        second.set_search_string(Some("pos"));
        second.set_scroll_position(ScrollPosition::new(0.0, 120.0));

        stack.pop_to(1).unwrap();

        assert_eq!(stack.len(), 2);
        let names: Vec<_> = stack.iter().map(InspectorStackEntry::name).collect();
        assert_eq!(names, ["(E1)::GameObject", "(E2)::GameObject"]);
        let top = stack.top().unwrap();
        assert_eq!(top.search_string(), "pos");
        assert_eq!(top.scroll_position(), ScrollPosition::new(0.0, 120.0));

        assert_eq!(stack.pop_to(2), Err(StackError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn search_string_is_never_missing() {
        let mut entry = InspectorStackEntry::help();
        entry.set_search_string(Some("x"));
        entry.set_search_string(None);
        assert_eq!(entry.search_string(), "");
        assert!(entry.is_valid());
    }

    #[test]
    fn destroyed_objects_invalidate_entries() {
        let ty = TypeBuilder::class("UnityEngine", "GameObject").build();
        let player = TypeBuilder::class("Game", "Player").build();
        let root = ObjectRef::new(&ty).with_name("Root");
        let child = ObjectRef::new(&ty).with_name("Child");

        let mut stack = InspectorStack::new();
        stack.push(InspectorStackEntry::object(&root));
        stack.push(InspectorStackEntry::object(&child));
        stack.push(InspectorStackEntry::static_type(player));
        assert_eq!(stack.truncate_invalid(), 0);

        child.destroy();
        assert!(!stack.get(1).unwrap().is_valid());
        assert!(stack.top().unwrap().is_valid());

        assert_eq!(stack.truncate_invalid(), 2);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top().unwrap().name(), "(Root)::GameObject");

        drop(root);
        assert!(!stack.top().unwrap().is_valid());
    }
}
