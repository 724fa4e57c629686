use ri_reflect::Value;

use crate::EntryEnv;
use crate::entry::{AnyCacheEntry, CacheEntry};
use crate::members::{collect_entries, filter_entries};
use crate::stack::{InspectorStack, InspectorStackEntry, StackError};

/// The inspector controller: a set of tabs, each a drill-down stack.
///
/// There is always at least one tab, possibly empty.
#[derive(Debug)]
pub struct Inspector {
    tabs: Vec<InspectorStack>,
    current: usize,
    env: EntryEnv,
}

impl Inspector {
    /// Creates an inspector with one empty tab.
    pub fn new(env: EntryEnv) -> Self {
        Self {
            tabs: vec![InspectorStack::new()],
            current: 0,
            env,
        }
    }

    #[inline]
    pub fn env(&self) -> &EntryEnv {
        &self.env
    }

    #[inline]
    pub fn tabs(&self) -> &[InspectorStack] {
        &self.tabs
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_tab(&self) -> &InspectorStack {
        &self.tabs[self.current]
    }

    pub fn current_tab_mut(&mut self) -> &mut InspectorStack {
        &mut self.tabs[self.current]
    }

    /// Pushes `entry` onto the current tab.
    pub fn push(&mut self, entry: InspectorStackEntry) {
        self.current_tab_mut().push(entry);
    }

    /// Opens `entry` in a new tab and selects it.
    pub fn push_new_tab(&mut self, entry: InspectorStackEntry) {
        let mut stack = InspectorStack::new();
        stack.push(entry);
        self.tabs.push(stack);
        self.current = self.tabs.len() - 1;
    }

    pub fn select_tab(&mut self, index: usize) -> Result<(), StackError> {
        if index >= self.tabs.len() {
            return Err(StackError::NoSuchTab {
                index,
                len: self.tabs.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Closes a tab. Closing the last tab leaves one empty tab.
    pub fn close_tab(&mut self, index: usize) -> Result<(), StackError> {
        if index >= self.tabs.len() {
            return Err(StackError::NoSuchTab {
                index,
                len: self.tabs.len(),
            });
        }
        self.tabs.remove(index);
        if self.tabs.is_empty() {
            self.tabs.push(InspectorStack::new());
        }
        if self.current > index || self.current >= self.tabs.len() {
            self.current = self.current.saturating_sub(1);
        }
        Ok(())
    }

    /// Enters the value of `entry`, pushing it onto the current tab if it can
    /// be inspected.
    ///
    /// Returns `true` if something was pushed. Struct copies keep `entry` as
    /// their parent, so edits to them are written back.
    pub fn enter(&mut self, entry: &mut AnyCacheEntry) -> bool {
        if !entry.can_enter_value() {
            return false;
        }
        let next = match entry.enter_value() {
            Value::Object(obj) => InspectorStackEntry::object(&obj),
            Value::Struct(value) => InspectorStackEntry::structure(entry.name(), value, Some(entry.clone())),
            Value::Type(ty) => InspectorStackEntry::static_type(ty),
            _ => return false,
        };
        self.push(next);
        true
    }

    /// Returns the entries to display for the top of the current tab,
    /// filtered by its search string.
    ///
    /// Yields nothing for an empty tab or a destroyed target.
    pub fn current_entries(&self) -> Vec<AnyCacheEntry> {
        let Some(top) = self.current_tab().top() else {
            return Vec::new();
        };
        if !top.is_valid() {
            return Vec::new();
        }
        let mut entries = collect_entries(top.target(), &self.env);
        filter_entries(&mut entries, top.search_string());
        entries
    }

    /// Drops destroyed targets, and everything above them, from every tab.
    pub fn prune_invalid(&mut self) -> usize {
        self.tabs.iter_mut().map(InspectorStack::truncate_invalid).sum()
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(EntryEnv::default())
    }
}
