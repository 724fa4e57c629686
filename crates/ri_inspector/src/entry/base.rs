use ri_os::sync::{Arc, Mutex, lock_unpoisoned};
use ri_reflect::{ReflectError, TypeRef, Value};

use super::{AnyCacheEntry, CacheEntry, EntryInstance};
use crate::EntryEnv;
use crate::history::UndoFn;

/// Turns a failed reflection call into the value displayed in its place.
pub(crate) fn error_value(context: &str, err: &ReflectError) -> Value {
    if cfg!(all(debug_assertions, feature = "debug")) {
        log::debug!("{context}: {err}");
    }
    Value::Str(format!("ERROR: {err}"))
}

// -----------------------------------------------------------------------------
// EntryCore

/// State shared by every entry kind.
///
/// Clones share the value cache: the copy of an entry held as a parent
/// refreshes the entry the user sees when a nested write goes through it.
#[derive(Clone)]
pub(crate) struct EntryCore {
    name: Box<str>,
    owner: Option<TypeRef>,
    declared: bool,
    instance: EntryInstance,
    parent: Option<Box<AnyCacheEntry>>,
    env: EntryEnv,
    cached: Arc<Mutex<Option<Value>>>,
}

impl EntryCore {
    /// State for an entry over a member declared by `owner`.
    pub(crate) fn member(member: &str, owner: &TypeRef, instance: EntryInstance, env: EntryEnv) -> Self {
        let name = if instance.is_static() {
            format!("S/{member}").into_boxed_str()
        } else {
            member.into()
        };
        Self {
            name,
            owner: Some(owner.clone()),
            declared: true,
            instance,
            parent: None,
            env,
            cached: Arc::default(),
        }
    }

    /// State for an entry not backed by a member.
    pub(crate) fn synthetic(name: &str, owner: Option<TypeRef>, instance: EntryInstance, env: EntryEnv) -> Self {
        Self {
            name: name.into(),
            owner,
            declared: true,
            instance,
            parent: None,
            env,
            cached: Arc::default(),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn owner(&self) -> Option<&TypeRef> {
        self.owner.as_ref()
    }

    #[inline]
    pub(crate) fn declared(&self) -> bool {
        self.declared
    }

    #[inline]
    pub(crate) fn set_declared(&mut self, declared: bool) {
        self.declared = declared;
    }

    #[inline]
    pub(crate) fn instance(&self) -> &EntryInstance {
        &self.instance
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<&AnyCacheEntry> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: AnyCacheEntry) {
        self.parent = Some(Box::new(parent));
    }

    /// Whether every entry up the parent chain accepts writes.
    pub(crate) fn parent_settable(&self) -> bool {
        self.parent.as_deref().is_none_or(CacheEntry::can_set_value)
    }

    /// Reads through the cache.
    pub(crate) fn read(
        &mut self,
        read: impl FnOnce(&EntryInstance) -> Result<Value, ReflectError>,
    ) -> Value {
        let caching = self.env.caching();
        if caching && let Some(value) = &*lock_unpoisoned(&self.cached) {
            return value.clone();
        }
        match read(&self.instance) {
            Ok(value) => {
                if caching {
                    *lock_unpoisoned(&self.cached) = Some(value.clone());
                }
                value
            }
            Err(err) => error_value(&self.name, &err),
        }
    }

    #[inline]
    pub(crate) fn reset_cache(&mut self) {
        *lock_unpoisoned(&self.cached) = None;
    }

    /// Writes `value` and accounts for it.
    ///
    /// Entries inside a struct copy hand the updated copy to their parent,
    /// which writes it back into its own container. Every other entry
    /// reports the write to the change log, unless the value did not change.
    pub(crate) fn commit<W>(
        &mut self,
        member: &str,
        format: &str,
        value: Value,
        read: impl FnOnce(&EntryInstance) -> Result<Value, ReflectError>,
        write: W,
    ) where
        W: Fn(&EntryInstance, Value) -> Result<(), ReflectError> + Send + 'static,
    {
        let original = read(&self.instance);
        if let Err(err) = write(&self.instance, value.clone()) {
            log::warn!("could not set {}: {err}", self.name);
            return;
        }
        *lock_unpoisoned(&self.cached) = self.env.caching().then(|| value.clone());

        if let Some(parent) = &mut self.parent {
            if let EntryInstance::Struct(boxed) = &self.instance {
                parent.set_value(Value::Struct(boxed.snapshot()));
            }
            return;
        }

        let undo = match &original {
            Ok(current) if *current == value => return,
            Ok(_) => {
                let instance = self.instance.clone();
                let undo: UndoFn = Box::new(move |original| write(&instance, original.clone()));
                Some(undo)
            }
            Err(_) => None,
        };
        let target = self.instance.change_target(self.owner.as_ref());
        self.env.changes().report_assignment_as(
            format,
            target,
            member,
            original.unwrap_or_default(),
            value,
            undo,
        );
    }
}
