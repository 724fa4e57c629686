//! Persisted options and the host capability that stores them.
//!
//! The host owns persistence. The inspector registers each option once
//! through [`SettingsHost::register`] and keeps the returned
//! [`SettingHandle`] to change it later. Registration reports the current
//! value to the change callback right away, so state derived from a setting
//! never starts out of sync.

use core::fmt;
use std::collections::BTreeMap;

use ri_os::sync::atomic::{AtomicBool, Ordering};
use ri_os::sync::{Arc, Mutex, lock_unpoisoned};
use ri_reflect::RuntimeFlavor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// -----------------------------------------------------------------------------
// SettingValue

/// The value of a single option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    /// Returns the name of the value's kind, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn same_kind(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Saved option values: `category -> name -> value`.
pub type SettingsDocument = BTreeMap<String, BTreeMap<String, SettingValue>>;

/// Called with the new value whenever a setting changes.
pub type OnChange = Box<dyn FnMut(&SettingValue) + Send>;

// -----------------------------------------------------------------------------
// SettingError

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingError {
    #[error("setting {category}/{name} is already registered")]
    Duplicate { category: String, name: String },

    #[error("setting {category}/{name} holds {expected} values, got {found}")]
    TypeMismatch {
        category: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

// -----------------------------------------------------------------------------
// SettingHandle

struct SettingSlot {
    category: Box<str>,
    name: Box<str>,
    description: Box<str>,
    default: SettingValue,
    value: Mutex<SettingValue>,
    on_change: Mutex<OnChange>,
}

/// The setter returned by a registration.
///
/// Handles are shared: clones change the same setting.
#[derive(Clone)]
pub struct SettingHandle(Arc<SettingSlot>);

impl SettingHandle {
    /// Creates the storage of a setting and reports its initial value.
    ///
    /// The initial value is `current` when given, `default` otherwise.
    /// Host implementations of [`SettingsHost`] build their handles with this.
    pub fn new(
        category: &str,
        name: &str,
        default: SettingValue,
        current: Option<SettingValue>,
        description: &str,
        mut on_change: OnChange,
    ) -> Result<Self, SettingError> {
        let value = current.unwrap_or_else(|| default.clone());
        if !value.same_kind(&default) {
            return Err(SettingError::TypeMismatch {
                category: category.into(),
                name: name.into(),
                expected: default.kind(),
                found: value.kind(),
            });
        }

        on_change(&value);

        Ok(Self(Arc::new(SettingSlot {
            category: category.into(),
            name: name.into(),
            description: description.into(),
            default,
            value: Mutex::new(value),
            on_change: Mutex::new(on_change),
        })))
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.0.category
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.0.description
    }

    #[inline]
    pub fn default_value(&self) -> &SettingValue {
        &self.0.default
    }

    /// Returns the current value.
    pub fn get(&self) -> SettingValue {
        lock_unpoisoned(&self.0.value).clone()
    }

    /// Changes the value and notifies the change callback.
    ///
    /// The callback must not set the same setting again.
    pub fn set(&self, value: SettingValue) -> Result<(), SettingError> {
        if !value.same_kind(&self.0.default) {
            return Err(SettingError::TypeMismatch {
                category: self.0.category.to_string(),
                name: self.0.name.to_string(),
                expected: self.0.default.kind(),
                found: value.kind(),
            });
        }
        *lock_unpoisoned(&self.0.value) = value.clone();
        (lock_unpoisoned(&self.0.on_change))(&value);
        Ok(())
    }

    /// Restores the default value.
    pub fn reset(&self) {
        let default = self.0.default.clone();
        *lock_unpoisoned(&self.0.value) = default.clone();
        (lock_unpoisoned(&self.0.on_change))(&default);
    }
}

impl fmt::Debug for SettingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingHandle")
            .field("category", &self.category())
            .field("name", &self.name())
            .field("value", &self.get())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SettingsHost

/// The settings-registration capability of the host.
pub trait SettingsHost {
    /// Registers one option.
    ///
    /// Implementations must call `on_change` before returning, with the
    /// saved value if there is one and `default` otherwise.
    fn register(
        &mut self,
        category: &str,
        name: &str,
        default: SettingValue,
        description: &str,
        on_change: OnChange,
    ) -> Result<SettingHandle, SettingError>;
}

/// A [`SettingsHost`] keeping everything in memory.
///
/// It can be preloaded from, and saved to, any serde format through
/// [`SettingsDocument`].
#[derive(Default)]
pub struct MemorySettings {
    saved: SettingsDocument,
    handles: Vec<SettingHandle>,
}

impl MemorySettings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host that starts from previously saved values.
    pub fn from_document(saved: SettingsDocument) -> Self {
        Self {
            saved,
            handles: Vec::new(),
        }
    }

    /// Returns the handle of a registered setting.
    pub fn handle(&self, category: &str, name: &str) -> Option<&SettingHandle> {
        self.handles
            .iter()
            .find(|h| h.category() == category && h.name() == name)
    }

    /// Returns every registered setting.
    #[inline]
    pub fn handles(&self) -> &[SettingHandle] {
        &self.handles
    }

    /// Returns the values to save.
    ///
    /// Saved values of settings nobody registered this session are kept.
    pub fn document(&self) -> SettingsDocument {
        let mut document = self.saved.clone();
        for handle in &self.handles {
            document
                .entry(handle.category().to_owned())
                .or_default()
                .insert(handle.name().to_owned(), handle.get());
        }
        document
    }
}

impl SettingsHost for MemorySettings {
    fn register(
        &mut self,
        category: &str,
        name: &str,
        default: SettingValue,
        description: &str,
        on_change: OnChange,
    ) -> Result<SettingHandle, SettingError> {
        if self.handle(category, name).is_some() {
            return Err(SettingError::Duplicate {
                category: category.into(),
                name: name.into(),
            });
        }

        let saved = self
            .saved
            .get(category)
            .and_then(|values| values.get(name))
            .filter(|value| {
                let usable = value.same_kind(&default);
                if !usable {
                    log::warn!(
                        "ignoring saved {} value of setting {category}/{name}, expected {}",
                        value.kind(),
                        default.kind(),
                    );
                }
                usable
            })
            .cloned();

        let handle = SettingHandle::new(category, name, default, saved, description, on_change)?;
        self.handles.push(handle.clone());
        Ok(handle)
    }
}

// -----------------------------------------------------------------------------
// InspectorSettings

/// The options the inspector core reads.
///
/// Cache entries receive this through their
/// [`EntryEnv`](crate::EntryEnv) instead of reading a global, and clones
/// share the same toggles so a host callback updates every holder.
#[derive(Debug, Clone)]
pub struct InspectorSettings {
    cache_values: Arc<AtomicBool>,
    show_inherited: Arc<AtomicBool>,
    runtime: RuntimeFlavor,
}

impl InspectorSettings {
    pub const CATEGORY: &'static str = "Inspector";
    pub const CACHE_VALUES: &'static str = "Cache values";
    pub const SHOW_INHERITED: &'static str = "Show inherited members";

    /// Creates settings with default values for the given runtime.
    pub fn new(runtime: RuntimeFlavor) -> Self {
        Self {
            cache_values: Arc::new(AtomicBool::new(true)),
            show_inherited: Arc::new(AtomicBool::new(true)),
            runtime,
        }
    }

    /// Whether entries remember the last value they read.
    #[inline]
    pub fn cache_values(&self) -> bool {
        self.cache_values.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_cache_values(&self, enabled: bool) {
        self.cache_values.store(enabled, Ordering::Relaxed);
    }

    /// Whether members declared by base types are listed.
    #[inline]
    pub fn show_inherited(&self) -> bool {
        self.show_inherited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_show_inherited(&self, enabled: bool) {
        self.show_inherited.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub const fn runtime(&self) -> RuntimeFlavor {
        self.runtime
    }

    /// Wires every option to a host setting.
    pub fn register(&self, host: &mut impl SettingsHost) -> Result<Vec<SettingHandle>, SettingError> {
        let toggles = [
            (
                Self::CACHE_VALUES,
                &self.cache_values,
                "Remember the last value read from each member instead of calling getters on every redraw.",
            ),
            (
                Self::SHOW_INHERITED,
                &self.show_inherited,
                "List members declared by base types.",
            ),
        ];

        let mut handles = Vec::with_capacity(toggles.len());
        for (name, flag, description) in toggles {
            let default = flag.load(Ordering::Relaxed);
            let flag = flag.clone();
            let handle = host.register(
                Self::CATEGORY,
                name,
                SettingValue::Bool(default),
                description,
                Box::new(move |value| {
                    if let Some(enabled) = value.as_bool() {
                        flag.store(enabled, Ordering::Relaxed);
                    }
                }),
            )?;
            handles.push(handle);
        }
        Ok(handles)
    }
}

impl Default for InspectorSettings {
    fn default() -> Self {
        Self::new(RuntimeFlavor::default())
    }
}
