use core::fmt;

use ri_os::sync::Arc;
use ri_reflect::display::type_display_name;
use ri_reflect::{TypeRef, Value};

use super::{CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;

type Callback = Arc<dyn Fn() -> Value + Send + Sync>;

/// A synthetic entry that runs a callback when entered.
///
/// It displays a fixed message. Entering calls the callback and returns
/// its result, `null` for actions.
#[derive(Clone)]
pub struct CallbackCacheEntry {
    core: EntryCore,
    message: Box<str>,
    return_type: Option<TypeRef>,
    callback: Callback,
}

impl CallbackCacheEntry {
    /// An entry running `action`.
    pub fn action<F>(name: &str, message: &str, action: F, env: EntryEnv) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            core: EntryCore::synthetic(name, None, EntryInstance::Static, env),
            message: message.into(),
            return_type: None,
            callback: Arc::new(move || {
                action();
                Value::Null
            }),
        }
    }

    /// An entry returning the result of `func`.
    pub fn func<F, T>(name: &str, message: &str, return_type: TypeRef, func: F, env: EntryEnv) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        Self {
            core: EntryCore::synthetic(name, None, EntryInstance::Static, env),
            message: message.into(),
            return_type: Some(return_type),
            callback: Arc::new(move || func().into()),
        }
    }
}

impl CacheEntry for CallbackCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        self.return_type
            .as_ref()
            .map_or_else(|| "void".into(), |ty| type_display_name(ty))
    }

    fn owner(&self) -> Option<&TypeRef> {
        None
    }

    fn get_value(&mut self) -> Value {
        Value::Str(self.message.to_string())
    }

    fn set_value(&mut self, _value: Value) {}

    fn enter_value(&mut self) -> Value {
        (self.callback)()
    }

    fn can_set_value(&self) -> bool {
        false
    }

    fn can_enter_value(&mut self) -> bool {
        true
    }

    fn tooltip(&self) -> String {
        format!("{} {}()", self.type_name(), self.core.name())
    }
}

impl fmt::Debug for CallbackCacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackCacheEntry")
            .field("name", &self.core.name())
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
