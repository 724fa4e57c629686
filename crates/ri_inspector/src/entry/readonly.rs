use ri_reflect::{TypeRef, Value};

use super::{CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;

/// A synthetic entry showing a fixed value.
#[derive(Clone)]
pub struct ReadonlyCacheEntry {
    core: EntryCore,
    value: Value,
}

impl ReadonlyCacheEntry {
    pub fn new(name: &str, value: impl Into<Value>, env: EntryEnv) -> Self {
        Self {
            core: EntryCore::synthetic(name, None, EntryInstance::Static, env),
            value: value.into(),
        }
    }
}

impl CacheEntry for ReadonlyCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        self.value.type_name()
    }

    fn owner(&self) -> Option<&TypeRef> {
        None
    }

    fn get_value(&mut self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, _value: Value) {}

    fn can_set_value(&self) -> bool {
        false
    }

    fn tooltip(&self) -> String {
        format!("{} {}", self.type_name(), self.core.name())
    }
}

#[cfg(test)]
mod tests {
    use ri_reflect::Value;

    use super::ReadonlyCacheEntry;
    use crate::EntryEnv;
    use crate::entry::CacheEntry;

    #[test]
    fn shows_its_value() {
        let env = EntryEnv::default();
        let mut entry = ReadonlyCacheEntry::new("Version", "1.2.0", env.clone());

        assert_eq!(entry.get_value(), Value::Str("1.2.0".into()));
        entry.set_value(Value::Str("2.0".into()));
        assert_eq!(entry.get_value(), Value::Str("1.2.0".into()));
        assert!(!entry.can_set_value());
        assert!(!entry.can_enter_value());
        assert_eq!(env.changes().len(), 0);
    }
}
