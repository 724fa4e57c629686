use ri_reflect::display::type_display_name;
use ri_reflect::{ObjectRef, ReflectError, Receiver, TypeRef, Value};

use super::{CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;

/// Description format of list item writes: `List [#3][0] = 5`.
const INDEX_FORMAT: &str = "{target}{member} = {value}";

fn list_item(this: Receiver<'_>, index: usize) -> Result<&ObjectRef, ReflectError> {
    match this {
        Receiver::Object(list) => Ok(list),
        _ => Err(ReflectError::NotAContainer(format!("[{index}]"))),
    }
}

/// A synthetic entry over one item of a list.
#[derive(Clone)]
pub struct ListCacheEntry {
    core: EntryCore,
    index: usize,
}

impl ListCacheEntry {
    /// Creates an entry over item `index` of `list`.
    pub fn new(list: &ObjectRef, index: usize, env: EntryEnv) -> Self {
        let name = format!("[{index}]");
        Self {
            core: EntryCore::synthetic(&name, Some(list.ty().clone()), EntryInstance::object(list), env),
            index,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl CacheEntry for ListCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        self.core
            .owner()
            .and_then(|list| list.element_type())
            .map_or_else(|| "object".into(), |ty| type_display_name(ty))
    }

    fn owner(&self) -> Option<&TypeRef> {
        self.core.owner()
    }

    fn get_value(&mut self) -> Value {
        let index = self.index;
        self.core
            .read(|instance| instance.access(|this| list_item(this, index)?.list_get(index)))
    }

    fn set_value(&mut self, value: Value) {
        let index = self.index;
        let member = format!("[{index}]");
        self.core.commit(
            &member,
            INDEX_FORMAT,
            value,
            |instance| instance.access(|this| list_item(this, index)?.list_get(index)),
            move |instance, value| instance.access(|this| list_item(this, index)?.list_set(index, value)),
        );
    }

    fn can_set_value(&self) -> bool {
        true
    }

    fn reset_cache(&mut self) {
        self.core.reset_cache();
    }

    fn tooltip(&self) -> String {
        format!("{} {}", self.type_name(), self.core.name())
    }
}

#[cfg(test)]
mod tests {
    use ri_os::time::ManualClock;
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{ObjectRef, Value};

    use super::ListCacheEntry;
    use crate::EntryEnv;
    use crate::entry::CacheEntry;
    use crate::history::{ChangeHistory, ChangeLog};
    use crate::settings::InspectorSettings;

    #[test]
    fn items_read_and_write() {
        let env = EntryEnv::new(
            InspectorSettings::default(),
            ChangeLog::new(ChangeHistory::with_clock(ManualClock::new())),
        );
        let ty = TypeBuilder::list("System", "List", &builtin::int()).build();
        let list = ObjectRef::new_list(&ty, vec![Value::Int(1), Value::Int(2)]).with_name("Scores");

        let mut second = ListCacheEntry::new(&list, 1, env.clone());
        assert_eq!(second.name(), "[1]");
        assert_eq!(second.type_name(), "long");
        assert_eq!(second.get_value(), Value::Int(2));

        second.set_value(Value::Int(7));
        assert_eq!(list.list_get(1), Ok(Value::Int(7)));
        assert_eq!(env.changes().export_pseudo_code(), "List.Find(\"Scores\")[1] = 7;\n");

        let mut missing = ListCacheEntry::new(&list, 5, env);
        assert!(matches!(missing.get_value(), Value::Str(s) if s.starts_with("ERROR: ")));
    }
}
