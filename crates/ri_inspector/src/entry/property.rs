use ri_reflect::display::{property_signature, type_display_name};
use ri_reflect::member::PropertyInfo;
use ri_reflect::{TypeRef, Value};

use super::{AnyCacheEntry, CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;
use crate::history::Change;

/// An entry over a property.
///
/// Reading calls the getter, which may have side effects; with value
/// caching on it is called once per listing.
#[derive(Clone)]
pub struct PropertyCacheEntry {
    core: EntryCore,
    property: PropertyInfo,
}

impl PropertyCacheEntry {
    /// Creates an entry over `property`, declared by `owner`, of `instance`.
    pub fn new(instance: EntryInstance, owner: &TypeRef, property: PropertyInfo, env: EntryEnv) -> Self {
        Self {
            core: EntryCore::member(property.name(), owner, instance, env),
            property,
        }
    }

    pub fn declared(mut self, declared: bool) -> Self {
        self.core.set_declared(declared);
        self
    }

    /// Sets the entry whose struct copy this property belongs to.
    pub fn with_parent(mut self, parent: AnyCacheEntry) -> Self {
        self.core.set_parent(parent);
        self
    }

    #[inline]
    pub fn property(&self) -> &PropertyInfo {
        &self.property
    }

    #[inline]
    pub fn instance(&self) -> &EntryInstance {
        self.core.instance()
    }
}

impl CacheEntry for PropertyCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        type_display_name(self.property.property_type())
    }

    fn owner(&self) -> Option<&TypeRef> {
        self.core.owner()
    }

    fn is_declared(&self) -> bool {
        self.core.declared()
    }

    fn get_value(&mut self) -> Value {
        let property = &self.property;
        self.core.read(|instance| instance.access(|this| property.get(this)))
    }

    fn set_value(&mut self, value: Value) {
        if !self.can_set_value() {
            return;
        }
        let property = self.property.clone();
        let reader = &self.property;
        self.core.commit(
            self.property.name(),
            Change::ASSIGNMENT_FORMAT,
            value,
            |instance| {
                if reader.can_read() {
                    instance.access(|this| reader.get(this))
                } else {
                    Ok(Value::Null)
                }
            },
            move |instance, value| instance.access(|this| property.set(this, value)),
        );
    }

    fn can_set_value(&self) -> bool {
        self.property.can_write() && self.core.parent_settable()
    }

    fn reset_cache(&mut self) {
        self.core.reset_cache();
    }

    fn tooltip(&self) -> String {
        match self.core.owner() {
            Some(owner) => format!(
                "{}\nDeclared in {}",
                property_signature(&self.property),
                owner.full_name()
            ),
            None => property_signature(&self.property),
        }
    }
}

#[cfg(test)]
mod tests {
    use ri_os::sync::Arc;
    use ri_os::sync::atomic::{AtomicUsize, Ordering};
    use ri_os::time::ManualClock;
    use ri_reflect::member::PropertyBuilder;
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{ObjectRef, TypeRef, Value};

    use super::PropertyCacheEntry;
    use crate::EntryEnv;
    use crate::entry::{CacheEntry, EntryInstance};
    use crate::history::{ChangeHistory, ChangeLog};
    use crate::settings::InspectorSettings;

    fn counting_type(calls: &Arc<AtomicUsize>) -> TypeRef {
        let calls = calls.clone();
        TypeBuilder::class("Game", "Timer")
            .field("_elapsed", builtin::float())
            .property(
                PropertyBuilder::new("Elapsed", builtin::float())
                    .getter(move |mut this| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        this.read("_elapsed")
                    })
                    .setter(|mut this, value| this.write("_elapsed", value)),
            )
            .property(PropertyBuilder::new("Now", builtin::float()).getter(|_| Ok(Value::Float(1.0))))
            .build()
    }

    fn entry(ty: &TypeRef, obj: &ObjectRef, name: &str, env: &EntryEnv) -> PropertyCacheEntry {
        let prop = ty.find_property(name).unwrap().clone();
        PropertyCacheEntry::new(EntryInstance::object(obj), ty, prop, env.clone())
    }

    fn env(caching: bool) -> EntryEnv {
        let settings = InspectorSettings::default();
        settings.set_cache_values(caching);
        EntryEnv::new(settings, ChangeLog::new(ChangeHistory::with_clock(ManualClock::new())))
    }

    #[test]
    fn uncached_reads_call_the_getter_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ty = counting_type(&calls);
        let obj = ObjectRef::new(&ty);
        let mut elapsed = entry(&ty, &obj, "Elapsed", &env(false));

        elapsed.get_value();
        elapsed.get_value();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_reads_call_the_getter_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ty = counting_type(&calls);
        let obj = ObjectRef::new(&ty);
        let env = env(true);
        let mut elapsed = entry(&ty, &obj, "Elapsed", &env);

        elapsed.get_value();
        elapsed.get_value();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A write reads the old value once for the change record.
        elapsed.set_value(Value::Float(2.5));
        let after_write = calls.load(Ordering::SeqCst);
        assert_eq!(elapsed.get_value(), Value::Float(2.5));
        assert_eq!(calls.load(Ordering::SeqCst), after_write);

        elapsed.reset_cache();
        assert_eq!(elapsed.get_value(), Value::Float(2.5));
        assert_eq!(calls.load(Ordering::SeqCst), after_write + 1);
        assert_eq!(env.changes().len(), 1);
    }

    #[test]
    fn getter_only_properties_are_not_settable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ty = counting_type(&calls);
        let obj = ObjectRef::new(&ty);
        let env = env(true);
        let mut now = entry(&ty, &obj, "Now", &env);

        assert!(!now.can_set_value());
        now.set_value(Value::Float(9.0));
        assert_eq!(now.get_value(), Value::Float(1.0));
        assert_eq!(env.changes().len(), 0);
        assert_eq!(now.type_name(), "float");
        assert!(now.tooltip().starts_with("float Now { get; }"));
    }
}
