use ri_reflect::display::{field_signature, type_display_name};
use ri_reflect::member::FieldInfo;
use ri_reflect::{TypeRef, Value};

use super::{AnyCacheEntry, CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;
use crate::history::Change;

/// An entry over a field.
///
/// Constants and readonly fields are shown but never written.
#[derive(Clone)]
pub struct FieldCacheEntry {
    core: EntryCore,
    field: FieldInfo,
}

impl FieldCacheEntry {
    /// Creates an entry over `field`, declared by `owner`, of `instance`.
    pub fn new(instance: EntryInstance, owner: &TypeRef, field: FieldInfo, env: EntryEnv) -> Self {
        Self {
            core: EntryCore::member(field.name(), owner, instance, env),
            field,
        }
    }

    /// Marks the field as inherited from a base type or not.
    pub fn declared(mut self, declared: bool) -> Self {
        self.core.set_declared(declared);
        self
    }

    /// Sets the entry whose struct copy this field belongs to.
    pub fn with_parent(mut self, parent: AnyCacheEntry) -> Self {
        self.core.set_parent(parent);
        self
    }

    #[inline]
    pub fn field(&self) -> &FieldInfo {
        &self.field
    }

    #[inline]
    pub fn instance(&self) -> &EntryInstance {
        self.core.instance()
    }

    #[inline]
    pub fn parent(&self) -> Option<&AnyCacheEntry> {
        self.core.parent()
    }
}

impl CacheEntry for FieldCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        type_display_name(self.field.field_type())
    }

    fn owner(&self) -> Option<&TypeRef> {
        self.core.owner()
    }

    fn is_declared(&self) -> bool {
        self.core.declared()
    }

    fn get_value(&mut self) -> Value {
        let field = &self.field;
        self.core.read(|instance| instance.access(|this| field.get(this)))
    }

    fn set_value(&mut self, value: Value) {
        if !self.can_set_value() {
            return;
        }
        let field = self.field.clone();
        let reader = &self.field;
        self.core.commit(
            self.field.name(),
            Change::ASSIGNMENT_FORMAT,
            value,
            |instance| instance.access(|this| reader.get(this)),
            move |instance, value| instance.access(|this| field.set(this, value)),
        );
    }

    fn can_set_value(&self) -> bool {
        !self.field.is_literal() && !self.field.is_readonly() && self.core.parent_settable()
    }

    fn reset_cache(&mut self) {
        self.core.reset_cache();
    }

    fn tooltip(&self) -> String {
        match self.core.owner() {
            Some(owner) => format!("{}\nDeclared in {}", field_signature(&self.field), owner.full_name()),
            None => field_signature(&self.field),
        }
    }
}

#[cfg(test)]
mod tests {
    use ri_os::time::ManualClock;
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{BoxedStruct, ObjectRef, Receiver, StructValue, TypeRef, Value};

    use super::FieldCacheEntry;
    use crate::entry::{CacheEntry, EntryInstance};
    use crate::history::{ChangeHistory, ChangeLog};
    use crate::settings::InspectorSettings;
    use crate::EntryEnv;

    fn env() -> EntryEnv {
        EntryEnv::new(
            InspectorSettings::default(),
            ChangeLog::new(ChangeHistory::with_clock(ManualClock::new())),
        )
    }

    fn enemy() -> TypeRef {
        TypeBuilder::class("Game", "Enemy")
            .field("health", builtin::int())
            .readonly_field("id", builtin::int())
            .const_field("MaxHealth", builtin::int(), Value::Int(100))
            .static_field("count", builtin::int())
            .build()
    }

    fn entry(ty: &TypeRef, name: &str, instance: EntryInstance, env: &EntryEnv) -> FieldCacheEntry {
        let field = ty.find_field(name).unwrap().clone();
        FieldCacheEntry::new(instance, ty, field, env.clone())
    }

    #[test]
    fn static_entries_are_prefixed() {
        let ty = enemy();
        let env = env();
        let obj = ObjectRef::new(&ty);

        assert_eq!(entry(&ty, "count", EntryInstance::Static, &env).name(), "S/count");
        assert_eq!(entry(&ty, "health", EntryInstance::object(&obj), &env).name(), "health");
    }

    #[test]
    fn readonly_and_constants_are_not_settable() {
        let ty = enemy();
        let env = env();
        let obj = ObjectRef::new(&ty);

        let mut id = entry(&ty, "id", EntryInstance::object(&obj), &env);
        let mut max = entry(&ty, "MaxHealth", EntryInstance::Static, &env);
        assert!(!id.can_set_value());
        assert!(!max.can_set_value());

        assert_eq!(id.get_value(), Value::Int(0));
        id.set_value(Value::Int(5));
        max.set_value(Value::Int(5));

        assert_eq!(id.get_value(), Value::Int(0));
        assert_eq!(max.get_value(), Value::Int(100));
        assert_eq!(env.changes().len(), 0);
    }

    #[test]
    fn writes_are_logged_once_per_change() {
        let ty = enemy();
        let env = env();
        let obj = ObjectRef::new(&ty).with_name("Orc");
        let mut health = entry(&ty, "health", EntryInstance::object(&obj), &env);

        health.set_value(Value::Int(40));
        assert_eq!(obj.ty().find_field("health").unwrap().get(Receiver::Object(&obj)), Ok(Value::Int(40)));
        assert_eq!(health.get_value(), Value::Int(40));

        // Same value again: nothing changes, nothing is logged.
        health.set_value(Value::Int(40));
        assert_eq!(env.changes().len(), 1);
        assert_eq!(
            env.changes().lock().records()[0].description(),
            "(Orc)::Enemy.health = 40"
        );

        // Wrong type: the write fails quietly.
        health.set_value(Value::Str("full".into()));
        assert_eq!(env.changes().len(), 1);

        env.changes().undo(0).unwrap();
        health.reset_cache();
        assert_eq!(health.get_value(), Value::Int(0));
    }

    #[test]
    fn detached_struct_copies_are_logged_against_the_copy() {
        let vector = TypeBuilder::value_type("UnityEngine", "Vector3")
            .field("x", builtin::float())
            .build();
        let env = env();
        let copy = BoxedStruct::new(StructValue::new(&vector));
        let mut x = entry(&vector, "x", EntryInstance::Struct(copy.clone()), &env);
        let current = || copy.snapshot().fields()[0].clone();

        assert!(x.can_set_value());
        x.set_value(Value::Float(2.0));
        assert_eq!(current(), Value::Float(2.0));
        assert_eq!(env.changes().len(), 1);
        assert!(
            env.changes().lock().records()[0]
                .description()
                .starts_with("Vector3 [struct].x = ")
        );

        env.changes().undo(0).unwrap();
        assert_eq!(current(), Value::Float(0.0));
        assert_eq!(env.changes().len(), 1);
    }

    #[test]
    fn destroyed_instance_reads_as_error() {
        let ty = enemy();
        let env = env();
        env.settings().set_cache_values(false);
        let obj = ObjectRef::new(&ty);
        let mut health = entry(&ty, "health", EntryInstance::object(&obj), &env);

        obj.destroy();
        let Value::Str(text) = health.get_value() else {
            panic!("expected an error string");
        };
        assert!(text.starts_with("ERROR: "));
        assert!(!health.can_enter_value());

        drop(obj);
        assert!(matches!(health.get_value(), Value::Str(s) if s.starts_with("ERROR: ")));
    }

    #[test]
    fn static_field_of_broken_type() {
        let ty = TypeBuilder::class("Game", "Broken")
            .static_field("instance", builtin::object())
            .initialization_error("NullReferenceException")
            .build();
        let env = env();
        let mut instance = entry(&ty, "instance", EntryInstance::Static, &env);

        assert!(matches!(instance.get_value(), Value::Str(s) if s.contains("NullReferenceException")));
    }
}
