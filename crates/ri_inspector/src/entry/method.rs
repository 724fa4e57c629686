use ri_reflect::display::{method_signature, type_display_name};
use ri_reflect::member::MethodInfo;
use ri_reflect::{TypeRef, Value};

use super::{CacheEntry, EntryCore, EntryInstance, error_value};
use crate::EntryEnv;

/// An entry over a method.
///
/// Methods are never called by merely listing them. The first
/// [`enter_value`](CacheEntry::enter_value) runs the method and keeps the
/// result without drilling into it. Entering again returns the kept
/// result, so the user can inspect it.
#[derive(Clone)]
pub struct MethodCacheEntry {
    core: EntryCore,
    method: MethodInfo,
    result: Option<Value>,
}

impl MethodCacheEntry {
    /// Creates an entry over `method`, declared by `owner`, of `instance`.
    pub fn new(instance: EntryInstance, owner: &TypeRef, method: MethodInfo, env: EntryEnv) -> Self {
        Self {
            core: EntryCore::member(method.name(), owner, instance, env),
            method,
            result: None,
        }
    }

    pub fn declared(mut self, declared: bool) -> Self {
        self.core.set_declared(declared);
        self
    }

    #[inline]
    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    /// Returns `true` once the method was run.
    #[inline]
    pub fn has_run(&self) -> bool {
        self.result.is_some()
    }

    fn run(&self) -> Value {
        let method = &self.method;
        let result = self
            .core
            .instance()
            .access(|this| method.invoke(this, &[]));
        match result {
            Ok(value) => value,
            Err(err) => error_value(self.core.name(), &err),
        }
    }
}

impl CacheEntry for MethodCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        self.method
            .return_type()
            .map_or_else(|| "void".into(), |ty| type_display_name(ty))
    }

    fn owner(&self) -> Option<&TypeRef> {
        self.core.owner()
    }

    fn is_declared(&self) -> bool {
        self.core.declared()
    }

    /// Returns the result of the last run, `Null` before the first.
    fn get_value(&mut self) -> Value {
        self.result.clone().unwrap_or_default()
    }

    fn set_value(&mut self, _value: Value) {}

    fn enter_value(&mut self) -> Value {
        match &self.result {
            Some(result) => result.clone(),
            None => {
                let result = self.run();
                self.result = Some(result);
                Value::Null
            }
        }
    }

    fn can_set_value(&self) -> bool {
        false
    }

    fn can_enter_value(&mut self) -> bool {
        self.result.as_ref().is_none_or(|result| !result.is_primitive())
    }

    /// Forgets the last result; the next enter runs the method again.
    fn reset_cache(&mut self) {
        self.result = None;
    }

    fn tooltip(&self) -> String {
        let signature = method_signature(&self.method);
        match self.core.owner() {
            Some(owner) => format!("{signature}\nDeclared in {}", owner.full_name()),
            None => signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use ri_os::sync::Arc;
    use ri_os::sync::atomic::{AtomicUsize, Ordering};
    use ri_reflect::member::MethodBuilder;
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{ObjectRef, ReflectError, Value};

    use super::MethodCacheEntry;
    use crate::EntryEnv;
    use crate::entry::{CacheEntry, EntryInstance};

    #[test]
    fn two_step_enter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let item = TypeBuilder::class("Game", "Item").build();
        let spawned = item.clone();
        let ty = TypeBuilder::class("Game", "Spawner")
            .method(
                MethodBuilder::new("Spawn")
                    .returns(item.clone())
                    .invoker(move |_, _| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(Value::Object(ObjectRef::new(&spawned)))
                    }),
            )
            .build();
        let obj = ObjectRef::new(&ty);
        let method = ty.find_method("Spawn").unwrap().clone();
        let mut entry = MethodCacheEntry::new(EntryInstance::object(&obj), &ty, method, EntryEnv::default());

        assert_eq!(entry.get_value(), Value::Null);
        assert!(entry.can_enter_value());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(entry.enter_value(), Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(entry.has_run());

        let Value::Object(first) = entry.enter_value() else {
            panic!("expected the kept result");
        };
        let Value::Object(again) = entry.get_value() else {
            panic!("expected the kept result");
        };
        assert!(first.ptr_eq(&again));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(entry.type_name(), "Item");
    }

    #[test]
    fn failures_and_primitive_results() {
        let ty = TypeBuilder::class("Game", "Dice")
            .method(
                MethodBuilder::new("Roll")
                    .static_()
                    .returns(builtin::int())
                    .invoker(|_, _| Ok(Value::Int(4))),
            )
            .method(MethodBuilder::new("Explode").invoker(|_, _| Err(ReflectError::invocation("boom"))))
            .build();
        let env = EntryEnv::default();

        let roll = ty.find_method("Roll").unwrap().clone();
        let mut roll = MethodCacheEntry::new(EntryInstance::Static, &ty, roll, env.clone());
        assert_eq!(roll.name(), "S/Roll");
        roll.enter_value();
        assert_eq!(roll.get_value(), Value::Int(4));
        assert!(!roll.can_enter_value());
        assert!(!roll.can_set_value());

        let explode = ty.find_method("Explode").unwrap().clone();
        let obj = ObjectRef::new(&ty);
        let mut explode = MethodCacheEntry::new(EntryInstance::object(&obj), &ty, explode, env);
        explode.enter_value();
        assert_eq!(explode.get_value(), Value::Str("ERROR: boom".into()));
        assert_eq!(explode.type_name(), "void");
    }
}
