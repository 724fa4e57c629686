use ri_reflect::display::{event_signature, type_display_name};
use ri_reflect::member::EventInfo;
use ri_reflect::{ReflectError, TypeRef, Value};

use super::{CacheEntry, EntryCore, EntryInstance};
use crate::EntryEnv;

/// An entry over an event.
///
/// The value is the current subscriber list, read from the event's backing
/// field. Events without a known backing field read as `null`.
#[derive(Clone)]
pub struct EventCacheEntry {
    core: EntryCore,
    event: EventInfo,
}

impl EventCacheEntry {
    /// Creates an entry over `event`, declared by `owner`, of `instance`.
    pub fn new(instance: EntryInstance, owner: &TypeRef, event: EventInfo, env: EntryEnv) -> Self {
        Self {
            core: EntryCore::member(event.name(), owner, instance, env),
            event,
        }
    }

    pub fn declared(mut self, declared: bool) -> Self {
        self.core.set_declared(declared);
        self
    }

    #[inline]
    pub fn event(&self) -> &EventInfo {
        &self.event
    }
}

impl CacheEntry for EventCacheEntry {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn type_name(&self) -> String {
        type_display_name(self.event.handler_type())
    }

    fn owner(&self) -> Option<&TypeRef> {
        self.core.owner()
    }

    fn is_declared(&self) -> bool {
        self.core.declared()
    }

    fn get_value(&mut self) -> Value {
        let Some(backing) = self.event.backing_field() else {
            return Value::Null;
        };
        let field = self.core.owner().and_then(|owner| owner.find_field(backing)).cloned();
        self.core.read(|instance| match field {
            Some(field) => instance.access(|this| field.get(this)),
            None => Err(ReflectError::invocation(format!("backing field {backing} not found"))),
        })
    }

    fn set_value(&mut self, _value: Value) {}

    fn can_set_value(&self) -> bool {
        false
    }

    fn reset_cache(&mut self) {
        self.core.reset_cache();
    }

    fn tooltip(&self) -> String {
        let accessors = [
            ("add", self.event.add_method().is_some()),
            ("remove", self.event.remove_method().is_some()),
            ("raise", self.event.raise_method().is_some()),
        ];
        let mut out = event_signature(&self.event);
        out.push_str(" {");
        for (name, present) in accessors {
            if present {
                out.push(' ');
                out.push_str(name);
                out.push(';');
            }
        }
        out.push_str(" }");
        out
    }
}
