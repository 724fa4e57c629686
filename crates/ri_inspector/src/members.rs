use ri_reflect::{RuntimeFlavor, TypeRef, Value};
use ri_utils::contains_ignore_case;

use crate::EntryEnv;
use crate::entry::{
    AnyCacheEntry, CacheEntry, CallbackCacheEntry, EntryInstance, EventCacheEntry, FieldCacheEntry,
    ListCacheEntry, MethodCacheEntry, PropertyCacheEntry, ReadonlyCacheEntry,
};
use crate::interop;
use crate::stack::{InstanceTarget, StackTarget};

// -----------------------------------------------------------------------------
// Scope

/// How the members of one inspected target are bound.
struct Scope<'a> {
    /// `None` when only static members are listed.
    instance: Option<EntryInstance>,
    /// The entry a struct copy was read from.
    parent: Option<&'a AnyCacheEntry>,
    env: &'a EntryEnv,
}

impl Scope<'_> {
    fn instance_for(&self, is_static: bool) -> Option<EntryInstance> {
        if is_static {
            Some(EntryInstance::Static)
        } else {
            self.instance.clone()
        }
    }

    fn parent_for(&self, is_static: bool) -> Option<AnyCacheEntry> {
        if is_static { None } else { self.parent.cloned() }
    }

    fn resolve(&self, entry: AnyCacheEntry) -> AnyCacheEntry {
        match self.env.runtime() {
            RuntimeFlavor::Il2Cpp => interop::enhance(entry),
            RuntimeFlavor::Mono => entry,
        }
    }

    /// Lists the members `owner` declares, in field, property, method,
    /// event order.
    fn members(&self, owner: &TypeRef, declared: bool, out: &mut Vec<AnyCacheEntry>) {
        let env = self.env;
        for field in owner.fields() {
            let Some(instance) = self.instance_for(field.is_static()) else {
                continue;
            };
            let mut entry = FieldCacheEntry::new(instance, owner, field.clone(), env.clone()).declared(declared);
            if let Some(parent) = self.parent_for(field.is_static()) {
                entry = entry.with_parent(parent);
            }
            out.push(self.resolve(entry.into()));
        }
        for property in owner.properties() {
            let Some(instance) = self.instance_for(property.is_static()) else {
                continue;
            };
            let mut entry =
                PropertyCacheEntry::new(instance, owner, property.clone(), env.clone()).declared(declared);
            if let Some(parent) = self.parent_for(property.is_static()) {
                entry = entry.with_parent(parent);
            }
            out.push(self.resolve(entry.into()));
        }
        // Only methods callable without arguments can be run from the listing.
        for method in owner.methods().iter().filter(|m| m.parameters().is_empty()) {
            let Some(instance) = self.instance_for(method.is_static()) else {
                continue;
            };
            let entry = MethodCacheEntry::new(instance, owner, method.clone(), env.clone()).declared(declared);
            out.push(self.resolve(entry.into()));
        }
        for event in owner.events() {
            let Some(instance) = self.instance_for(event.is_static()) else {
                continue;
            };
            let entry = EventCacheEntry::new(instance, owner, event.clone(), env.clone()).declared(declared);
            out.push(self.resolve(entry.into()));
        }
    }

    /// Lists the members of `ty` and, if enabled, of its base types.
    fn hierarchy(&self, ty: &TypeRef, out: &mut Vec<AnyCacheEntry>) {
        let show_inherited = self.env.settings().show_inherited();
        let chain = core::iter::successors(Some(ty.clone()), |ty| ty.base().cloned());
        for (depth, owner) in chain.enumerate() {
            let declared = depth == 0;
            if !declared && !show_inherited {
                break;
            }
            self.members(&owner, declared, out);
        }
    }
}

// -----------------------------------------------------------------------------
// Collection

fn help_entries(env: &EntryEnv) -> Vec<AnyCacheEntry> {
    let changes = env.changes().clone();
    vec![
        ReadonlyCacheEntry::new("Runtime", env.runtime().as_str(), env.clone()).into(),
        ReadonlyCacheEntry::new("Cache values", env.caching(), env.clone()).into(),
        ReadonlyCacheEntry::new("Recorded changes", Value::Int(changes.len() as i64), env.clone()).into(),
        CallbackCacheEntry::action(
            "Clear change history",
            "Click to forget every recorded change",
            move || changes.clear(),
            env.clone(),
        )
        .into(),
    ]
}

/// Creates the entries to display for `target`.
///
/// Members of the target's type come first, then those inherited from each
/// base type in turn. Static targets list static members only. List objects
/// also get one entry per item. A destroyed target has no entries.
pub fn collect_entries(target: &StackTarget, env: &EntryEnv) -> Vec<AnyCacheEntry> {
    let mut out = Vec::new();
    match target {
        StackTarget::Help => return help_entries(env),
        StackTarget::StaticType(ty) => {
            let scope = Scope {
                instance: None,
                parent: None,
                env,
            };
            scope.hierarchy(ty, &mut out);
        }
        StackTarget::Instance(InstanceTarget::Object(weak)) => {
            let Ok(obj) = weak.upgrade_live() else {
                return out;
            };
            let scope = Scope {
                instance: Some(EntryInstance::object(&obj)),
                parent: None,
                env,
            };
            scope.hierarchy(obj.ty(), &mut out);
            if let Ok(len) = obj.list_len() {
                out.extend((0..len).map(|index| ListCacheEntry::new(&obj, index, env.clone()).into()));
            }
        }
        StackTarget::Instance(InstanceTarget::Struct { value, parent }) => {
            let scope = Scope {
                instance: Some(EntryInstance::Struct(value.clone())),
                parent: parent.as_deref(),
                env,
            };
            scope.hierarchy(&value.ty(), &mut out);
        }
    }
    out
}

/// Keeps the entries whose name or type name contains `search`, ignoring case.
pub fn filter_entries(entries: &mut Vec<AnyCacheEntry>, search: &str) {
    if search.is_empty() {
        return;
    }
    entries.retain(|entry| {
        contains_ignore_case(entry.name(), search) || contains_ignore_case(&entry.type_name(), search)
    });
}

#[cfg(test)]
mod tests {
    use ri_os::time::ManualClock;
    use ri_reflect::member::{MethodBuilder, PropertyBuilder};
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{ObjectRef, RuntimeFlavor, TypeRef, Value};

    use super::{collect_entries, filter_entries};
    use crate::EntryEnv;
    use crate::entry::{AnyCacheEntry, CacheEntry};
    use crate::history::{ChangeHistory, ChangeLog};
    use crate::settings::InspectorSettings;
    use crate::stack::InspectorStackEntry;

    fn env(runtime: RuntimeFlavor) -> EntryEnv {
        EntryEnv::new(
            InspectorSettings::new(runtime),
            ChangeLog::new(ChangeHistory::with_clock(ManualClock::new())),
        )
    }

    fn enemy() -> TypeRef {
        let base = TypeBuilder::class("Game", "Actor")
            .field("name", builtin::string())
            .build();
        TypeBuilder::class("Game", "Enemy")
            .base(&base)
            .field("health", builtin::int())
            .static_field("count", builtin::int())
            .property(PropertyBuilder::new("Alive", builtin::bool()).getter(|_| Ok(Value::Bool(true))))
            .method(MethodBuilder::new("Kill"))
            .method(MethodBuilder::new("Hit").param("damage", builtin::int()))
            .build()
    }

    fn names(entries: &[AnyCacheEntry]) -> Vec<&str> {
        entries.iter().map(CacheEntry::name).collect()
    }

    #[test]
    fn declared_members_come_first() {
        let ty = enemy();
        let obj = ObjectRef::new(&ty);
        let env = env(RuntimeFlavor::Mono);
        let entries = collect_entries(InspectorStackEntry::object(&obj).target(), &env);

        assert_eq!(names(&entries), ["health", "S/count", "Alive", "Kill", "name"]);
        assert!(entries[0].is_declared());
        assert!(!entries[4].is_declared());

        env.settings().set_show_inherited(false);
        let entries = collect_entries(InspectorStackEntry::object(&obj).target(), &env);
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn static_targets_list_static_members() {
        let env = env(RuntimeFlavor::Mono);
        let entries = collect_entries(InspectorStackEntry::static_type(enemy()).target(), &env);
        assert_eq!(names(&entries), ["S/count"]);
    }

    #[test]
    fn destroyed_targets_have_no_entries() {
        let ty = enemy();
        let obj = ObjectRef::new(&ty);
        let entry = InspectorStackEntry::object(&obj);
        obj.destroy();
        assert!(collect_entries(entry.target(), &env(RuntimeFlavor::Mono)).is_empty());
    }

    #[test]
    fn lists_get_item_entries() {
        let ty = TypeBuilder::list("System", "List", &builtin::float()).build();
        let list = ObjectRef::new_list(&ty, vec![Value::Float(0.5), Value::Float(1.5)]);
        let entries = collect_entries(InspectorStackEntry::object(&list).target(), &env(RuntimeFlavor::Mono));
        assert_eq!(names(&entries), ["[0]", "[1]"]);
    }

    #[test]
    fn il2cpp_entries_carry_pointers() {
        let ty = TypeBuilder::class("Il2CppGame", "Crate")
            .field("weight", builtin::float())
            .static_field_with("NativeFieldInfoPtr_weight", builtin::intptr(), Value::Ptr(0x40))
            .build();
        let obj = ObjectRef::new(&ty);
        let target = InspectorStackEntry::object(&obj);

        let entries = collect_entries(target.target(), &env(RuntimeFlavor::Il2Cpp));
        assert!(entries[0].as_il2cpp().is_some());
        assert!(entries[1].as_il2cpp().is_none());

        let entries = collect_entries(target.target(), &env(RuntimeFlavor::Mono));
        assert!(entries.iter().all(|entry| entry.as_il2cpp().is_none()));
    }

    #[test]
    fn help_page() {
        let env = env(RuntimeFlavor::Il2Cpp);
        let mut entries = collect_entries(InspectorStackEntry::help().target(), &env);
        assert_eq!(entries[0].get_value(), Value::Str("IL2CPP".into()));

        let clear = entries.last_mut().unwrap();
        assert_eq!(clear.name(), "Clear change history");
        assert_eq!(clear.enter_value(), Value::Null);
    }

    #[test]
    fn filtering_ignores_case() {
        let ty = enemy();
        let obj = ObjectRef::new(&ty);
        let mut entries = collect_entries(InspectorStackEntry::object(&obj).target(), &env(RuntimeFlavor::Mono));

        filter_entries(&mut entries, "HEALTH");
        assert_eq!(names(&entries), ["health"]);

        let mut entries = collect_entries(InspectorStackEntry::object(&obj).target(), &env(RuntimeFlavor::Mono));
        filter_entries(&mut entries, "bool");
        assert_eq!(names(&entries), ["Alive"]);

        filter_entries(&mut entries, "");
        assert_eq!(entries.len(), 1);
    }
}
