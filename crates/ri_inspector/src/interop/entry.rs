
use ri_reflect::member::FieldInfo;
use ri_reflect::{TypeRef, Value};

use super::lookup::{NativeHandle, get_ptr_lookup_table, safe_get_ptr};
use crate::entry::{AnyCacheEntry, CacheEntry, EntryDisplay};

// -----------------------------------------------------------------------------
// NativePointers

/// The native pointer fields found for one member.
#[derive(Clone, Debug)]
pub enum NativePointers {
    /// A field or method, backed by one pointer.
    Single(FieldInfo),
    Property {
        getter: Option<FieldInfo>,
        setter: Option<FieldInfo>,
    },
    Event {
        add: Option<FieldInfo>,
        remove: Option<FieldInfo>,
        raise: Option<FieldInfo>,
    },
}

impl NativePointers {
    /// Returns the labelled pointer slots of this shape, found or not.
    pub fn slots(&self) -> Vec<(&'static str, Option<&FieldInfo>)> {
        match self {
            Self::Single(field) => vec![("Native pointer", Some(field))],
            Self::Property { getter, setter } => vec![
                ("Getter pointer", getter.as_ref()),
                ("Setter pointer", setter.as_ref()),
            ],
            Self::Event { add, remove, raise } => vec![
                ("Add pointer", add.as_ref()),
                ("Remove pointer", remove.as_ref()),
                ("Raise pointer", raise.as_ref()),
            ],
        }
    }

    /// Returns how many pointers were found.
    pub fn found(&self) -> usize {
        self.slots().iter().filter(|(_, field)| field.is_some()).count()
    }
}

// -----------------------------------------------------------------------------
// Il2CppCacheEntry

/// A reflected member together with the native pointers backing it.
///
/// Reads and writes go through the managed wrapper as usual; the pointers
/// are shown in the tooltip only.
#[derive(Clone)]
pub struct Il2CppCacheEntry {
    inner: AnyCacheEntry,
    owner: TypeRef,
    pointers: NativePointers,
}

impl Il2CppCacheEntry {
    #[inline]
    pub fn inner(&self) -> &AnyCacheEntry {
        &self.inner
    }

    #[inline]
    pub fn pointers(&self) -> &NativePointers {
        &self.pointers
    }

    /// Returns each pointer slot with its formatted value.
    pub fn pointer_values(&self) -> Vec<(&'static str, String)> {
        self.pointers
            .slots()
            .into_iter()
            .map(|(label, field)| (label, safe_get_ptr(field, &self.owner)))
            .collect()
    }

    /// Unwraps the plain entry.
    pub fn into_inner(self) -> AnyCacheEntry {
        self.inner
    }
}

impl CacheEntry for Il2CppCacheEntry {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn type_name(&self) -> String {
        self.inner.type_name()
    }

    fn owner(&self) -> Option<&TypeRef> {
        Some(&self.owner)
    }

    fn is_declared(&self) -> bool {
        self.inner.is_declared()
    }

    fn get_value(&mut self) -> Value {
        self.inner.get_value()
    }

    fn set_value(&mut self, value: Value) {
        self.inner.set_value(value);
    }

    fn enter_value(&mut self) -> Value {
        self.inner.enter_value()
    }

    fn can_set_value(&self) -> bool {
        self.inner.can_set_value()
    }

    fn can_enter_value(&mut self) -> bool {
        self.inner.can_enter_value()
    }

    fn reset_cache(&mut self) {
        self.inner.reset_cache();
    }

    fn tooltip(&self) -> String {
        let mut out = self.inner.tooltip();
        for (label, value) in self.pointer_values() {
            out.push_str(&format!("\n{label}: {value}"));
        }
        out
    }

    fn display(&mut self) -> EntryDisplay {
        EntryDisplay {
            text: self.inner.display().text,
            tooltip: self.tooltip(),
        }
    }
}

// -----------------------------------------------------------------------------
// enhance

fn pointers_of(entry: &AnyCacheEntry, owner: &TypeRef) -> Option<NativePointers> {
    let table = get_ptr_lookup_table(owner);
    let get = |handle| table.get(&handle).cloned();
    let pointers = match entry {
        AnyCacheEntry::Field(e) => NativePointers::Single(get(NativeHandle::Field(e.field().id()))?),
        AnyCacheEntry::Method(e) => NativePointers::Single(get(NativeHandle::Method(e.method().id()))?),
        AnyCacheEntry::Property(e) => {
            let id = e.property().id();
            NativePointers::Property {
                getter: get(NativeHandle::Getter(id)),
                setter: get(NativeHandle::Setter(id)),
            }
        }
        AnyCacheEntry::Event(e) => {
            let id = e.event().id();
            NativePointers::Event {
                add: get(NativeHandle::Add(id)),
                remove: get(NativeHandle::Remove(id)),
                raise: get(NativeHandle::Raise(id)),
            }
        }
        _ => return None,
    };
    (pointers.found() > 0).then_some(pointers)
}

/// Attaches the native pointers backing a reflected member to its entry.
///
/// Entries of members without any backing pointer, and synthetic entries,
/// are returned unchanged.
pub fn enhance(entry: AnyCacheEntry) -> AnyCacheEntry {
    let Some(owner) = entry.owner().cloned() else {
        return entry;
    };
    match pointers_of(&entry, &owner) {
        Some(pointers) => Il2CppCacheEntry {
            inner: entry,
            owner,
            pointers,
        }
        .into(),
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use ri_reflect::Value;
    use ri_reflect::member::{EventBuilder, MethodBuilder, PropertyBuilder};
    use ri_reflect::ty::{TypeBuilder, builtin};
    use ri_reflect::{ObjectRef, TypeRef};

    use super::{NativePointers, enhance};
    use crate::EntryEnv;
    use crate::entry::{
        AnyCacheEntry, CacheEntry, EntryInstance, EventCacheEntry, FieldCacheEntry, PropertyCacheEntry,
    };

    fn ptr(ty: TypeBuilder, name: &str, value: usize) -> TypeBuilder {
        ty.static_field_with(name, builtin::intptr(), Value::Ptr(value))
    }

    fn door() -> TypeRef {
        let action = TypeBuilder::class("Il2CppSystem", "Action").build();
        let ty = TypeBuilder::class("Il2CppGame", "Door")
            .field("angle", builtin::float())
            .field("label", builtin::string());
        let ty = ptr(ty, "NativeFieldInfoPtr_angle", 0xa0);
        let ty = ptr(ty, "NativeMethodInfoPtr_get_Open", 0xb0);
        let ty = ptr(ty, "NativeMethodInfoPtr_set_Open", 0xb1);
        let ty = ptr(ty, "NativeMethodInfoPtr_get_Locked", 0xc0);
        let ty = ptr(ty, "NativeMethodInfoPtr_add_Opened", 0xd0);
        ty.property(
            PropertyBuilder::new("Open", builtin::bool())
                .getter(|_| Ok(Value::Bool(false)))
                .getter_loads("NativeMethodInfoPtr_get_Open")
                .setter(|_, _| Ok(()))
                .setter_loads("NativeMethodInfoPtr_set_Open"),
        )
        .property(
            PropertyBuilder::new("Locked", builtin::bool())
                .getter(|_| Ok(Value::Bool(true)))
                .getter_loads("NativeMethodInfoPtr_get_Locked"),
        )
        .property(PropertyBuilder::new("Managed", builtin::bool()).getter(|_| Ok(Value::Bool(true))))
        .event(
            EventBuilder::new("Opened", action.clone())
                .add(MethodBuilder::new("add_Opened").loads("NativeMethodInfoPtr_add_Opened"))
                .remove(MethodBuilder::new("remove_Opened")),
        )
        .event(EventBuilder::new("Closed", action))
        .build()
    }

    fn property(ty: &TypeRef, obj: &ObjectRef, name: &str) -> AnyCacheEntry {
        let prop = ty.find_property(name).unwrap().clone();
        PropertyCacheEntry::new(EntryInstance::object(obj), ty, prop, EntryEnv::default()).into()
    }

    fn event(ty: &TypeRef, obj: &ObjectRef, name: &str) -> AnyCacheEntry {
        let event = ty.find_event(name).unwrap().clone();
        EventCacheEntry::new(EntryInstance::object(obj), ty, event, EntryEnv::default()).into()
    }

    #[test]
    fn property_pointer_shapes() {
        let ty = door();
        let obj = ObjectRef::new(&ty);

        let open = enhance(property(&ty, &obj, "Open"));
        let open = open.as_il2cpp().unwrap();
        assert_eq!(open.pointers().found(), 2);
        assert_eq!(
            open.pointer_values(),
            vec![("Getter pointer", "0xb0".to_string()), ("Setter pointer", "0xb1".to_string())]
        );

        let locked = enhance(property(&ty, &obj, "Locked"));
        let locked = locked.as_il2cpp().unwrap();
        assert_eq!(locked.pointers().found(), 1);
        assert!(locked.tooltip().ends_with("Getter pointer: 0xc0\nSetter pointer: null"));

        assert!(enhance(property(&ty, &obj, "Managed")).as_il2cpp().is_none());
    }

    #[test]
    fn event_and_field_pointer_shapes() {
        let ty = door();
        let obj = ObjectRef::new(&ty);

        let mut opened = enhance(event(&ty, &obj, "Opened"));
        assert!(matches!(
            opened.as_il2cpp().unwrap().pointers(),
            NativePointers::Event { add: Some(_), remove: None, raise: None }
        ));
        assert_eq!(opened.name(), "Opened");
        assert_eq!(opened.get_value(), Value::Null);
        assert!(enhance(event(&ty, &obj, "Closed")).as_il2cpp().is_none());

        let env = EntryEnv::default();
        let angle = ty.find_field("angle").unwrap().clone();
        let mut angle = enhance(FieldCacheEntry::new(EntryInstance::object(&obj), &ty, angle, env.clone()).into());
        assert_eq!(angle.as_il2cpp().unwrap().pointer_values(), vec![("Native pointer", "0xa0".to_string())]);
        angle.set_value(Value::Float(90.0));
        assert_eq!(angle.get_value(), Value::Float(90.0));

        let label = ty.find_field("label").unwrap().clone();
        let label = enhance(FieldCacheEntry::new(EntryInstance::object(&obj), &ty, label, env).into());
        assert!(label.as_il2cpp().is_none());
    }
}
