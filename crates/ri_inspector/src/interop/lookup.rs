use ri_os::sync::{Arc, LazyLock, Mutex, lock_unpoisoned};
use ri_reflect::display::value_preview;
use ri_reflect::member::{FieldInfo, MemberId, MethodBody, MethodInfo};
use ri_reflect::{Receiver, TypeHandle, TypeInfo, TypeKind};
use ri_utils::hash::HashMap;

/// Name prefix of the static field holding a field's native handle.
const FIELD_PTR_PREFIX: &str = "NativeFieldInfoPtr_";

// -----------------------------------------------------------------------------
// NativeHandle

/// A managed member, or one accessor of it, that may be backed by a native
/// function or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeHandle {
    Field(MemberId),
    Method(MemberId),
    Getter(MemberId),
    Setter(MemberId),
    Add(MemberId),
    Remove(MemberId),
    Raise(MemberId),
}

/// Maps the members of one type to the static pointer fields backing them.
pub type PtrLookupTable = Arc<HashMap<NativeHandle, FieldInfo>>;

// -----------------------------------------------------------------------------
// Lookup

// Types are never unloaded during a session, so tables are kept forever.
static TABLES: LazyLock<Mutex<HashMap<TypeHandle, PtrLookupTable>>> =
    LazyLock::new(|| Mutex::new(HashMap::default()));

fn is_pointer_field(field: &FieldInfo) -> bool {
    field.is_static() && field.field_type().kind() == TypeKind::Pointer
}

/// Returns the first static pointer field `body` loads.
fn loaded_pointer(ty: &TypeInfo, body: &MethodBody) -> Option<FieldInfo> {
    body.loads()
        .iter()
        .filter_map(|name| ty.declared_field(name))
        .find(|field| is_pointer_field(field))
        .cloned()
}

fn build_table(ty: &TypeInfo) -> HashMap<NativeHandle, FieldInfo> {
    let mut table = HashMap::default();
    let mut insert = |handle, field: Option<FieldInfo>| {
        if let Some(field) = field {
            table.insert(handle, field);
        }
    };

    for field in ty.fields() {
        if is_pointer_field(field) {
            continue;
        }
        let ptr = ty
            .declared_field(&format!("{FIELD_PTR_PREFIX}{}", field.name()))
            .filter(|ptr| is_pointer_field(ptr))
            .cloned();
        insert(NativeHandle::Field(field.id()), ptr);
    }
    for method in ty.methods() {
        insert(NativeHandle::Method(method.id()), loaded_pointer(ty, method.body()));
    }
    for property in ty.properties() {
        let id = property.id();
        let getter = property.getter_body().and_then(|body| loaded_pointer(ty, body));
        let setter = property.setter_body().and_then(|body| loaded_pointer(ty, body));
        insert(NativeHandle::Getter(id), getter);
        insert(NativeHandle::Setter(id), setter);
    }
    for event in ty.events() {
        let id = event.id();
        let ptr = |method: Option<&MethodInfo>| method.and_then(|method| loaded_pointer(ty, method.body()));
        insert(NativeHandle::Add(id), ptr(event.add_method()));
        insert(NativeHandle::Remove(id), ptr(event.remove_method()));
        insert(NativeHandle::Raise(id), ptr(event.raise_method()));
    }
    table
}

/// Returns the pointer lookup table of the members `ty` declares.
///
/// The table is computed on first request and shared afterwards: asking
/// twice for the same type returns the same [`Arc`].
pub fn get_ptr_lookup_table(ty: &TypeInfo) -> PtrLookupTable {
    let mut tables = lock_unpoisoned(&TABLES);
    tables
        .entry(ty.handle())
        .or_insert_with(|| {
            let table = build_table(ty);
            log::debug!("{} native pointers found in {}", table.len(), ty.full_name());
            Arc::new(table)
        })
        .clone()
}

/// Formats the value of a pointer field for display. Never fails.
///
/// - `"null"` without a field.
/// - `"???"` if `owner` has open generic parameters.
/// - `"error"` if reading the field fails.
pub fn safe_get_ptr(field: Option<&FieldInfo>, owner: &TypeInfo) -> String {
    let Some(field) = field else {
        return "null".into();
    };
    if owner.contains_generic_parameters() {
        return "???".into();
    }
    match field.get(Receiver::Static) {
        Ok(value) => value_preview(&value),
        Err(err) => {
            log::debug!("reading {} failed: {err}", field.name());
            "error".into()
        }
    }
}

#[cfg(test)]
mod tests {
    use ri_os::sync::Arc;
    use ri_reflect::Value;
    use ri_reflect::member::{MethodBuilder, PropertyBuilder};
    use ri_reflect::ty::{TypeBuilder, builtin};

    use super::{NativeHandle, get_ptr_lookup_table, safe_get_ptr};

    #[test]
    fn plain_types_have_empty_memoized_tables() {
        let ty = TypeBuilder::class("Game", "Plain")
            .field("hp", builtin::int())
            .method(MethodBuilder::new("Tick"))
            .build();

        let first = get_ptr_lookup_table(&ty);
        let second = get_ptr_lookup_table(&ty);
        assert!(first.is_empty());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn finds_backing_pointers() {
        let ty = TypeBuilder::class("Il2CppGame", "Player")
            .field("hp", builtin::int())
            .static_field_with("NativeFieldInfoPtr_hp", builtin::intptr(), Value::Ptr(0x10))
            .static_field_with("NativeMethodInfoPtr_Jump", builtin::intptr(), Value::Ptr(0x20))
            .static_field_with("NativeMethodInfoPtr_get_Speed", builtin::intptr(), Value::Ptr(0x30))
            .method(MethodBuilder::new("Jump").loads("NativeMethodInfoPtr_Jump"))
            .property(
                PropertyBuilder::new("Speed", builtin::float())
                    .getter(|_| Ok(Value::Float(1.0)))
                    .getter_loads("NativeMethodInfoPtr_get_Speed"),
            )
            .build();
        let table = get_ptr_lookup_table(&ty);

        let hp = ty.find_field("hp").unwrap();
        let jump = ty.find_method("Jump").unwrap();
        let speed = ty.find_property("Speed").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[&NativeHandle::Field(hp.id())].name(), "NativeFieldInfoPtr_hp");
        assert_eq!(
            safe_get_ptr(table.get(&NativeHandle::Method(jump.id())), &ty),
            "0x20"
        );
        assert!(table.contains_key(&NativeHandle::Getter(speed.id())));
        assert!(!table.contains_key(&NativeHandle::Setter(speed.id())));
    }

    #[test]
    fn safe_get_ptr_never_fails() {
        let generic = TypeBuilder::class("Il2CppSystem", "List")
            .static_field_with("NativeFieldInfoPtr_items", builtin::intptr(), Value::Ptr(1))
            .generic_parameters(true)
            .build();
        let broken = TypeBuilder::class("Il2CppGame", "Broken")
            .static_field("NativeMethodInfoPtr_Run", builtin::intptr())
            .initialization_error("class not found")
            .build();

        assert_eq!(safe_get_ptr(None, &generic), "null");
        assert_eq!(safe_get_ptr(generic.fields().first(), &generic), "???");
        assert_eq!(safe_get_ptr(broken.fields().first(), &broken), "error");
    }
}
