//! Types every runtime provides.
//!
//! Each function returns the same shared [`TypeRef`] on every call.

use ri_os::sync::LazyLock;

use super::type_info::{Special, TypeKind, TypeRef};
use super::TypeBuilder;

macro_rules! builtin_type {
    ($(#[$meta:meta])* $fn_name:ident => $name:literal, $kind:ident, $special:ident) => {
        $(#[$meta])*
        pub fn $fn_name() -> TypeRef {
            static TYPE: LazyLock<TypeRef> = LazyLock::new(|| {
                TypeBuilder::with_kind("System", $name, TypeKind::$kind)
                    .special(Special::$special)
                    .build()
            });
            TYPE.clone()
        }
    };
}

builtin_type!(
    /// The root of every type hierarchy. Any value conforms to it.
    object => "Object", Class, ObjectRoot
);
builtin_type!(
    /// The type of type handles, [`Value::Type`](crate::Value::Type).
    system_type => "Type", Class, SystemType
);
builtin_type!(bool => "Boolean", Bool, None);
builtin_type!(int => "Int64", Int, None);
builtin_type!(float => "Double", Float, None);
builtin_type!(intptr => "IntPtr", Pointer, None);
builtin_type!(string => "String", String, None);

#[cfg(test)]
mod tests {
    use ri_os::sync::Arc;

    #[test]
    fn builtins_are_shared() {
        assert!(Arc::ptr_eq(&super::int(), &super::int()));
        assert_ne!(super::int().handle(), super::float().handle());
        assert!(super::object().is_object_root());
    }
}
