//! Human-friendly descriptions of types, members and values.
//!
//! These strings are for display and tooltips only; nothing parses them back.

use core::fmt::Write;

use crate::member::{EventInfo, FieldInfo, MethodInfo, PropertyInfo};
use crate::ty::{TypeInfo, TypeKind};
use crate::value::StructValue;
use crate::{ObjectRef, Value};

// -----------------------------------------------------------------------------
// Types

/// Returns the friendly name of a type: keyword names for primitives, the
/// short name otherwise.
///
/// # Examples
///
/// ```
/// use ri_reflect::display::type_display_name;
/// use ri_reflect::ty::builtin;
///
/// assert_eq!(type_display_name(&builtin::float()), "float");
/// assert_eq!(type_display_name(&builtin::object()), "object");
/// ```
pub fn type_display_name(ty: &TypeInfo) -> String {
    if ty.is_object_root() {
        return "object".into();
    }
    let name = match ty.kind() {
        TypeKind::Bool => "bool",
        TypeKind::Int => "long",
        TypeKind::Float => "float",
        TypeKind::String => "string",
        TypeKind::Pointer => "IntPtr",
        TypeKind::ValueType | TypeKind::Class => ty.name(),
    };
    if ty.contains_generic_parameters() {
        format!("{name}<>")
    } else {
        name.into()
    }
}

// -----------------------------------------------------------------------------
// Members

fn static_prefix(is_static: bool) -> &'static str {
    if is_static { "static " } else { "" }
}

/// `static readonly long count`
pub fn field_signature(field: &FieldInfo) -> String {
    let modifier = if field.is_literal() {
        "const "
    } else if field.is_readonly() {
        "readonly "
    } else {
        ""
    };
    let is_static = field.is_static() && !field.is_literal();
    format!(
        "{}{modifier}{} {}",
        static_prefix(is_static),
        type_display_name(field.field_type()),
        field.name()
    )
}

/// `float speed { get; set; }`
pub fn property_signature(prop: &PropertyInfo) -> String {
    let mut out = format!(
        "{}{} {} {{",
        static_prefix(prop.is_static()),
        type_display_name(prop.property_type()),
        prop.name()
    );
    if prop.can_read() {
        out.push_str(" get;");
    }
    if prop.can_write() {
        out.push_str(" set;");
    }
    out.push_str(" }");
    out
}

/// `void Jump(float height)`
pub fn method_signature(method: &MethodInfo) -> String {
    let ret = method
        .return_type()
        .map_or_else(|| "void".into(), |ty| type_display_name(ty));
    let mut out = format!("{}{ret} {}(", static_prefix(method.is_static()), method.name());
    for (index, param) in method.parameters().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", type_display_name(&param.ty), param.name);
    }
    out.push(')');
    out
}

/// `event Action onDeath`
pub fn event_signature(event: &EventInfo) -> String {
    format!(
        "{}event {} {}",
        static_prefix(event.is_static()),
        type_display_name(event.handler_type()),
        event.name()
    )
}

// -----------------------------------------------------------------------------
// Values

/// Returns the label of an object as used in logs and change records.
///
/// Named objects render as `(Name)::Type`, unnamed ones as `Type [#id]`.
pub fn object_label(obj: &ObjectRef) -> String {
    match obj.name() {
        Some(name) => format!("({name})::{}", obj.ty().name()),
        None => format!("{} [#{}]", obj.ty().name(), obj.id()),
    }
}

/// `Vector3(1.0, 0.0, 2.5)`
pub fn struct_preview(value: &StructValue) -> String {
    let mut out = format!("{}(", value.ty().name());
    for (index, field) in value.fields().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(&value_preview(field));
    }
    out.push(')');
    out
}

/// Renders a value in a compact, code-like form.
///
/// # Examples
///
/// ```
/// use ri_reflect::Value;
/// use ri_reflect::display::value_preview;
///
/// assert_eq!(value_preview(&Value::Str("hi".into())), "\"hi\"");
/// assert_eq!(value_preview(&Value::Float(2.0)), "2.0");
/// assert_eq!(value_preview(&Value::Ptr(255)), "0xff");
/// ```
pub fn value_preview(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => format!("{x:?}"),
        Value::Str(s) => format!("{s:?}"),
        Value::Ptr(p) => format!("{p:#x}"),
        Value::Struct(s) => struct_preview(s),
        Value::Object(o) => object_label(o),
        Value::Type(t) => format!("typeof({})", t.full_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::{field_signature, method_signature, object_label, property_signature};
    use crate::member::{MethodBuilder, PropertyBuilder};
    use crate::ty::{TypeBuilder, builtin};
    use crate::{ObjectRef, Value};

    #[test]
    fn signatures() {
        let ty = TypeBuilder::class("Game", "Player")
            .readonly_field("id", builtin::int())
            .const_field("Max", builtin::int(), Value::Int(1))
            .property(PropertyBuilder::new("speed", builtin::float()).getter(|_| Ok(Value::Float(1.0))))
            .method(MethodBuilder::new("Jump").param("height", builtin::float()))
            .build();

        assert_eq!(field_signature(&ty.fields()[0]), "readonly long id");
        assert_eq!(field_signature(&ty.fields()[1]), "const long Max");
        assert_eq!(property_signature(&ty.properties()[0]), "float speed { get; }");
        assert_eq!(method_signature(&ty.methods()[0]), "void Jump(float height)");
    }

    #[test]
    fn labels() {
        let ty = TypeBuilder::class("Engine", "GameObject").build();
        let named = ObjectRef::new(&ty).with_name("Cube");
        let unnamed = ObjectRef::new(&ty);

        assert_eq!(object_label(&named), "(Cube)::GameObject");
        assert_eq!(object_label(&unnamed), format!("GameObject [#{}]", unnamed.id()));
    }
}
