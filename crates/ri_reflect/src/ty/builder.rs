use ri_os::sync::Arc;

use super::type_info::{Special, TypeHandle, TypeInfo, TypeKind, TypeRef};
use crate::Value;
use crate::member::{EventBuilder, FieldBuilder, MemberId, MemberKind, MethodBuilder, PropertyBuilder};

// -----------------------------------------------------------------------------
// TypeBuilder

/// Assembles a [`TypeInfo`].
///
/// Member ids are assigned in declaration order per member kind, instance
/// field slots continue after the base type's slots, and every static field
/// gets its own storage cell.
///
/// # Examples
///
/// ```
/// use ri_reflect::Value;
/// use ri_reflect::member::PropertyBuilder;
/// use ri_reflect::ty::{TypeBuilder, builtin};
///
/// let ty = TypeBuilder::class("UnityEngine", "Light")
///     .field("range", builtin::float())
///     .const_field("MaxLights", builtin::int(), Value::Int(8))
///     .property(
///         PropertyBuilder::new("isActive", builtin::bool())
///             .getter(|_| Ok(Value::Bool(true))),
///     )
///     .build();
///
/// assert_eq!(ty.full_name(), "UnityEngine.Light");
/// assert_eq!(ty.fields().len(), 2);
/// assert!(ty.find_field("MaxLights").unwrap().is_literal());
/// ```
pub struct TypeBuilder {
    handle: TypeHandle,
    name: Box<str>,
    namespace: Option<Box<str>>,
    kind: TypeKind,
    special: Special,
    base: Option<TypeRef>,
    element: Option<TypeRef>,
    fields: Vec<FieldBuilder>,
    properties: Vec<PropertyBuilder>,
    methods: Vec<MethodBuilder>,
    events: Vec<EventBuilder>,
    generic_parameters: bool,
    init_error: Option<Arc<str>>,
}

impl TypeBuilder {
    pub(crate) fn with_kind(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            handle: TypeHandle::next(),
            name: name.into(),
            namespace: (!namespace.is_empty()).then(|| namespace.into()),
            kind,
            special: Special::None,
            base: None,
            element: None,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
            generic_parameters: false,
            init_error: None,
        }
    }

    pub(crate) fn special(mut self, special: Special) -> Self {
        self.special = special;
        self
    }

    /// Starts a reference type. An empty `namespace` means none.
    pub fn class(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Class)
    }

    /// Starts a value type. An empty `namespace` means none.
    pub fn value_type(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::ValueType)
    }

    /// Starts a list type holding `element` values.
    pub fn list(namespace: &str, name: &str, element: &TypeRef) -> Self {
        let mut builder = Self::with_kind(namespace, name, TypeKind::Class);
        builder.element = Some(element.clone());
        builder
    }

    /// Returns the handle the built type will carry.
    #[inline]
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Sets the base type. Ignored for value types, which cannot inherit.
    pub fn base(mut self, base: &TypeRef) -> Self {
        if self.kind == TypeKind::Class {
            self.base = Some(base.clone());
        }
        self
    }

    /// Adds a writable instance field.
    pub fn field(self, name: &str, ty: TypeRef) -> Self {
        self.with_field(FieldBuilder::new(name, ty))
    }

    /// Adds an instance field that may only be assigned by a constructor.
    pub fn readonly_field(self, name: &str, ty: TypeRef) -> Self {
        self.with_field(FieldBuilder::new(name, ty).readonly())
    }

    /// Adds a static field holding its type's default value.
    pub fn static_field(self, name: &str, ty: TypeRef) -> Self {
        self.with_field(FieldBuilder::new(name, ty).static_())
    }

    /// Adds a static field with an initial value.
    pub fn static_field_with(self, name: &str, ty: TypeRef, value: Value) -> Self {
        self.with_field(FieldBuilder::new(name, ty).static_().initial(value))
    }

    /// Adds a compile-time constant.
    pub fn const_field(self, name: &str, ty: TypeRef, value: Value) -> Self {
        self.with_field(FieldBuilder::new(name, ty).literal().initial(value))
    }

    pub fn with_field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn event(mut self, event: EventBuilder) -> Self {
        self.events.push(event);
        self
    }

    /// Marks the type as an open generic definition.
    pub fn generic_parameters(mut self, open: bool) -> Self {
        self.generic_parameters = open;
        self
    }

    /// Makes every static member read of the type fail with `message`.
    pub fn initialization_error(mut self, message: &str) -> Self {
        self.init_error = Some(message.into());
        self
    }

    /// Finishes the type.
    pub fn build(self) -> TypeRef {
        let owner: Arc<str> = match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name).into(),
            None => self.name.as_ref().into(),
        };
        let mut next_slot = self.base.as_ref().map_or(0, |b| b.instance_slots());

        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| {
                let id = MemberId::new(MemberKind::Field, index);
                field.build(id, self.handle, &mut next_slot, &owner, self.init_error.clone())
            })
            .collect();

        let properties = self
            .properties
            .into_iter()
            .enumerate()
            .map(|(index, prop)| prop.build(MemberId::new(MemberKind::Property, index), self.handle))
            .collect();

        let methods = self
            .methods
            .into_iter()
            .enumerate()
            .map(|(index, method)| method.build(MemberId::new(MemberKind::Method, index), self.handle))
            .collect();

        let events = self
            .events
            .into_iter()
            .enumerate()
            .map(|(index, event)| event.build(MemberId::new(MemberKind::Event, index), self.handle))
            .collect();

        Arc::new(TypeInfo {
            handle: self.handle,
            name: self.name,
            namespace: self.namespace,
            kind: self.kind,
            special: self.special,
            base: self.base,
            element: self.element,
            fields,
            properties,
            methods,
            events,
            instance_slots: next_slot,
            generic_parameters: self.generic_parameters,
            init_error: self.init_error,
        })
    }
}
