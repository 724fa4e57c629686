use super::{MemberId, MethodBuilder, MethodInfo};
use crate::ty::{TypeHandle, TypeRef};

// -----------------------------------------------------------------------------
// EventInfo

/// An event: up to three accessor methods plus an optional backing field
/// holding the current subscribers.
#[derive(Clone)]
pub struct EventInfo {
    id: MemberId,
    declaring: TypeHandle,
    name: Box<str>,
    handler_type: TypeRef,
    is_static: bool,
    add: Option<MethodInfo>,
    remove: Option<MethodInfo>,
    raise: Option<MethodInfo>,
    backing_field: Option<Box<str>>,
}

impl EventInfo {
    #[inline]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    #[inline]
    pub const fn declaring_type(&self) -> TypeHandle {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn handler_type(&self) -> &TypeRef {
        &self.handler_type
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn add_method(&self) -> Option<&MethodInfo> {
        self.add.as_ref()
    }

    #[inline]
    pub fn remove_method(&self) -> Option<&MethodInfo> {
        self.remove.as_ref()
    }

    #[inline]
    pub fn raise_method(&self) -> Option<&MethodInfo> {
        self.raise.as_ref()
    }

    /// Returns the name of the field storing the subscribers, if known.
    #[inline]
    pub fn backing_field(&self) -> Option<&str> {
        self.backing_field.as_deref()
    }
}

impl core::fmt::Debug for EventInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::display::event_signature(self))
    }
}

// -----------------------------------------------------------------------------
// EventBuilder

/// Describes an event for [`TypeBuilder::event`](crate::ty::TypeBuilder::event).
pub struct EventBuilder {
    name: Box<str>,
    handler_type: TypeRef,
    is_static: bool,
    add: Option<MethodBuilder>,
    remove: Option<MethodBuilder>,
    raise: Option<MethodBuilder>,
    backing_field: Option<Box<str>>,
}

impl EventBuilder {
    pub fn new(name: &str, handler_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            handler_type,
            is_static: false,
            add: None,
            remove: None,
            raise: None,
            backing_field: None,
        }
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn add(mut self, method: MethodBuilder) -> Self {
        self.add = Some(method);
        self
    }

    pub fn remove(mut self, method: MethodBuilder) -> Self {
        self.remove = Some(method);
        self
    }

    pub fn raise(mut self, method: MethodBuilder) -> Self {
        self.raise = Some(method);
        self
    }

    pub fn backing_field(mut self, field: &str) -> Self {
        self.backing_field = Some(field.into());
        self
    }

    pub(crate) fn build(self, id: MemberId, declaring: TypeHandle) -> EventInfo {
        let is_static = self.is_static;
        // Accessors share the event's id; they are not listed as methods.
        let accessor = |method: MethodBuilder| {
            let method = if is_static { method.static_() } else { method };
            method.build(id, declaring)
        };

        EventInfo {
            id,
            declaring,
            name: self.name,
            handler_type: self.handler_type,
            is_static,
            add: self.add.map(&accessor),
            remove: self.remove.map(&accessor),
            raise: self.raise.map(&accessor),
            backing_field: self.backing_field,
        }
    }
}
