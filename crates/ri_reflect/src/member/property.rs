use ri_os::sync::Arc;

use super::{MemberId, MethodBody};
use crate::ty::{TypeHandle, TypeRef};
use crate::{ReflectError, Receiver, Value};

/// A property getter.
pub type Getter = Arc<dyn Fn(Receiver<'_>) -> Result<Value, ReflectError> + Send + Sync>;

/// A property setter.
pub type Setter = Arc<dyn Fn(Receiver<'_>, Value) -> Result<(), ReflectError> + Send + Sync>;

#[derive(Clone)]
struct Accessor<F> {
    func: F,
    body: MethodBody,
}

// -----------------------------------------------------------------------------
// PropertyInfo

/// A property: a getter and/or setter pair.
#[derive(Clone)]
pub struct PropertyInfo {
    id: MemberId,
    declaring: TypeHandle,
    name: Box<str>,
    property_type: TypeRef,
    is_static: bool,
    getter: Option<Accessor<Getter>>,
    setter: Option<Accessor<Setter>>,
}

impl PropertyInfo {
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
    pub fn property_type(&self) -> &TypeRef {
        &self.property_type
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    #[inline]
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Returns the getter's body, if there is a getter.
    pub fn getter_body(&self) -> Option<&MethodBody> {
        self.getter.as_ref().map(|a| &a.body)
    }

    /// Returns the setter's body, if there is a setter.
    pub fn setter_body(&self) -> Option<&MethodBody> {
        self.setter.as_ref().map(|a| &a.body)
    }

    /// Invokes the getter.
    pub fn get(&self, receiver: Receiver<'_>) -> Result<Value, ReflectError> {
        let Some(getter) = &self.getter else {
            return Err(ReflectError::invocation(format!(
                "property {} has no getter",
                self.name
            )));
        };
        self.check_receiver(&receiver)?;
        (getter.func)(receiver)
    }

    /// Invokes the setter.
    pub fn set(&self, receiver: Receiver<'_>, value: Value) -> Result<(), ReflectError> {
        let Some(setter) = &self.setter else {
            return Err(ReflectError::ReadOnly(self.name.to_string()));
        };
        self.check_receiver(&receiver)?;
        value.expect_type(&self.property_type)?;
        (setter.func)(receiver, value)
    }

    fn check_receiver(&self, receiver: &Receiver<'_>) -> Result<(), ReflectError> {
        if !self.is_static && receiver.is_static() {
            return Err(ReflectError::NullReference(self.name.to_string()));
        }
        Ok(())
    }
}

impl core::fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::display::property_signature(self))
    }
}

// -----------------------------------------------------------------------------
// PropertyBuilder

/// Describes a property for [`TypeBuilder::property`](crate::ty::TypeBuilder::property).
///
/// # Examples
///
/// ```
/// use ri_reflect::member::PropertyBuilder;
/// use ri_reflect::ty::{TypeBuilder, builtin};
/// use ri_reflect::{ObjectRef, Receiver, Value};
///
/// let ty = TypeBuilder::class("Game", "Door")
///     .field("_open", builtin::bool())
///     .property(
///         PropertyBuilder::new("IsOpen", builtin::bool())
///             .getter(|mut this| this.read("_open"))
///             .setter(|mut this, value| this.write("_open", value)),
///     )
///     .build();
///
/// let door = ObjectRef::new(&ty);
/// let prop = ty.find_property("IsOpen").unwrap();
/// prop.set(Receiver::Object(&door), Value::Bool(true)).unwrap();
/// assert_eq!(prop.get(Receiver::Object(&door)), Ok(Value::Bool(true)));
/// ```
pub struct PropertyBuilder {
    name: Box<str>,
    ty: TypeRef,
    is_static: bool,
    getter: Option<Accessor<Getter>>,
    setter: Option<Accessor<Setter>>,
}

impl PropertyBuilder {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            getter: None,
            setter: None,
        }
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn getter<F>(mut self, func: F) -> Self
    where
        F: Fn(Receiver<'_>) -> Result<Value, ReflectError> + Send + Sync + 'static,
    {
        self.getter = Some(Accessor {
            func: Arc::new(func),
            body: MethodBody::default(),
        });
        self
    }

    pub fn setter<F>(mut self, func: F) -> Self
    where
        F: Fn(Receiver<'_>, Value) -> Result<(), ReflectError> + Send + Sync + 'static,
    {
        self.setter = Some(Accessor {
            func: Arc::new(func),
            body: MethodBody::default(),
        });
        self
    }

    /// Records a static field loaded by the getter body. Requires a getter.
    pub fn getter_loads(mut self, field: &str) -> Self {
        if let Some(getter) = &mut self.getter {
            getter.body.push(field.into());
        }
        self
    }

    /// Records a static field loaded by the setter body. Requires a setter.
    pub fn setter_loads(mut self, field: &str) -> Self {
        if let Some(setter) = &mut self.setter {
            setter.body.push(field.into());
        }
        self
    }

    pub(crate) fn build(self, id: MemberId, declaring: TypeHandle) -> PropertyInfo {
        PropertyInfo {
            id,
            declaring,
            name: self.name,
            property_type: self.ty,
            is_static: self.is_static,
            getter: self.getter,
            setter: self.setter,
        }
    }
}
