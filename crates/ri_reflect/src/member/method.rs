use ri_os::sync::Arc;

use super::{MemberId, MethodBody};
use crate::ty::{TypeHandle, TypeRef};
use crate::{ReflectError, Receiver, Value};

/// The callable behind a method.
pub type Invoker = Arc<dyn Fn(Receiver<'_>, &[Value]) -> Result<Value, ReflectError> + Send + Sync>;

/// A named, typed method parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: Box<str>,
    pub ty: TypeRef,
}

// -----------------------------------------------------------------------------
// MethodInfo

/// A method of a type.
#[derive(Clone)]
pub struct MethodInfo {
    id: MemberId,
    declaring: TypeHandle,
    name: Box<str>,
    return_type: Option<TypeRef>,
    parameters: Box<[ParameterInfo]>,
    is_static: bool,
    invoker: Invoker,
    body: MethodBody,
}

impl MethodInfo {
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

    /// Returns the return type, `None` for `void`.
    #[inline]
    pub fn return_type(&self) -> Option<&TypeRef> {
        self.return_type.as_ref()
    }

    #[inline]
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    /// Calls the method. `void` methods return [`Value::Null`].
    pub fn invoke(&self, receiver: Receiver<'_>, args: &[Value]) -> Result<Value, ReflectError> {
        if !self.is_static && receiver.is_static() {
            return Err(ReflectError::NullReference(self.name.to_string()));
        }
        if args.len() != self.parameters.len() {
            return Err(ReflectError::ArgumentCount {
                member: self.name.to_string(),
                expected: self.parameters.len(),
                received: args.len(),
            });
        }
        for (param, arg) in self.parameters.iter().zip(args) {
            arg.expect_type(&param.ty)?;
        }
        (self.invoker)(receiver, args)
    }
}

impl core::fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::display::method_signature(self))
    }
}

// -----------------------------------------------------------------------------
// MethodBuilder

/// Describes a method for [`TypeBuilder::method`](crate::ty::TypeBuilder::method).
///
/// A builder without an invoker produces a method that does nothing and
/// returns [`Value::Null`].
pub struct MethodBuilder {
    name: Box<str>,
    return_type: Option<TypeRef>,
    parameters: Vec<ParameterInfo>,
    is_static: bool,
    invoker: Option<Invoker>,
    body: MethodBody,
}

impl MethodBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            parameters: Vec::new(),
            is_static: false,
            invoker: None,
            body: MethodBody::default(),
        }
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn param(mut self, name: &str, ty: TypeRef) -> Self {
        self.parameters.push(ParameterInfo {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn invoker<F>(mut self, func: F) -> Self
    where
        F: Fn(Receiver<'_>, &[Value]) -> Result<Value, ReflectError> + Send + Sync + 'static,
    {
        self.invoker = Some(Arc::new(func));
        self
    }

    /// Records a static field loaded by the method body.
    pub fn loads(mut self, field: &str) -> Self {
        self.body.push(field.into());
        self
    }

    pub(crate) fn build(self, id: MemberId, declaring: TypeHandle) -> MethodInfo {
        MethodInfo {
            id,
            declaring,
            name: self.name,
            return_type: self.return_type,
            parameters: self.parameters.into_boxed_slice(),
            is_static: self.is_static,
            invoker: self.invoker.unwrap_or_else(|| Arc::new(|_, _| Ok(Value::Null))),
            body: self.body,
        }
    }
}
