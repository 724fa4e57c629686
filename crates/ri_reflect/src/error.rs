use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// A failure raised while touching a member of a live object.
///
/// These are the managed runtime's exceptions as seen from the inspector:
/// they are expected at any time and must be shown, not propagated.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("the object of type {0} has been destroyed")]
    Destroyed(String),

    #[error("object reference not set to an instance of {0}")]
    NullReference(String),

    #[error("{0} is read-only")]
    ReadOnly(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("{member} expects {expected} argument(s), received {received}")]
    ArgumentCount {
        member: String,
        expected: usize,
        received: usize,
    },

    #[error("the type initializer for {ty} threw an exception: {message}")]
    TypeInitialization { ty: String, message: String },

    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} has no member storage of this shape")]
    NotAContainer(String),

    #[error("{0}")]
    Invocation(String),
}

impl ReflectError {
    /// Creates an [`ReflectError::Invocation`] error from any message.
    ///
    /// Host getters and methods use this to report their own exceptions.
    #[inline]
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation(message.into())
    }
}
