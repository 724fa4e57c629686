use core::fmt;

use ri_os::sync::OnceLock;
use ri_os::time::Timestamp;
use ri_reflect::display::{object_label, value_preview};
use ri_reflect::{ReflectError, TypeRef, Value, WeakObject};

use super::ChangeError;

/// Reverses a change, given the value the member held before it.
///
/// Action records pass [`Value::Null`].
pub type UndoFn = Box<dyn FnMut(&Value) -> Result<(), ReflectError> + Send>;

// -----------------------------------------------------------------------------
// ChangeTarget

/// What a change record is about.
///
/// Records never own their target: objects are held weakly and may be
/// destroyed while the record lives on.
#[derive(Clone)]
pub enum ChangeTarget {
    /// Nothing in particular.
    None,
    /// The static members of a type.
    Static(TypeRef),
    /// A live object.
    Object(WeakObject),
    /// An inspected copy of a struct, identified by its box.
    Struct { ty: TypeRef, id: usize },
}

impl ChangeTarget {
    /// Returns `true` if both targets denote the same thing.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Static(a), Self::Static(b)) => a.handle() == b.handle(),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Struct { id: a, .. }, Self::Struct { id: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Renders the target in change-record notation.
    ///
    /// Named objects read `(Name)::Type`, everything else carries a
    /// bracketed qualifier, e.g. `Player [static]`.
    pub fn label(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Static(ty) => format!("{} [static]", ty.name()),
            Self::Object(weak) => match weak.upgrade() {
                Some(obj) => object_label(&obj),
                None => format!("object [#{}]", weak.id()),
            },
            Self::Struct { ty, .. } => format!("{} [struct]", ty.name()),
        }
    }
}

impl fmt::Debug for ChangeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// -----------------------------------------------------------------------------
// ChangeKind

/// The two kinds of change records.
#[derive(Debug, Clone)]
pub enum ChangeKind {
    /// An arbitrary named operation.
    Action { name: Box<str> },
    /// A member went from `original` to `new_value`.
    Assignment {
        member: Box<str>,
        original: Value,
        new_value: Value,
    },
}

// -----------------------------------------------------------------------------
// Change

/// One logged mutation.
///
/// The description is rendered from a format string on first use and kept
/// until the record changes. The format may refer to `{target}`,
/// `{member}`, `{value}` and `{original}`. Action records render `{member}`
/// as the action name.
pub struct Change {
    target: ChangeTarget,
    kind: ChangeKind,
    format: Box<str>,
    timestamp: Timestamp,
    undo: Option<UndoFn>,
    description: OnceLock<String>,
}

impl Change {
    /// The default format of assignment records.
    pub const ASSIGNMENT_FORMAT: &'static str = "{target}.{member} = {value}";
    /// The default format of action records.
    pub const ACTION_FORMAT: &'static str = "{target}: {member}";

    /// Creates an assignment record.
    pub fn assignment(
        target: ChangeTarget,
        member: &str,
        original: Value,
        new_value: Value,
        timestamp: Timestamp,
        undo: Option<UndoFn>,
    ) -> Self {
        Self {
            target,
            kind: ChangeKind::Assignment {
                member: member.into(),
                original,
                new_value,
            },
            format: Self::ASSIGNMENT_FORMAT.into(),
            timestamp,
            undo,
            description: OnceLock::new(),
        }
    }

    /// Creates an action record.
    pub fn action(
        target: ChangeTarget,
        name: &str,
        timestamp: Timestamp,
        undo: Option<UndoFn>,
    ) -> Self {
        let format = match target {
            ChangeTarget::None => "{member}",
            _ => Self::ACTION_FORMAT,
        };
        Self {
            target,
            kind: ChangeKind::Action { name: name.into() },
            format: format.into(),
            timestamp,
            undo,
            description: OnceLock::new(),
        }
    }

    /// Replaces the description format.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.into();
        self.description = OnceLock::new();
        self
    }

    #[inline]
    pub fn target(&self) -> &ChangeTarget {
        &self.target
    }

    #[inline]
    pub fn kind(&self) -> &ChangeKind {
        &self.kind
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn is_action(&self) -> bool {
        matches!(self.kind, ChangeKind::Action { .. })
    }

    /// Returns the assigned member, `None` for actions.
    pub fn member(&self) -> Option<&str> {
        match &self.kind {
            ChangeKind::Assignment { member, .. } => Some(member),
            ChangeKind::Action { .. } => None,
        }
    }

    /// Returns the value before the change, `Null` for actions.
    pub fn original(&self) -> &Value {
        match &self.kind {
            ChangeKind::Assignment { original, .. } => original,
            ChangeKind::Action { .. } => &Value::Null,
        }
    }

    /// Returns the value after the change, `None` for actions.
    pub fn new_value(&self) -> Option<&Value> {
        match &self.kind {
            ChangeKind::Assignment { new_value, .. } => Some(new_value),
            ChangeKind::Action { .. } => None,
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Returns `true` if this assignment may absorb a later edit of `member`
    /// on `target`.
    pub(crate) fn concerns(&self, target: &ChangeTarget, member: &str) -> bool {
        self.member() == Some(member) && self.target.same_as(target)
    }

    /// Merges a later edit into this record.
    ///
    /// The original value and undo stay those of the first edit. Does
    /// nothing on actions.
    pub fn update_new_value(&mut self, value: Value, timestamp: Timestamp) {
        if let ChangeKind::Assignment { new_value, .. } = &mut self.kind {
            *new_value = value;
            self.timestamp = timestamp;
            self.description = OnceLock::new();
        }
    }

    /// Calls the undo delegate with the original value.
    pub fn undo(&mut self) -> Result<(), ChangeError> {
        let original = self.original().clone();
        let undo = self.undo.as_mut().ok_or(ChangeError::NotUndoable)?;
        undo(&original)?;
        Ok(())
    }

    /// Returns the human-readable description.
    pub fn description(&self) -> &str {
        self.description.get_or_init(|| self.render())
    }

    /// Returns the description prefixed with the UTC time of the change.
    pub fn line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.description())
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.format.len() + 16);
        let mut rest = &*self.format;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open..];
            let Some(close) = after.find('}') else {
                out.push_str(after);
                rest = "";
                break;
            };
            match &after[1..close] {
                "target" => out.push_str(&self.target.label()),
                "member" => match &self.kind {
                    ChangeKind::Assignment { member, .. } => out.push_str(member),
                    ChangeKind::Action { name } => out.push_str(name),
                },
                "value" => {
                    if let Some(value) = self.new_value() {
                        out.push_str(&value_preview(value));
                    }
                }
                "original" => out.push_str(&value_preview(self.original())),
                _ => out.push_str(&after[..=close]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("timestamp", &self.timestamp)
            .field("can_undo", &self.can_undo())
            .finish()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.description())
    }
}
