use core::fmt;

use ri_os::sync::{Arc, LazyLock, Mutex, MutexGuard, lock_unpoisoned};
use ri_os::time::{Clock, SystemClock};
use ri_reflect::Value;

use super::export::pseudo_code_line;
use super::{Change, ChangeError, ChangeTarget, UndoFn};

// -----------------------------------------------------------------------------
// ChangeHistory

/// An ordered log of [`Change`] records.
///
/// Records are only ever appended, except for [`clear`](Self::clear).
/// An assignment to the same member of the same target as the last record
/// is merged into that record instead, as long as nothing else was logged
/// or undone in between. Dragging a slider thus leaves one record, not
/// hundreds.
pub struct ChangeHistory {
    records: Vec<Change>,
    clock: Box<dyn Clock>,
    // Whether the last record may still absorb a later edit.
    open: bool,
}

impl ChangeHistory {
    /// Creates an empty history stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty history stamped by `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            records: Vec::new(),
            clock: Box::new(clock),
            open: false,
        }
    }

    /// Returns the records, oldest first.
    #[inline]
    pub fn records(&self) -> &[Change] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Logs that `member` of `target` changed from `original` to `new_value`.
    ///
    /// Returns the index of the record holding the change.
    pub fn report_assignment(
        &mut self,
        target: ChangeTarget,
        member: &str,
        original: Value,
        new_value: Value,
        undo: Option<UndoFn>,
    ) -> usize {
        self.report_assignment_as(Change::ASSIGNMENT_FORMAT, target, member, original, new_value, undo)
    }

    /// Like [`report_assignment`](Self::report_assignment), with a custom
    /// description format for a new record.
    pub fn report_assignment_as(
        &mut self,
        format: &str,
        target: ChangeTarget,
        member: &str,
        original: Value,
        new_value: Value,
        undo: Option<UndoFn>,
    ) -> usize {
        let now = self.clock.now();
        if self.open
            && let Some(last) = self.records.last_mut()
            && last.concerns(&target, member)
        {
            last.update_new_value(new_value, now);
            return self.records.len() - 1;
        }

        let change = Change::assignment(target, member, original, new_value, now, undo);
        self.push(change.with_format(format));
        self.open = true;
        self.records.len() - 1
    }

    /// Logs a named operation.
    pub fn report_action(&mut self, name: &str, target: ChangeTarget, undo: Option<UndoFn>) -> usize {
        let now = self.clock.now();
        self.push(Change::action(target, name, now, undo));
        self.open = false;
        self.records.len() - 1
    }

    /// Appends a prepared record. It is never merged with later edits.
    pub fn push(&mut self, change: Change) {
        log::debug!("{}", change.description());
        self.records.push(change);
        self.open = false;
    }

    /// Undoes the record at `index`.
    ///
    /// The record stays in the log. Fails without touching the log if the
    /// record has no undo delegate.
    pub fn undo(&mut self, index: usize) -> Result<(), ChangeError> {
        let len = self.records.len();
        let change = self
            .records
            .get_mut(index)
            .ok_or(ChangeError::NoSuchRecord { index, len })?;
        if !change.can_undo() {
            return Err(ChangeError::NotUndoable);
        }
        self.open = false;
        change.undo()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.open = false;
    }

    /// Returns one `[HH:MM:SS] description` line per record.
    pub fn export_text(&self) -> String {
        self.export(Change::line)
    }

    /// Returns the log as pseudo-code, one statement per record.
    ///
    /// See [`pseudo_code`](super::pseudo_code) for what this does and does not promise.
    pub fn export_pseudo_code(&self) -> String {
        self.export(pseudo_code_line)
    }

    fn export(&self, line: impl Fn(&Change) -> String) -> String {
        let mut out = String::new();
        for change in &self.records {
            out.push_str(&line(change));
            out.push('\n');
        }
        out
    }
}

impl Default for ChangeHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangeHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHistory")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ChangeLog

/// A shared handle to a [`ChangeHistory`].
///
/// Cache entries report their writes here. Undo delegates run while the
/// log is locked and must not report changes themselves.
#[derive(Clone, Debug)]
pub struct ChangeLog(Arc<Mutex<ChangeHistory>>);

impl ChangeLog {
    pub fn new(history: ChangeHistory) -> Self {
        Self(Arc::new(Mutex::new(history)))
    }

    /// Returns the process-wide log, creating it on first use.
    ///
    /// It lives for the rest of the session and is only emptied by
    /// [`clear`](Self::clear).
    pub fn global() -> Self {
        static GLOBAL: LazyLock<ChangeLog> = LazyLock::new(|| ChangeLog::new(ChangeHistory::new()));
        GLOBAL.clone()
    }

    /// Locks the history for reading or batch edits.
    pub fn lock(&self) -> MutexGuard<'_, ChangeHistory> {
        lock_unpoisoned(&self.0)
    }

    /// Returns `true` if both handles share the same history.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn report_assignment(
        &self,
        target: ChangeTarget,
        member: &str,
        original: Value,
        new_value: Value,
        undo: Option<UndoFn>,
    ) -> usize {
        self.lock()
            .report_assignment(target, member, original, new_value, undo)
    }

    pub fn report_assignment_as(
        &self,
        format: &str,
        target: ChangeTarget,
        member: &str,
        original: Value,
        new_value: Value,
        undo: Option<UndoFn>,
    ) -> usize {
        self.lock()
            .report_assignment_as(format, target, member, original, new_value, undo)
    }

    pub fn report_action(&self, name: &str, target: ChangeTarget, undo: Option<UndoFn>) -> usize {
        self.lock().report_action(name, target, undo)
    }

    pub fn undo(&self, index: usize) -> Result<(), ChangeError> {
        self.lock().undo(index)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn export_text(&self) -> String {
        self.lock().export_text()
    }

    pub fn export_pseudo_code(&self) -> String {
        self.lock().export_pseudo_code()
    }
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new(ChangeHistory::new())
    }
}

#[cfg(test)]
mod tests {
    use ri_os::sync::{Arc, Mutex};
    use ri_os::time::{Clock, Duration, ManualClock};
    use ri_reflect::ty::TypeBuilder;
    use ri_reflect::{ObjectRef, ReflectError, Value};

    use super::{ChangeHistory, ChangeLog};
    use crate::history::{ChangeError, ChangeTarget};

    fn object(name: &str) -> ObjectRef {
        let ty = TypeBuilder::class("UnityEngine", "Transform").build();
        ObjectRef::new(&ty).with_name(name)
    }

    #[test]
    fn consecutive_edits_coalesce() {
        let clock = ManualClock::new();
        let mut history = ChangeHistory::with_clock(clock.clone());
        let cube = object("Cube");
        let target = ChangeTarget::Object(cube.downgrade());

        clock.advance(Duration::from_secs(10));
        history.report_assignment(target.clone(), "x", Value::Int(0), Value::Int(1), None);
        clock.advance(Duration::from_secs(5));
        let index = history.report_assignment(target.clone(), "x", Value::Int(1), Value::Int(2), None);

        assert_eq!(index, 0);
        assert_eq!(history.len(), 1);
        let record = &history.records()[0];
        assert_eq!(record.new_value(), Some(&Value::Int(2)));
        assert_eq!(record.original(), &Value::Int(0));
        assert_eq!(record.timestamp(), clock.now());

        history.report_assignment(target, "y", Value::Int(0), Value::Int(4), None);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn intervening_records_break_coalescing() {
        let mut history = ChangeHistory::with_clock(ManualClock::new());
        let a = object("A");
        let b = object("B");
        let ta = ChangeTarget::Object(a.downgrade());
        let tb = ChangeTarget::Object(b.downgrade());

        history.report_assignment(ta.clone(), "x", Value::Int(0), Value::Int(1), None);
        history.report_assignment(tb, "x", Value::Int(0), Value::Int(1), None);
        history.report_assignment(ta.clone(), "x", Value::Int(1), Value::Int(2), None);
        assert_eq!(history.len(), 3);

        history.report_action("Reload", ChangeTarget::None, None);
        history.report_assignment(ta.clone(), "x", Value::Int(2), Value::Int(3), None);
        assert_eq!(history.len(), 5);

        history.clear();
        assert!(history.is_empty());
        history.report_assignment(ta, "x", Value::Int(3), Value::Int(4), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_calls_delegate_once_with_original() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let mut history = ChangeHistory::with_clock(ManualClock::new());
        let cube = object("Cube");

        history.report_assignment(
            ChangeTarget::Object(cube.downgrade()),
            "layer",
            Value::Int(3),
            Value::Int(8),
            Some(Box::new(move |original| {
                sink.lock().unwrap().push(original.clone());
                Ok(())
            })),
        );
        history.undo(0).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![Value::Int(3)]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_without_delegate_leaves_log_alone() {
        let mut history = ChangeHistory::with_clock(ManualClock::new());
        history.report_action("Spawn", ChangeTarget::None, None);

        assert_eq!(history.undo(0), Err(ChangeError::NotUndoable));
        assert_eq!(history.undo(4), Err(ChangeError::NoSuchRecord { index: 4, len: 1 }));
        assert_eq!(history.len(), 1);
        assert_eq!(history.records()[0].description(), "Spawn");
    }

    #[test]
    fn failing_undo_reports_the_error() {
        let mut history = ChangeHistory::with_clock(ManualClock::new());
        history.report_action(
            "Delete",
            ChangeTarget::None,
            Some(Box::new(|_| Err(ReflectError::invocation("gone")))),
        );
        assert_eq!(
            history.undo(0),
            Err(ChangeError::Failed(ReflectError::invocation("gone")))
        );
    }

    #[test]
    fn exports() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_secs(3600 + 2 * 60 + 3));
        let log = ChangeLog::new(ChangeHistory::with_clock(clock));
        let stats = TypeBuilder::class("Game", "Stats").build();
        let cam = {
            let ty = TypeBuilder::class("UnityEngine", "Camera").build();
            ObjectRef::new(&ty).with_name("Main Camera")
        };

        log.report_assignment(
            ChangeTarget::Object(cam.downgrade()),
            "fieldOfView",
            Value::Float(60.0),
            Value::Float(75.0),
            None,
        );
        log.report_assignment(ChangeTarget::Static(stats), "kills", Value::Int(0), Value::Int(5), None);
        log.report_action("Cleared cache", ChangeTarget::None, None);

        assert_eq!(
            log.export_text(),
            "[01:02:03] (Main Camera)::Camera.fieldOfView = 75.0\n\
             [01:02:03] Stats [static].kills = 5\n\
             [01:02:03] Cleared cache\n"
        );
        assert_eq!(
            log.export_pseudo_code(),
            "Camera.Find(\"Main Camera\").fieldOfView = 75.0;\n\
             Stats.kills = 5;\n\
             // Cleared cache\n"
        );
    }

    #[test]
    fn global_log_is_shared() {
        assert!(ChangeLog::global().ptr_eq(&ChangeLog::global()));
    }
}
