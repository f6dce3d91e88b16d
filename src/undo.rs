//! Undo/Redo system for keypoint edits.
//!
//! Every reversible edit is recorded as a [`Change`] that carries exactly what
//! is needed to apply and invert it. The log is linear: recording a change
//! after an undo discards everything past the cursor, and deleting a skeleton
//! wipes the whole history.

use crate::annotator::SkeletonAnnotator;
use crate::constants::DEFAULT_MAX_HISTORY;
use crate::model::SkeletonId;

// ============================================================================
// Change Types
// ============================================================================

/// A recorded edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A keypoint was placed
    AddKeypoint {
        skeleton: SkeletonId,
        label: String,
        x: i32,
        y: i32,
    },
    /// A placed keypoint was removed
    DeleteKeypoint {
        skeleton: SkeletonId,
        /// Label of the removed keypoint
        label: String,
        /// Coordinates it had before removal
        x: i32,
        y: i32,
    },
    /// A placed keypoint was dragged to a new position
    MoveKeypoint {
        skeleton: SkeletonId,
        label: String,
        before: (i32, i32),
        after: (i32, i32),
    },
    /// A skeleton was deleted; recording this clears the log
    SkeletonDeleted { skeleton: SkeletonId },
}

impl Change {
    /// Get a human-readable description of this change
    pub fn description(&self) -> String {
        match self {
            Change::AddKeypoint { label, .. } => format!("Add keypoint '{label}'"),
            Change::DeleteKeypoint { label, .. } => format!("Delete keypoint '{label}'"),
            Change::MoveKeypoint { label, .. } => format!("Move keypoint '{label}'"),
            Change::SkeletonDeleted { skeleton } => format!("Delete skeleton {skeleton}"),
        }
    }
}

// ============================================================================
// Change Log
// ============================================================================

/// Configuration for the change log
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of changes to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Linear undo/redo history.
///
/// `cursor` points at the most recently applied change; `None` means "before
/// the first entry". Entries after the cursor are the redo tail.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<Change>,
    cursor: Option<usize>,
    config: UndoConfig,
}

impl ChangeLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a change that has already been applied.
    pub fn record(&mut self, change: Change) {
        if let Change::SkeletonDeleted { skeleton } = change {
            log::debug!("🗑️ Undo history cleared by deleting skeleton {}", skeleton);
            self.clear();
            return;
        }

        // No branching: drop the redo tail
        self.entries.truncate(self.next_index());

        log::debug!("📝 Undo: recorded '{}'", change.description());
        self.entries.push(change);
        self.cursor = Some(self.entries.len() - 1);

        while self.entries.len() > self.config.max_history.max(1) {
            self.entries.remove(0);
            self.cursor = self.cursor.and_then(|c| c.checked_sub(1));
        }
    }

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |c| c + 1)
    }

    /// Step back: returns the change to invert, or `None` at the start.
    pub fn undo(&mut self) -> Option<Change> {
        let index = self.cursor?;
        let change = self.entries.get(index)?.clone();
        self.cursor = index.checked_sub(1);
        log::debug!("⏪ Undo: '{}'", change.description());
        Some(change)
    }

    /// Step forward: returns the change to re-apply, or `None` at the end.
    pub fn redo(&mut self) -> Option<Change> {
        let index = self.next_index();
        let change = self.entries.get(index)?.clone();
        self.cursor = Some(index);
        log::debug!("⏩ Redo: '{}'", change.description());
        Some(change)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.next_index() < self.entries.len()
    }

    /// Get the description of the change that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .and_then(|c| self.entries.get(c))
            .map(Change::description)
    }

    /// Get the description of the change that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.entries.get(self.next_index()).map(Change::description)
    }

    /// Current cursor position, `None` before the first entry
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

impl SkeletonAnnotator {
    /// Invert the most recent change. Silently does nothing when there is
    /// nothing to undo.
    pub fn undo(&mut self) {
        if let Some(change) = self.history.undo() {
            self.apply_change(&change, false);
        }
    }

    /// Re-apply the next change. Silently does nothing at the end of the log.
    pub fn redo(&mut self) {
        if let Some(change) = self.history.redo() {
            self.apply_change(&change, true);
        }
    }

    fn apply_change(&mut self, change: &Change, forward: bool) {
        let (skeleton, label, position) = match change {
            Change::AddKeypoint {
                skeleton,
                label,
                x,
                y,
            } => (*skeleton, label, forward.then_some((*x, *y))),
            Change::DeleteKeypoint {
                skeleton,
                label,
                x,
                y,
            } => (*skeleton, label, (!forward).then_some((*x, *y))),
            Change::MoveKeypoint {
                skeleton,
                label,
                before,
                after,
            } => (*skeleton, label, Some(if forward { *after } else { *before })),
            Change::SkeletonDeleted { .. } => return,
        };

        if self.skeleton_index(skeleton).is_none() {
            log::warn!("Undo/redo target skeleton {} no longer exists", skeleton);
            return;
        }
        self.sync_keypoint(skeleton, label, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(label: &str, x: i32) -> Change {
        Change::AddKeypoint {
            skeleton: SkeletonId(1),
            label: label.to_string(),
            x,
            y: 0,
        }
    }

    #[test]
    fn test_empty_log_is_noop() {
        let mut log = ChangeLog::new();
        assert_eq!(log.undo(), None);
        assert_eq!(log.redo(), None);
        assert_eq!(log.cursor(), None);
    }

    #[test]
    fn test_record_advances_cursor() {
        let mut log = ChangeLog::new();
        log.record(add("A", 1));
        log.record(add("B", 2));
        assert_eq!(log.cursor(), Some(1));
        assert!(log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut log = ChangeLog::new();
        log.record(add("A", 1));
        log.record(add("B", 2));

        assert_eq!(log.undo(), Some(add("B", 2)));
        assert_eq!(log.undo(), Some(add("A", 1)));
        assert_eq!(log.undo(), None);
        assert_eq!(log.cursor(), None);

        assert_eq!(log.redo(), Some(add("A", 1)));
        assert_eq!(log.redo(), Some(add("B", 2)));
        assert_eq!(log.redo(), None);
    }

    #[test]
    fn test_record_mid_history_truncates() {
        let mut log = ChangeLog::new();
        log.record(add("A", 1));
        log.record(add("B", 2));
        log.record(add("C", 3));
        log.undo();
        log.undo();
        log.record(add("D", 4));

        assert_eq!(log.len(), 2);
        assert!(!log.can_redo());
        assert_eq!(log.undo(), Some(add("D", 4)));
        assert_eq!(log.undo(), Some(add("A", 1)));
    }

    #[test]
    fn test_record_after_full_undo_replaces_everything() {
        let mut log = ChangeLog::new();
        log.record(add("A", 1));
        log.undo();
        log.record(add("B", 2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.undo_description().as_deref(), Some("Add keypoint 'B'"));
    }

    #[test]
    fn test_skeleton_deleted_clears() {
        let mut log = ChangeLog::new();
        log.record(add("A", 1));
        log.record(add("B", 2));
        log.record(Change::SkeletonDeleted {
            skeleton: SkeletonId(1),
        });
        assert!(log.is_empty());
        assert_eq!(log.undo(), None);
    }

    #[test]
    fn test_max_history_drops_oldest() {
        let mut log = ChangeLog::with_config(UndoConfig { max_history: 2 });
        log.record(add("A", 1));
        log.record(add("B", 2));
        log.record(add("C", 3));
        assert_eq!(log.len(), 2);
        assert_eq!(log.cursor(), Some(1));
        assert_eq!(log.undo(), Some(add("C", 3)));
        assert_eq!(log.undo(), Some(add("B", 2)));
        assert_eq!(log.undo(), None);
    }

    #[test]
    fn test_descriptions() {
        let mut log = ChangeLog::new();
        assert_eq!(log.undo_description(), None);
        log.record(Change::MoveKeypoint {
            skeleton: SkeletonId(1),
            label: "knee".to_string(),
            before: (0, 0),
            after: (1, 1),
        });
        assert_eq!(log.undo_description().as_deref(), Some("Move keypoint 'knee'"));
        log.undo();
        assert_eq!(log.redo_description().as_deref(), Some("Move keypoint 'knee'"));
    }
}
