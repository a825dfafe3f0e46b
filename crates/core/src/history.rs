//! Whole-document snapshot log with a navigation cursor.
//!
//! Each [`Snapshot`] holds its own deep copy of the [`Document`]; taking or
//! restoring one clones the full graph, so later edits to the live document
//! never reach a stored snapshot and vice versa.
//!
//! Cursor states: `None` (no snapshot taken yet) or `Some(i)` with
//! `i < len`. `take` appends and moves the cursor to the new entry;
//! `navigate` moves it to a valid index or does nothing. Entries are never
//! removed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum number of snapshots kept in one session.
pub const MAX_SNAPSHOTS: usize = 1000;

/// Maximum length of a snapshot label in characters.
pub const MAX_SNAPSHOT_LABEL_LENGTH: usize = 200;

/// Direction for single-step history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Back,
    Forward,
}

/// A point-in-time copy of the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub label: Option<String>,
    pub taken_at: Timestamp,
    pub document: Document,
}

/// Lightweight description of a snapshot for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub index: usize,
    pub label: Option<String>,
    pub taken_at: Timestamp,
    pub version_count: usize,
    pub shot_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotLog {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The cursor as exposed to clients: `-1` before any snapshot exists.
    pub fn cursor_position(&self) -> i64 {
        self.cursor.map_or(-1, |c| c as i64)
    }

    pub fn can_step_back(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_step_forward(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Deep-copy `document` onto the end of the log and move the cursor to it.
    ///
    /// Each entry is a full copy, so the log is capped at [`MAX_SNAPSHOTS`];
    /// past the cap `take` fails and the log and cursor are left as they are.
    pub fn take(&mut self, document: &Document, label: Option<String>) -> Result<usize, CoreError> {
        if let Some(label) = &label {
            validate_snapshot_label(label)?;
        }
        if self.entries.len() >= MAX_SNAPSHOTS {
            return Err(CoreError::Validation(format!(
                "Snapshot limit of {MAX_SNAPSHOTS} reached for this session"
            )));
        }

        self.entries.push(Snapshot {
            label,
            taken_at: Utc::now(),
            document: document.clone(),
        });
        let index = self.entries.len() - 1;
        self.cursor = Some(index);
        Ok(index)
    }

    /// Replace `document` with a copy of the snapshot at `index`.
    ///
    /// Out-of-range indices (including negatives) are ignored and return
    /// `false`; neither the document nor the cursor changes.
    pub fn navigate(&mut self, index: i64, document: &mut Document) -> bool {
        let Some(index) = usize::try_from(index).ok().filter(|i| *i < self.entries.len()) else {
            return false;
        };
        *document = self.entries[index].document.clone();
        self.cursor = Some(index);
        true
    }

    /// Navigate one entry back or forward from the cursor.
    pub fn step(&mut self, direction: StepDirection, document: &mut Document) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let target = match direction {
            StepDirection::Back => cursor as i64 - 1,
            StepDirection::Forward => cursor as i64 + 1,
        };
        self.navigate(target, document)
    }

    pub fn summaries(&self) -> Vec<SnapshotSummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, s)| SnapshotSummary {
                index,
                label: s.label.clone(),
                taken_at: s.taken_at,
                version_count: s.document.versions().len(),
                shot_count: s.document.shots().len(),
            })
            .collect()
    }
}

/// Validate a snapshot label: non-blank and within [`MAX_SNAPSHOT_LABEL_LENGTH`].
pub fn validate_snapshot_label(label: &str) -> Result<(), CoreError> {
    if label.trim().is_empty() {
        return Err(CoreError::Validation(
            "Snapshot label must not be blank".to_string(),
        ));
    }
    let len = label.chars().count();
    if len > MAX_SNAPSHOT_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Snapshot label must not exceed {MAX_SNAPSHOT_LABEL_LENGTH} characters, got {len}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateCharacter, CreateShot};
    use assert_matches::assert_matches;

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.add_version("draft 1");
        doc.add_scene("INT. LAB").unwrap();
        doc.add_character(CreateCharacter::named("Ava"));
        doc.add_shot(CreateShot::named("Opening"));
        doc
    }

    #[test]
    fn empty_log_has_no_cursor() {
        let log = SnapshotLog::new();
        assert_eq!(log.cursor(), None);
        assert_eq!(log.cursor_position(), -1);
        assert!(!log.can_step_back());
        assert!(!log.can_step_forward());
    }

    #[test]
    fn take_past_cap_is_rejected_without_moving_cursor() {
        let mut log = SnapshotLog::new();
        let doc = Document::new();
        for _ in 0..MAX_SNAPSHOTS {
            log.take(&doc, None).unwrap();
        }
        log.navigate(0, &mut Document::new());

        assert_matches!(log.take(&doc, None), Err(CoreError::Validation(_)));
        assert_eq!(log.len(), MAX_SNAPSHOTS);
        assert_eq!(log.cursor(), Some(0));
    }

    #[test]
    fn take_moves_cursor_to_new_entry() {
        let mut log = SnapshotLog::new();
        let doc = sample_document();

        assert_eq!(log.take(&doc, None).unwrap(), 0);
        assert_eq!(log.take(&doc, Some("after act one".into())).unwrap(), 1);
        assert_eq!(log.cursor(), Some(1));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn navigate_restores_snapshot_exactly() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        log.take(&doc, None).unwrap();
        let at_snapshot = doc.clone();

        doc.add_version("draft 2");
        doc.add_shot(CreateShot::named("Chase"));
        doc.delete_scene("INT. LAB");
        doc.move_shot(1, 0).unwrap();
        assert_ne!(doc, at_snapshot);

        assert!(log.navigate(0, &mut doc));
        assert_eq!(doc, at_snapshot);
        assert_eq!(log.cursor(), Some(0));
    }

    #[test]
    fn later_edits_do_not_alter_stored_snapshot() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        log.take(&doc, None).unwrap();
        let stored = log.get(0).unwrap().document.clone();

        let shot_id = doc.shots()[0].id;
        let mut shot = doc.shot(shot_id).unwrap().clone();
        shot.name = "Renamed".to_string();
        doc.update_shot(shot);

        assert_eq!(log.get(0).unwrap().document, stored);
        assert_eq!(log.get(0).unwrap().document.shots()[0].name, "Opening");
    }

    #[test]
    fn editing_after_restore_does_not_alter_snapshot() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        log.take(&doc, None).unwrap();

        log.navigate(0, &mut doc);
        doc.add_version("draft 2");

        assert_eq!(log.get(0).unwrap().document.versions().len(), 1);
    }

    #[test]
    fn navigate_out_of_range_is_noop() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        log.take(&doc, None).unwrap();
        doc.add_version("draft 2");
        let live = doc.clone();

        assert!(!log.navigate(1, &mut doc));
        assert!(!log.navigate(-1, &mut doc));
        assert_eq!(doc, live);
        assert_eq!(log.cursor(), Some(0));
    }

    #[test]
    fn navigate_on_empty_log_is_noop() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        let live = doc.clone();
        assert!(!log.navigate(0, &mut doc));
        assert_eq!(doc, live);
        assert_eq!(log.cursor(), None);
    }

    #[test]
    fn step_back_and_forward() {
        let mut log = SnapshotLog::new();
        let mut doc = Document::new();
        doc.add_version("v1");
        log.take(&doc, None).unwrap();
        doc.add_version("v2");
        log.take(&doc, None).unwrap();

        assert!(log.can_step_back());
        assert!(!log.can_step_forward());

        assert!(log.step(StepDirection::Back, &mut doc));
        assert_eq!(doc.versions().len(), 1);
        assert!(!log.step(StepDirection::Back, &mut doc));

        assert!(log.step(StepDirection::Forward, &mut doc));
        assert_eq!(doc.versions().len(), 2);
        assert!(!log.step(StepDirection::Forward, &mut doc));
        assert_eq!(log.cursor(), Some(1));
    }

    #[test]
    fn step_without_snapshots_is_noop() {
        let mut log = SnapshotLog::new();
        let mut doc = sample_document();
        assert!(!log.step(StepDirection::Forward, &mut doc));
        assert!(!log.step(StepDirection::Back, &mut doc));
    }

    #[test]
    fn blank_label_is_rejected() {
        let mut log = SnapshotLog::new();
        let doc = Document::new();
        assert_matches!(log.take(&doc, Some("  ".into())), Err(CoreError::Validation(_)));
        assert!(log.is_empty());
        assert_eq!(log.cursor(), None);
    }

    #[test]
    fn summaries_describe_entries() {
        let mut log = SnapshotLog::new();
        let doc = sample_document();
        log.take(&doc, Some("first".into())).unwrap();

        let summaries = log.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].index, 0);
        assert_eq!(summaries[0].label.as_deref(), Some("first"));
        assert_eq!(summaries[0].version_count, 1);
        assert_eq!(summaries[0].shot_count, 1);
    }
}
