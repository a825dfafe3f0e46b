//! Script version log operations on [`Document`].
//!
//! The log is append-only and never deduplicated. Versions are addressed by
//! their 1-based number; the text-based `set_current_version` is kept for
//! callers that only hold the text.

use chrono::Utc;

use crate::diff::{diff_lines, LineDiff};
use crate::document::Document;
use crate::error::CoreError;
use crate::models::{CurrentVersion, ScriptVersion};

impl Document {
    /// Append `text` as a new version and make it current. Returns its number.
    pub fn add_version(&mut self, text: impl Into<String>) -> usize {
        let text = text.into();
        let number = self.versions.len() + 1;
        self.versions.push(ScriptVersion {
            number,
            text: text.clone(),
            saved_at: Utc::now(),
        });
        self.current_version = CurrentVersion {
            text,
            number: Some(number),
        };
        number
    }

    /// Point the current version at a text value without touching the log.
    ///
    /// When several versions share the text, the last one is taken. Text that
    /// matches no saved version becomes an unsaved draft (`number == None`).
    pub fn set_current_version(&mut self, text: impl Into<String>) {
        let text = text.into();
        let number = self
            .versions
            .iter()
            .rev()
            .find(|v| v.text == text)
            .map(|v| v.number);
        self.current_version = CurrentVersion { text, number };
    }

    /// Make the version with the given number current.
    pub fn revert_to_version(&mut self, number: usize) -> Result<(), CoreError> {
        let version = self
            .version(number)
            .ok_or_else(|| CoreError::not_found("ScriptVersion", number))?;
        self.current_version = CurrentVersion {
            text: version.text.clone(),
            number: Some(number),
        };
        Ok(())
    }

    pub fn version(&self, number: usize) -> Option<&ScriptVersion> {
        number
            .checked_sub(1)
            .and_then(|index| self.versions.get(index))
    }

    /// Both versions of a comparison, or `NotFound` for the first missing one.
    pub fn version_pair(
        &self,
        from: usize,
        to: usize,
    ) -> Result<(&ScriptVersion, &ScriptVersion), CoreError> {
        let old = self
            .version(from)
            .ok_or_else(|| CoreError::not_found("ScriptVersion", from))?;
        let new = self
            .version(to)
            .ok_or_else(|| CoreError::not_found("ScriptVersion", to))?;
        Ok((old, new))
    }

}

/// Line diff from version `old` to version `new`.
///
/// Pure and possibly slow on long scripts; callers holding shared state
/// should clone the versions out first.
pub fn diff_versions(old: &ScriptVersion, new: &ScriptVersion) -> Result<Vec<LineDiff>, CoreError> {
    diff_lines(&old.text, &new.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffStatus;
    use assert_matches::assert_matches;

    fn texts(doc: &Document) -> Vec<&str> {
        doc.versions().iter().map(|v| v.text.as_str()).collect()
    }

    #[test]
    fn add_version_appends_and_sets_current() {
        let mut doc = Document::new();
        assert_eq!(doc.add_version("draft 1"), 1);
        assert_eq!(doc.add_version("draft 2"), 2);

        assert_eq!(texts(&doc), vec!["draft 1", "draft 2"]);
        assert_eq!(doc.current_version().text, "draft 2");
        assert_eq!(doc.current_version().number, Some(2));
    }

    #[test]
    fn identical_versions_are_both_stored() {
        let mut doc = Document::new();
        doc.add_version("same");
        doc.add_version("same");
        assert_eq!(doc.versions().len(), 2);
    }

    #[test]
    fn set_current_version_keeps_log_intact() {
        let mut doc = Document::new();
        doc.add_version("draft 1");
        doc.add_version("draft 2");

        doc.set_current_version("draft 1");

        assert_eq!(doc.current_version().text, "draft 1");
        assert_eq!(doc.current_version().number, Some(1));
        assert_eq!(texts(&doc), vec!["draft 1", "draft 2"]);
    }

    #[test]
    fn set_current_version_with_duplicate_text_resolves_to_last_match() {
        let mut doc = Document::new();
        doc.add_version("repeat");
        doc.add_version("other");
        doc.add_version("repeat");

        doc.set_current_version("repeat");

        assert_eq!(doc.current_version().number, Some(3));
        assert_eq!(doc.current_version().text, "repeat");
    }

    #[test]
    fn set_current_version_with_unsaved_text_is_a_draft() {
        let mut doc = Document::new();
        doc.add_version("draft 1");
        doc.set_current_version("scribbles");
        assert_eq!(doc.current_version().number, None);
        assert_eq!(doc.current_version().text, "scribbles");
    }

    #[test]
    fn revert_to_version_by_number() {
        let mut doc = Document::new();
        doc.add_version("repeat");
        doc.add_version("repeat");

        doc.revert_to_version(1).unwrap();
        assert_eq!(doc.current_version().number, Some(1));

        assert_matches!(doc.revert_to_version(0), Err(CoreError::NotFound { .. }));
        assert_matches!(doc.revert_to_version(3), Err(CoreError::NotFound { .. }));
        assert_eq!(doc.current_version().number, Some(1));
    }

    #[test]
    fn diff_versions_compares_saved_texts() {
        let mut doc = Document::new();
        doc.add_version("INT. LAB\nAva enters.");
        doc.add_version("INT. LAB\nAva runs in.");

        let (old, new) = doc.version_pair(1, 2).unwrap();
        let diff = diff_versions(old, new).unwrap();
        assert_eq!(diff[0].status, DiffStatus::Unchanged);
        assert!(diff.iter().any(|d| d.status == DiffStatus::Removed && d.text == "Ava enters."));
        assert!(diff.iter().any(|d| d.status == DiffStatus::Added && d.text == "Ava runs in."));
    }

    #[test]
    fn version_pair_with_unknown_number_is_not_found() {
        let mut doc = Document::new();
        doc.add_version("only");
        assert_matches!(doc.version_pair(1, 2), Err(CoreError::NotFound { .. }));
    }
}
