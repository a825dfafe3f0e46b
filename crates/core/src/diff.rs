//! Line-by-line text comparison used to compare script versions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The status of a line in a diff comparison.
///
/// - `Added`     -- present only in the newer text.
/// - `Removed`   -- present only in the older text.
/// - `Unchanged` -- present in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a diff with its 1-based line numbers on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    pub status: DiffStatus,
    pub text: String,
    pub old_line: Option<usize>,
    pub new_line: Option<usize>,
}

/// Upper bound on the comparison table, in line pairs. Lines shared at the
/// start and end of both texts do not count.
pub const MAX_DIFF_CELLS: usize = 4_000_000;

/// Diff two texts line by line using a longest-common-subsequence table.
///
/// The common prefix and suffix are matched directly; only the differing
/// middle goes through the table. Removed lines are emitted before added
/// lines at each change point.
pub fn diff_lines(old: &str, new: &str) -> Result<Vec<LineDiff>, CoreError> {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let cells = (a_mid.len() + 1).saturating_mul(b_mid.len() + 1);
    if cells > MAX_DIFF_CELLS {
        return Err(CoreError::Validation(format!(
            "Versions differ in {} and {} lines; comparison is limited to {MAX_DIFF_CELLS} line pairs",
            a_mid.len(),
            b_mid.len()
        )));
    }

    let mut out = Vec::with_capacity(a.len().max(b.len()));
    for (k, line) in a[..prefix].iter().enumerate() {
        out.push(LineDiff::unchanged(line, k + 1, k + 1));
    }
    diff_middle(a_mid, b_mid, prefix, &mut out);
    for k in 0..suffix {
        let (i, j) = (a.len() - suffix + k, b.len() - suffix + k);
        out.push(LineDiff::unchanged(a[i], i + 1, j + 1));
    }
    Ok(out)
}

impl LineDiff {
    fn unchanged(text: &str, old_line: usize, new_line: usize) -> Self {
        Self {
            status: DiffStatus::Unchanged,
            text: text.to_string(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }
}

/// LCS walk over `a` and `b`, which start at line `offset + 1` on both sides.
fn diff_middle(a: &[&str], b: &[&str], offset: usize, out: &mut Vec<LineDiff>) {
    let width = b.len() + 1;
    // lcs[i * width + j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![0u32; (a.len() + 1) * width];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if i < a.len() && j < b.len() && a[i] == b[j] {
            out.push(LineDiff::unchanged(a[i], offset + i + 1, offset + j + 1));
            i += 1;
            j += 1;
        } else if i < a.len()
            && (j == b.len() || lcs[(i + 1) * width + j] >= lcs[i * width + j + 1])
        {
            out.push(LineDiff {
                status: DiffStatus::Removed,
                text: a[i].to_string(),
                old_line: Some(offset + i + 1),
                new_line: None,
            });
            i += 1;
        } else {
            out.push(LineDiff {
                status: DiffStatus::Added,
                text: b[j].to_string(),
                old_line: None,
                new_line: Some(offset + j + 1),
            });
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn statuses(diff: &[LineDiff]) -> Vec<(DiffStatus, &str)> {
        diff.iter().map(|d| (d.status, d.text.as_str())).collect()
    }

    #[test]
    fn identical_texts_are_unchanged() {
        let diff = diff_lines("a\nb", "a\nb").unwrap();
        assert!(diff.iter().all(|d| d.status == DiffStatus::Unchanged));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn detects_added_and_removed_lines() {
        let diff = diff_lines("FADE IN\nold line\nFADE OUT", "FADE IN\nnew line\nFADE OUT").unwrap();
        assert_eq!(
            statuses(&diff),
            vec![
                (DiffStatus::Unchanged, "FADE IN"),
                (DiffStatus::Removed, "old line"),
                (DiffStatus::Added, "new line"),
                (DiffStatus::Unchanged, "FADE OUT"),
            ]
        );
    }

    #[test]
    fn line_numbers_track_each_side() {
        let diff = diff_lines("a\nc", "a\nb\nc").unwrap();
        let added = diff.iter().find(|d| d.status == DiffStatus::Added).unwrap();
        assert_eq!(added.text, "b");
        assert_eq!(added.old_line, None);
        assert_eq!(added.new_line, Some(2));

        let last = diff.last().unwrap();
        assert_eq!(last.old_line, Some(2));
        assert_eq!(last.new_line, Some(3));
    }

    #[test]
    fn empty_old_text_is_all_added() {
        let diff = diff_lines("", "one\ntwo").unwrap();
        assert!(diff.iter().all(|d| d.status == DiffStatus::Added));
    }

    #[test]
    fn changes_inside_long_texts_keep_line_numbers() {
        let old: Vec<String> = (1..=6000).map(|n| format!("line {n}")).collect();
        let mut new = old.clone();
        new[2999] = "rewritten".to_string();

        let diff = diff_lines(&old.join("\n"), &new.join("\n")).unwrap();

        assert_eq!(diff.len(), 6001);
        let removed = diff.iter().find(|d| d.status == DiffStatus::Removed).unwrap();
        assert_eq!((removed.text.as_str(), removed.old_line), ("line 3000", Some(3000)));
        let added = diff.iter().find(|d| d.status == DiffStatus::Added).unwrap();
        assert_eq!((added.text.as_str(), added.new_line), ("rewritten", Some(3000)));
        let last = diff.last().unwrap();
        assert_eq!((last.old_line, last.new_line), (Some(6000), Some(6000)));
    }

    #[test]
    fn oversized_comparison_is_rejected() {
        let old: Vec<String> = (0..5000).map(|n| format!("old {n}")).collect();
        let new: Vec<String> = (0..5000).map(|n| format!("new {n}")).collect();

        let result = diff_lines(&old.join("\n"), &new.join("\n"));

        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(DiffStatus::Removed.to_string(), "removed");
    }
}
