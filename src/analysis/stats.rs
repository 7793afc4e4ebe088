use crate::types::{CommitStats, DIFF_EXCERPT_LIMIT};

/// Unnormalized change data for one commit, as read from the history source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommitDiff {
    /// Paths touched by the commit
    pub files: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
    /// Patch text, possibly already cut short by the source
    pub patch: String,
    /// Set when the source stopped collecting patch text early
    pub patch_truncated: bool,
}

impl CommitStats {
    /// Normalize raw diff output into commit statistics.
    pub fn from_raw(raw: RawCommitDiff) -> Self {
        let RawCommitDiff {
            files,
            insertions,
            deletions,
            patch,
            patch_truncated,
        } = raw;

        Self {
            files_changed: files.len(),
            files_list: files,
            insertions,
            deletions,
            total_lines: insertions + deletions,
            diff: diff_excerpt(&patch, patch_truncated),
        }
    }
}

/// Cap a diff at [`DIFF_EXCERPT_LIMIT`] characters, marking the cut with `...`.
pub fn diff_excerpt(patch: &str, truncated: bool) -> String {
    match patch.char_indices().nth(DIFF_EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &patch[..idx]),
        None if truncated => format!("{}...", patch),
        None => patch.to_string(),
    }
}
