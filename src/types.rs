//! # Common Types
//!
//! This module contains the types shared by every pipeline stage: the commit
//! records produced by the history source, their derived statistics, and the
//! scored, labelled commits that the aggregation and leaderboard stages consume.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Minimum total score for a commit to count as significant.
pub const SIGNIFICANT_THRESHOLD: u32 = 50;

/// Maximum number of diff characters kept on [`CommitStats`].
pub const DIFF_EXCERPT_LIMIT: usize = 4000;

/// A single commit as reported by the history source.
///
/// Records are created once per commit and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,
    /// Author name, used as the contributor identity
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author time in seconds since the Unix epoch
    pub timestamp: i64,
    /// Author time as a UTC date
    pub date: DateTime<Utc>,
    /// Commit subject line
    pub message: String,
}

impl CommitRecord {
    pub fn new(
        hash: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            timestamp,
            date: DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default(),
            message: message.into(),
        }
    }

    /// First eight characters of the hash.
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(8) {
            Some((idx, _)) => &self.hash[..idx],
            None => &self.hash,
        }
    }
}

/// File and line statistics for one commit.
///
/// `Default` is the degraded form used when extraction fails: no files, no lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub files_changed: usize,
    pub files_list: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
    /// Always `insertions + deletions`
    pub total_lines: usize,
    /// Diff text capped at [`DIFF_EXCERPT_LIMIT`] characters
    pub diff: String,
}

/// Per-axis scores of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub loc: u32,
    pub files: u32,
    pub keyword: u32,
    pub ai: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn new(loc: u32, files: u32, keyword: u32, ai: u32) -> Self {
        Self {
            loc,
            files,
            keyword,
            ai,
            total: loc + files + keyword + ai,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Significant,
    Simple,
}

impl Classification {
    pub fn for_total(total: u32) -> Self {
        if total >= SIGNIFICANT_THRESHOLD {
            Classification::Significant
        } else {
            Classification::Simple
        }
    }
}

/// A commit with its statistics, scores and label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub record: CommitRecord,
    pub stats: CommitStats,
    pub scores: ScoreBreakdown,
    pub classification: Classification,
}

impl ClassifiedCommit {
    /// Label is derived from the score total, never supplied.
    pub fn new(record: CommitRecord, stats: CommitStats, scores: ScoreBreakdown) -> Self {
        Self {
            classification: Classification::for_total(scores.total),
            record,
            stats,
            scores,
        }
    }

    pub fn is_significant(&self) -> bool {
        self.classification == Classification::Significant
    }

    pub fn author(&self) -> &str {
        &self.record.author_name
    }
}

#[derive(Serialize)]
struct CommitView<'a> {
    hash: &'a str,
    author: &'a str,
    email: &'a str,
    date: String,
    message: &'a str,
    stats: StatsView,
    scores: ScoreBreakdown,
    classification: Classification,
}

#[derive(Serialize)]
struct StatsView {
    files: usize,
    lines: usize,
    insertions: usize,
    deletions: usize,
}

impl Serialize for ClassifiedCommit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CommitView {
            hash: self.record.short_hash(),
            author: &self.record.author_name,
            email: &self.record.author_email,
            date: self.record.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            message: &self.record.message,
            stats: StatsView {
                files: self.stats.files_changed,
                lines: self.stats.total_lines,
                insertions: self.stats.insertions,
                deletions: self.stats.deletions,
            },
            scores: self.scores,
            classification: self.classification,
        }
        .serialize(serializer)
    }
}
