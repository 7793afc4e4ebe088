use chrono::{DateTime, Utc};
use git2::{DiffFormat, DiffOptions, ErrorCode, Oid, Repository, Sort};
use std::path::Path;
use tracing::debug;

use crate::analysis::stats::RawCommitDiff;
use crate::error::HistoryError;
use crate::types::{CommitRecord, DIFF_EXCERPT_LIMIT};

/// Patch bytes collected per commit; enough for [`DIFF_EXCERPT_LIMIT`] characters
/// of any encoding.
const PATCH_BYTE_BUDGET: usize = DIFF_EXCERPT_LIMIT * 4;

/// Supplies commits and their change data.
pub trait HistorySource {
    /// Non-merge commits committed at or after `since`, newest first.
    fn list_commits(&self, since: DateTime<Utc>) -> Result<Vec<CommitRecord>, HistoryError>;

    /// Files, line counts and patch text of one commit against its first parent.
    fn commit_diff(&self, hash: &str) -> Result<RawCommitDiff, HistoryError>;
}

/// History source backed by a local Git repository.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }
}

impl HistorySource for GitHistory {
    fn list_commits(&self, since: DateTime<Utc>) -> Result<Vec<CommitRecord>, HistoryError> {
        // An unborn HEAD is an empty history, not an unreadable one
        if let Err(e) = self.repo.head() {
            if e.code() == ErrorCode::UnbornBranch {
                return Ok(Vec::new());
            }
            return Err(e.into());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let cutoff = since.timestamp();
        let mut commits = Vec::new();

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }
            if commit.time().seconds() < cutoff {
                continue;
            }

            let author = commit.author();
            commits.push(CommitRecord::new(
                commit.id().to_string(),
                author.name().unwrap_or("Unknown"),
                author.email().unwrap_or(""),
                author.when().seconds(),
                commit.summary().unwrap_or(""),
            ));
        }

        debug!(count = commits.len(), %since, "listed commits");
        Ok(commits)
    }

    fn commit_diff(&self, hash: &str) -> Result<RawCommitDiff, HistoryError> {
        let commit = self.repo.find_commit(Oid::from_str(hash)?)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;

        let stats = diff.stats()?;
        let files = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();

        let mut patch = String::new();
        let mut patch_truncated = false;
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if patch.len() >= PATCH_BYTE_BUDGET {
                patch_truncated = true;
                return true;
            }
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(RawCommitDiff {
            files,
            insertions: stats.insertions(),
            deletions: stats.deletions(),
            patch,
            patch_truncated,
        })
    }
}
