use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

use crate::contributions::ManualContributions;
use crate::error::PeriodError;
use crate::leaderboard::{build_leaderboards, Leaderboards};
use crate::types::{ClassifiedCommit, SIGNIFICANT_THRESHOLD};
use crate::utils::aggregation::aggregate_by_period;

/// The leaderboard document written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub last_updated: String,
    pub total_commits_analyzed: usize,
    pub analysis_period_days: i64,
    pub leaderboards: Leaderboards,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub scoring_system: ScoringSystem,
}

/// Human-readable description of the scoring bands.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringSystem {
    pub loc_score: &'static str,
    pub files_score: &'static str,
    pub keyword_score: &'static str,
    pub ai_score: &'static str,
    pub total: &'static str,
    pub significant_threshold: u32,
}

impl Default for ScoringSystem {
    fn default() -> Self {
        Self {
            loc_score: "0-30 points based on lines changed",
            files_score: "0-20 points based on files modified",
            keyword_score: "0-25 points based on commit type",
            ai_score: "0-25 points based on AI impact analysis",
            total: "0-100 points",
            significant_threshold: SIGNIFICANT_THRESHOLD,
        }
    }
}

impl Report {
    /// Aggregate classified commits and rank every period.
    pub fn build(
        commits: &[ClassifiedCommit],
        contributions: &ManualContributions,
        generated_at: DateTime<Utc>,
        analysis_period_days: i64,
    ) -> Result<Self, PeriodError> {
        let buckets = aggregate_by_period(commits);
        let leaderboards = build_leaderboards(&buckets, contributions)?;

        Ok(Self {
            last_updated: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_commits_analyzed: commits.len(),
            analysis_period_days,
            leaderboards,
            metadata: ReportMetadata {
                scoring_system: ScoringSystem::default(),
            },
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }
}
