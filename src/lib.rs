//! # Commit Leaderboard Library
//!
//! `commit_leaderboard` scores the recent commit history of a Git repository and
//! ranks its authors on weekly, monthly and quarterly leaderboards.
//!
//! ## Features
//!
//! - Read non-merge commits from the last 180 days
//! - Score each commit on size, breadth, message type and estimated impact
//! - Classify commits as significant or simple
//! - Merge manually recorded contributions into each period's ranking
//! - Emit a single JSON report for a dashboard to consume
//!
//! ## Example
//!
//! ```no_run
//! use chrono::Utc;
//! use commit_leaderboard::analysis::{analyze_repo_async, AnalysisOptions, HeuristicEstimator};
//! use commit_leaderboard::contributions::ManualContributions;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let options = AnalysisOptions {
//!     repo_path: ".".into(),
//!     workers: 4,
//! };
//! let (report, summary) = analyze_repo_async(
//!     options,
//!     Arc::new(HeuristicEstimator),
//!     &ManualContributions::default(),
//!     Utc::now(),
//! )
//! .await?;
//! report.write_to("leaderboard-data.json".as_ref())?;
//! println!("{} significant commits", summary.significant);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod contributions;
pub mod error;
pub mod leaderboard;
pub mod report;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::LeaderboardConfig;
pub use contributions::{ManualContribution, ManualContributions};
pub use leaderboard::{ContributorSummary, Leaderboards, Tier};
pub use report::Report;
pub use types::{Classification, ClassifiedCommit, CommitRecord, CommitStats, ScoreBreakdown};
