use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

use crate::analysis::classify::classify_commit;
use crate::analysis::git::{GitHistory, HistorySource};
use crate::analysis::impact::ImpactEstimator;
use crate::contributions::ManualContributions;
use crate::error::HistoryError;
use crate::report::Report;
use crate::types::{ClassifiedCommit, CommitRecord, CommitStats};

/// Length of the look-back window.
pub const ANALYSIS_WINDOW_DAYS: i64 = 180;

/// Log a progress line every this many commits.
const PROGRESS_INTERVAL: usize = 10;

const MIN_CHUNK_SIZE: usize = 1;
const MAX_CHUNK_SIZE: usize = 250;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub repo_path: PathBuf,
    pub workers: usize,
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub significant: usize,
    pub simple: usize,
}

impl RunSummary {
    pub fn from_commits(commits: &[ClassifiedCommit]) -> Self {
        let significant = commits.iter().filter(|c| c.is_significant()).count();
        Self {
            total: commits.len(),
            significant,
            simple: commits.len() - significant,
        }
    }
}

/// Shared progress counter across classification workers.
struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_INTERVAL == 0 {
            info!("Progress: {}/{}", done, self.total);
        }
    }
}

/// Extract stats for and classify each commit, in order.
///
/// A commit whose diff cannot be read is scored on zero stats.
pub fn classify_all(
    history: &dyn HistorySource,
    commits: Vec<CommitRecord>,
    estimator: &dyn ImpactEstimator,
) -> Vec<ClassifiedCommit> {
    classify_chunk(history, commits, estimator, None)
}

fn classify_chunk(
    history: &dyn HistorySource,
    commits: Vec<CommitRecord>,
    estimator: &dyn ImpactEstimator,
    progress: Option<&Progress>,
) -> Vec<ClassifiedCommit> {
    commits
        .into_iter()
        .map(|record| {
            let stats = match history.commit_diff(&record.hash) {
                Ok(raw) => CommitStats::from_raw(raw),
                Err(e) => {
                    warn!(commit = %record.hash, error = %e, "failed to read commit stats");
                    CommitStats::default()
                }
            };
            let classified = classify_commit(record, stats, estimator);
            if let Some(progress) = progress {
                progress.tick();
            }
            classified
        })
        .collect()
}

/// Chunks small enough that every worker gets several.
fn chunk_size_for(total: usize, workers: usize) -> usize {
    total
        .div_ceil(workers.max(1) * 4)
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

/// Classify commits on a bounded pool of blocking tasks.
///
/// Each task opens its own repository handle. Chunks are contiguous and joined
/// in submission order, so the result keeps the input order.
pub async fn classify_commits_parallel(
    repo_path: PathBuf,
    commits: Vec<CommitRecord>,
    estimator: Arc<dyn ImpactEstimator>,
    workers: usize,
) -> Result<Vec<ClassifiedCommit>, HistoryError> {
    let total = commits.len();
    let chunk_size = chunk_size_for(total, workers);
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let progress = Arc::new(Progress {
        done: AtomicUsize::new(0),
        total,
    });

    let mut handles = Vec::with_capacity(total.div_ceil(chunk_size));
    for chunk in commits.chunks(chunk_size) {
        let chunk = chunk.to_vec();
        let repo_path = repo_path.clone();
        let estimator = Arc::clone(&estimator);
        let progress = Arc::clone(&progress);
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| HistoryError::Worker(format!("failed to acquire semaphore: {}", e)))?;

        handles.push(tokio::spawn(async move {
            let _permit = permit;
            spawn_blocking(move || {
                let history = GitHistory::open(&repo_path)?;
                Ok::<_, HistoryError>(classify_chunk(
                    &history,
                    chunk,
                    estimator.as_ref(),
                    Some(progress.as_ref()),
                ))
            })
            .await
            .map_err(|e| HistoryError::Worker(e.to_string()))?
        }));
    }

    let mut classified = Vec::with_capacity(total);
    for result in futures::future::join_all(handles).await {
        let chunk = result.map_err(|e| HistoryError::Worker(e.to_string()))??;
        classified.extend(chunk);
    }
    Ok(classified)
}

/// Run the whole pipeline against a repository.
///
/// Fails only when the history cannot be read.
pub async fn analyze_repo_async(
    options: AnalysisOptions,
    estimator: Arc<dyn ImpactEstimator>,
    contributions: &ManualContributions,
    now: DateTime<Utc>,
) -> Result<(Report, RunSummary)> {
    let start_time = Instant::now();
    let since = now - Duration::days(ANALYSIS_WINDOW_DAYS);

    info!(
        "Fetching commits from the last {} days of {}",
        ANALYSIS_WINDOW_DAYS,
        options.repo_path.display()
    );
    let commits = {
        let repo_path = options.repo_path.clone();
        spawn_blocking(move || GitHistory::open(&repo_path)?.list_commits(since))
            .await
            .context("history task panicked")?
            .with_context(|| format!("cannot read history of {}", options.repo_path.display()))?
    };
    info!("Found {} commits", commits.len());

    info!(workers = options.workers, estimator = estimator.name(), "Classifying commits");
    let classified =
        classify_commits_parallel(options.repo_path.clone(), commits, estimator, options.workers)
            .await
            .context("commit classification failed")?;

    info!("Aggregating by time period and building leaderboards");
    let report = Report::build(&classified, contributions, now, ANALYSIS_WINDOW_DAYS)
        .context("failed to build leaderboards")?;

    let summary = RunSummary::from_commits(&classified);
    info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "Analysis complete: {} commits, {} significant, {} simple",
        summary.total,
        summary.significant,
        summary.simple
    );
    Ok((report, summary))
}
