use crate::analysis::impact::{ImpactEstimator, ImpactRequest};
use crate::analysis::scoring::{score_by_files, score_by_impact, score_by_keyword, score_by_lines};
use crate::types::{ClassifiedCommit, CommitRecord, CommitStats, ScoreBreakdown};

/// Score a commit on every axis and label it.
///
/// The diff excerpt is scoring input only and is not kept on the result.
pub fn classify_commit(
    record: CommitRecord,
    mut stats: CommitStats,
    estimator: &dyn ImpactEstimator,
) -> ClassifiedCommit {
    let ai = score_by_impact(estimator, &ImpactRequest::new(&record, &stats));
    stats.diff = String::new();
    let scores = ScoreBreakdown::new(
        score_by_lines(stats.total_lines),
        score_by_files(stats.files_changed),
        score_by_keyword(&record.message),
        ai,
    );
    ClassifiedCommit::new(record, stats, scores)
}
