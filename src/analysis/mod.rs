pub mod classify;
pub mod git;
pub mod impact;
pub mod pipeline;
pub mod scoring;
pub mod stats;


pub use classify::classify_commit;
pub use git::{GitHistory, HistorySource};
pub use impact::{select_estimator, HeuristicEstimator, ImpactEstimator, RemoteEstimator};
pub use pipeline::{
    analyze_repo_async, classify_all, AnalysisOptions, RunSummary, ANALYSIS_WINDOW_DAYS,
};
