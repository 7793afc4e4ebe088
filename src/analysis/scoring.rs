//! Commit scoring
//!
//! Four independent axes, each banded into a small integer range:
//!
//! | axis    | range  | input                     |
//! |---------|--------|---------------------------|
//! | loc     | 3-30   | inserted + deleted lines  |
//! | files   | 5-20   | files touched             |
//! | keyword | 5-25   | commit message prefix     |
//! | ai      | 0-25   | impact estimator          |
//!
//! The commit score is the plain sum of the four.

use tracing::warn;

use crate::analysis::impact::{heuristic_score, ImpactEstimator, ImpactRequest, IMPACT_MAX};

struct KeywordTier {
    keywords: &'static [&'static str],
    score: u32,
}

/// Checked in order; the first tier with a matching keyword decides the score.
const KEYWORD_TIERS: [KeywordTier; 4] = [
    KeywordTier {
        keywords: &["feat:", "feature:", "refactor:", "perf:", "breaking:"],
        score: 25,
    },
    KeywordTier {
        keywords: &["fix:", "bug:", "improve:", "enhance:", "update:"],
        score: 15,
    },
    KeywordTier {
        keywords: &["docs:", "doc:", "typo:", "style:", "format:"],
        score: 5,
    },
    KeywordTier {
        keywords: &["test:", "chore:", "ci:"],
        score: 10,
    },
];

/// Score for messages without a recognised prefix.
const DEFAULT_KEYWORD_SCORE: u32 = 12;

pub fn score_by_lines(total_lines: usize) -> u32 {
    match total_lines {
        n if n >= 100 => 30,
        n if n >= 50 => 15,
        n if n >= 20 => 8,
        _ => 3,
    }
}

pub fn score_by_files(files_changed: usize) -> u32 {
    match files_changed {
        n if n >= 5 => 20,
        n if n >= 2 => 10,
        _ => 5,
    }
}

/// Case-insensitive substring match against the keyword tiers.
pub fn score_by_keyword(message: &str) -> u32 {
    let message = message.to_lowercase();
    KEYWORD_TIERS
        .iter()
        .find(|tier| tier.keywords.iter().any(|kw| message.contains(kw)))
        .map_or(DEFAULT_KEYWORD_SCORE, |tier| tier.score)
}

/// Ask the estimator, clamping its answer; any failure falls back to the line heuristic.
pub fn score_by_impact(estimator: &dyn ImpactEstimator, request: &ImpactRequest<'_>) -> u32 {
    match estimator.estimate(request) {
        Ok(estimate) => estimate.clamp(0, IMPACT_MAX as i64) as u32,
        Err(e) => {
            warn!(estimator = estimator.name(), error = %e, "impact scoring failed, using fallback");
            heuristic_score(request.total_lines)
        }
    }
}
