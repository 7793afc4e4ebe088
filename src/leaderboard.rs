//! # Leaderboards
//!
//! Per-period rankings. Each period is ranked on its own: authors are ordered by
//! total score (commit score plus manual contributions), ties broken by commit
//! count, remaining ties left in first-appearance order. Tiers are absolute
//! rank bands, so the size of a period's field does not move them.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::contributions::ManualContributions;
use crate::error::PeriodError;
use crate::types::ClassifiedCommit;
use crate::utils::aggregation::{AuthorBuckets, PeriodBuckets};
use crate::utils::periods::Granularity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Tier {
    T0,
    T1,
    T2,
    T3,
}

impl Tier {
    /// Ranks 1-5 are T0, 6-12 T1, 13-22 T2, everything after T3.
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            ..=5 => Tier::T0,
            6..=12 => Tier::T1,
            13..=22 => Tier::T2,
            _ => Tier::T3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::T0 => "Elite",
            Tier::T1 => "Advanced",
            Tier::T2 => "Intermediate",
            Tier::T3 => "Contributing",
        }
    }
}

/// One author's standing in one period.
#[derive(Debug, Clone, Serialize)]
pub struct ContributorSummary {
    pub name: String,
    pub email: String,
    pub total_commits: usize,
    pub significant_commits: usize,
    pub simple_commits: usize,
    pub significance_ratio: f64,
    pub commit_score: i64,
    pub avg_score: f64,
    pub additional_contribution_score: i64,
    pub additional_contribution_notes: String,
    pub total_score: i64,
    pub rank: usize,
    pub tier: Tier,
    pub tier_name: &'static str,
    pub commits: Vec<ClassifiedCommit>,
}

impl ContributorSummary {
    /// Unranked summary; `rank` and `tier` are filled in by [`rank_contributors`].
    fn new(name: &str, commits: &[ClassifiedCommit], manual_score: i64, manual_notes: String) -> Self {
        let total_commits = commits.len();
        let significant_commits = commits.iter().filter(|c| c.is_significant()).count();
        let commit_score: i64 = commits.iter().map(|c| i64::from(c.scores.total)).sum();

        let (significance_ratio, avg_score) = if total_commits > 0 {
            (
                significant_commits as f64 / total_commits as f64,
                round2(commit_score as f64 / total_commits as f64),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            name: name.to_string(),
            email: commits
                .first()
                .map(|c| c.record.author_email.clone())
                .unwrap_or_default(),
            total_commits,
            significant_commits,
            simple_commits: total_commits - significant_commits,
            significance_ratio,
            commit_score,
            avg_score,
            additional_contribution_score: manual_score,
            additional_contribution_notes: manual_notes,
            total_score: commit_score + manual_score,
            rank: 0,
            tier: Tier::T3,
            tier_name: Tier::T3.name(),
            commits: commits.to_vec(),
        }
    }
}

/// Two decimals, exact halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Stable sort by `(total_score, total_commits)` descending, then assign rank and tier.
pub fn rank_contributors(summaries: &mut [ContributorSummary]) {
    summaries.sort_by(|a, b| {
        (b.total_score, b.total_commits).cmp(&(a.total_score, a.total_commits))
    });
    for (idx, summary) in summaries.iter_mut().enumerate() {
        summary.rank = idx + 1;
        summary.tier = Tier::for_rank(summary.rank);
        summary.tier_name = summary.tier.name();
    }
}

/// Rank the authors of one period whose inclusive bounds are `(start, end)`.
pub fn build_period_leaderboard(
    authors: &AuthorBuckets,
    bounds: (NaiveDateTime, NaiveDateTime),
    contributions: &ManualContributions,
) -> Vec<ContributorSummary> {
    let (start, end) = bounds;
    let mut summaries: Vec<ContributorSummary> = authors
        .iter()
        .map(|(author, commits)| {
            let (manual_score, manual_notes) = contributions.merge_score(author, start, end);
            ContributorSummary::new(author, commits, manual_score, manual_notes)
        })
        .collect();
    rank_contributors(&mut summaries);
    summaries
}

/// Ranked leaderboards for every period of every granularity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboards {
    pub weekly: BTreeMap<String, Vec<ContributorSummary>>,
    pub monthly: BTreeMap<String, Vec<ContributorSummary>>,
    pub quarterly: BTreeMap<String, Vec<ContributorSummary>>,
}

impl Leaderboards {
    pub fn get(&self, granularity: Granularity) -> &BTreeMap<String, Vec<ContributorSummary>> {
        match granularity {
            Granularity::Weekly => &self.weekly,
            Granularity::Monthly => &self.monthly,
            Granularity::Quarterly => &self.quarterly,
        }
    }

    fn get_mut(&mut self, granularity: Granularity) -> &mut BTreeMap<String, Vec<ContributorSummary>> {
        match granularity {
            Granularity::Weekly => &mut self.weekly,
            Granularity::Monthly => &mut self.monthly,
            Granularity::Quarterly => &mut self.quarterly,
        }
    }

    pub fn period(&self, granularity: Granularity, key: &str) -> Option<&[ContributorSummary]> {
        self.get(granularity).get(key).map(Vec::as_slice)
    }
}

pub fn build_leaderboards(
    buckets: &PeriodBuckets,
    contributions: &ManualContributions,
) -> Result<Leaderboards, PeriodError> {
    let mut leaderboards = Leaderboards::default();
    for granularity in Granularity::ALL {
        for (key, authors) in buckets.periods(granularity) {
            let bounds = granularity.period_bounds(key)?;
            let ranked = build_period_leaderboard(authors, bounds, contributions);
            leaderboards.get_mut(granularity).insert(key.to_string(), ranked);
        }
    }
    Ok(leaderboards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributions::ManualContribution;
    use crate::types::{CommitRecord, CommitStats, ScoreBreakdown};
    use crate::utils::aggregation::aggregate_by_period;
    use pretty_assertions::assert_eq;

    // 2024-01-03T10:00:00Z, a Wednesday in 2024-W01
    const WEEK_ONE: i64 = 1_704_276_000;

    fn commit(author: &str, total: u32, offset: i64) -> ClassifiedCommit {
        ClassifiedCommit::new(
            CommitRecord::new(
                format!("{}-{}-{}", author, total, offset),
                author,
                format!("{}@example.com", author.to_lowercase()),
                WEEK_ONE + offset,
                "x",
            ),
            CommitStats::default(),
            ScoreBreakdown::new(total, 0, 0, 0),
        )
    }

    fn week_bounds() -> (NaiveDateTime, NaiveDateTime) {
        Granularity::Weekly.period_bounds("2024-W01").unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        let expected = [
            (1, Tier::T0),
            (5, Tier::T0),
            (6, Tier::T1),
            (12, Tier::T1),
            (13, Tier::T2),
            (22, Tier::T2),
            (23, Tier::T3),
            (500, Tier::T3),
        ];
        for (rank, tier) in expected {
            assert_eq!(Tier::for_rank(rank), tier, "rank {}", rank);
        }
        assert_eq!(Tier::T0.name(), "Elite");
        assert_eq!(Tier::T3.name(), "Contributing");
    }

    #[test]
    fn test_tiers_over_twenty_three_contributors() {
        let authors: AuthorBuckets = (0..23)
            .map(|i| commit(&format!("author{:02}", i), 100 - i as u32, i64::from(i)))
            .collect();
        let board = build_period_leaderboard(&authors, week_bounds(), &ManualContributions::default());

        assert_eq!(board.len(), 23);
        let tier_of = |rank: usize| board[rank - 1].tier;
        assert_eq!(tier_of(5), Tier::T0);
        assert_eq!(tier_of(6), Tier::T1);
        assert_eq!(tier_of(12), Tier::T1);
        assert_eq!(tier_of(13), Tier::T2);
        assert_eq!(tier_of(22), Tier::T2);
        assert_eq!(tier_of(23), Tier::T3);
        assert_eq!(board[22].tier_name, "Contributing");
        assert!(board.iter().enumerate().all(|(i, s)| s.rank == i + 1));
    }

    #[test]
    fn test_summary_fields() {
        let authors: AuthorBuckets = vec![
            commit("Alice", 60, 0),
            commit("Alice", 20, 10),
            commit("Alice", 45, 20),
        ]
        .into_iter()
        .collect();
        let board = build_period_leaderboard(&authors, week_bounds(), &ManualContributions::default());
        let alice = &board[0];

        assert_eq!(alice.email, "alice@example.com");
        assert_eq!(alice.total_commits, 3);
        assert_eq!(alice.significant_commits, 1);
        assert_eq!(alice.simple_commits, 2);
        assert_eq!(alice.commit_score, 125);
        assert_eq!(alice.avg_score, 41.67);
        assert!((alice.significance_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(alice.total_score, 125);
    }

    #[test]
    fn test_avg_score_half_rounds_to_even() {
        // 329 / 8 = 41.125 exactly
        let authors: AuthorBuckets = (0..8)
            .map(|i| commit("Alice", if i == 7 { 42 } else { 41 }, i64::from(i)))
            .collect();
        let board = build_period_leaderboard(&authors, week_bounds(), &ManualContributions::default());

        assert_eq!(board[0].commit_score, 329);
        assert_eq!(board[0].avg_score, 41.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn test_ties_broken_by_commit_count_then_order() {
        let authors: AuthorBuckets = vec![
            commit("Carol", 50, 0),
            commit("Dave", 25, 1),
            commit("Dave", 25, 2),
            commit("Erin", 50, 3),
        ]
        .into_iter()
        .collect();
        let board = build_period_leaderboard(&authors, week_bounds(), &ManualContributions::default());
        let names: Vec<&str> = board.iter().map(|s| s.name.as_str()).collect();

        // All total 50; Dave has more commits, Carol precedes Erin in the input
        assert_eq!(names, vec!["Dave", "Carol", "Erin"]);
    }

    #[test]
    fn test_manual_score_can_reorder() {
        let authors: AuthorBuckets = vec![commit("Alice", 80, 0), commit("Bob", 70, 1)]
            .into_iter()
            .collect();
        let mut manual = ManualContributions::default();
        manual.insert("Bob", ManualContribution::undated(15, "design review"));
        manual.insert("Alice", ManualContribution::undated(-5, ""));

        let board = build_period_leaderboard(&authors, week_bounds(), &manual);

        assert_eq!(board[0].name, "Bob");
        assert_eq!(board[0].total_score, 85);
        assert_eq!(board[0].additional_contribution_notes, "design review");
        assert_eq!(board[1].total_score, 75);
        assert_eq!(board[1].additional_contribution_score, -5);
    }

    #[test]
    fn test_three_commit_week_with_manual_bonus() {
        let commits = vec![
            commit("A", 60, 0),
            commit("A", 60, 3_600),
            commit("A", 60, 7_200),
        ];
        let mut manual = ManualContributions::default();
        manual.insert("A", ManualContribution::undated(10, ""));

        let leaderboards = build_leaderboards(&aggregate_by_period(&commits), &manual).unwrap();
        let week = leaderboards.period(Granularity::Weekly, "2024-W01").unwrap();
        let a = &week[0];

        assert_eq!(a.total_commits, 3);
        assert_eq!(a.significant_commits, 3);
        assert_eq!(a.commit_score, 180);
        assert_eq!(a.additional_contribution_score, 10);
        assert_eq!(a.total_score, 190);
        assert_eq!(a.rank, 1);
        assert_eq!(a.tier, Tier::T0);

        assert!(leaderboards.period(Granularity::Monthly, "2024-01").is_some());
        assert!(leaderboards.period(Granularity::Quarterly, "2024-Q1").is_some());
    }

    #[test]
    fn test_serialized_summary_shape() {
        let authors: AuthorBuckets = vec![commit("Alice", 60, 0)].into_iter().collect();
        let board = build_period_leaderboard(&authors, week_bounds(), &ManualContributions::default());
        let value = serde_json::to_value(&board[0]).unwrap();

        assert_eq!(value["tier"], "T0");
        assert_eq!(value["tier_name"], "Elite");
        assert_eq!(value["additional_contribution_notes"], "");
        assert_eq!(value["commits"].as_array().unwrap().len(), 1);
    }
}
