use std::collections::{BTreeMap, HashMap};

use crate::types::ClassifiedCommit;
use crate::utils::periods::Granularity;

/// Commits of one period grouped by author.
///
/// Authors iterate in order of first appearance; each author's commits keep
/// their source order.
#[derive(Debug, Clone, Default)]
pub struct AuthorBuckets {
    entries: Vec<(String, Vec<ClassifiedCommit>)>,
    index: HashMap<String, usize>,
}

impl AuthorBuckets {
    fn push(&mut self, commit: ClassifiedCommit) {
        match self.index.get(commit.author()).copied() {
            Some(idx) => self.entries[idx].1.push(commit),
            None => {
                self.index
                    .insert(commit.author().to_string(), self.entries.len());
                self.entries
                    .push((commit.author().to_string(), vec![commit]));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ClassifiedCommit])> {
        self.entries
            .iter()
            .map(|(author, commits)| (author.as_str(), commits.as_slice()))
    }

    pub fn get(&self, author: &str) -> Option<&[ClassifiedCommit]> {
        self.index
            .get(author)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ClassifiedCommit> for AuthorBuckets {
    fn from_iter<I: IntoIterator<Item = ClassifiedCommit>>(iter: I) -> Self {
        let mut buckets = AuthorBuckets::default();
        for commit in iter {
            buckets.push(commit);
        }
        buckets
    }
}

/// Granularity -> period key -> author -> commits.
#[derive(Debug, Clone, Default)]
pub struct PeriodBuckets {
    buckets: BTreeMap<Granularity, BTreeMap<String, AuthorBuckets>>,
}

impl PeriodBuckets {
    /// Periods of one granularity in ascending key order.
    pub fn periods(&self, granularity: Granularity) -> impl Iterator<Item = (&str, &AuthorBuckets)> {
        self.buckets
            .get(&granularity)
            .into_iter()
            .flat_map(|periods| periods.iter().map(|(key, authors)| (key.as_str(), authors)))
    }

    pub fn get(&self, granularity: Granularity, key: &str) -> Option<&AuthorBuckets> {
        self.buckets.get(&granularity)?.get(key)
    }

    pub fn period_count(&self, granularity: Granularity) -> usize {
        self.buckets.get(&granularity).map_or(0, BTreeMap::len)
    }
}

/// Place every commit into one bucket per granularity.
pub fn aggregate_by_period(commits: &[ClassifiedCommit]) -> PeriodBuckets {
    let mut buckets: BTreeMap<Granularity, BTreeMap<String, AuthorBuckets>> = BTreeMap::new();

    for commit in commits {
        let date = commit.record.date.naive_utc();
        for granularity in Granularity::ALL {
            buckets
                .entry(granularity)
                .or_default()
                .entry(granularity.period_key(date))
                .or_default()
                .push(commit.clone());
        }
    }

    PeriodBuckets { buckets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitRecord, CommitStats, ScoreBreakdown};
    use pretty_assertions::assert_eq;

    // 2024-01-01T12:00:00Z, a Monday
    const JAN_1_2024: i64 = 1_704_110_400;
    const DAY: i64 = 86_400;

    fn commit(hash: &str, author: &str, timestamp: i64) -> ClassifiedCommit {
        ClassifiedCommit::new(
            CommitRecord::new(hash, author, format!("{}@example.com", author), timestamp, "x"),
            CommitStats::default(),
            ScoreBreakdown::new(3, 5, 12, 0),
        )
    }

    #[test]
    fn test_empty_input() {
        let buckets = aggregate_by_period(&[]);
        for granularity in Granularity::ALL {
            assert_eq!(buckets.period_count(granularity), 0);
        }
    }

    #[test]
    fn test_each_commit_in_every_granularity() {
        let commits = vec![
            commit("c1", "alice", JAN_1_2024),
            commit("c2", "bob", JAN_1_2024 + 8 * DAY),
            commit("c3", "alice", JAN_1_2024 + 40 * DAY),
        ];
        let buckets = aggregate_by_period(&commits);

        assert_eq!(buckets.period_count(Granularity::Weekly), 3);
        assert_eq!(buckets.period_count(Granularity::Monthly), 2);
        assert_eq!(buckets.period_count(Granularity::Quarterly), 1);

        let quarter = buckets.get(Granularity::Quarterly, "2024-Q1").unwrap();
        assert_eq!(quarter.len(), 2);
        assert_eq!(quarter.get("alice").unwrap().len(), 2);
        assert_eq!(quarter.get("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_source_order_preserved() {
        // Newest first, as the history source lists them
        let commits = vec![
            commit("c3", "bob", JAN_1_2024 + 3 * DAY),
            commit("c2", "alice", JAN_1_2024 + 2 * DAY),
            commit("c1", "bob", JAN_1_2024 + DAY),
        ];
        let buckets = aggregate_by_period(&commits);
        let week = buckets.get(Granularity::Weekly, "2024-W01").unwrap();

        let authors: Vec<&str> = week.iter().map(|(author, _)| author).collect();
        assert_eq!(authors, vec!["bob", "alice"]);

        let bob: Vec<&str> = week
            .get("bob")
            .unwrap()
            .iter()
            .map(|c| c.record.hash.as_str())
            .collect();
        assert_eq!(bob, vec!["c3", "c1"]);
    }

    #[test]
    fn test_periods_sorted() {
        let commits = vec![
            commit("c1", "alice", JAN_1_2024 + 70 * DAY),
            commit("c2", "alice", JAN_1_2024),
        ];
        let buckets = aggregate_by_period(&commits);
        let keys: Vec<&str> = buckets
            .periods(Granularity::Monthly)
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["2024-01", "2024-03"]);
    }
}
