//! # Manual Contributions
//!
//! Curated, non-commit score adjustments per author. The dataset accepts two
//! per-author shapes:
//!
//! ```json
//! { "contributors": {
//!     "Alice": { "contributions": [
//!         { "score": 20, "notes": "release lead", "start_date": "2024-02-01", "end_date": "2024-02-29" }
//!     ] },
//!     "Bob": { "score": 5, "notes": "triage" }
//! } }
//! ```
//!
//! The second (legacy) shape is normalized at load time into a single undated
//! contribution. Nothing outside this module sees the raw shapes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ContributionsError;

/// Format used when writing dates back out.
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One curated score entry. Bounds are inclusive; `None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualContribution {
    pub score: i64,
    pub notes: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl ManualContribution {
    pub fn undated(score: i64, notes: impl Into<String>) -> Self {
        Self {
            score,
            notes: notes.into(),
            start: None,
            end: None,
        }
    }

    /// Whether this entry overlaps the inclusive period `[period_start, period_end]`.
    pub fn applies_to(&self, period_start: NaiveDateTime, period_end: NaiveDateTime) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (None, Some(end)) => end >= period_start,
            (Some(start), None) => start <= period_end,
            (Some(start), Some(end)) => start <= period_end && end >= period_start,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Dataset {
    #[serde(default)]
    contributors: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContributorEntry {
    Modern {
        contributions: Vec<ContributionEntry>,
    },
    Legacy {
        score: i64,
        #[serde(default)]
        notes: Option<String>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
struct ContributionEntry {
    #[serde(default)]
    score: i64,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl ContributionEntry {
    fn resolve(self) -> Result<ManualContribution, ContributionsError> {
        Ok(ManualContribution {
            score: self.score,
            notes: self.notes.unwrap_or_default(),
            start: parse_optional_date(self.start_date.as_deref(), Bound::Start)?,
            end: parse_optional_date(self.end_date.as_deref(), Bound::End)?,
        })
    }
}

impl From<&ManualContribution> for ContributionEntry {
    fn from(contribution: &ManualContribution) -> Self {
        Self {
            score: contribution.score,
            notes: Some(contribution.notes.clone()),
            start_date: contribution
                .start
                .map(|d| d.format(EXPORT_DATE_FORMAT).to_string()),
            end_date: contribution
                .end
                .map(|d| d.format(EXPORT_DATE_FORMAT).to_string()),
        }
    }
}

#[derive(Serialize)]
struct ExportDataset {
    contributors: BTreeMap<String, ExportContributor>,
}

#[derive(Serialize)]
struct ExportContributor {
    contributions: Vec<ContributionEntry>,
}

fn parse_optional_date(
    value: Option<&str>,
    bound: Bound,
) -> Result<Option<NaiveDateTime>, ContributionsError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value, bound).map(Some),
    }
}

/// Date-only values cover the whole day: a start is midnight, an end is 23:59:59.
fn parse_date(value: &str, bound: Bound) -> Result<NaiveDateTime, ContributionsError> {
    let invalid = || ContributionsError::InvalidDate(value.to_string());

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let datetime = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_opt(23, 59, 59),
        };
        return datetime.ok_or_else(invalid);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(invalid)
}

/// Resolve either entry shape into contributions, dropping entries with bad dates.
fn normalize(author: &str, entry: ContributorEntry) -> Vec<ManualContribution> {
    match entry {
        ContributorEntry::Legacy { score, notes } => {
            vec![ManualContribution::undated(score, notes.unwrap_or_default())]
        }
        ContributorEntry::Modern { contributions } => contributions
            .into_iter()
            .filter_map(|entry| match entry.resolve() {
                Ok(contribution) => Some(contribution),
                Err(e) => {
                    warn!(author, error = %e, "dropping manual contribution");
                    None
                }
            })
            .collect(),
    }
}

/// The curated dataset, normalized and read-only.
#[derive(Debug, Clone, Default)]
pub struct ManualContributions {
    by_author: BTreeMap<String, Vec<ManualContribution>>,
}

impl ManualContributions {
    pub fn load(path: &Path) -> Result<Self, ContributionsError> {
        let content = std::fs::read_to_string(path).map_err(|source| ContributionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load the dataset, treating a missing or malformed file as empty.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "manual contribution dataset not found, continuing without it");
            return Self::default();
        }
        match Self::load(path) {
            Ok(contributions) => {
                info!(
                    path = %path.display(),
                    authors = contributions.author_count(),
                    "loaded manual contributions"
                );
                contributions
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load manual contributions, continuing without them");
                Self::default()
            }
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ContributionsError> {
        let dataset: Dataset = serde_json::from_str(content)?;
        let mut by_author = BTreeMap::new();

        for (author, value) in dataset.contributors {
            match serde_json::from_value::<ContributorEntry>(value) {
                Ok(entry) => {
                    let contributions = normalize(&author, entry);
                    by_author.insert(author, contributions);
                }
                Err(e) => warn!(author = %author, error = %e, "skipping unrecognised contributor entry"),
            }
        }

        Ok(Self { by_author })
    }

    pub fn insert(&mut self, author: impl Into<String>, contribution: ManualContribution) {
        self.by_author
            .entry(author.into())
            .or_default()
            .push(contribution);
    }

    pub fn for_author(&self, author: &str) -> &[ManualContribution] {
        self.by_author
            .get(author)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn author_count(&self) -> usize {
        self.by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }

    /// Sum of the author's entries overlapping the period, with their non-empty
    /// notes joined by `"; "` in entry order.
    pub fn merge_score(
        &self,
        author: &str,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> (i64, String) {
        let applying: Vec<&ManualContribution> = self
            .for_author(author)
            .iter()
            .filter(|c| c.applies_to(period_start, period_end))
            .collect();

        let score = applying.iter().map(|c| c.score).sum();
        let notes = applying
            .iter()
            .filter(|c| !c.notes.is_empty())
            .map(|c| c.notes.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        (score, notes)
    }

    /// The dataset in the dated-list shape.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let export = ExportDataset {
            contributors: self
                .by_author
                .iter()
                .map(|(author, contributions)| {
                    let contributor = ExportContributor {
                        contributions: contributions.iter().map(ContributionEntry::from).collect(),
                    };
                    (author.clone(), contributor)
                })
                .collect(),
        };
        serde_json::to_string_pretty(&export)
    }

    pub fn write_normalized(&self, path: &Path) -> Result<(), ContributionsError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| ContributionsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
