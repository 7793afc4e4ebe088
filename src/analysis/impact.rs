//! Impact estimation
//!
//! An [`ImpactEstimator`] rates how significant a commit is on a 0-25 scale.
//! One estimator is chosen at startup: the remote scoring service when a
//! credential is available, otherwise the local line-count heuristic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::config::ImpactSettings;
use crate::error::ImpactError;
use crate::types::{CommitRecord, CommitStats};

/// Upper bound of an impact estimate.
pub const IMPACT_MAX: u32 = 25;

/// Diff characters included in the remote prompt.
const PROMPT_DIFF_CHARS: usize = 1000;

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Commit data handed to an estimator.
#[derive(Debug, Clone, Copy)]
pub struct ImpactRequest<'a> {
    pub message: &'a str,
    pub files_changed: usize,
    pub total_lines: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub diff_excerpt: &'a str,
}

impl<'a> ImpactRequest<'a> {
    pub fn new(record: &'a CommitRecord, stats: &'a CommitStats) -> Self {
        Self {
            message: &record.message,
            files_changed: stats.files_changed,
            total_lines: stats.total_lines,
            insertions: stats.insertions,
            deletions: stats.deletions,
            diff_excerpt: &stats.diff,
        }
    }
}

pub trait ImpactEstimator: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Raw estimate; callers clamp it to `[0, IMPACT_MAX]`.
    fn estimate(&self, request: &ImpactRequest<'_>) -> Result<i64, ImpactError>;
}

/// One point per ten changed lines, capped at [`IMPACT_MAX`].
pub fn heuristic_score(total_lines: usize) -> u32 {
    (total_lines / 10).min(IMPACT_MAX as usize) as u32
}

/// Local, deterministic estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl ImpactEstimator for HeuristicEstimator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn estimate(&self, request: &ImpactRequest<'_>) -> Result<i64, ImpactError> {
        Ok(heuristic_score(request.total_lines) as i64)
    }
}

/// Estimator backed by a remote messages-style language model endpoint.
pub struct RemoteEstimator {
    agent: ureq::Agent,
    settings: ImpactSettings,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl RemoteEstimator {
    pub fn new(settings: ImpactSettings, api_key: String) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            settings,
            api_key,
        }
    }
}

impl ImpactEstimator for RemoteEstimator {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn estimate(&self, request: &ImpactRequest<'_>) -> Result<i64, ImpactError> {
        let body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": [{ "role": "user", "content": build_prompt(request) }],
        });

        let response = self
            .agent
            .post(&self.settings.endpoint)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", &self.settings.anthropic_version)
            .set("content-type", "application/json")
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => ImpactError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(transport) => ImpactError::Transport(transport.to_string()),
            })?;

        let reply: MessagesResponse = response.into_json()?;
        let text = reply
            .content
            .into_iter()
            .find_map(|block| block.text)
            .unwrap_or_default();
        parse_score(&text)
    }
}

/// First run of digits in a reply.
pub fn parse_score(text: &str) -> Result<i64, ImpactError> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .ok_or_else(|| ImpactError::NoScore(text.trim().to_string()))
}

fn build_prompt(request: &ImpactRequest<'_>) -> String {
    let diff_preview: String = request.diff_excerpt.chars().take(PROMPT_DIFF_CHARS).collect();
    format!(
        "Analyze this git commit and rate its significance from 0-25 points.\n\
         \n\
         Commit message: {message}\n\
         Files changed: {files}\n\
         Lines changed: {lines} ({ins}+, {del}-)\n\
         \n\
         Consider:\n\
         - Impact on architecture/design (high=20-25, medium=10-19, low=0-9)\n\
         - Bug severity if it's a fix\n\
         - Feature complexity\n\
         - Code quality improvements\n\
         \n\
         Diff preview:\n\
         {diff}\n\
         \n\
         Respond with ONLY a number from 0-25.",
        message = request.message,
        files = request.files_changed,
        lines = request.total_lines,
        ins = request.insertions,
        del = request.deletions,
        diff = diff_preview,
    )
}

/// Pick the estimator for this run.
pub fn select_estimator(
    settings: &ImpactSettings,
    api_key: Option<String>,
) -> Arc<dyn ImpactEstimator> {
    match api_key {
        Some(key) => {
            info!(model = %settings.model, "using remote impact scoring");
            Arc::new(RemoteEstimator::new(settings.clone(), key))
        }
        None => {
            info!("no API key configured, using heuristic impact scoring");
            Arc::new(HeuristicEstimator)
        }
    }
}
