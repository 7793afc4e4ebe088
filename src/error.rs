//! # Error Types
//!
//! Typed errors for each collaborator boundary. Only [`HistoryError`] is fatal to
//! a run; the rest are converted to degraded results where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// The commit history could not be read.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
    #[error("history worker failed: {0}")]
    Worker(String),
}

/// The impact scoring service did not produce a usable estimate.
#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("impact service request failed: {0}")]
    Transport(String),
    #[error("impact service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("impact service reply could not be decoded: {0}")]
    Decode(#[from] std::io::Error),
    #[error("impact service reply contained no score: {0:?}")]
    NoScore(String),
}

/// The curated contribution dataset could not be loaded.
#[derive(Debug, Error)]
pub enum ContributionsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed contribution dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid contribution date {0:?}")]
    InvalidDate(String),
}

/// A period key does not match its granularity's format.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed {granularity} period key {key:?}")]
pub struct PeriodError {
    pub key: String,
    pub granularity: &'static str,
}

/// The configuration file exists but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
