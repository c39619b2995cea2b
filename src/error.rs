//! Error types for ryt-batch

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the delegated download engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {message}")]
    Failed {
        program: String,
        status: String,
        message: String,
    },

    #[error("engine binary not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Short, single-line reason suitable for a failure report
    pub fn reason(&self) -> String {
        match self {
            EngineError::Failed { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised while loading or creating the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
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

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that stop a batch run before or after the item pass
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("work list not found: {0}")]
    ListNotFound(PathBuf),

    #[error("failed to read work list {path}: {source}")]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write failure report {path}: {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
