use std::path::PathBuf;
use thiserror::Error;

/// Runner specific errors
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No providers found under {}", .0.display())]
    NoProviders(PathBuf),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to persist results: {0}")]
    Persist(String),
}

pub type RunnerResult<T> = std::result::Result<T, RunnerError>;
