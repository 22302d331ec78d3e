use crate::shared::error::{RunnerError, RunnerResult};
use sm_interop_providers::DEFAULT_INVOCATION_TIMEOUT;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const ROOT_ENV: &str = "SM_INTEROP_ROOT";
pub const TIMEOUT_ENV: &str = "SM_INTEROP_TIMEOUT_SECS";

pub const WRAPPERS_DIR: &str = "wrappers";
pub const RESULTS_FILE: &str = "test_results.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub project_root: PathBuf,
    pub invocation_timeout: Duration,
}

impl RunnerConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            invocation_timeout: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    pub fn from_env() -> RunnerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> RunnerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = match lookup(ROOT_ENV) {
            Some(root) if root.trim().is_empty() => {
                return Err(RunnerError::Config(format!("{ROOT_ENV} is set but empty")));
            }
            Some(root) => PathBuf::from(root),
            None => default_project_root()?,
        };

        let invocation_timeout = match lookup(TIMEOUT_ENV) {
            None => DEFAULT_INVOCATION_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        value = %raw,
                        default_secs = DEFAULT_INVOCATION_TIMEOUT.as_secs(),
                        "Invalid {TIMEOUT_ENV}, using default"
                    );
                    DEFAULT_INVOCATION_TIMEOUT
                }
            },
        };

        Ok(Self {
            project_root,
            invocation_timeout,
        })
    }

    pub fn wrappers_dir(&self) -> PathBuf {
        self.project_root.join(WRAPPERS_DIR)
    }

    pub fn results_path(&self) -> PathBuf {
        self.project_root.join(RESULTS_FILE)
    }
}

/// The workspace root: parent of this crate's manifest directory
fn default_project_root() -> RunnerResult<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            RunnerError::Config(format!(
                "cannot derive project root; set {ROOT_ENV} explicitly"
            ))
        })
}
