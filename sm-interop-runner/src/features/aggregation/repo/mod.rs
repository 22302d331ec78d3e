use crate::shared::error::{RunnerError, RunnerResult};
use sm_interop_core::MatrixOutcome;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub trait ResultsRepository: Send + Sync {
    /// Replace the stored artifact with `outcomes`
    fn save(&self, outcomes: &[MatrixOutcome]) -> RunnerResult<()>;

    /// Human-readable location of the artifact
    fn location(&self) -> String;
}

/// Pretty-printed JSON array on disk
pub struct JsonFileResultsRepository {
    path: PathBuf,
}

impl JsonFileResultsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsRepository for JsonFileResultsRepository {
    fn save(&self, outcomes: &[MatrixOutcome]) -> RunnerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RunnerError::Persist(format!("{}: {e}", parent.display()))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(outcomes)
            .map_err(|e| RunnerError::Persist(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| RunnerError::Persist(format!("{}: {e}", self.path.display())))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryResultsRepository {
    saved: Arc<RwLock<Option<Vec<MatrixOutcome>>>>,
}

impl InMemoryResultsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> RunnerResult<Option<Vec<MatrixOutcome>>> {
        let saved = self
            .saved
            .read()
            .map_err(|_| RunnerError::Persist("results lock poisoned".to_string()))?;
        Ok(saved.clone())
    }
}

impl ResultsRepository for InMemoryResultsRepository {
    fn save(&self, outcomes: &[MatrixOutcome]) -> RunnerResult<()> {
        let mut saved = self
            .saved
            .write()
            .map_err(|_| RunnerError::Persist("results lock poisoned".to_string()))?;
        *saved = Some(outcomes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_interop_core::{Participants, TestFamily};

    fn sample() -> Vec<MatrixOutcome> {
        vec![
            MatrixOutcome::passed(TestFamily::Sm3Hash, Participants::group(["python", "go"])),
            MatrixOutcome::failed(
                TestFamily::Sm2SignVerify,
                Participants::pair("go", "python"),
                "Signature verification failed",
            ),
        ]
    }

    #[test]
    fn test_json_file_is_reparseable_array() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileResultsRepository::new(dir.path().join("test_results.json"));

        repo.save(&sample()).unwrap();

        let text = fs::read_to_string(repo.path()).unwrap();
        let parsed: Vec<MatrixOutcome> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
        assert!(text.starts_with("[\n"));
    }

    #[test]
    fn test_json_file_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/test_results.json");
        let repo = JsonFileResultsRepository::new(&path);

        repo.save(&sample()).unwrap();
        repo.save(&sample()[..1]).unwrap();

        let parsed: Vec<MatrixOutcome> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_json_file_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let repo = JsonFileResultsRepository::new(dir.path());

        let err = repo.save(&sample()).unwrap_err();
        assert!(matches!(err, RunnerError::Persist(_)));
    }

    #[test]
    fn test_in_memory_repository() {
        let repo = InMemoryResultsRepository::new();
        assert!(repo.saved().unwrap().is_none());

        repo.save(&sample()).unwrap();
        assert_eq!(repo.saved().unwrap().unwrap().len(), 2);
        assert_eq!(repo.location(), "memory");
    }
}
