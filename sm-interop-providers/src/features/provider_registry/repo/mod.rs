use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Missing,
    /// Present but lacking the execute bit; only relevant for native adapters
    NotExecutable,
    Ready,
}

pub trait ArtifactProbe: Send + Sync {
    fn probe(&self, path: &Path, needs_exec: bool) -> ArtifactState;
}

/// Checks adapter artifacts on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactProbe;

impl FsArtifactProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactProbe for FsArtifactProbe {
    fn probe(&self, path: &Path, needs_exec: bool) -> ArtifactState {
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return ArtifactState::Missing,
        };

        if needs_exec && !is_executable(&metadata) {
            return ArtifactState::NotExecutable;
        }
        ArtifactState::Ready
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FsArtifactProbe::new();
        assert_eq!(
            probe.probe(&dir.path().join("wrapper.py"), false),
            ArtifactState::Missing
        );
    }

    #[test]
    fn test_probe_directory_is_not_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FsArtifactProbe::new();
        assert_eq!(probe.probe(dir.path(), false), ArtifactState::Missing);
    }

    #[test]
    fn test_probe_script_is_ready_without_exec_bit() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("wrapper.js");
        fs::write(&script, "console.log('{}')").unwrap();

        assert_eq!(
            FsArtifactProbe::new().probe(&script, false),
            ArtifactState::Ready
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_native_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("wrapper");
        fs::write(&binary, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o644)).unwrap();

        let probe = FsArtifactProbe::new();
        assert_eq!(probe.probe(&binary, true), ArtifactState::NotExecutable);

        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(probe.probe(&binary, true), ArtifactState::Ready);
    }
}
