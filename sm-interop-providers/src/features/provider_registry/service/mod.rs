use crate::features::provider_registry::repo::{ArtifactProbe, ArtifactState};
use crate::{Launcher, ProviderDescriptor, ProviderKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A candidate adapter that was not registered, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub kind: ProviderKind,
    pub artifact: PathBuf,
    pub state: ArtifactState,
}

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub providers: Vec<ProviderDescriptor>,
    pub skipped: Vec<SkippedCandidate>,
}

pub struct ProviderRegistryService {
    probe: Arc<dyn ArtifactProbe>,
}

impl ProviderRegistryService {
    pub fn new(probe: Arc<dyn ArtifactProbe>) -> Self {
        Self { probe }
    }

    /// Probe every known adapter in fixed order: python, javascript, php, go.
    pub fn discover(&self, wrappers_dir: &Path) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        for kind in ProviderKind::ALL {
            let artifact = wrappers_dir.join(kind.artifact_path());
            let needs_exec = kind.launcher() == Launcher::Native;

            match self.probe.probe(&artifact, needs_exec) {
                ArtifactState::Ready => report
                    .providers
                    .push(ProviderDescriptor::for_artifact(kind, &artifact)),
                state => report.skipped.push(SkippedCandidate {
                    kind,
                    artifact,
                    state,
                }),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StubProbe {
        states: HashMap<PathBuf, ArtifactState>,
    }

    impl StubProbe {
        fn with(entries: &[(&str, ArtifactState)]) -> Arc<Self> {
            Arc::new(Self {
                states: entries
                    .iter()
                    .map(|(path, state)| (PathBuf::from(path), *state))
                    .collect(),
            })
        }
    }

    impl ArtifactProbe for StubProbe {
        fn probe(&self, path: &Path, _needs_exec: bool) -> ArtifactState {
            self.states
                .get(path)
                .copied()
                .unwrap_or(ArtifactState::Missing)
        }
    }

    #[test]
    fn test_discover_keeps_fixed_order() {
        let service = ProviderRegistryService::new(StubProbe::with(&[
            ("/w/go/wrapper", ArtifactState::Ready),
            ("/w/py/wrapper.py", ArtifactState::Ready),
            ("/w/js/wrapper.js", ArtifactState::Ready),
        ]));

        let report = service.discover(Path::new("/w"));
        let names: Vec<_> = report.providers.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["python", "javascript", "go"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].kind, ProviderKind::Php);
    }

    #[test]
    fn test_discover_records_non_executable_native_adapter() {
        let service = ProviderRegistryService::new(StubProbe::with(&[(
            "/w/go/wrapper",
            ArtifactState::NotExecutable,
        )]));

        let report = service.discover(Path::new("/w"));
        assert!(report.providers.is_empty());
        let go = report
            .skipped
            .iter()
            .find(|s| s.kind == ProviderKind::Go)
            .unwrap();
        assert_eq!(go.state, ArtifactState::NotExecutable);
    }

    #[test]
    fn test_discover_nothing_present() {
        let service = ProviderRegistryService::new(StubProbe::with(&[]));
        let report = service.discover(Path::new("/w"));
        assert!(report.providers.is_empty());
        assert_eq!(report.skipped.len(), ProviderKind::ALL.len());
    }
}
