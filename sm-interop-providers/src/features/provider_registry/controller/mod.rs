use crate::features::invocation_gateway::controller::InvocationGatewayController;
use crate::features::provider_registry::repo::FsArtifactProbe;
use crate::features::provider_registry::service::ProviderRegistryService;
use crate::{AdapterProvider, CapabilityProvider, ProviderSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Result of probing the wrappers directory
pub enum Discovery {
    Found(ProviderSet),
    Empty,
}

impl Discovery {
    pub fn providers(&self) -> &[Arc<dyn CapabilityProvider>] {
        match self {
            Discovery::Found(providers) => providers,
            Discovery::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Discovery::Empty)
    }
}

pub struct ProviderRegistryController {
    service: ProviderRegistryService,
    gateway: Arc<InvocationGatewayController>,
}

impl ProviderRegistryController {
    pub fn new(service: ProviderRegistryService, gateway: Arc<InvocationGatewayController>) -> Self {
        Self { service, gateway }
    }

    /// Filesystem-backed registry whose providers run as real subprocesses
    pub fn for_filesystem(timeout: Duration) -> Self {
        Self::new(
            ProviderRegistryService::new(Arc::new(FsArtifactProbe::new())),
            Arc::new(InvocationGatewayController::with_timeout(timeout)),
        )
    }

    pub fn discover(&self, wrappers_dir: &Path) -> Discovery {
        let report = self.service.discover(wrappers_dir);

        for skipped in &report.skipped {
            debug!(
                provider = skipped.kind.name(),
                artifact = %skipped.artifact.display(),
                state = ?skipped.state,
                "Adapter not registered"
            );
        }

        let providers: ProviderSet = report
            .providers
            .into_iter()
            .map(|descriptor| {
                Arc::new(AdapterProvider::new(descriptor, self.gateway.clone()))
                    as Arc<dyn CapabilityProvider>
            })
            .collect();

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        info!(
            wrappers_dir = %wrappers_dir.display(),
            count = providers.len(),
            providers = ?names,
            "Provider discovery complete"
        );

        if providers.is_empty() {
            Discovery::Empty
        } else {
            Discovery::Found(providers)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let controller = ProviderRegistryController::for_filesystem(Duration::from_secs(1));

        let discovery = controller.discover(dir.path());
        assert!(discovery.is_empty());
        assert!(discovery.providers().is_empty());
    }

    #[test]
    fn test_discover_python_and_javascript_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("py")).unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::create_dir_all(dir.path().join("php")).unwrap();
        fs::write(dir.path().join("py/wrapper.py"), "print('{}')").unwrap();
        fs::write(dir.path().join("js/wrapper.js"), "console.log('{}')").unwrap();

        let controller = ProviderRegistryController::for_filesystem(Duration::from_secs(1));
        let discovery = controller.discover(dir.path());

        let names: Vec<&str> = discovery.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["python", "javascript"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_native_adapter_without_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("go")).unwrap();
        let binary = dir.path().join("go/wrapper");
        fs::write(&binary, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o644)).unwrap();

        let controller = ProviderRegistryController::for_filesystem(Duration::from_secs(1));
        assert!(controller.discover(dir.path()).is_empty());

        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        let discovery = controller.discover(dir.path());
        assert_eq!(discovery.providers().len(), 1);
        assert_eq!(discovery.providers()[0].name(), "go");
    }
}
