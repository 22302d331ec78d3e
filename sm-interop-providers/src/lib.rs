pub mod adapter;
pub mod features;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sm_interop_core::{CapabilityRequest, CapabilityResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use adapter::AdapterProvider;
pub use features::invocation_gateway::controller::InvocationGatewayController;
pub use features::invocation_gateway::repo::DEFAULT_INVOCATION_TIMEOUT;
pub use features::provider_registry::controller::{Discovery, ProviderRegistryController};

/// A participating implementation, addressed through one uniform interface.
///
/// Implementations must never panic or return early on transport failures:
/// every failure mode is folded into `CapabilityResult::Error`.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn metadata(&self) -> &ProviderMetadata;

    async fn invoke(&self, request: &CapabilityRequest) -> CapabilityResult;

    fn name(&self) -> &str {
        &self.metadata().provider_id
    }
}

/// Ordered set of discovered providers
pub type ProviderSet = Vec<Arc<dyn CapabilityProvider>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub provider_id: String,
    pub kind: ProviderKind,
    pub artifact: PathBuf,
}

/// How an adapter artifact is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    Interpreter(&'static str),
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Python,
    JavaScript,
    Php,
    Go,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Python,
        ProviderKind::JavaScript,
        ProviderKind::Php,
        ProviderKind::Go,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Python => "python",
            ProviderKind::JavaScript => "javascript",
            ProviderKind::Php => "php",
            ProviderKind::Go => "go",
        }
    }

    /// Adapter location relative to the wrappers directory
    pub fn artifact_path(&self) -> &'static str {
        match self {
            ProviderKind::Python => "py/wrapper.py",
            ProviderKind::JavaScript => "js/wrapper.js",
            ProviderKind::Php => "php/wrapper.php",
            ProviderKind::Go => "go/wrapper",
        }
    }

    pub fn launcher(&self) -> Launcher {
        match self {
            ProviderKind::Python => Launcher::Interpreter("python3"),
            ProviderKind::JavaScript => Launcher::Interpreter("node"),
            ProviderKind::Php => Launcher::Interpreter("php"),
            ProviderKind::Go => Launcher::Native,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to launch one adapter. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub artifact: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ProviderDescriptor {
    pub fn for_artifact(kind: ProviderKind, artifact: &Path) -> Self {
        let (program, args) = match kind.launcher() {
            Launcher::Interpreter(interpreter) => (
                interpreter.to_string(),
                vec![artifact.display().to_string()],
            ),
            Launcher::Native => (artifact.display().to_string(), Vec::new()),
        };
        let working_dir = artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            kind,
            artifact: artifact.to_path_buf(),
            program,
            args,
            working_dir,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
