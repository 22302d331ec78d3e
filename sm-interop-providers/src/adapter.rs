use crate::features::invocation_gateway::controller::InvocationGatewayController;
use crate::{CapabilityProvider, ProviderDescriptor, ProviderMetadata};
use async_trait::async_trait;
use sm_interop_core::{CapabilityRequest, CapabilityResult};
use std::sync::Arc;

/// A language adapter reached through the invocation gateway
pub struct AdapterProvider {
    metadata: ProviderMetadata,
    descriptor: ProviderDescriptor,
    gateway: Arc<InvocationGatewayController>,
}

impl AdapterProvider {
    pub fn new(descriptor: ProviderDescriptor, gateway: Arc<InvocationGatewayController>) -> Self {
        Self {
            metadata: ProviderMetadata {
                provider_id: descriptor.name().to_string(),
                kind: descriptor.kind,
                artifact: descriptor.artifact.clone(),
            },
            descriptor,
            gateway,
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl CapabilityProvider for AdapterProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn invoke(&self, request: &CapabilityRequest) -> CapabilityResult {
        self.gateway.invoke(&self.descriptor, request).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ProviderKind;
    use sm_interop_core::CapabilityOutput;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn write_adapter(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("wrapper");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_adapter_provider_round_trips_through_process() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_adapter(
            dir.path(),
            r#"echo '{"status":"success","output":"66C7F0F462EEEDD9D1F2D46BDC10E4E24167C4875CF2F7A2297DA02B8F4BA8E0"}'"#,
        );
        let provider = AdapterProvider::new(
            ProviderDescriptor::for_artifact(ProviderKind::Go, &artifact),
            Arc::new(InvocationGatewayController::with_timeout(Duration::from_secs(5))),
        );

        assert_eq!(provider.name(), "go");
        let result = provider
            .invoke(&CapabilityRequest::sm3_hash("abc"))
            .await;
        assert!(matches!(
            result,
            CapabilityResult::Success(CapabilityOutput::Digest(_))
        ));
    }

    #[tokio::test]
    async fn test_adapter_provider_receives_cli_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_adapter(
            dir.path(),
            r#"if [ "$1 $2 $3" = "sm4 decrypt --input" ]; then
  echo '{"status":"success","output":"ok"}'
else
  echo '{"status":"error","message":"unexpected arguments"}'
fi"#,
        );
        let provider = AdapterProvider::new(
            ProviderDescriptor::for_artifact(ProviderKind::Go, &artifact),
            Arc::new(InvocationGatewayController::with_timeout(Duration::from_secs(5))),
        );

        let request = CapabilityRequest::sm4_decrypt(
            "00ff",
            "0123456789abcdef0123456789abcdef",
            sm_interop_core::CipherMode::Ecb,
            None,
        );
        assert_eq!(
            provider.invoke(&request).await,
            CapabilityResult::Success(CapabilityOutput::Plaintext("ok".to_string()))
        );
    }
}
