use crate::features::invocation_gateway::repo::TokioProcessRunner;
use crate::features::invocation_gateway::service::{FailureKind, InvocationGatewayService};
use crate::ProviderDescriptor;
use sm_interop_core::{CapabilityRequest, CapabilityResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct InvocationGatewayController {
    service: InvocationGatewayService,
}

impl InvocationGatewayController {
    pub fn new(service: InvocationGatewayService) -> Self {
        Self { service }
    }

    /// Gateway backed by real subprocesses bounded by `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(InvocationGatewayService::new(Arc::new(
            TokioProcessRunner::new(timeout),
        )))
    }

    pub async fn invoke(
        &self,
        descriptor: &ProviderDescriptor,
        request: &CapabilityRequest,
    ) -> CapabilityResult {
        let started = Instant::now();
        let invocation = self.service.invoke(descriptor, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match (&invocation.result, invocation.failure) {
            (CapabilityResult::Error { message }, Some(FailureKind::Transport)) => warn!(
                provider = descriptor.name(),
                capability = %request.capability(),
                elapsed_ms,
                error = %message,
                "Adapter invocation failed"
            ),
            (CapabilityResult::Error { message }, _) => debug!(
                provider = descriptor.name(),
                capability = %request.capability(),
                elapsed_ms,
                error = %message,
                "Adapter reported an error"
            ),
            (CapabilityResult::Success(_), _) => debug!(
                provider = descriptor.name(),
                capability = %request.capability(),
                elapsed_ms,
                "Adapter invocation succeeded"
            ),
        }

        invocation.result
    }
}
