mod cipher;
mod hash;
mod signature;
mod sm2_cipher;

use sm_interop_core::{
    CapabilityOutput, CipherMode, MatrixOutcome, OutcomeCollector, Participants, TestFamily,
};
use sm_interop_providers::CapabilityProvider;
use std::sync::Arc;
use tracing::{info, warn};

pub use cipher::sm4_round_trip;
pub use hash::hash_consistency;
pub use signature::sign_verify;
pub use sm2_cipher::sm2_round_trip;

/// Drives the protocols over a fixed provider set.
///
/// Each protocol appends to the caller's collector and never returns early
/// on a provider failure; every cell of the matrix ends up recorded.
pub struct MatrixService {
    providers: Vec<Arc<dyn CapabilityProvider>>,
}

impl MatrixService {
    pub fn new(providers: Vec<Arc<dyn CapabilityProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn CapabilityProvider>] {
        &self.providers
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub async fn hash_consistency(&self, collector: &mut OutcomeCollector) {
        hash_consistency(&self.providers, collector).await
    }

    pub async fn sm4_round_trip(&self, mode: CipherMode, collector: &mut OutcomeCollector) {
        sm4_round_trip(&self.providers, mode, collector).await
    }

    pub async fn sign_verify(&self, collector: &mut OutcomeCollector) {
        sign_verify(&self.providers, collector).await
    }

    pub async fn sm2_round_trip(&self, collector: &mut OutcomeCollector) {
        sm2_round_trip(&self.providers, collector).await
    }
}

pub(crate) fn record(collector: &mut OutcomeCollector, outcome: MatrixOutcome) {
    match outcome.error() {
        None => info!(
            test = %outcome.test(),
            participants = %outcome.participants(),
            "passed"
        ),
        Some(error) => warn!(
            test = %outcome.test(),
            participants = %outcome.participants(),
            error = %error,
            "failed"
        ),
    }
    collector.record(outcome);
}

/// Record one failed cell per consumer when a row's producing step failed
pub(crate) fn fail_row(
    collector: &mut OutcomeCollector,
    test: TestFamily,
    producer: &str,
    consumers: &[Arc<dyn CapabilityProvider>],
    error: &str,
) {
    for consumer in consumers {
        record(
            collector,
            MatrixOutcome::failed(
                test,
                Participants::pair(producer, consumer.name()),
                error,
            ),
        );
    }
}

pub(crate) fn unexpected_output(expected: &str, output: &CapabilityOutput) -> String {
    format!("Unexpected adapter output, expected {expected}: {output:?}")
}

/// Shortened hex for log lines
pub(crate) fn preview(hex: &str) -> &str {
    hex.get(..16).unwrap_or(hex)
}
