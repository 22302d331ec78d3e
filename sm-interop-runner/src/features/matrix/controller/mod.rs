use crate::features::matrix::service::MatrixService;
use sm_interop_core::{CipherMode, OutcomeCollector};
use tracing::{info, warn};

pub struct MatrixController {
    service: MatrixService,
}

impl MatrixController {
    pub fn new(service: MatrixService) -> Self {
        Self { service }
    }

    /// Run every protocol in order and hand back the collected outcomes.
    pub async fn run_all(&self) -> OutcomeCollector {
        let names = self.service.provider_names();
        if names.len() < 2 {
            warn!(
                providers = ?names,
                "Need at least 2 providers for cross-provider testing; running available tests anyway"
            );
        }
        info!(providers = ?names, "Starting interoperability matrix");

        let mut collector = OutcomeCollector::new();
        self.service.hash_consistency(&mut collector).await;
        self.service
            .sm4_round_trip(CipherMode::Ecb, &mut collector)
            .await;
        self.service
            .sm4_round_trip(CipherMode::Cbc, &mut collector)
            .await;
        self.service.sign_verify(&mut collector).await;
        self.service.sm2_round_trip(&mut collector).await;

        info!(outcomes = collector.len(), "Interoperability matrix complete");
        collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matrix::service::testing::{as_dyn, honest, FakeProvider};
    use sm_interop_core::{CapabilityResult, TestFamily};

    #[tokio::test]
    async fn test_run_all_covers_every_family_in_order() {
        let providers = [honest("python"), honest("javascript"), honest("go")];
        let controller = MatrixController::new(MatrixService::new(as_dyn(&providers)));

        let collector = controller.run_all().await;

        // 1 hash + 4 x 3x3 matrices
        assert_eq!(collector.len(), 1 + 4 * 9);
        assert!(collector.outcomes().iter().all(|o| o.is_passed()));

        let mut families: Vec<TestFamily> = collector.outcomes().iter().map(|o| o.test()).collect();
        families.dedup();
        assert_eq!(
            families,
            vec![
                TestFamily::Sm3Hash,
                TestFamily::Sm4EcbEncryptDecrypt,
                TestFamily::Sm4CbcEncryptDecrypt,
                TestFamily::Sm2SignVerify,
                TestFamily::Sm2EncryptDecrypt,
            ]
        );
    }

    #[tokio::test]
    async fn test_single_provider_still_runs() {
        let controller = MatrixController::new(MatrixService::new(as_dyn(&[honest("php")])));

        let collector = controller.run_all().await;

        assert_eq!(collector.len(), 5);
        assert!(collector.outcomes().iter().all(|o| o.is_passed()));
    }

    #[tokio::test]
    async fn test_dead_provider_does_not_abort_run() {
        let dead = FakeProvider::new("javascript", |_| CapabilityResult::error("timed out"));
        let providers = [honest("python"), dead.clone()];
        let controller = MatrixController::new(MatrixService::new(as_dyn(&providers)));

        let collector = controller.run_all().await;

        // hash: 1 single failure + 1 passed group; four 2x2 matrices
        assert_eq!(collector.len(), 2 + 4 * 4);
        let passed = collector.outcomes().iter().filter(|o| o.is_passed()).count();
        // python -> python in each matrix, plus the hash group
        assert_eq!(passed, 1 + 4);
        assert!(dead.calls() > 0);
    }
}
