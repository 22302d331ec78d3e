use crate::features::aggregation::service::{AggregationService, RunSummary};
use sm_interop_core::MatrixOutcome;
use tracing::{error, info};

/// Everything known about a finished run
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub outcomes: Vec<MatrixOutcome>,
    /// Where the artifact was written; `None` if persisting failed
    pub artifact: Option<String>,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.summary.all_passed()
    }
}

pub struct AggregationController {
    service: AggregationService,
}

impl AggregationController {
    pub fn new(service: AggregationService) -> Self {
        Self { service }
    }

    /// Summarize and persist. A persistence failure is logged and leaves the
    /// verdict unchanged.
    pub fn finalize(&self, outcomes: Vec<MatrixOutcome>) -> RunReport {
        let summary = self.service.summarize(&outcomes);
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "Run summary"
        );

        let artifact = match self.service.persist(&outcomes) {
            Ok(()) => {
                let location = self.service.artifact_location();
                info!(path = %location, "Detailed results saved");
                Some(location)
            }
            Err(e) => {
                error!(error = %e, "Failed to save detailed results");
                None
            }
        };

        RunReport {
            summary,
            outcomes,
            artifact,
        }
    }
}
