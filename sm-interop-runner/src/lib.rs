pub mod features;
pub mod shared;

use chrono::Utc;
use features::aggregation::controller::AggregationController;
use features::aggregation::repo::JsonFileResultsRepository;
use features::aggregation::service::AggregationService;
use features::matrix::controller::MatrixController;
use features::matrix::service::MatrixService;
use sm_interop_providers::{Discovery, ProviderRegistryController};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub use features::aggregation::controller::RunReport;
pub use shared::config::RunnerConfig;
pub use shared::error::{RunnerError, RunnerResult};

/// One full interoperability run: discover adapters, drive the matrix,
/// summarize and persist.
///
/// Returns `RunnerError::NoProviders` when no adapter is present; nothing is
/// written in that case.
pub async fn run(config: &RunnerConfig) -> RunnerResult<RunReport> {
    let run_id = Uuid::new_v4();
    let span = info_span!("interop_run", %run_id);

    async move {
        let started_at = Utc::now();
        info!(
            project_root = %config.project_root.display(),
            timeout_secs = config.invocation_timeout.as_secs(),
            %started_at,
            "Starting SM interoperability run"
        );

        let wrappers_dir = config.wrappers_dir();
        let registry = ProviderRegistryController::for_filesystem(config.invocation_timeout);
        let providers = match registry.discover(&wrappers_dir) {
            Discovery::Found(providers) => providers,
            Discovery::Empty => {
                error!(wrappers_dir = %wrappers_dir.display(), "No providers detected");
                return Err(RunnerError::NoProviders(wrappers_dir));
            }
        };

        let matrix = MatrixController::new(MatrixService::new(providers));
        let collector = matrix.run_all().await;

        let aggregation = AggregationController::new(AggregationService::new(Arc::new(
            JsonFileResultsRepository::new(config.results_path()),
        )));
        let report = aggregation.finalize(collector.into_outcomes());

        info!(
            elapsed_ms = (Utc::now() - started_at).num_milliseconds(),
            all_passed = report.all_passed(),
            "Run finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
