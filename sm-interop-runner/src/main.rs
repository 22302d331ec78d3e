use sm_interop_runner::{RunnerConfig, RunnerError};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("sm_interop_runner=info,sm_interop_providers=info,info")
        }))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RunnerConfig::from_env()?;

    println!("SM Cross-Implementation Test Runner");
    println!("Project root: {}", config.project_root.display());

    match sm_interop_runner::run(&config).await {
        Ok(report) => {
            println!("\n{}", report.summary.render());
            if let Some(artifact) = &report.artifact {
                println!("Detailed results saved to: {artifact}");
            }
            Ok(if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(RunnerError::NoProviders(dir)) => {
            eprintln!("Error: No providers detected under {}", dir.display());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
