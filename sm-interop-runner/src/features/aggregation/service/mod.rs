use crate::features::aggregation::repo::ResultsRepository;
use crate::shared::error::RunnerResult;
use serde::Serialize;
use sm_interop_core::{MatrixOutcome, TestFamily};
use std::fmt::Write;
use std::sync::Arc;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureLine {
    pub test: TestFamily,
    pub participants: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<FailureLine>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[MatrixOutcome]) -> Self {
        let failures: Vec<FailureLine> = outcomes
            .iter()
            .filter(|o| !o.is_passed())
            .map(|o| FailureLine {
                test: o.test(),
                participants: o.participants().to_string(),
                error: o.error().unwrap_or("Unknown error").to_string(),
            })
            .collect();

        Self {
            total: outcomes.len(),
            passed: outcomes.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Final tally and failure digest shown to the operator
    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "TEST SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total tests: {}", self.total);
        let _ = writeln!(out, "Passed: {}", self.passed);
        let _ = writeln!(out, "Failed: {}", self.failed);

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\nFailed tests:");
            for failure in &self.failures {
                let _ = writeln!(
                    out,
                    "  - {} ({}): {}",
                    failure.test, failure.participants, failure.error
                );
            }
        }
        out
    }
}

pub struct AggregationService {
    repo: Arc<dyn ResultsRepository>,
}

impl AggregationService {
    pub fn new(repo: Arc<dyn ResultsRepository>) -> Self {
        Self { repo }
    }

    pub fn summarize(&self, outcomes: &[MatrixOutcome]) -> RunSummary {
        RunSummary::from_outcomes(outcomes)
    }

    pub fn persist(&self, outcomes: &[MatrixOutcome]) -> RunnerResult<()> {
        self.repo.save(outcomes)
    }

    pub fn artifact_location(&self) -> String {
        self.repo.location()
    }
}
