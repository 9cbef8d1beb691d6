//! Execution report model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::steps::executor::serialize_millis;
use crate::steps::StepResult;

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Every attempted step succeeded.
    AllSucceeded,
    /// At least one attempted step failed.
    PartialFailure,
    /// Nothing was executed.
    DryRun,
}

impl OverallStatus {
    /// Process exit code for this status.
    pub fn exit_code(&self) -> i32 {
        match self {
            OverallStatus::AllSucceeded | OverallStatus::DryRun => 0,
            OverallStatus::PartialFailure => 1,
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverallStatus::AllSucceeded => "all steps succeeded",
            OverallStatus::PartialFailure => "partial failure",
            OverallStatus::DryRun => "dry run",
        };
        write!(f, "{}", s)
    }
}

/// Summary of one pipeline run, derived from its step results.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Step results in execution order.
    pub results: Vec<StepResult>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the whole run.
    #[serde(rename = "total_duration_ms", serialize_with = "serialize_millis")]
    pub total_duration: Duration,

    /// Results with `succeeded == true`.
    pub success_count: usize,

    /// Results with `attempted == true`. Skipped steps are not counted.
    pub total_count: usize,

    /// Overall outcome.
    pub overall_status: OverallStatus,
}

impl ExecutionReport {
    /// Derive a report from collected results.
    pub fn from_results(
        results: Vec<StepResult>,
        started_at: DateTime<Utc>,
        total_duration: Duration,
        dry_run: bool,
    ) -> Self {
        let success_count = results.iter().filter(|r| r.succeeded).count();
        let total_count = results.iter().filter(|r| r.attempted).count();

        let overall_status = if dry_run {
            OverallStatus::DryRun
        } else if success_count == total_count {
            OverallStatus::AllSucceeded
        } else {
            OverallStatus::PartialFailure
        };

        Self {
            results,
            started_at,
            total_duration,
            success_count,
            total_count,
            overall_status,
        }
    }

    /// Attempted steps that failed, in execution order.
    pub fn failed(&self) -> impl Iterator<Item = &StepResult> {
        self.results.iter().filter(|r| r.attempted && !r.succeeded)
    }

    /// Names of steps that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.attempted && !r.succeeded)
            .map(|r| r.name.as_str())
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        self.overall_status.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &str) -> StepResult {
        StepResult::success(name, Utc::now(), Duration::from_secs(1), name.to_string())
    }

    fn failed(name: &str) -> StepResult {
        StepResult::failure(
            name,
            Utc::now(),
            Duration::from_secs(1),
            "exited with code 1".to_string(),
            Some(1),
            name.to_string(),
        )
    }

    #[test]
    fn skipped_steps_are_excluded_from_total() {
        let report = ExecutionReport::from_results(
            vec![ok("a"), StepResult::skipped("b"), ok("c")],
            Utc::now(),
            Duration::from_secs(2),
            false,
        );
        assert_eq!(report.total_count, 2);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.overall_status, OverallStatus::AllSucceeded);
        assert_eq!(report.skipped().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn any_failure_is_partial() {
        let report = ExecutionReport::from_results(
            vec![ok("a"), failed("b")],
            Utc::now(),
            Duration::ZERO,
            false,
        );
        assert_eq!(report.overall_status, OverallStatus::PartialFailure);
        assert_eq!(report.exit_code(), 1);
        let failed: Vec<_> = report.failed().map(|r| r.name.as_str()).collect();
        assert_eq!(failed, ["b"]);
    }

    #[test]
    fn dry_run_status_wins() {
        let report = ExecutionReport::from_results(
            vec![StepResult::simulated("a", "a".to_string())],
            Utc::now(),
            Duration::ZERO,
            true,
        );
        assert_eq!(report.overall_status, OverallStatus::DryRun);
        assert_eq!(report.total_count, 0);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.failed().count(), 0);
    }

    #[test]
    fn all_skipped_counts_as_success() {
        let report = ExecutionReport::from_results(
            vec![StepResult::skipped("a")],
            Utc::now(),
            Duration::ZERO,
            false,
        );
        assert_eq!(report.overall_status, OverallStatus::AllSucceeded);
    }

    #[test]
    fn serializes_status_in_snake_case() {
        let report = ExecutionReport::from_results(vec![], Utc::now(), Duration::ZERO, false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall_status"], "all_succeeded");
        assert_eq!(json["total_duration_ms"], 0);
    }
}
