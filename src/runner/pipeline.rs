//! Sequential pipeline execution.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{ClusterupError, Result};
use crate::report::ExecutionReport;
use crate::steps::{SkipReason, StepDefinition, StepResult, StepRunner};

/// Progress events emitted during pipeline execution.
#[derive(Debug)]
pub enum PipelineProgress<'a> {
    /// A step is about to start.
    StepStarting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished (successfully, simulated, or failed).
    StepFinished { result: &'a StepResult },
    /// A step was skipped.
    StepSkipped {
        name: &'a str,
        reason: &'a SkipReason,
    },
}

/// An ordered list of uniquely named steps.
///
/// List order is dependency order: a step may rely on the effects of the
/// ones before it, never on the ones after.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<StepDefinition>,
}

impl Pipeline {
    /// Create a pipeline, rejecting duplicate step names.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.name.as_str()) {
                return Err(ClusterupError::DuplicateStep {
                    name: step.name.clone(),
                });
            }
        }
        Ok(Self { steps })
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the pipeline without progress reporting.
    pub fn run(&self, runner: &StepRunner<'_>, dry_run: bool) -> ExecutionReport {
        self.execute(runner, dry_run, |_| {})
    }

    /// Run every step in order and build the report.
    ///
    /// A failed step never stops the run; each step produces exactly one
    /// result.
    pub fn execute<F>(
        &self,
        runner: &StepRunner<'_>,
        dry_run: bool,
        mut on_progress: F,
    ) -> ExecutionReport
    where
        F: FnMut(PipelineProgress<'_>),
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        let total = self.steps.len();
        let mut results = Vec::with_capacity(total);

        debug!("Executing {} step(s), dry_run={}", total, dry_run);

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(reason) = &step.skip {
                on_progress(PipelineProgress::StepSkipped {
                    name: &step.name,
                    reason,
                });
            } else {
                on_progress(PipelineProgress::StepStarting {
                    name: &step.name,
                    index,
                    total,
                });
            }

            let result = runner.run(step, dry_run);

            if !step.is_skipped() {
                on_progress(PipelineProgress::StepFinished { result: &result });
            }
            results.push(result);
        }

        let report = ExecutionReport::from_results(results, started_at, clock.elapsed(), dry_run);
        info!(
            "Pipeline finished: {}/{} succeeded ({})",
            report.success_count, report.total_count, report.overall_status
        );
        report
    }
}
