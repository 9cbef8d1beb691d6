//! Step execution.
//!
//! The [`StepRunner`] turns a [`StepDefinition`] into exactly one
//! [`StepResult`]. Failures of the collaborator, including failure to
//! launch it at all, are recorded in the result rather than returned as
//! errors, so the pipeline's control flow never branches on them.

use crate::config::{resolve_template, Configuration};
use crate::error::ClusterupError;
use crate::session::Session;
use crate::shell::{ExternalCollaborator, Invocation};
use crate::steps::definition::StepDefinition;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome class of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not attempted because the step was skipped.
    Skipped,
    /// Not attempted because the run was a dry run.
    Simulated,
    /// Ran and exited successfully.
    Succeeded,
    /// Ran (or tried to) and failed.
    Failed,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Skipped => '○',
            StepStatus::Simulated => '◇',
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Skipped => "skipped",
            StepStatus::Simulated => "would execute",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Result of one step. Created once; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    /// Step name.
    pub name: String,

    /// Whether the collaborator was (or was meant to be) invoked.
    pub attempted: bool,

    /// Whether the step succeeded. Dry-run simulations count as successes.
    pub succeeded: bool,

    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,

    /// Execution duration.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,

    /// Error detail (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Exit code (if the collaborator exited normally).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Command line that was (or would have been) run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<String>,
}

impl StepResult {
    /// Create a skipped result.
    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attempted: false,
            succeeded: false,
            started_at: Utc::now(),
            duration: Duration::ZERO,
            error: None,
            exit_code: None,
            invocation: None,
        }
    }

    /// Create a dry-run result.
    pub fn simulated(name: &str, invocation: String) -> Self {
        Self {
            succeeded: true,
            invocation: Some(invocation),
            ..Self::skipped(name)
        }
    }

    /// Create a success result.
    pub fn success(
        name: &str,
        started_at: DateTime<Utc>,
        duration: Duration,
        invocation: String,
    ) -> Self {
        Self {
            name: name.to_string(),
            attempted: true,
            succeeded: true,
            started_at,
            duration,
            error: None,
            exit_code: Some(0),
            invocation: Some(invocation),
        }
    }

    /// Create a failure result.
    pub fn failure(
        name: &str,
        started_at: DateTime<Utc>,
        duration: Duration,
        error: String,
        exit_code: Option<i32>,
        invocation: String,
    ) -> Self {
        Self {
            name: name.to_string(),
            attempted: true,
            succeeded: false,
            started_at,
            duration,
            error: Some(error),
            exit_code,
            invocation: Some(invocation),
        }
    }

    /// Get the status of this result.
    pub fn status(&self) -> StepStatus {
        match (self.attempted, self.succeeded) {
            (false, false) => StepStatus::Skipped,
            (false, true) => StepStatus::Simulated,
            (true, true) => StepStatus::Succeeded,
            (true, false) => StepStatus::Failed,
        }
    }
}

/// Runs single steps against a configuration.
pub struct StepRunner<'a> {
    config: &'a Configuration,
    collaborator: &'a dyn ExternalCollaborator,
    session: &'a dyn Session,
    capture_output: bool,
}

impl<'a> StepRunner<'a> {
    /// Create a runner. Collaborator output is inherited by default.
    pub fn new(
        config: &'a Configuration,
        collaborator: &'a dyn ExternalCollaborator,
        session: &'a dyn Session,
    ) -> Self {
        Self {
            config,
            collaborator,
            session,
            capture_output: false,
        }
    }

    /// Capture collaborator output instead of passing it through.
    pub fn with_capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Resolve a step's parameters into a flat `-Flag value` list.
    ///
    /// A reference to a missing configuration value becomes an explicit
    /// empty argument; it is never dropped.
    pub fn resolve_arguments(&self, step: &StepDefinition) -> Vec<String> {
        let mut args = Vec::with_capacity(step.parameters.len() * 2);

        for param in &step.parameters {
            let resolved = resolve_template(&param.template, |key| self.config.lookup(key));
            for key in &resolved.missing {
                warn!(
                    "Step '{}': '{}' is not set; passing -{} as an empty value",
                    step.name, key, param.flag
                );
            }
            args.push(format!("-{}", param.flag));
            args.push(resolved.value);
        }

        args
    }

    /// Build the full invocation for a step.
    pub fn invocation(&self, step: &StepDefinition) -> Invocation {
        let root = self.config.root_dir();
        let target = resolve_target(&step.target, &root);

        let mut args = Vec::new();
        let program = match step.interpreter.split_first() {
            Some((interpreter, leading)) => {
                args.extend(leading.iter().cloned());
                args.push(target);
                interpreter.clone()
            }
            None => target,
        };
        args.extend(self.resolve_arguments(step));

        Invocation {
            program,
            args,
            cwd: Some(root),
            env: self.session.env(),
            timeout: step.timeout,
            capture_output: self.capture_output,
        }
    }

    /// Run one step.
    pub fn run(&self, step: &StepDefinition, dry_run: bool) -> StepResult {
        if let Some(reason) = &step.skip {
            info!("Skipping '{}' ({})", step.name, reason);
            return StepResult::skipped(&step.name);
        }

        let invocation = self.invocation(step);
        let command_line = invocation.command_line();

        if dry_run {
            info!("Would execute '{}': {}", step.name, command_line);
            return StepResult::simulated(&step.name, command_line);
        }

        info!("Running '{}'", step.name);
        debug!("Invocation: {:?}", invocation);

        let started_at = Utc::now();
        let clock = Instant::now();
        let outcome = self.collaborator.invoke(&invocation);
        let duration = clock.elapsed();

        match outcome {
            Ok(outcome) if outcome.success() => {
                info!("'{}' succeeded", step.name);
                StepResult::success(&step.name, started_at, duration, command_line)
            }
            Ok(outcome) => {
                let detail = outcome.failure_detail();
                warn!("Step '{}' failed: {}", step.name, detail);
                StepResult::failure(
                    &step.name,
                    started_at,
                    duration,
                    detail,
                    outcome.exit_code,
                    command_line,
                )
            }
            Err(e) => {
                warn!("Step '{}' could not run: {}", step.name, e);
                StepResult::failure(
                    &step.name,
                    started_at,
                    duration,
                    e.to_string(),
                    None,
                    command_line,
                )
            }
        }
    }
}

/// Relative paths are resolved against the configuration directory; bare
/// program names are left for PATH lookup.
fn resolve_target(target: &str, root: &Path) -> String {
    let path = Path::new(target);
    if path.is_absolute() || path.components().count() == 1 {
        target.to_string()
    } else {
        root.join(path).to_string_lossy().into_owned()
    }
}
