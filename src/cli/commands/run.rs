//! Run command implementation.
//!
//! The `clusterup run` command executes the bring-up pipeline: load and
//! validate configuration, check prerequisites, run every step in order and
//! print and persist the report.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::RunArgs;
use crate::config::{load_configuration, Configuration};
use crate::error::Result;
use crate::report::{ExecutionReport, ReportGenerator};
use crate::requirements::{check_all, parse_system_path};
use crate::runner::{Pipeline, PipelineProgress};
use crate::session::CommandSession;
use crate::shell::{ExternalCollaborator, ProcessCollaborator};
use crate::steps::{build_steps, StepRunner, StepStatus};
use crate::ui::{format_duration, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    config_path: PathBuf,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(config_path: &Path, args: RunArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Run against an already loaded configuration with the given collaborator.
    pub fn run_with(
        &self,
        config: &Configuration,
        collaborator: &dyn ExternalCollaborator,
        ui: &mut dyn UserInterface,
    ) -> Result<ExecutionReport> {
        let skip: HashSet<String> = self.args.skip.iter().cloned().collect();
        let pipeline = Pipeline::new(build_steps(config, &skip)?)?;

        let session = CommandSession::from_configuration(config, collaborator);
        let path_entries = parse_system_path();
        let prerequisites = crate::requirements::from_configuration(config, &session, &path_entries);
        check_all(&prerequisites).into_result()?;
        debug!("{} prerequisite(s) satisfied", prerequisites.len());

        let title = config
            .lookup("environment.name")
            .map(|env| format!("Bringing up {}", env))
            .unwrap_or_else(|| "Bringing up environment".to_string());
        ui.show_header(&title);
        if self.args.dry_run {
            ui.message("Dry run: no steps will be executed");
        }

        let capture = !ui.output_mode().shows_command_output();
        let runner = StepRunner::new(config, collaborator, &session).with_capture_output(capture);

        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let report = pipeline.execute(&runner, self.args.dry_run, |event| match event {
            PipelineProgress::StepStarting { name, index, total } => {
                ui.show_progress(index + 1, total);
                if capture {
                    spinner = Some(ui.start_spinner(&format!("Running {}", name)));
                } else {
                    ui.message(&format!("Running {}", name));
                }
            }
            PipelineProgress::StepFinished { result } => {
                let line = match result.status() {
                    StepStatus::Simulated => format!(
                        "{} would execute: {}",
                        result.name,
                        result.invocation.as_deref().unwrap_or_default()
                    ),
                    StepStatus::Failed => format!(
                        "{} failed: {}",
                        result.name,
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                    _ => format!("{} ({})", result.name, format_duration(result.duration)),
                };
                match (spinner.take(), result.succeeded) {
                    (Some(mut s), true) => s.finish_success(&line),
                    (Some(mut s), false) => s.finish_error(&line),
                    (None, true) => ui.success(&line),
                    (None, false) => ui.error(&line),
                }
            }
            PipelineProgress::StepSkipped { name, reason } => {
                ui.skipped(&format!("{} ({})", name, reason));
            }
        });

        Ok(report)
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_configuration(&self.config_path)?;
        let collaborator = ProcessCollaborator::new();

        let report = self.run_with(&config, &collaborator, ui)?;
        let generator = ReportGenerator::from_configuration(&config);

        if self.args.json {
            ui.show_block(&generator.render_json(&report)?);
        } else {
            ui.show_block(&format!("\n{}", generator.render(&report)));
        }

        if !self.args.no_report {
            let dir = config.reports_dir();
            match generator.persist(&report, &dir) {
                Some(path) => ui.message(&format!("Report written to {}", path.display())),
                None => ui.warning(&format!("Report could not be written to {}", dir.display())),
            }
        }

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
