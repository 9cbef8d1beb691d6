//! Check command implementation.
//!
//! `clusterup check` validates the configuration and probes every
//! prerequisite, printing one line per probe. No step runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::load_configuration;
use crate::error::Result;
use crate::requirements::{check_all, parse_system_path};
use crate::runner::Pipeline;
use crate::session::CommandSession;
use crate::shell::ProcessCollaborator;
use crate::steps::build_steps;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_PREREQUISITES};

/// The check command implementation.
pub struct CheckCommand {
    config_path: PathBuf,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_configuration(&self.config_path)?;
        let pipeline = Pipeline::new(build_steps(&config, &HashSet::new())?)?;
        ui.success(&format!(
            "Configuration valid: {} ({} steps)",
            self.config_path.display(),
            pipeline.len()
        ));

        let collaborator = ProcessCollaborator::new();
        let session = CommandSession::from_configuration(&config, &collaborator);
        let path_entries = parse_system_path();
        let prerequisites =
            crate::requirements::from_configuration(&config, &session, &path_entries);
        let report = check_all(&prerequisites);

        for name in &report.checked {
            if report.failures.contains(name) {
                ui.error(&format!("{} not satisfied", name));
            } else {
                ui.success(name);
            }
        }

        if report.all_satisfied() {
            ui.show_block("All prerequisites satisfied.");
            Ok(CommandResult::success())
        } else {
            ui.show_block(&format!(
                "{} of {} prerequisites unsatisfied.",
                report.failures.len(),
                report.checked.len()
            ));
            Ok(CommandResult::failure(EXIT_PREREQUISITES))
        }
    }
}
