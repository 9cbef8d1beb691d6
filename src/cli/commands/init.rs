//! Init command implementation.
//!
//! `clusterup init` writes the configuration template on demand.

use std::path::{Path, PathBuf};

use crate::cli::args::InitArgs;
use crate::config::write_template;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_FAILURE};

/// The init command implementation.
pub struct InitCommand {
    config_path: PathBuf,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(config_path: &Path, args: InitArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.config_path.exists() && !self.args.force {
            ui.error(&format!(
                "{} already exists. Use --force to overwrite.",
                self.config_path.display()
            ));
            return Ok(CommandResult::failure(EXIT_FAILURE));
        }

        write_template(&self.config_path)?;
        ui.success(&format!("Wrote {}", self.config_path.display()));
        ui.message("Replace every <set-me> value, then run `clusterup check`.");
        Ok(CommandResult::success())
    }
}
