//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands
//! - Exit codes and the error-to-exit-code mapping

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::config_path;
use crate::error::{ClusterupError, Result};
use crate::ui::UserInterface;

/// Every step succeeded, or the run was a dry run.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one step failed.
pub const EXIT_FAILURE: i32 = 1;
/// Configuration missing or invalid.
pub const EXIT_CONFIG: i32 = 2;
/// Prerequisites unsatisfied.
pub const EXIT_PREREQUISITES: i32 = 3;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Fatal conditions (bad configuration, missing prerequisites) are
    /// returned as errors and mapped to exit codes by [`exit_code_for`].
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: EXIT_SUCCESS,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Create a result from an exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            success: exit_code == EXIT_SUCCESS,
            exit_code,
        }
    }
}

/// Exit code for a fatal error.
pub fn exit_code_for(error: &ClusterupError) -> i32 {
    match error {
        e if e.is_configuration() => EXIT_CONFIG,
        ClusterupError::PrerequisiteUnsatisfied { .. } => EXIT_PREREQUISITES,
        _ => EXIT_FAILURE,
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: PathBuf,
}

impl CommandDispatcher {
    /// Create a dispatcher resolving the configuration from `base_dir`.
    pub fn new(base_dir: &Path, config_override: Option<&Path>) -> Self {
        Self {
            config_path: config_path(base_dir, config_override),
        }
    }

    /// Get the resolved configuration path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                super::run::RunCommand::new(&self.config_path, args.clone()).execute(ui)
            }
            Some(Commands::Check) => super::check::CheckCommand::new(&self.config_path).execute(ui),
            Some(Commands::List(args)) => {
                super::list::ListCommand::new(&self.config_path, args.clone()).execute(ui)
            }
            Some(Commands::Init(args)) => {
                super::init::InitCommand::new(&self.config_path, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::run::RunCommand::new(&self.config_path, RunArgs::default()).execute(ui),
        }
    }
}
