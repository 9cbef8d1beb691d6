//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::ui::OutputMode;

/// clusterup - Configuration-driven Kubernetes environment bring-up.
#[derive(Debug, Parser)]
#[command(name = "clusterup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./clusterup.yml)
    #[arg(short, long, global = true, env = "CLUSTERUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output, including collaborator output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output mode from the global flags.
    ///
    /// `run --json` owns stdout for the JSON document, so status output and
    /// collaborator passthrough are turned off.
    pub fn output_mode(&self) -> OutputMode {
        match &self.command {
            Some(Commands::Run(args)) if args.json => OutputMode::Quiet,
            _ => OutputMode::from_flags(self.verbose, self.quiet),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the bring-up pipeline (default if no command specified)
    Run(RunArgs),

    /// Validate configuration and check prerequisites without running steps
    Check,

    /// List pipeline steps and whether each would run
    List(ListArgs),

    /// Write a configuration template
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Skip specified steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Show what would run without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not write the report file
    #[arg(long)]
    pub no_report: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Steps to show as skipped (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["clusterup"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_skip_is_comma_separated() {
        let cli =
            Cli::try_parse_from(["clusterup", "run", "--skip", "security,monitoring", "--dry-run"])
                .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.skip, ["security", "monitoring"]);
                assert!(args.dry_run);
                assert!(!args.json);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["clusterup", "check", "--config", "env/dev.yml", "-q"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("env/dev.yml")));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn output_mode_follows_flags() {
        let cli = Cli::try_parse_from(["clusterup", "run", "-v"]).unwrap();
        assert_eq!(cli.output_mode(), OutputMode::Verbose);
        let cli = Cli::try_parse_from(["clusterup", "-q"]).unwrap();
        assert_eq!(cli.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn json_run_is_quiet_even_when_verbose() {
        let cli = Cli::try_parse_from(["clusterup", "run", "--json"]).unwrap();
        assert_eq!(cli.output_mode(), OutputMode::Quiet);
        let cli = Cli::try_parse_from(["clusterup", "run", "--json", "-v"]).unwrap();
        assert_eq!(cli.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn init_force() {
        let cli = Cli::try_parse_from(["clusterup", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init(InitArgs { force: true }))));
    }
}
