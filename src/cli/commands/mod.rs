//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Fatal errors bubble up to `main`
//! and are mapped to exit codes by [`exit_code_for`].

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod init;
pub mod list;
pub mod run;

pub use dispatcher::{
    exit_code_for, Command, CommandDispatcher, CommandResult, EXIT_CONFIG, EXIT_FAILURE,
    EXIT_PREREQUISITES, EXIT_SUCCESS,
};
