//! Prerequisite detection.
//!
//! This module verifies that the external tools and the authenticated
//! session the pipeline depends on exist before any step runs.
//!
//! # Modules
//!
//! - [`checker`] - Runs a list of opaque probes and collects every failure
//! - [`probe`] - Standard probes (tool on PATH, authenticated session)

pub mod checker;
pub mod probe;

pub use checker::{check_all, Prerequisite, PrerequisiteReport};
pub use probe::{from_configuration, parse_system_path, resolve_tool_path, session_probe, tool_probe};
