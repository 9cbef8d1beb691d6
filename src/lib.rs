//! clusterup - Configuration-driven Kubernetes environment bring-up.
//!
//! clusterup reads one YAML configuration, verifies that the tools and the
//! authenticated session the bring-up depends on are available, then runs
//! an ordered pipeline of external collaborators (cluster creation, security
//! hardening, monitoring, a sample application). A failed step never stops
//! the run; every step gets a result and the run ends with a report.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, template, validation, interpolation
//! - [`error`] - Error types and result aliases
//! - [`report`] - Execution report, rendering and persistence
//! - [`requirements`] - Prerequisite probes
//! - [`runner`] - Sequential pipeline execution
//! - [`session`] - Authenticated session capability
//! - [`shell`] - External collaborator invocation
//! - [`steps`] - Step definitions and single-step execution
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use clusterup::config::resolve_template;
//!
//! let resolved = resolve_template("${cluster.name}-ns", |key| {
//!     (key == "cluster.name").then(|| "aks-dev".to_string())
//! });
//! assert_eq!(resolved.value, "aks-dev-ns");
//! assert!(resolved.missing.is_empty());
//! ```
//!
//! For end-to-end pipeline runs, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod requirements;
pub mod runner;
pub mod session;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{ClusterupError, Result};
