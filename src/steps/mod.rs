//! Step definition and execution.
//!
//! This module provides the single-step half of the orchestrator:
//!
//! - [`StepDefinition`] - A manifest entry merged with the run's skip policy
//! - [`build_steps`] - Build the run's step list from configuration
//! - [`StepRunner`] - Resolve parameters, invoke the collaborator, classify
//! - [`StepResult`] - Immutable record of one step's fate
//!
//! # Example
//!
//! ```
//! use clusterup::config::parse_configuration;
//! use clusterup::session::StaticSession;
//! use clusterup::shell::ProcessCollaborator;
//! use clusterup::steps::{StepDefinition, StepRunner, StepStatus};
//! use std::path::Path;
//!
//! let config = parse_configuration("cluster: {name: aks}", Path::new("clusterup.yml")).unwrap();
//! let collaborator = ProcessCollaborator::new();
//! let session = StaticSession::authenticated();
//! let runner = StepRunner::new(&config, &collaborator, &session);
//!
//! let step = StepDefinition::new("cluster", "create-cluster")
//!     .with_param("ClusterName", "${cluster.name}");
//! let result = runner.run(&step, true);
//!
//! assert_eq!(result.status(), StepStatus::Simulated);
//! assert_eq!(result.invocation.as_deref(), Some("create-cluster -ClusterName aks"));
//! ```

pub mod definition;
pub mod executor;

pub use definition::{build_steps, SkipReason, StepDefinition, StepParameter};
pub use executor::{StepResult, StepRunner, StepStatus};
