//! Configuration loading, parsing, and validation for clusterup.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File loading and template generation in [`loader`] and [`template`]
//! - Validation in [`validator`]
//! - `${key}` references in step parameters in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use clusterup::config::load_configuration;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("clusterup.yml");
//! fs::write(
//!     &path,
//!     "environment: {name: dev, location: eastus}\n\
//!      resources: {resource_group: rg-dev}\n\
//!      cluster: {name: aks-dev}\n",
//! )
//! .unwrap();
//!
//! let config = load_configuration(&path).unwrap();
//! assert_eq!(config.lookup("cluster.name"), Some("aks-dev".to_string()));
//! ```

pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validator;

// Schema re-exports
pub use schema::{
    default_pipeline, ConfigSections, Configuration, PrerequisiteConfig, SessionConfig, Settings,
    StepManifest, PLACEHOLDER, REQUIRED_KEYS,
};

// Loader re-exports
pub use loader::{
    config_path, load_configuration, load_unvalidated, parse_configuration, DEFAULT_CONFIG_FILE,
};

// Template re-exports
pub use template::{write_template, TEMPLATE};

// Validator re-exports
pub use validator::{validate, validate_config, ValidationError};

// Interpolation re-exports
pub use interpolation::{
    extract_references, parse_template, resolve_template, ResolvedTemplate, Segment,
};
