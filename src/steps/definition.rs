//! Step definitions.
//!
//! A [`StepDefinition`] is a manifest entry merged with the run's skip
//! policy. Definitions are built once per run and never mutated.

use crate::config::{Configuration, StepManifest};
use crate::error::{ClusterupError, Result};
use serde_yaml::Value;
use std::collections::HashSet;
use std::time::Duration;

/// One `-Flag value` parameter, with its value still a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepParameter {
    /// Flag name without the leading dash.
    pub flag: String,
    /// Value template, may contain `${key}` references.
    pub template: String,
}

/// Why a step will not be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The step's feature toggle is off.
    FeatureDisabled(String),
    /// The operator asked for it on the command line.
    Requested,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FeatureDisabled(feature) => write!(f, "features.{} is off", feature),
            SkipReason::Requested => write!(f, "skipped on request"),
        }
    }
}

/// A step ready to hand to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Unique step name.
    pub name: String,
    /// Collaborator path or program name.
    pub target: String,
    /// Interpreter program and its leading arguments (empty = run target directly).
    pub interpreter: Vec<String>,
    /// Ordered parameters.
    pub parameters: Vec<StepParameter>,
    /// Why the step is skipped, if it is.
    pub skip: Option<SkipReason>,
    /// Upper bound on run time.
    pub timeout: Option<Duration>,
    /// Short description.
    pub description: Option<String>,
}

impl StepDefinition {
    /// Create a step that runs `target` with no parameters.
    pub fn new(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            interpreter: Vec::new(),
            parameters: Vec::new(),
            skip: None,
            timeout: None,
            description: None,
        }
    }

    /// Append a parameter.
    pub fn with_param(mut self, flag: &str, template: &str) -> Self {
        self.parameters.push(StepParameter {
            flag: flag.to_string(),
            template: template.to_string(),
        });
        self
    }

    /// Run the target through an interpreter, e.g. `bash` or `pwsh -File`.
    pub fn with_interpreter(mut self, interpreter: &str) -> Self {
        self.interpreter = interpreter.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Mark the step as skipped.
    pub fn skipped(mut self, reason: SkipReason) -> Self {
        self.skip = Some(reason);
        self
    }

    /// Whether the step will be skipped.
    pub fn is_skipped(&self) -> bool {
        self.skip.is_some()
    }

    fn from_manifest(
        manifest: &StepManifest,
        config: &Configuration,
        requested_skips: &HashSet<String>,
    ) -> Self {
        let skip = if requested_skips.contains(&manifest.name) {
            Some(SkipReason::Requested)
        } else if !config.step_enabled(manifest) {
            manifest.feature.clone().map(SkipReason::FeatureDisabled)
        } else {
            None
        };

        let parameters = manifest
            .params
            .iter()
            .map(|(flag, value)| StepParameter {
                flag: scalar_to_string(flag),
                template: scalar_to_string(value),
            })
            .collect();

        let timeout = manifest
            .timeout_secs
            .or(config.settings().step_timeout_secs)
            .map(Duration::from_secs);

        Self {
            name: manifest.name.clone(),
            target: manifest.run.clone(),
            interpreter: manifest
                .interpreter
                .as_deref()
                .map(|i| i.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            parameters,
            skip,
            timeout,
            description: manifest.description.clone(),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Build the run's step list from the configuration's manifest.
///
/// `skip` names steps the operator wants skipped on top of the feature
/// toggles.
///
/// # Errors
///
/// Returns `UnknownStep` for a skip name not in the pipeline and
/// `DuplicateStep` if two manifest entries share a name.
pub fn build_steps(config: &Configuration, skip: &HashSet<String>) -> Result<Vec<StepDefinition>> {
    let manifest = config.pipeline();

    let mut names = HashSet::new();
    for entry in &manifest {
        if !names.insert(entry.name.as_str()) {
            return Err(ClusterupError::DuplicateStep {
                name: entry.name.clone(),
            });
        }
    }

    let mut unknown: Vec<_> = skip.iter().filter(|s| !names.contains(s.as_str())).collect();
    unknown.sort();
    if let Some(name) = unknown.first() {
        return Err(ClusterupError::UnknownStep {
            name: name.to_string(),
        });
    }

    Ok(manifest
        .iter()
        .map(|entry| StepDefinition::from_manifest(entry, config, skip))
        .collect())
}
