//! Configuration validation rules.
//!
//! This module validates configuration before any step runs:
//! - Every required key must be present and non-empty
//! - Every enabled step's `requires` keys must be present and non-empty
//! - Step names must be unique
//! - Step parameter values must be scalars

use crate::config::schema::{Configuration, REQUIRED_KEYS};
use crate::error::{ClusterupError, Result};
use serde_yaml::Value;
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Offending configuration key or step name
    pub key: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &'static str, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            key: key.into(),
            message: message.into(),
        }
    }

    fn into_error(self) -> ClusterupError {
        match self.rule {
            "duplicate-step" => ClusterupError::DuplicateStep { name: self.key },
            "missing-key" => ClusterupError::missing_key(&self.key),
            _ => ClusterupError::ConfigurationInvalid {
                key: self.key,
                reason: self.message,
            },
        }
    }
}

/// Validate a configuration and return all errors, in a stable order.
pub fn validate_config(config: &Configuration) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_required_keys(config));
    errors.extend(validate_pipeline(config));

    errors
}

fn validate_required_keys(config: &Configuration) -> Vec<ValidationError> {
    REQUIRED_KEYS
        .iter()
        .filter(|key| !config.is_present(key))
        .map(|key| ValidationError::new("missing-key", *key, "is required but missing or empty"))
        .collect()
}

fn validate_pipeline(config: &Configuration) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for step in config.pipeline() {
        if !seen.insert(step.name.clone()) {
            errors.push(ValidationError::new(
                "duplicate-step",
                &step.name,
                "appears more than once in the pipeline",
            ));
        }

        if step.run.trim().is_empty() {
            errors.push(ValidationError::new(
                "missing-run",
                format!("pipeline.{}.run", step.name),
                "must name the collaborator to invoke",
            ));
        }

        for (flag, value) in &step.params {
            let flag_name = flag.as_str().unwrap_or_default();
            if flag_name.is_empty() {
                errors.push(ValidationError::new(
                    "invalid-param",
                    format!("pipeline.{}.params", step.name),
                    "parameter names must be non-empty strings",
                ));
            }
            if matches!(value, Value::Sequence(_) | Value::Mapping(_)) {
                errors.push(ValidationError::new(
                    "invalid-param",
                    format!("pipeline.{}.params.{}", step.name, flag_name),
                    "must be a scalar value",
                ));
            }
        }

        // Skipped-by-toggle steps don't need their keys filled in
        if !config.step_enabled(&step) {
            continue;
        }
        for key in &step.requires {
            if !config.is_present(key) && !REQUIRED_KEYS.contains(&key.as_str()) {
                errors.push(ValidationError::new(
                    "missing-key",
                    key,
                    format!("is required by step '{}' but missing or empty", step.name),
                ));
            }
        }
    }

    errors
}

/// Validate and return the first error, if any.
///
/// # Errors
///
/// Returns `ConfigurationInvalid` naming the first offending key, or
/// `DuplicateStep` for a repeated step name.
pub fn validate(config: &Configuration) -> Result<()> {
    match validate_config(config).into_iter().next() {
        None => Ok(()),
        Some(first) => Err(first.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_configuration;
    use std::path::Path;

    const VALID: &str = r#"
environment:
  name: dev
  location: eastus
resources:
  resource_group: rg-dev
cluster:
  name: aks-dev
features:
  security: true
"#;

    fn parse(yaml: &str) -> Configuration {
        parse_configuration(yaml, Path::new("clusterup.yml")).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&parse(VALID)).is_ok());
    }

    #[test]
    fn missing_required_key_is_named() {
        let config = parse(&VALID.replace("  name: aks-dev\n", ""));
        let err = validate(&config).unwrap_err();
        match err {
            ClusterupError::ConfigurationInvalid { key, .. } => assert_eq!(key, "cluster.name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_required_key_is_rejected() {
        let config = parse(&VALID.replace("rg-dev", "\"\""));
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, "resources.resource_group");
    }

    #[test]
    fn every_missing_key_is_collected() {
        let config = parse("features: {}");
        let keys: Vec<_> = validate_config(&config)
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, REQUIRED_KEYS);
    }

    #[test]
    fn step_requires_checked_when_enabled() {
        let yaml = format!(
            "{}pipeline:\n  - name: dns\n    run: ./dns.sh\n    requires: [dns.zone]\n",
            VALID
        );
        let err = validate(&parse(&yaml)).unwrap_err();
        assert!(err.to_string().contains("dns.zone"));
    }

    #[test]
    fn step_requires_ignored_when_feature_disabled() {
        let yaml = format!(
            "{}pipeline:\n  - name: dns\n    run: ./dns.sh\n    feature: dns\n    requires: [dns.zone]\n",
            VALID
        );
        assert!(validate(&parse(&yaml)).is_ok());
    }

    #[test]
    fn duplicate_step_names_rejected() {
        let yaml = format!(
            "{}pipeline:\n  - name: a\n    run: ./a.sh\n  - name: a\n    run: ./b.sh\n",
            VALID
        );
        let err = validate(&parse(&yaml)).unwrap_err();
        assert!(matches!(err, ClusterupError::DuplicateStep { ref name } if name == "a"));
    }

    #[test]
    fn non_scalar_param_rejected() {
        let yaml = format!(
            "{}pipeline:\n  - name: a\n    run: ./a.sh\n    params:\n      Nodes: [1, 2]\n",
            VALID
        );
        let errors = validate_config(&parse(&yaml));
        assert!(errors.iter().any(|e| e.rule == "invalid-param"));
    }
}
