//! Configuration schema definitions for clusterup.
//!
//! The configuration is kept twice: as the raw nested YAML document, so any
//! dotted key (`cluster.name`) can be looked up for parameter resolution,
//! and as typed sections for the parts the orchestrator itself reads.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Value written into the template for every required key.
///
/// A key still holding this value is treated as empty.
pub const PLACEHOLDER: &str = "<set-me>";

/// Keys that must be present and non-empty before the pipeline runs.
pub const REQUIRED_KEYS: &[&str] = &[
    "environment.name",
    "environment.location",
    "resources.resource_group",
    "cluster.name",
];

/// Typed view of the configuration sections the orchestrator reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSections {
    /// Feature toggles, one per optional pipeline step.
    pub features: BTreeMap<String, bool>,

    /// External tools and session that must exist before any step runs.
    pub prerequisites: PrerequisiteConfig,

    /// Session capability settings.
    pub session: SessionConfig,

    /// Orchestrator settings.
    pub settings: Settings,

    /// Pipeline manifest (defaults to [`default_pipeline`] when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Vec<StepManifest>>,
}

/// Prerequisites checked before the pipeline starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerequisiteConfig {
    /// Tools that must be found on PATH.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Command whose zero exit status means an authenticated session exists.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub session_check: Vec<String>,
}

/// Session capability settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Extra environment exported to every collaborator.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for run reports, relative to the configuration file.
    pub reports_dir: PathBuf,

    /// Upper bound on a single step's run time. No bound when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            step_timeout_secs: None,
        }
    }
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// One entry of the pipeline manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepManifest {
    /// Unique, human-readable step name.
    pub name: String,

    /// Collaborator to invoke (path relative to the config file, or a program name).
    pub run: String,

    /// Program the `run` target is handed to, e.g. `bash` or `pwsh -File`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Feature toggle controlling this step. Always enabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    /// Configuration keys this step cannot run without.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Ordered flag-name to value-template mapping.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub params: Mapping,

    /// Per-step override of `settings.step_timeout_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Short description shown by `clusterup list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StepManifest {
    fn builtin(
        name: &str,
        run: &str,
        feature: Option<&str>,
        description: &str,
        params: &[(&str, &str)],
    ) -> Self {
        let mut mapping = Mapping::new();
        for (flag, value) in params {
            mapping.insert(Value::from(*flag), Value::from(*value));
        }
        let requires = params
            .iter()
            .flat_map(|(_, v)| super::interpolation::extract_references(v))
            .filter(|key| REQUIRED_KEYS.contains(&key.as_str()))
            .fold(Vec::new(), |mut acc, key| {
                if !acc.contains(&key) {
                    acc.push(key);
                }
                acc
            });

        Self {
            name: name.to_string(),
            run: run.to_string(),
            interpreter: None,
            feature: feature.map(str::to_string),
            requires,
            params: mapping,
            timeout_secs: None,
            description: Some(description.to_string()),
        }
    }
}

/// The manifest used when the configuration declares no `pipeline`.
pub fn default_pipeline() -> Vec<StepManifest> {
    vec![
        StepManifest::builtin(
            "cluster",
            "scripts/create-cluster.sh",
            None,
            "Create the resource group and cluster",
            &[
                ("ResourceGroup", "${resources.resource_group}"),
                ("ClusterName", "${cluster.name}"),
                ("Location", "${environment.location}"),
                ("NodeCount", "${cluster.node_count}"),
            ],
        ),
        StepManifest::builtin(
            "security",
            "scripts/apply-security.sh",
            Some("security"),
            "Apply network and pod security policies",
            &[
                ("ResourceGroup", "${resources.resource_group}"),
                ("ClusterName", "${cluster.name}"),
            ],
        ),
        StepManifest::builtin(
            "monitoring",
            "scripts/install-monitoring.sh",
            Some("monitoring"),
            "Install the monitoring stack",
            &[
                ("ClusterName", "${cluster.name}"),
                ("Namespace", "monitoring"),
            ],
        ),
        StepManifest::builtin(
            "sample-app",
            "scripts/deploy-sample-app.sh",
            Some("sample_app"),
            "Deploy the sample application",
            &[
                ("ClusterName", "${cluster.name}"),
                ("Environment", "${environment.name}"),
            ],
        ),
    ]
}

/// A loaded, validated configuration. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Configuration {
    document: Value,
    sections: ConfigSections,
    source: PathBuf,
}

impl Configuration {
    /// Build a configuration from a parsed document.
    pub(crate) fn new(document: Value, sections: ConfigSections, source: &Path) -> Self {
        Self {
            document,
            sections,
            source: source.to_path_buf(),
        }
    }

    /// Path the configuration was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Directory collaborators run in and relative paths resolve against.
    pub fn root_dir(&self) -> PathBuf {
        match self.source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Resolved reports directory.
    pub fn reports_dir(&self) -> PathBuf {
        self.root_dir().join(&self.sections.settings.reports_dir)
    }

    /// Raw value at a dotted key, walking nested sections.
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.document, |node, part| node.get(part))
    }

    /// Scalar value at a dotted key, rendered as a string.
    ///
    /// Returns `None` for missing keys, nulls and non-scalar values.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Tagged(tagged) => match &tagged.value {
                Value::String(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether a key holds a non-empty value that is not the template placeholder.
    pub fn is_present(&self, key: &str) -> bool {
        self.lookup(key)
            .map(|v| {
                let v = v.trim();
                !v.is_empty() && v != PLACEHOLDER
            })
            .unwrap_or(false)
    }

    /// Whether a feature toggle is on. Absent toggles are off.
    pub fn feature_enabled(&self, feature: &str) -> bool {
        self.sections.features.get(feature).copied().unwrap_or(false)
    }

    /// All declared feature toggles.
    pub fn features(&self) -> &BTreeMap<String, bool> {
        &self.sections.features
    }

    /// Whether a manifest entry is enabled by its feature toggle.
    pub fn step_enabled(&self, step: &StepManifest) -> bool {
        step.feature
            .as_deref()
            .map(|f| self.feature_enabled(f))
            .unwrap_or(true)
    }

    /// The pipeline manifest, falling back to the built-in one.
    pub fn pipeline(&self) -> Vec<StepManifest> {
        self.sections
            .pipeline
            .clone()
            .unwrap_or_else(default_pipeline)
    }

    /// Prerequisite settings.
    pub fn prerequisites(&self) -> &PrerequisiteConfig {
        &self.sections.prerequisites
    }

    /// Session settings.
    pub fn session(&self) -> &SessionConfig {
        &self.sections.session
    }

    /// Orchestrator settings.
    pub fn settings(&self) -> &Settings {
        &self.sections.settings
    }

    /// Key/value lines describing the target environment, for reports.
    pub fn summary(&self) -> Vec<(String, String)> {
        let mut lines: Vec<(String, String)> = REQUIRED_KEYS
            .iter()
            .map(|key| (key.to_string(), self.lookup(key).unwrap_or_default()))
            .collect();
        for (feature, enabled) in &self.sections.features {
            let state = if *enabled { "enabled" } else { "disabled" };
            lines.push((format!("features.{}", feature), state.to_string()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(yaml: &str) -> Configuration {
        let document: Value = serde_yaml::from_str(yaml).unwrap();
        let sections: ConfigSections = serde_yaml::from_value(document.clone()).unwrap();
        Configuration::new(document, sections, Path::new("/work/clusterup.yml"))
    }

    #[test]
    fn lookup_walks_nested_sections() {
        let config = config_from("cluster:\n  name: aks-dev\n  node_count: 3\n");
        assert_eq!(config.lookup("cluster.name"), Some("aks-dev".to_string()));
        assert_eq!(config.lookup("cluster.node_count"), Some("3".to_string()));
        assert_eq!(config.lookup("cluster.missing"), None);
        assert_eq!(config.lookup("nope.name"), None);
    }

    #[test]
    fn lookup_ignores_non_scalars() {
        let config = config_from("cluster:\n  name: aks\n");
        assert_eq!(config.lookup("cluster"), None);
    }

    #[test]
    fn placeholder_is_not_present() {
        let config = config_from("cluster:\n  name: \"<set-me>\"\nenvironment:\n  name: \"  \"\n");
        assert!(!config.is_present("cluster.name"));
        assert!(!config.is_present("environment.name"));
    }

    #[test]
    fn features_default_to_disabled() {
        let config = config_from("features:\n  security: true\n");
        assert!(config.feature_enabled("security"));
        assert!(!config.feature_enabled("monitoring"));
    }

    #[test]
    fn step_without_feature_is_always_enabled() {
        let config = config_from("features: {}\n");
        let pipeline = default_pipeline();
        assert!(config.step_enabled(&pipeline[0]));
        assert!(!config.step_enabled(&pipeline[1]));
    }

    #[test]
    fn default_pipeline_order_and_requires() {
        let pipeline = default_pipeline();
        let names: Vec<_> = pipeline.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["cluster", "security", "monitoring", "sample-app"]);
        assert!(pipeline[0].requires.contains(&"cluster.name".to_string()));
        assert!(!pipeline[0].requires.contains(&"cluster.node_count".to_string()));
    }

    #[test]
    fn root_dir_is_config_parent() {
        let config = config_from("{}");
        assert_eq!(config.root_dir(), PathBuf::from("/work"));
        assert_eq!(config.reports_dir(), PathBuf::from("/work/reports"));
    }

    #[test]
    fn custom_pipeline_replaces_default() {
        let config = config_from(
            r#"
pipeline:
  - name: only
    run: ./only.sh
    params:
      Name: "${cluster.name}"
"#,
        );
        let pipeline = config.pipeline();
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline[0].run, "./only.sh");
        assert_eq!(pipeline[0].params.len(), 1);
    }

    #[test]
    fn summary_lists_required_keys_and_features() {
        let config = config_from("cluster:\n  name: aks\nfeatures:\n  monitoring: false\n");
        let summary = config.summary();
        assert!(summary.contains(&("cluster.name".to_string(), "aks".to_string())));
        assert!(summary.contains(&("features.monitoring".to_string(), "disabled".to_string())));
    }
}
