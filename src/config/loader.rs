//! Configuration file loading.
//!
//! The configuration is read once at process start. A missing file is
//! never silently defaulted: a template is written in its place and the
//! load fails so the caller stops before touching any infrastructure.

use crate::config::schema::{ConfigSections, Configuration};
use crate::config::template::write_template;
use crate::config::validator::validate;
use crate::error::{ClusterupError, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "clusterup.yml";

/// Resolve the configuration path from an optional override.
pub fn config_path(base_dir: &Path, config_override: Option<&Path>) -> PathBuf {
    match config_override {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => base_dir.join(path),
        None => base_dir.join(DEFAULT_CONFIG_FILE),
    }
}

/// Load and validate the configuration at `path`.
///
/// # Errors
///
/// Returns `ConfigurationMissing` after writing a template if the file
/// doesn't exist, `ConfigParseError` if the YAML is invalid, and
/// `ConfigurationInvalid` naming the first missing or empty required key.
pub fn load_configuration(path: &Path) -> Result<Configuration> {
    let config = load_unvalidated(path)?;
    validate(&config)?;
    debug!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Load the configuration at `path` without validating required keys.
///
/// Used by commands that only display the configuration. A missing file
/// still produces a template and `ConfigurationMissing`.
pub fn load_unvalidated(path: &Path) -> Result<Configuration> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            write_template(path)?;
            info!("Wrote template configuration to {}", path.display());
            return Err(ClusterupError::ConfigurationMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(ClusterupError::Io(e)),
    };

    parse_configuration(&content, path)
}

/// Parse YAML content into a [`Configuration`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting and relative path resolution
pub fn parse_configuration(content: &str, source_path: &Path) -> Result<Configuration> {
    let parse_error = |e: serde_yaml::Error| ClusterupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    };

    let mut document: Value = serde_yaml::from_str(content).map_err(parse_error)?;
    if document.is_null() {
        document = Value::Mapping(Mapping::new());
    }
    if !document.is_mapping() {
        return Err(ClusterupError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: "top level must be a mapping of sections".to_string(),
        });
    }

    let sections: ConfigSections = serde_yaml::from_value(document.clone()).map_err(parse_error)?;
    Ok(Configuration::new(document, sections, source_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::template::TEMPLATE;
    use tempfile::TempDir;

    const VALID: &str = r#"
environment:
  name: dev
  location: eastus
resources:
  resource_group: rg-dev
cluster:
  name: aks-dev
"#;

    #[test]
    fn config_path_defaults_to_cwd_file() {
        let path = config_path(Path::new("/work"), None);
        assert_eq!(path, PathBuf::from("/work/clusterup.yml"));
    }

    #[test]
    fn config_path_honours_override() {
        assert_eq!(
            config_path(Path::new("/work"), Some(Path::new("envs/dev.yml"))),
            PathBuf::from("/work/envs/dev.yml")
        );
        assert_eq!(
            config_path(Path::new("/work"), Some(Path::new("/etc/c.yml"))),
            PathBuf::from("/etc/c.yml")
        );
    }

    #[test]
    fn missing_file_writes_template_and_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clusterup.yml");

        let result = load_configuration(&path);

        assert!(matches!(
            result,
            Err(ClusterupError::ConfigurationMissing { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn untouched_template_is_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clusterup.yml");
        let _ = load_configuration(&path);

        let result = load_configuration(&path);
        assert!(matches!(
            result,
            Err(ClusterupError::ConfigurationInvalid { ref key, .. }) if key == "environment.name"
        ));
    }

    #[test]
    fn existing_file_is_not_rewritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clusterup.yml");
        fs::write(&path, "cluster: {}\n").unwrap();

        let _ = load_configuration(&path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "cluster: {}\n");
    }

    #[test]
    fn valid_file_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clusterup.yml");
        fs::write(&path, VALID).unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.lookup("cluster.name"), Some("aks-dev".to_string()));
        assert_eq!(config.source(), path.as_path());
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let result = parse_configuration("cluster: [", Path::new("c.yml"));
        assert!(matches!(result, Err(ClusterupError::ConfigParseError { .. })));
    }

    #[test]
    fn scalar_document_is_parse_error() {
        let result = parse_configuration("just a string", Path::new("c.yml"));
        assert!(matches!(result, Err(ClusterupError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_parses_but_fails_validation() {
        let config = parse_configuration("", Path::new("c.yml")).unwrap();
        assert!(validate(&config).is_err());
    }
}
