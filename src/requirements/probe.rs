//! Standard prerequisite probes.
//!
//! Tools are looked up by walking PATH entries directly rather than shelling
//! out to `which`, whose behavior varies across systems.

use crate::config::Configuration;
use crate::requirements::checker::Prerequisite;
use crate::session::Session;
use std::path::{Path, PathBuf};

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Names containing a path separator are checked as given.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return (direct.is_file() && is_executable(direct)).then(|| direct.to_path_buf());
    }

    let extensions: &[&str] = if cfg!(windows) {
        &["", ".exe", ".cmd", ".bat"]
    } else {
        &[""]
    };

    path_entries.iter().find_map(|dir| {
        extensions.iter().find_map(|ext| {
            let candidate = dir.join(format!("{}{}", tool, ext));
            (candidate.is_file() && is_executable(&candidate)).then_some(candidate)
        })
    })
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Probe that succeeds when `tool` is invocable from `path_entries`.
pub fn tool_probe<'a>(tool: &str, path_entries: &'a [PathBuf]) -> Prerequisite<'a> {
    let name = tool.to_string();
    Prerequisite::new(format!("tool:{}", tool), move || {
        resolve_tool_path(&name, path_entries).is_some()
    })
}

/// Probe that succeeds when the session is authenticated.
pub fn session_probe<'a>(session: &'a dyn Session) -> Prerequisite<'a> {
    Prerequisite::new("session", move || session.is_authenticated())
}

/// Build the prerequisite list the configuration asks for.
///
/// One `tool:<name>` probe per configured tool, then a `session` probe when
/// a session check command is configured.
pub fn from_configuration<'a>(
    config: &Configuration,
    session: &'a dyn Session,
    path_entries: &'a [PathBuf],
) -> Vec<Prerequisite<'a>> {
    let prerequisites = config.prerequisites();
    let mut list: Vec<Prerequisite<'a>> = prerequisites
        .tools
        .iter()
        .map(|tool| tool_probe(tool, path_entries))
        .collect();

    if !prerequisites.session_check.is_empty() {
        list.push(session_probe(session));
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_configuration;
    use crate::requirements::checker::check_all;
    use crate::session::StaticSession;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn resolves_tool_in_path_entries() {
        let temp = TempDir::new().unwrap();
        make_executable(&temp.path().join("kubectl"));
        let entries = vec![PathBuf::from("/nonexistent"), temp.path().to_path_buf()];

        assert_eq!(
            resolve_tool_path("kubectl", &entries),
            Some(temp.path().join("kubectl"))
        );
        assert_eq!(resolve_tool_path("helm", &entries), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_not_a_tool() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("az"), "").unwrap();
        let entries = vec![temp.path().to_path_buf()];
        assert_eq!(resolve_tool_path("az", &entries), None);
    }

    #[cfg(unix)]
    #[test]
    fn path_with_separator_is_checked_directly() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("bin-tool");
        make_executable(&tool);
        let name = tool.to_string_lossy().to_string();
        assert_eq!(resolve_tool_path(&name, &[]), Some(tool));
    }

    #[test]
    fn from_configuration_builds_tool_and_session_probes() {
        let config = parse_configuration(
            "prerequisites:\n  tools: [az, kubectl]\n  session_check: [az, account, show]\n",
            Path::new("clusterup.yml"),
        )
        .unwrap();
        let session = StaticSession::anonymous();
        let entries: Vec<PathBuf> = Vec::new();

        let list = from_configuration(&config, &session, &entries);
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["tool:az", "tool:kubectl", "session"]);

        let report = check_all(&list);
        assert_eq!(report.failures, ["tool:az", "tool:kubectl", "session"]);
    }

    #[test]
    fn session_probe_omitted_without_check() {
        let config =
            parse_configuration("prerequisites:\n  tools: []\n", Path::new("c.yml")).unwrap();
        let session = StaticSession::anonymous();
        let entries: Vec<PathBuf> = Vec::new();
        assert!(from_configuration(&config, &session, &entries).is_empty());
    }
}
