//! Platform detection.

/// Environment variables whose presence marks a CI run.
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    is_ci_with(|var| std::env::var_os(var).is_some())
}

/// CI detection against an arbitrary variable lookup.
pub fn is_ci_with(is_set: impl Fn(&str) -> bool) -> bool {
    CI_VARS.iter().any(|var| is_set(var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_known_ci_var_counts() {
        for var in CI_VARS {
            assert!(is_ci_with(|name| name == *var), "{} not detected", var);
        }
    }

    #[test]
    fn no_ci_vars_means_local() {
        assert!(!is_ci_with(|_| false));
        assert!(!is_ci_with(|name| name == "HOME"));
    }
}
