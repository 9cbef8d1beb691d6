//! Prerequisite checking.
//!
//! A prerequisite is a name plus an opaque predicate. The checker never
//! short-circuits: every probe runs, so an operator sees every missing
//! prerequisite in one pass instead of fixing them one at a time.

use crate::error::{ClusterupError, Result};
use tracing::debug;

/// A named, opaque prerequisite probe.
pub struct Prerequisite<'a> {
    /// Name reported when the probe fails.
    pub name: String,
    probe: Box<dyn Fn() -> bool + 'a>,
}

impl<'a> Prerequisite<'a> {
    /// Create a prerequisite from a name and a predicate.
    pub fn new(name: impl Into<String>, probe: impl Fn() -> bool + 'a) -> Self {
        Self {
            name: name.into(),
            probe: Box::new(probe),
        }
    }

    /// Run the probe.
    pub fn is_satisfied(&self) -> bool {
        (self.probe)()
    }
}

impl std::fmt::Debug for Prerequisite<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prerequisite")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Outcome of checking a set of prerequisites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteReport {
    /// Every prerequisite that was checked, in order.
    pub checked: Vec<String>,
    /// Names of failed prerequisites, in input order.
    pub failures: Vec<String>,
}

impl PrerequisiteReport {
    /// Whether every probe succeeded.
    pub fn all_satisfied(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert into an error when anything failed.
    ///
    /// # Errors
    ///
    /// Returns `PrerequisiteUnsatisfied` listing every failure.
    pub fn into_result(self) -> Result<()> {
        if self.all_satisfied() {
            Ok(())
        } else {
            Err(ClusterupError::PrerequisiteUnsatisfied {
                failures: self.failures,
            })
        }
    }
}

/// Run every probe and collect the failures.
pub fn check_all(requirements: &[Prerequisite<'_>]) -> PrerequisiteReport {
    let mut report = PrerequisiteReport::default();

    for requirement in requirements {
        let satisfied = requirement.is_satisfied();
        debug!(
            "Prerequisite '{}': {}",
            requirement.name,
            if satisfied { "ok" } else { "missing" }
        );
        report.checked.push(requirement.name.clone());
        if !satisfied {
            report.failures.push(requirement.name.clone());
        }
    }

    report
}
