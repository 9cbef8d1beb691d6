//! Authenticated session capability.
//!
//! The bring-up collaborators depend on ambient state, most importantly a
//! logged-in cloud CLI session. Rather than reading that state from the
//! process environment wherever it's needed, it is modelled as an explicit
//! [`Session`] handed to the prerequisite probes and the step runner.

use crate::config::Configuration;
use crate::shell::{ExternalCollaborator, Invocation};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable carrying the environment name to collaborators.
pub const ENVIRONMENT_VAR: &str = "CLUSTERUP_ENVIRONMENT";

/// The session the collaborators run under.
pub trait Session {
    /// Whether an authenticated session exists.
    fn is_authenticated(&self) -> bool;

    /// Environment exported to every collaborator.
    fn env(&self) -> HashMap<String, String>;
}

/// A session whose state is fixed up front.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    authenticated: bool,
    env: HashMap<String, String>,
}

impl StaticSession {
    /// An authenticated session with no extra environment.
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            env: HashMap::new(),
        }
    }

    /// A session that reports no login.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }
}

impl Session for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn env(&self) -> HashMap<String, String> {
        self.env.clone()
    }
}

/// A session verified by running a check command (e.g. `az account show`).
///
/// The check runs at most once; its answer is cached for the run.
pub struct CommandSession<'a> {
    check: Vec<String>,
    cwd: PathBuf,
    env: HashMap<String, String>,
    collaborator: &'a dyn ExternalCollaborator,
    authenticated: OnceCell<bool>,
}

impl<'a> CommandSession<'a> {
    /// Build the session described by the configuration.
    pub fn from_configuration(
        config: &Configuration,
        collaborator: &'a dyn ExternalCollaborator,
    ) -> Self {
        let mut env = config.session().env.clone();
        if let Some(name) = config.lookup("environment.name") {
            env.insert(ENVIRONMENT_VAR.to_string(), name);
        }

        Self {
            check: config.prerequisites().session_check.clone(),
            cwd: config.root_dir(),
            env,
            collaborator,
            authenticated: OnceCell::new(),
        }
    }

    /// Whether a check command is configured at all.
    pub fn has_check(&self) -> bool {
        !self.check.is_empty()
    }

    fn run_check(&self) -> bool {
        let Some((program, args)) = self.check.split_first() else {
            return true;
        };

        let invocation = Invocation {
            cwd: Some(self.cwd.clone()),
            env: self.env.clone(),
            capture_output: true,
            ..Invocation::new(program.clone(), args.to_vec())
        };

        match self.collaborator.invoke(&invocation) {
            Ok(outcome) => {
                debug!(
                    "Session check '{}' {}",
                    invocation.command_line(),
                    if outcome.success() { "passed" } else { "failed" }
                );
                outcome.success()
            }
            Err(e) => {
                debug!("Session check could not run: {}", e);
                false
            }
        }
    }
}

impl Session for CommandSession<'_> {
    fn is_authenticated(&self) -> bool {
        *self.authenticated.get_or_init(|| self.run_check())
    }

    fn env(&self) -> HashMap<String, String> {
        self.env.clone()
    }
}
