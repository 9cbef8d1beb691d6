//! External collaborator invocation.
//!
//! Every step delegates to an external program. The orchestrator only cares
//! whether that program could be started and how it exited, so invocation
//! sits behind the one-method [`ExternalCollaborator`] trait and tests can
//! swap in scripted doubles.

use crate::error::{ClusterupError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// How often a running child is polled when a timeout applies.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long captured output is still collected after a timed-out child is killed.
const READER_GRACE: Duration = Duration::from_millis(500);

/// A fully resolved request to run an external program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run.
    pub program: String,

    /// Arguments, in order.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the inherited environment).
    pub env: HashMap<String, String>,

    /// Kill the program if it runs longer than this. None = no bound.
    pub timeout: Option<Duration>,

    /// Capture stdout/stderr instead of inheriting them.
    pub capture_output: bool,
}

impl Invocation {
    /// Create an invocation of `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ..Default::default()
        }
    }

    /// Shell-style rendering, for logs and dry-run output.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| quote(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() {
        "''".to_string()
    } else if part.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", part.replace('\'', r"'\''"))
    } else {
        part.to_string()
    }
}

/// How a collaborator finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Exit code (None if killed by signal or timeout).
    pub exit_code: Option<i32>,

    /// Whether the run was killed for exceeding its timeout.
    pub timed_out: bool,

    /// Captured standard output (empty unless captured).
    pub stdout: String,

    /// Captured standard error (empty unless captured).
    pub stderr: String,
}

impl Outcome {
    /// An outcome with the given exit code and no output.
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Default::default()
        }
    }

    /// Exit code 0 is success; anything else is failure.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Human-readable reason for a failed outcome.
    pub fn failure_detail(&self) -> String {
        let base = if self.timed_out {
            "timed out and was killed".to_string()
        } else {
            match self.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            }
        };

        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) => format!("{}: {}", base, last.trim()),
            None => base,
        }
    }
}

/// Something that can run an external program and report how it exited.
///
/// `Err` means the program could not be run at all (e.g. not found).
pub trait ExternalCollaborator {
    /// Run the invocation to completion.
    fn invoke(&self, invocation: &Invocation) -> Result<Outcome>;
}

/// Runs collaborators as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCollaborator;

impl ProcessCollaborator {
    /// Create a process-backed collaborator.
    pub fn new() -> Self {
        Self
    }
}

impl ExternalCollaborator for ProcessCollaborator {
    fn invoke(&self, invocation: &Invocation) -> Result<Outcome> {
        let command_line = invocation.command_line();
        let launch_error = |e: std::io::Error| ClusterupError::CommandFailed {
            command: command_line.clone(),
            message: e.to_string(),
        };

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());

        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&invocation.env);

        if invocation.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        // A bounded run gets its own process group so a timeout reaches grandchildren too
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if invocation.timeout.is_some() {
                cmd.process_group(0);
            }
        }

        debug!("Spawning: {}", command_line);
        let mut child = cmd.spawn().map_err(launch_error)?;

        // Drain pipes on their own threads so a chatty child can't block on a full pipe
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let (status, timed_out) = wait(&mut child, invocation.timeout).map_err(launch_error)?;

        let stdout = collect(stdout_reader, timed_out);
        let stderr = collect(stderr_reader, timed_out);

        Ok(Outcome {
            exit_code: if timed_out { None } else { status.code() },
            timed_out,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Collect a reader's output.
///
/// After a timeout a surviving descendant may still hold the pipe open, so the
/// wait is bounded and the reader thread is left to finish on its own.
fn collect(reader: Option<Receiver<String>>, timed_out: bool) -> String {
    let Some(rx) = reader else {
        return String::new();
    };
    if timed_out {
        rx.recv_timeout(READER_GRACE).unwrap_or_default()
    } else {
        rx.recv().unwrap_or_default()
    }
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<(ExitStatus, bool)> {
    let Some(limit) = timeout else {
        return Ok((child.wait()?, false));
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if start.elapsed() >= limit {
            kill_tree(child);
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill(2) with a negative pid only signals the group the child leads.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    // Fails if the child exited in between; wait() still reaps it
    let _ = child.kill();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation {
            capture_output: true,
            ..Invocation::new("sh", vec!["-c".to_string(), script.to_string()])
        }
    }

    #[test]
    fn command_line_quotes_empty_and_spaced_args() {
        let inv = Invocation::new(
            "deploy.sh",
            vec!["-Name".into(), "".into(), "-Title".into(), "two words".into()],
        );
        assert_eq!(inv.command_line(), "deploy.sh -Name '' -Title 'two words'");
    }

    #[test]
    fn outcome_success_requires_zero_exit() {
        assert!(Outcome::exited(0).success());
        assert!(!Outcome::exited(1).success());
        assert!(!Outcome::default().success());
        let timed_out = Outcome {
            exit_code: Some(0),
            timed_out: true,
            ..Default::default()
        };
        assert!(!timed_out.success());
    }

    #[test]
    fn failure_detail_quotes_last_stderr_line() {
        let outcome = Outcome {
            exit_code: Some(2),
            stderr: "warming up\nquota exceeded\n\n".to_string(),
            ..Default::default()
        };
        assert_eq!(outcome.failure_detail(), "exited with code 2: quota exceeded");
        assert_eq!(Outcome::default().failure_detail(), "terminated by signal");
    }

    #[cfg(unix)]
    #[test]
    fn process_success_and_output() {
        let outcome = ProcessCollaborator::new()
            .invoke(&sh("echo hello; echo oops >&2"))
            .unwrap();
        assert!(outcome.success());
        assert!(outcome.stdout.contains("hello"));
        assert!(outcome.stderr.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn process_nonzero_exit() {
        let outcome = ProcessCollaborator::new().invoke(&sh("exit 3")).unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn process_receives_args_env_and_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut inv = Invocation::new(
            "sh",
            vec![
                "-c".into(),
                "printf '%s|%s|%s' \"$1\" \"$CLUSTER\" \"$(pwd)\"".into(),
                "sh".into(),
                "-Flag".into(),
            ],
        );
        inv.capture_output = true;
        inv.cwd = Some(temp.path().to_path_buf());
        inv.env.insert("CLUSTER".into(), "aks-dev".into());

        let outcome = ProcessCollaborator::new().invoke(&inv).unwrap();
        assert!(outcome.stdout.starts_with("-Flag|aks-dev|"));
    }

    #[test]
    fn missing_program_is_launch_error() {
        let inv = Invocation::new("/nonexistent/clusterup-collaborator", vec![]);
        let err = ProcessCollaborator::new().invoke(&inv).unwrap_err();
        assert!(matches!(err, ClusterupError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_long_running_child() {
        let inv = Invocation {
            timeout: Some(Duration::from_millis(200)),
            ..Invocation::new("sleep", vec!["5".to_string()])
        };
        let start = Instant::now();
        let outcome = ProcessCollaborator::new().invoke(&inv).unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.success());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_is_not_held_up_by_grandchildren() {
        let inv = Invocation {
            timeout: Some(Duration::from_millis(200)),
            ..sh("sleep 6; echo done")
        };
        let start = Instant::now();
        let outcome = ProcessCollaborator::new().invoke(&inv).unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.stdout.contains("done"));
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
