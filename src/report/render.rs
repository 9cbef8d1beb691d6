//! Report rendering and persistence.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::error::{ClusterupError, Result};
use crate::report::execution::{ExecutionReport, OverallStatus};
use crate::steps::StepStatus;
use crate::ui::format_duration;

/// Prefix of persisted report file names.
pub const REPORT_PREFIX: &str = "clusterup-report-";

/// Upper bound on same-second suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Renders and stores run reports.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    summary: Vec<(String, String)>,
}

impl ReportGenerator {
    /// Create a generator with a fixed configuration summary.
    pub fn new(summary: Vec<(String, String)>) -> Self {
        Self { summary }
    }

    /// Create a generator summarizing the given configuration.
    pub fn from_configuration(config: &Configuration) -> Self {
        Self::new(config.summary())
    }

    /// Render a report as plain text.
    ///
    /// The output depends only on the report and the configuration
    /// summary, so rendering the same report twice gives the same text.
    pub fn render(&self, report: &ExecutionReport) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "clusterup run report");
        let _ = writeln!(
            out,
            "Started: {}",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        if !self.summary.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Configuration:");
            let width = self.summary.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in &self.summary {
                let _ = writeln!(out, "  {:<width$}  {}", key, value, width = width);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Steps:");
        let width = report
            .results
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0);
        for result in &report.results {
            let status = result.status();
            let mut line = format!(
                "  {} {:<width$}  {}",
                status.display_char(),
                result.name,
                status,
                width = width
            );
            if status == StepStatus::Succeeded || status == StepStatus::Failed {
                let _ = write!(line, " ({})", format_duration(result.duration));
            }
            let _ = writeln!(out, "{}", line);
        }

        let skipped = report.skipped().count();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Succeeded: {} of {} attempted ({} skipped)",
            report.success_count, report.total_count, skipped
        );
        let _ = writeln!(
            out,
            "Total duration: {}",
            format_duration(report.total_duration)
        );
        let _ = writeln!(out, "Status: {}", status_line(report.overall_status));

        if report.overall_status == OverallStatus::PartialFailure {
            let _ = writeln!(out);
            let _ = writeln!(out, "Failed steps:");
            for result in report.failed() {
                let _ = writeln!(
                    out,
                    "  - {}: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        out
    }

    /// Render a report as pretty-printed JSON.
    pub fn render_json(&self, report: &ExecutionReport) -> Result<String> {
        serde_json::to_string_pretty(report).map_err(|e| ClusterupError::Other(e.into()))
    }

    /// File name the report is persisted under.
    pub fn file_name(report: &ExecutionReport) -> String {
        format!(
            "{}{}.txt",
            REPORT_PREFIX,
            report.started_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Write the rendered report into `dir`.
    ///
    /// An existing report is never overwritten: a second run started in the
    /// same second gets a `-2`, `-3`, ... suffix. Failures are logged and
    /// reported as `None`; they never fail the run.
    pub fn persist(&self, report: &ExecutionReport, dir: &Path) -> Option<PathBuf> {
        match self.write(report, dir) {
            Ok(path) => {
                debug!("Report written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                let error = ClusterupError::ReportPersistenceFailure {
                    path: dir.join(Self::file_name(report)),
                    message: e.to_string(),
                };
                warn!("{}", error);
                None
            }
        }
    }

    fn write(&self, report: &ExecutionReport, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let name = Self::file_name(report);
        let stem = name.trim_end_matches(".txt");
        let text = self.render(report);

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let path = if attempt == 1 {
                dir.join(&name)
            } else {
                dir.join(format!("{}-{}.txt", stem, attempt))
            };
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(text.as_bytes())?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("{} reports already exist for {}", MAX_NAME_ATTEMPTS, stem),
        ))
    }
}

fn status_line(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::AllSucceeded => "SUCCESS - all attempted steps succeeded",
        OverallStatus::PartialFailure => "PARTIAL FAILURE - see failed steps below",
        OverallStatus::DryRun => "DRY RUN - no steps were executed",
    }
}
