//! List command implementation.
//!
//! `clusterup list` prints the pipeline in execution order with each step's
//! collaborator and whether it would run.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::config::load_unvalidated;
use crate::error::Result;
use crate::steps::{build_steps, StepDefinition};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    config_path: PathBuf,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(config_path: &Path, args: ListArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }
}

/// Render the step listing.
pub fn render_steps(steps: &[StepDefinition]) -> String {
    let width = steps.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();

    for (index, step) in steps.iter().enumerate() {
        let state = match &step.skip {
            Some(reason) => format!("skip: {}", reason),
            None => "run".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>2}. {:<width$}  {}  [{}]",
            index + 1,
            step.name,
            step.target,
            state,
            width = width
        );
        if let Some(description) = &step.description {
            let _ = writeln!(out, "    {:<width$}  {}", "", description, width = width);
        }
    }

    out
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_unvalidated(&self.config_path)?;
        let skip: HashSet<String> = self.args.skip.iter().cloned().collect();
        let steps = build_steps(&config, &skip)?;

        ui.show_header(&format!("Pipeline ({})", self.config_path.display()));
        ui.show_block(&render_steps(&steps));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::SkipReason;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn render_shows_order_and_skip_state() {
        let steps = vec![
            StepDefinition::new("cluster", "scripts/create-cluster.sh"),
            StepDefinition::new("monitoring", "scripts/install-monitoring.sh")
                .skipped(SkipReason::FeatureDisabled("monitoring".into())),
        ];

        let text = render_steps(&steps);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], " 1. cluster     scripts/create-cluster.sh  [run]");
        assert_eq!(
            lines[1],
            " 2. monitoring  scripts/install-monitoring.sh  [skip: features.monitoring is off]"
        );
    }

    #[test]
    fn lists_default_pipeline_with_placeholders() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clusterup.yml");
        fs::write(&path, "features: {security: true}\n").unwrap();
        let mut ui = MockUI::new();

        let result = ListCommand::new(&path, ListArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_block("cluster"));
        assert!(ui.has_block("sample-app"));
        assert!(ui.has_block("[skip: features.sample_app is off]"));
    }
}
