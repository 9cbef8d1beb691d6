//! Library integration tests.

use clusterup::ClusterupError;

#[test]
fn error_types_are_public() {
    let err = ClusterupError::UnknownStep {
        name: "dns".into(),
    };
    assert!(err.to_string().contains("dns"));
    assert!(err.is_configuration());
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> clusterup::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clusterup::cli::{Cli, Commands};
    use clap::Parser;

    let cli = Cli::parse_from(["clusterup", "run", "--json", "--no-report"]);

    if let Some(Commands::Run(args)) = cli.command {
        assert!(args.json);
        assert!(args.no_report);
        assert!(!args.dry_run);
    } else {
        panic!("Expected Run command");
    }
}

#[test]
fn prerequisite_error_lists_every_failure() {
    let err = ClusterupError::PrerequisiteUnsatisfied {
        failures: vec!["tool:helm".into(), "session".into()],
    };
    assert_eq!(
        err.to_string(),
        "Unsatisfied prerequisites: tool:helm, session"
    );
}
