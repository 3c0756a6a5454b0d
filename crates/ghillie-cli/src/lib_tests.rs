use super::*;

#[test]
fn parses_serve_command() {
    let cli = Cli::try_parse_from(["ghillie", "serve"]).unwrap();
    assert!(matches!(cli.command, Commands::Serve));
}

#[test]
fn parses_ingest_without_a_repository() {
    let cli = Cli::try_parse_from(["ghillie", "ingest"]).unwrap();
    match cli.command {
        Commands::Ingest { repository } => assert!(repository.is_none()),
        _ => panic!("expected Ingest command"),
    }
}

#[test]
fn parses_ingest_with_a_repository() {
    let cli = Cli::try_parse_from(["ghillie", "ingest", "acme/widgets"]).unwrap();
    match cli.command {
        Commands::Ingest { repository } => assert_eq!(repository.as_deref(), Some("acme/widgets")),
        _ => panic!("expected Ingest command"),
    }
}

#[test]
fn parses_report_requires_a_repository() {
    assert!(Cli::try_parse_from(["ghillie", "report"]).is_err());

    let cli = Cli::try_parse_from(["ghillie", "report", "acme/widgets"]).unwrap();
    match cli.command {
        Commands::Report { repository } => assert_eq!(repository, "acme/widgets"),
        _ => panic!("expected Report command"),
    }
}

#[test]
fn parses_config_check() {
    let cli = Cli::try_parse_from(["ghillie", "config", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigCommands::Check
        }
    ));
}

#[test]
fn rejects_an_unknown_command() {
    assert!(Cli::try_parse_from(["ghillie", "bogus"]).is_err());
}

#[test]
fn configuration_errors_exit_with_code_one() {
    let err = CliError::Configuration("bad config".to_string());
    assert_eq!(exit_code(&err), 1);
}

#[test]
fn service_errors_exit_with_code_two() {
    let err = CliError::Service(ServiceError::RepositoryNotFound {
        owner: "acme".to_string(),
        name: "widgets".to_string(),
    });
    assert_eq!(exit_code(&err), 2);
}
