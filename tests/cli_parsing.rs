//! Tests for CLI subcommand parsing.

use clap::Parser;
use scoreboard::config::{Command, LogFormat, LogLevel, Opt};
use scoreboard::ServiceAction;
use std::path::PathBuf;

#[test]
fn test_show_all_as_json() {
    let opt = Opt::try_parse_from(["scoreboard", "show", "ALL", "--json"]).unwrap();
    match opt.command {
        Command::Show { game, json } => {
            assert_eq!(game, "ALL");
            assert!(json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_service_action_values() {
    let opt = Opt::try_parse_from(["scoreboard", "service", "nginx", "restart"]).unwrap();
    assert!(matches!(
        opt.command,
        Command::Service { ref name, action: ServiceAction::Restart } if name == "nginx"
    ));

    let err = Opt::try_parse_from(["scoreboard", "service", "nginx", "reload"]);
    assert!(err.is_err());
}

#[test]
fn test_add_requires_numeric_score() {
    assert!(Opt::try_parse_from(["scoreboard", "add", "uno", "Ann", "ten"]).is_err());
    let opt = Opt::try_parse_from(["scoreboard", "add", "uno", "Ann", "10"]).unwrap();
    assert!(matches!(opt.command, Command::Add { score: 10, .. }));
}

#[test]
fn test_update_delta_defaults_to_one() {
    let opt = Opt::try_parse_from(["scoreboard", "update", "carrom", "Ravi"]).unwrap();
    assert!(matches!(opt.command, Command::Update { delta: 1, .. }));
}

#[test]
fn test_global_flags() {
    let opt = Opt::try_parse_from([
        "scoreboard",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--audit-log",
        "/tmp/audit.log",
        "--log-table",
        "History",
        "sql",
    ])
    .unwrap();
    assert!(matches!(opt.log_level, LogLevel::Debug));
    assert!(matches!(opt.log_format, LogFormat::Json));
    assert!(matches!(opt.command, Command::Sql));

    let config = opt.to_config();
    assert_eq!(config.audit_log_path, PathBuf::from("/tmp/audit.log"));
    assert_eq!(config.log_table, "History");
}

#[test]
fn test_subcommand_is_required() {
    assert!(Opt::try_parse_from(["scoreboard"]).is_err());
}
