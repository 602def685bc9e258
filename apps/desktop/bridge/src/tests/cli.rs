use crate::cli::Args;

use std::path::PathBuf;

use clap::Parser;

#[test]
fn given_no_arguments_when_parsed_then_default_settings_file_is_used() {
    let args = Args::try_parse_from(["bridge"]).expect("Defaults should parse");

    assert_eq!(args.settings, PathBuf::from("bridge.toml"));
    assert_eq!(args.log_dir, None);
    assert!(args.resolve_log_dir().ends_with("logs"));
}

#[test]
fn given_explicit_paths_when_parsed_then_they_are_used() {
    let args = Args::try_parse_from([
        "bridge",
        "--settings",
        "/etc/bridge/site.toml",
        "--log-dir",
        "/var/log/bridge",
    ])
    .expect("Arguments should parse");

    assert_eq!(args.settings, PathBuf::from("/etc/bridge/site.toml"));
    assert_eq!(args.resolve_log_dir(), PathBuf::from("/var/log/bridge"));
}

#[test]
fn given_unknown_flag_when_parsed_then_error() {
    assert!(Args::try_parse_from(["bridge", "--port", "1"]).is_err());
}
