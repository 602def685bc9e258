use crate::console::Command;
use crate::error::BridgeError;

fn parse(line: &str) -> Command {
    Command::parse(line)
        .expect("Line should parse")
        .expect("Line should produce a command")
}

#[test]
fn given_bare_verbs_when_parsed_then_matching_commands() {
    assert_eq!(parse("show"), Command::Show);
    assert_eq!(parse("wire"), Command::Wire);
    assert_eq!(parse("stats"), Command::Stats);
    assert_eq!(parse("changed"), Command::Changed);
    assert_eq!(parse("reset"), Command::Reset);
    assert_eq!(parse("save"), Command::Save);
    assert_eq!(parse("reload"), Command::Reload);
    assert_eq!(parse("send"), Command::Send);
    assert_eq!(parse("request"), Command::Request);
    assert_eq!(parse("help"), Command::Help);
    assert_eq!(parse("quit"), Command::Quit);
}

#[test]
fn given_mixed_case_and_padding_when_parsed_then_verb_still_matches() {
    assert_eq!(parse("  SHOW  "), Command::Show);
    assert_eq!(parse("Exit"), Command::Quit);
    assert_eq!(parse("?"), Command::Help);
}

#[test]
fn given_blank_line_when_parsed_then_no_command() {
    assert_eq!(Command::parse("").expect("Blank should parse"), None);
    assert_eq!(Command::parse("   \t").expect("Blank should parse"), None);
}

/// **VALUE**: Verifies the value of `set` is the whole rest of the line.
///
/// **BUG THIS CATCHES**: Splitting on every space would cut values like
/// descriptions or paths with spaces down to their first word.
#[test]
fn given_set_with_spaced_value_when_parsed_then_value_keeps_inner_spaces() {
    // GIVEN/WHEN: A value with inner spaces
    let command = parse("set MOTOR LABEL main  drive unit ");

    // THEN: Section and key are single words, value is the rest
    assert_eq!(
        command,
        Command::Set {
            section: "MOTOR".to_string(),
            key: "LABEL".to_string(),
            value: "main  drive unit".to_string(),
        }
    );
}

#[test]
fn given_set_without_value_when_parsed_then_value_is_empty() {
    assert_eq!(
        parse("set MOTOR SPEED"),
        Command::Set {
            section: "MOTOR".to_string(),
            key: "SPEED".to_string(),
            value: String::new(),
        }
    );
}

#[test]
fn given_check_when_parsed_then_section_key_value_are_kept_verbatim() {
    assert_eq!(
        parse("check Sensor gain 1.5"),
        Command::Check {
            section: "Sensor".to_string(),
            key: "gain".to_string(),
            value: "1.5".to_string(),
        }
    );
}

#[test]
fn given_set_missing_key_when_parsed_then_usage_error() {
    let result = Command::parse("set MOTOR");

    match result {
        Err(BridgeError::Command { message, .. }) => assert!(message.contains("usage")),
        other => panic!("Expected usage error, got {other:?}"),
    }
}

#[test]
fn given_unknown_verb_when_parsed_then_command_error() {
    assert!(matches!(
        Command::parse("launch rockets"),
        Err(BridgeError::Command { .. })
    ));
}
