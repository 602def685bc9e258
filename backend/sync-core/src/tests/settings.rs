use crate::error::settings::SettingsError;
use crate::settings::{
    ENV_BACKUP_PATH, ENV_CONFIG_PATH, ENV_LISTEN_PORT, ENV_REMOTE_HOST, ENV_REMOTE_PORT, Settings,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

const ALL_ENV_KEYS: [&str; 5] = [
    ENV_LISTEN_PORT,
    ENV_REMOTE_HOST,
    ENV_REMOTE_PORT,
    ENV_CONFIG_PATH,
    ENV_BACKUP_PATH,
];

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn given_no_configuration_when_defaulted_then_controller_ports_are_used() {
    let settings = Settings::default();

    assert_eq!(settings.listen_port, 12347);
    assert_eq!(settings.remote_host, "192.168.4.100");
    assert_eq!(settings.remote_port, 12348);
    assert_eq!(settings.config_path, PathBuf::from("config_received.ini"));
    assert_eq!(settings.backup_path, PathBuf::from("config_backup.ini"));
    assert_eq!(settings.max_payload_bytes, 1024 * 1024);
    assert_eq!(settings.remote_addr(), "192.168.4.100:12348");
}

#[test]
fn given_partial_toml_when_parsed_then_missing_fields_take_defaults() {
    let toml = "remote_host = \"10.0.0.7\"\nlisten_port = 4000\n";

    let settings =
        Settings::from_toml_str(toml, Path::new("bridge.toml")).expect("Settings should parse");

    assert_eq!(settings.remote_host, "10.0.0.7");
    assert_eq!(settings.listen_port, 4000);
    assert_eq!(settings.remote_port, 12348);
}

#[test]
fn given_malformed_toml_when_parsed_then_parse_error_names_the_file() {
    let result = Settings::from_toml_str("listen_port = \"not a number\"", Path::new("x.toml"));

    match result {
        Err(SettingsError::Parse { path, .. }) => assert_eq!(path, PathBuf::from("x.toml")),
        other => panic!("Expected Parse error, got {other:?}"),
    }
}

/// **VALUE**: Verifies environment overrides win over file values.
///
/// **WHY THIS MATTERS**: Deployments retarget the controller address with
/// `BRIDGE_*` variables without editing the settings file.
#[test]
fn given_overrides_when_applied_then_they_replace_file_values() {
    // GIVEN: Defaults plus every override
    let mut settings = Settings::default();
    let lookup = lookup_from(&[
        (ENV_LISTEN_PORT, "5000"),
        (ENV_REMOTE_HOST, " 127.0.0.1 "),
        (ENV_REMOTE_PORT, "5001"),
        (ENV_CONFIG_PATH, "/tmp/a.ini"),
        (ENV_BACKUP_PATH, "/tmp/b.ini"),
    ]);

    // WHEN: Applied
    settings.apply_overrides(lookup).expect("Overrides should apply");

    // THEN: All fields follow the environment
    assert_eq!(settings.listen_port, 5000);
    assert_eq!(settings.remote_host, "127.0.0.1");
    assert_eq!(settings.remote_port, 5001);
    assert_eq!(settings.config_path, PathBuf::from("/tmp/a.ini"));
    assert_eq!(settings.backup_path, PathBuf::from("/tmp/b.ini"));
}

#[test]
fn given_non_numeric_port_override_when_applied_then_validation_error() {
    let mut settings = Settings::default();

    let result = settings.apply_overrides(lookup_from(&[(ENV_REMOTE_PORT, "http")]));

    assert!(matches!(result, Err(SettingsError::Validation { .. })));
}

#[test]
fn given_invalid_values_when_validated_then_each_is_rejected() {
    let zero_port = Settings {
        listen_port: 0,
        ..Settings::default()
    };
    let blank_host = Settings {
        remote_host: "  ".to_string(),
        ..Settings::default()
    };
    let same_paths = Settings {
        backup_path: PathBuf::from("config_received.ini"),
        ..Settings::default()
    };
    let no_payload = Settings {
        max_payload_bytes: 0,
        ..Settings::default()
    };

    for settings in [zero_port, blank_host, same_paths, no_payload] {
        assert!(
            matches!(settings.validate(), Err(SettingsError::Validation { .. })),
            "Expected validation failure for {settings:?}"
        );
    }
    assert!(Settings::default().validate().is_ok());
}

/// **VALUE**: Verifies `load` reads the file and then the process environment.
///
/// **BUG THIS CATCHES**: Would catch the environment being ignored, or read
/// before the file so the file wins.
#[test]
#[serial]
fn given_file_and_environment_when_loaded_then_environment_wins() {
    // GIVEN: A settings file and a conflicting env var
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "remote_host = \"10.1.1.1\"\nremote_port = 7000\n")
        .expect("Failed to write settings");
    clear_env();
    // SAFETY: serialised with every other env-mutating test
    unsafe { std::env::set_var(ENV_REMOTE_PORT, "7100") };

    // WHEN: Loaded
    let result = Settings::load(&path);
    clear_env();

    // THEN: File host, environment port
    let settings = result.expect("Settings should load");
    assert_eq!(settings.remote_host, "10.1.1.1");
    assert_eq!(settings.remote_port, 7100);
}

#[test]
#[serial]
fn given_missing_file_when_loaded_then_defaults_are_used() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    clear_env();

    let settings = Settings::load(&dir.path().join("absent.toml")).expect("Defaults should load");

    assert_eq!(settings, Settings::default());
}

fn clear_env() {
    for key in ALL_ENV_KEYS {
        // SAFETY: only called from #[serial] tests
        unsafe { std::env::remove_var(key) };
    }
}
