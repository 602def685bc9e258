use bridge::console::{Command, Outcome, execute};
use bridge::error::BridgeError;

use sync_core::settings::Settings;
use sync_core::store::ConfigState;

use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

// ============================================================================
// Console commands against a real ConfigState
// Each test drives the same calls a user would type at the prompt
// ============================================================================

fn setup() -> (TempDir, Settings, ConfigState) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = Settings {
        remote_host: "127.0.0.1".to_string(),
        config_path: dir.path().join("config_received.ini"),
        backup_path: dir.path().join("config_backup.ini"),
        ..Settings::default()
    };
    let state = ConfigState::from_settings(&settings);
    (dir, settings, state)
}

async fn run(line: &str, state: &ConfigState, settings: &Settings) -> String {
    let command = Command::parse(line)
        .expect("Line should parse")
        .expect("Line should produce a command");
    match execute(command, state, settings)
        .await
        .expect("Command should succeed")
    {
        Outcome::Continue(output) => output,
        Outcome::Quit => panic!("Unexpected quit for '{line}'"),
    }
}

/// **VALUE**: Verifies the edit workflow: set, see it flagged, reset it away.
///
/// **WHY THIS MATTERS**: This is how a user reviews what a send would change
/// on the controller.
#[tokio::test]
async fn given_received_config_when_user_edits_then_changes_are_tracked_and_resettable() {
    // GIVEN: A received configuration
    let (_dir, settings, state) = setup();
    state.apply_received("[MOTOR]SPEED=100\n").await;

    // WHEN: Setting the same value, then a different one
    let same = run("set MOTOR SPEED 100", &state, &settings).await;
    let edited = run("set MOTOR SPEED 250", &state, &settings).await;

    // THEN: Only the real edit is flagged
    assert_eq!(same, "[MOTOR]SPEED=100 (unchanged)");
    assert_eq!(edited, "[MOTOR]SPEED=250 (changed)");
    assert_eq!(
        run("changed", &state, &settings).await,
        "[MOTOR]SPEED=250\n"
    );
    assert_eq!(run("check MOTOR SPEED 100", &state, &settings).await, "unchanged");

    // WHEN: Reset
    run("reset", &state, &settings).await;

    // THEN: Back to the received value
    assert_eq!(run("changed", &state, &settings).await, "no changes");
    assert_eq!(state.get("MOTOR", "SPEED").await.as_deref(), Some("100"));
}

#[tokio::test]
async fn given_store_when_wire_and_show_run_then_both_forms_are_rendered() {
    let (_dir, settings, state) = setup();
    assert_eq!(run("wire", &state, &settings).await, "(store is empty)");

    state.set("NETWORK", "IP", "10.0.0.2").await;
    state.set("MOTOR", "SPEED", "100").await;

    let wire = run("wire", &state, &settings).await;
    let show = run("show", &state, &settings).await;

    assert!(wire.contains("[NETWORK]IP=10.0.0.2\n"));
    assert!(wire.contains("[MOTOR]SPEED=100\n"));
    assert!(show.contains("[MOTOR]\nSPEED=100\n"));
    assert!(!show.contains("NETWORK"));
}

#[tokio::test]
async fn given_nothing_received_when_stats_run_then_sections_listed_and_never_received() {
    let (_dir, settings, state) = setup();
    state.set("A", "X", "1").await;
    state.set("B", "Y", "2").await;

    let stats = run("stats", &state, &settings).await;

    assert_eq!(stats, "sections: 2 [A, B], keys: 2, last received: never");
}

#[tokio::test]
async fn given_received_config_when_stats_run_then_snapshot_reports_receipt_time() {
    let (_dir, settings, state) = setup();
    state.apply_received("[MOTOR]SPEED=100\n[NETWORK]IP=10.0.0.2\n").await;

    let stats = run("stats", &state, &settings).await;

    assert!(stats.starts_with("sections: 2 [MOTOR, NETWORK], keys: 2, last received: "));
    assert!(!stats.ends_with("never"));
}

#[tokio::test]
async fn given_saved_edits_when_reloaded_then_they_come_back() {
    let (_dir, settings, state) = setup();
    assert!(
        run("reload", &state, &settings)
            .await
            .starts_with("no config file at")
    );

    run("set MOTOR SPEED 300", &state, &settings).await;
    run("save", &state, &settings).await;
    run("set MOTOR SPEED 1", &state, &settings).await;
    let reloaded = run("reload", &state, &settings).await;

    assert!(reloaded.starts_with("reloaded"));
    assert_eq!(state.get("MOTOR", "SPEED").await.as_deref(), Some("300"));
}

/// **VALUE**: Verifies `send` goes through the real outbound path.
#[tokio::test]
async fn given_received_config_when_send_run_then_controller_receives_frame() {
    // GIVEN: A fake controller and a received configuration
    let (_dir, mut settings, state) = setup();
    let controller = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind controller");
    settings.remote_port = controller.local_addr().expect("No local addr").port();
    let capture = tokio::spawn(async move {
        let (mut stream, _) = controller.accept().await.expect("Failed to accept");
        let mut received = String::new();
        stream
            .read_to_string(&mut received)
            .await
            .expect("Failed to read");
        received
    });
    state.apply_received("[MOTOR]SPEED=100\n").await;

    // WHEN: send
    let output = run("send", &state, &settings).await;

    // THEN: Controller got a framed config with the edited store
    let received = capture.await.expect("Controller task failed");
    let (header, payload) = received.split_once('\n').expect("Header missing");
    assert_eq!(header.parse::<usize>().expect("Numeric header"), payload.len());
    assert!(payload.contains("[MOTOR]SPEED=100\n"));
    assert_eq!(
        output,
        format!("sent {} bytes to {}", payload.len(), settings.remote_addr())
    );
}

#[tokio::test]
async fn given_unreachable_controller_when_request_run_then_core_error() {
    let (_dir, mut settings, state) = setup();
    settings.remote_port = {
        let probe = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind probe");
        probe.local_addr().expect("No local addr").port()
    };

    let result = execute(Command::Request, &state, &settings).await;

    assert!(matches!(result, Err(BridgeError::Core { .. })));
}

#[tokio::test]
async fn given_quit_when_executed_then_outcome_is_quit() {
    let (_dir, settings, state) = setup();

    let outcome = execute(Command::Quit, &state, &settings)
        .await
        .expect("Quit should succeed");

    assert_eq!(outcome, Outcome::Quit);
}
