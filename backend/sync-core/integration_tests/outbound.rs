use crate::helpers::{WAIT, is_status, test_settings, wait_for};

use sync_core::events::ConnectionStatus;
use sync_core::settings::Settings;
use sync_core::store::ConfigState;
use sync_core::transport::frame::{Frame, read_frame};
use sync_core::transport::{OutboundAction, send_or_request};

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Fake remote controller: accepts one connection and decodes one frame.
async fn fake_controller(settings: &mut Settings) -> JoinHandle<Frame> {
    let peer = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake controller");
    settings.remote_port = peer.local_addr().expect("No local addr").port();

    tokio::spawn(async move {
        let (mut stream, _) = peer.accept().await.expect("Failed to accept");
        read_frame(&mut stream, 1024 * 1024)
            .await
            .expect("Failed to read frame")
    })
}

/// **VALUE**: Verifies "send" before anything was received asks for the
/// controller's config instead of pushing an empty one.
///
/// **BUG THIS CATCHES**: Sending an empty store would wipe the controller.
#[tokio::test]
async fn given_no_baseline_when_send_triggered_then_request_goes_out() {
    // GIVEN: Fresh state and a fake controller
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = test_settings(&dir);
    settings.listen_port = 12347;
    let controller = fake_controller(&mut settings).await;
    let state = ConfigState::from_settings(&settings);

    // WHEN: Send is triggered
    let action = send_or_request(&state, &settings)
        .await
        .expect("Request should succeed");

    // THEN: A zero-length request was sent and nothing saved
    let frame = timeout(WAIT, controller)
        .await
        .expect("Controller timed out")
        .expect("Controller task failed");
    assert_eq!(action, OutboundAction::Requested);
    assert_eq!(frame, Frame::Request);
    assert!(!settings.config_path.exists());
}

/// **VALUE**: Verifies a real send stamps the port handshake, sends the wire
/// text and saves the local file.
///
/// **WHY THIS MATTERS**: The controller reads CONFIG_SYNC to know where to
/// answer; stale ports there break the next exchange.
#[tokio::test]
async fn given_baseline_when_send_triggered_then_ports_stamped_sent_and_saved() {
    // GIVEN: Received config with an edit on top
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = test_settings(&dir);
    settings.listen_port = 12347;
    let controller = fake_controller(&mut settings).await;
    let state = ConfigState::from_settings(&settings);
    state
        .apply_received("[MOTOR]SPEED=100\n[CONFIG_SYNC]WPF_RECV_PORT=1\n")
        .await;
    state.set("MOTOR", "SPEED", "250").await;

    // WHEN: Send is triggered
    let action = send_or_request(&state, &settings)
        .await
        .expect("Send should succeed");

    // THEN: Controller got the edited value and current ports
    let frame = timeout(WAIT, controller)
        .await
        .expect("Controller timed out")
        .expect("Controller task failed");
    let text = match frame {
        Frame::Config(text) => text,
        other => panic!("Expected a config frame, got {other:?}"),
    };
    assert!(text.contains("[MOTOR]SPEED=250\n"));
    assert!(text.contains("[CONFIG_SYNC]WPF_RECV_PORT=12347\n"));
    assert!(text.contains(&format!(
        "[CONFIG_SYNC]CPP_RECV_PORT={}\n",
        settings.remote_port
    )));
    assert_eq!(action, OutboundAction::Sent { bytes: text.len() });

    // THEN: Saved locally, previous file backed up
    let saved = std::fs::read_to_string(&settings.config_path).expect("Config file missing");
    assert!(saved.contains("SPEED=250"));
    let backup = std::fs::read_to_string(&settings.backup_path).expect("Backup missing");
    assert!(backup.contains("SPEED=100"));
}

#[tokio::test]
async fn given_unreachable_controller_when_send_triggered_then_error_and_status() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = test_settings(&dir);
    settings.remote_port = {
        let probe = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind probe");
        probe.local_addr().expect("No local addr").port()
    };
    let state = ConfigState::from_settings(&settings);
    let mut events = state.events().subscribe();

    let result = send_or_request(&state, &settings).await;

    assert!(result.is_err());
    wait_for(&mut events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::SendFailed { .. }))
    })
    .await;
}
