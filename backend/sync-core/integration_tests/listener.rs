use crate::helpers::{WAIT, is_status, send_raw, start, wait_for};

use sync_core::events::{BridgeEvent, ConnectionStatus};
use sync_core::store::NETWORK_SECTION;

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

// ============================================================================
// Inbound listener tests
// Drive the listener over real TCP the way the remote controller does
// ============================================================================

/// **VALUE**: Verifies a complete payload updates the store, the baseline and
/// the persisted file.
///
/// **WHY THIS MATTERS**: This is the main inbound path. Everything else the
/// bridge does starts from a received configuration.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The payload is parsed but the baseline is not committed
/// - The file is not written after a receipt
/// - The ConfigReceived event carries something other than the payload
#[tokio::test]
async fn given_listener_when_full_payload_arrives_then_store_baseline_and_file_update() {
    // GIVEN: A running listener
    let mut running = start().await;
    let payload = "[MOTOR]SPEED=100\n[NETWORK]IP=10.0.0.2\n";

    // WHEN: A complete frame arrives
    let frame = format!("{}\n{}", payload.len(), payload);
    send_raw(running.addr(), frame.as_bytes()).await;

    // THEN: Event with the exact payload
    let event = wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigReceived { .. })
    })
    .await;
    assert_eq!(
        event,
        BridgeEvent::ConfigReceived {
            payload: payload.to_string()
        }
    );

    // THEN: Store and baseline hold the values
    assert_eq!(
        running.state.get("MOTOR", "SPEED").await.as_deref(),
        Some("100")
    );
    assert!(running.state.has_baseline().await);
    assert!(!running.state.is_changed("MOTOR", "SPEED", "100").await);

    // THEN: File written without the link section
    let file = std::fs::read_to_string(&running.settings.config_path)
        .expect("Config file should exist");
    assert!(file.contains("[MOTOR]\nSPEED=100\n"));
    assert!(!file.contains(NETWORK_SECTION));

    running.handle.shutdown().await;
}

/// **VALUE**: Verifies a zero-length frame is surfaced as a configuration request.
///
/// **BUG THIS CATCHES**: Would catch a request being treated as an empty
/// configuration and wiping the store.
#[tokio::test]
async fn given_listener_when_zero_length_frame_arrives_then_config_requested() {
    // GIVEN: A listener whose store already has content
    let mut running = start().await;
    running.state.set("MOTOR", "SPEED", "100").await;

    // WHEN: "0\n" arrives
    send_raw(running.addr(), b"0\n").await;

    // THEN: A request event, store untouched
    let event = wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigRequested { .. })
    })
    .await;
    assert!(matches!(event, BridgeEvent::ConfigRequested { .. }));
    assert_eq!(
        running.state.get("MOTOR", "SPEED").await.as_deref(),
        Some("100")
    );
    assert!(!running.state.has_baseline().await);

    running.handle.shutdown().await;
}

/// **VALUE**: Verifies a bad header only drops that connection.
///
/// **WHY THIS MATTERS**: The listener must keep serving after a malformed
/// frame; otherwise one bad packet takes the bridge offline.
#[tokio::test]
async fn given_invalid_header_when_next_peer_sends_valid_frame_then_it_is_received() {
    // GIVEN: A running listener
    let mut running = start().await;

    // WHEN: A non-numeric header arrives
    send_raw(running.addr(), b"abc\n").await;

    // THEN: InvalidHeader status
    wait_for(&mut running.events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::InvalidHeader))
    })
    .await;

    // WHEN: A valid frame follows on a new connection
    send_raw(running.addr(), b"7\n[S]K=V\n").await;

    // THEN: It is received normally
    wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigReceived { .. })
    })
    .await;
    assert_eq!(running.state.get("S", "K").await.as_deref(), Some("V"));

    running.handle.shutdown().await;
}

/// **VALUE**: Verifies a truncated payload is discarded entirely.
///
/// **BUG THIS CATCHES**: Would catch partial payloads being parsed, which
/// would replace a full configuration with a fragment of one.
#[tokio::test]
async fn given_declared_length_when_peer_sends_less_then_nothing_is_applied() {
    // GIVEN: A listener with existing content
    let mut running = start().await;
    running.state.set("KEEP", "ME", "1").await;

    // WHEN: 50 bytes declared, 10 sent, connection closed
    send_raw(running.addr(), b"50\n[S]K=V\n12").await;

    // THEN: Receive error, no receipt, store untouched
    let event = wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigReceived { .. })
            || is_status(e, |s| matches!(s, ConnectionStatus::ReceiveError { .. }))
    })
    .await;
    assert!(matches!(
        event,
        BridgeEvent::StatusChanged(ConnectionStatus::ReceiveError { .. })
    ));
    assert_eq!(running.state.get("KEEP", "ME").await.as_deref(), Some("1"));
    assert_eq!(running.state.get("S", "K").await, None);
    assert!(!running.settings.config_path.exists());

    running.handle.shutdown().await;
}

#[tokio::test]
async fn given_payload_over_limit_when_declared_then_connection_is_rejected() {
    let mut running = start().await;
    let oversized = running.settings.max_payload_bytes + 1;

    send_raw(running.addr(), format!("{oversized}\n").as_bytes()).await;

    wait_for(&mut running.events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::ReceiveError { .. }))
    })
    .await;
    assert_eq!(running.state.stats().await.keys, 0);

    running.handle.shutdown().await;
}

/// **VALUE**: Verifies shutdown is prompt even while a peer is stalled
/// mid-payload.
///
/// **WHY THIS MATTERS**: The loop is serial and inbound reads have no timeout,
/// so shutdown is the only way out of a stuck session.
#[tokio::test]
async fn given_stalled_sender_when_listener_shut_down_then_loop_stops_promptly() {
    // GIVEN: A peer that declared 10 bytes, sent 3 and went quiet
    let mut running = start().await;
    let mut stalled = TcpStream::connect(running.addr())
        .await
        .expect("Failed to connect");
    stalled.write_all(b"10\nabc").await.expect("Failed to write");
    wait_for(&mut running.events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::Receiving { .. }))
    })
    .await;

    // WHEN: The listener is shut down
    let mut events = running.handle.subscribe();
    timeout(WAIT, running.handle.shutdown())
        .await
        .expect("Shutdown should not wait for the stalled peer");

    // THEN: Stopped was published and nothing was applied
    wait_for(&mut events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::Stopped))
    })
    .await;
    assert!(!running.state.has_baseline().await);
}

/// **VALUE**: Verifies the accept loop serves one session at a time.
///
/// **WHY THIS MATTERS**: Only one inbound session may touch the store at a
/// time. A second sender has to wait until the first one is finished.
///
/// **BUG THIS CATCHES**: Would catch sessions being spawned per connection,
/// which would let a later payload overtake a stalled one.
#[tokio::test]
async fn given_stalled_session_when_second_peer_sends_then_it_waits_for_the_first() {
    // GIVEN: A first peer that declared 10 bytes, sent 3 and went quiet
    let mut running = start().await;
    let mut stalled = TcpStream::connect(running.addr())
        .await
        .expect("Failed to connect");
    stalled.write_all(b"10\nabc").await.expect("Failed to write");
    wait_for(&mut running.events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::Receiving { .. }))
    })
    .await;

    // WHEN: A second peer sends a complete frame meanwhile
    send_raw(running.addr(), b"7\n[S]K=V\n").await;
    sleep(Duration::from_millis(200)).await;

    // THEN: It has not been applied while the first session is open
    assert_eq!(running.state.get("S", "K").await, None);

    // WHEN: The first peer goes away
    drop(stalled);

    // THEN: The second frame is read and applied
    wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigReceived { .. })
    })
    .await;
    assert_eq!(running.state.get("S", "K").await.as_deref(), Some("V"));

    running.handle.shutdown().await;
}

#[tokio::test]
async fn given_handle_dropped_when_nothing_awaits_it_then_loop_still_stops() {
    let running = start().await;
    let mut events = running.handle.subscribe();

    drop(running.handle);

    wait_for(&mut events, |e| {
        is_status(e, |s| matches!(s, ConnectionStatus::Stopped))
    })
    .await;
}
