use crate::helpers::{WAIT, start, wait_for};

use sync_core::error::transport::TransportError;
use sync_core::events::BridgeEvent;
use sync_core::transport::{request_config, send_config};

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Accept one connection on `listener` and return everything the peer wrote.
async fn capture_one(listener: TcpListener) -> Vec<u8> {
    let (mut stream, _) = listener.accept().await.expect("Failed to accept");
    let mut received = Vec::new();
    stream
        .read_to_end(&mut received)
        .await
        .expect("Failed to read from client");
    received
}

/// **VALUE**: Verifies the exact bytes put on the wire by a send.
///
/// **WHY THIS MATTERS**: The remote controller parses this byte for byte; any
/// framing drift breaks interoperability.
#[tokio::test]
async fn given_peer_when_config_sent_then_it_receives_header_and_payload() {
    // GIVEN: A raw TCP peer
    let peer = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind peer");
    let port = peer.local_addr().expect("No local addr").port();
    let capture = tokio::spawn(capture_one(peer));

    // WHEN: A config is sent
    let bytes = send_config("127.0.0.1", port, "[S]K=V\n")
        .await
        .expect("Send should succeed");

    // THEN: Header then payload, connection closed afterwards
    let received = timeout(WAIT, capture)
        .await
        .expect("Peer timed out")
        .expect("Peer task failed");
    assert_eq!(bytes, 7);
    assert_eq!(received, b"7\n[S]K=V\n");
}

#[tokio::test]
async fn given_peer_when_config_requested_then_it_receives_zero_header_only() {
    let peer = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind peer");
    let port = peer.local_addr().expect("No local addr").port();
    let capture = tokio::spawn(capture_one(peer));

    request_config("127.0.0.1", port)
        .await
        .expect("Request should succeed");

    let received = timeout(WAIT, capture)
        .await
        .expect("Peer timed out")
        .expect("Peer task failed");
    assert_eq!(received, b"0\n");
}

/// **VALUE**: Verifies the declared length counts bytes, not characters, on
/// the real send path.
#[tokio::test]
async fn given_multibyte_text_when_config_sent_then_header_counts_bytes() {
    // GIVEN: A raw TCP peer and a value with non-ASCII characters
    let peer = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind peer");
    let port = peer.local_addr().expect("No local addr").port();
    let capture = tokio::spawn(capture_one(peer));
    let text = "[S]NAME=Müller\n";

    // WHEN: Sent
    let bytes = send_config("127.0.0.1", port, text)
        .await
        .expect("Send should succeed");

    // THEN: Header carries the UTF-8 byte length
    let received = timeout(WAIT, capture)
        .await
        .expect("Peer timed out")
        .expect("Peer task failed");
    assert_eq!(bytes, text.len());
    assert_eq!(received, format!("{}\n{}", text.len(), text).into_bytes());
}

#[tokio::test]
async fn given_nobody_listening_when_config_sent_then_connect_error() {
    // Bind then release a port so the connect is refused
    let port = {
        let probe = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind probe");
        probe.local_addr().expect("No local addr").port()
    };

    let result = send_config("127.0.0.1", port, "[S]K=V\n").await;

    assert!(matches!(result, Err(TransportError::Connect { .. })));
}

/// **VALUE**: Verifies the client and the listener speak the same framing.
#[tokio::test]
async fn given_running_listener_when_client_sends_then_listener_applies_it() {
    // GIVEN: The bridge's own listener
    let mut running = start().await;
    let port = running.addr().port();

    // WHEN: The outbound client sends to it
    send_config("127.0.0.1", port, "[ECHO]BACK=yes\n")
        .await
        .expect("Send should succeed");

    // THEN: It lands in the store
    wait_for(&mut running.events, |e| {
        matches!(e, BridgeEvent::ConfigReceived { .. })
    })
    .await;
    assert_eq!(
        running.state.get("ECHO", "BACK").await.as_deref(),
        Some("yes")
    );

    running.handle.shutdown().await;
}
