//! Test helpers for transport integration tests.
//!
//! - Settings pointed at a temp dir and an ephemeral port
//! - Starting a listener and connecting to it
//! - Waiting for a specific event with a deadline

use sync_core::events::{BridgeEvent, ConnectionStatus};
use sync_core::settings::Settings;
use sync_core::store::ConfigState;
use sync_core::transport::{ListenerHandle, start_listener};

use std::net::SocketAddr;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(3);

/// Settings writing into `dir`, listening on an ephemeral port.
pub fn test_settings(dir: &TempDir) -> Settings {
    Settings {
        listen_port: 0,
        remote_host: "127.0.0.1".to_string(),
        remote_port: 9,
        config_path: dir.path().join("config_received.ini"),
        backup_path: dir.path().join("config_backup.ini"),
        ..Settings::default()
    }
}

pub struct RunningListener {
    pub handle: ListenerHandle,
    pub state: ConfigState,
    pub settings: Settings,
    pub events: Receiver<BridgeEvent>,
    // Keeps the temp dir alive for the test
    pub _dir: TempDir,
}

impl RunningListener {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.handle.local_addr().port()))
    }
}

pub async fn start() -> RunningListener {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = test_settings(&dir);
    let state = ConfigState::from_settings(&settings);
    let handle = start_listener(&settings, state.clone())
        .await
        .expect("Failed to start listener");
    let events = handle.subscribe();

    RunningListener {
        handle,
        state,
        settings,
        events,
        _dir: dir,
    }
}

/// Connect, write `bytes`, close the write side.
pub async fn send_raw(addr: SocketAddr, bytes: &[u8]) {
    let mut stream = TcpStream::connect(addr)
        .await
        .expect("Failed to connect to listener");
    stream.write_all(bytes).await.expect("Failed to write");
    stream.shutdown().await.expect("Failed to shut down write side");
}

/// Wait until an event matching `predicate` arrives, or panic after [`WAIT`].
pub async fn wait_for<F>(events: &mut Receiver<BridgeEvent>, predicate: F) -> BridgeEvent
where
    F: Fn(&BridgeEvent) -> bool,
{
    timeout(WAIT, async {
        loop {
            let event = events.recv().await.expect("Event bus closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

pub fn is_status(event: &BridgeEvent, wanted: fn(&ConnectionStatus) -> bool) -> bool {
    matches!(event, BridgeEvent::StatusChanged(status) if wanted(status))
}
