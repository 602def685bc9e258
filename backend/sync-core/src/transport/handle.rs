//! Listener handle type.
//!
//! Returned by [`start_listener`](crate::transport::start_listener). It owns the
//! shutdown signal for the accept loop.

use crate::events::{BridgeEvent, EventBus};

use std::net::SocketAddr;

use log::{info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Handle to a running inbound listener.
///
/// # Lifecycle
///
/// Call [`shutdown`](Self::shutdown) to stop accepting, abandon any session in
/// progress and wait for the loop to exit. Dropping the handle also signals
/// the loop to stop, without waiting for it.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    events: EventBus,
}

impl ListenerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown_tx: watch::Sender<bool>,
        task: JoinHandle<()>,
        events: EventBus,
    ) -> Self {
        Self {
            local_addr,
            shutdown_tx,
            task: Some(task),
            events,
        }
    }

    /// Address actually bound (useful when the configured port was 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    pub async fn shutdown(mut self) {
        info!("Stopping listener on {}", self.local_addr);
        self.shutdown_tx.send_replace(true);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Listener task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}
