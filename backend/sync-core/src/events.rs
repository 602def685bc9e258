//! Notifications for whatever sits on top of the core (console, UI, tests).
//!
//! Events go out on a broadcast channel. Publishing never blocks and never
//! fails when nobody is listening; a lagging subscriber only loses old events.

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::net::SocketAddr;

use log::debug;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Listening { port: u16 },
    Receiving { peer: SocketAddr },
    Received { bytes: usize },
    InvalidHeader,
    ReceiveError { message: String },
    Sending { addr: String },
    Sent { bytes: usize },
    SendFailed { message: String },
    Stopped,
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Listening { port } => write!(f, "Waiting on port {port}"),
            Self::Receiving { peer } => write!(f, "Receiving from {peer}..."),
            Self::Received { bytes } => write!(f, "Configuration received ({bytes} bytes)"),
            Self::InvalidHeader => write!(f, "Invalid header format"),
            Self::ReceiveError { message } => write!(f, "Receive error: {message}"),
            Self::Sending { addr } => write!(f, "Sending configuration to {addr}..."),
            Self::Sent { bytes } => write!(f, "Configuration sent ({bytes} bytes)"),
            Self::SendFailed { message } => write!(f, "Send error: {message}"),
            Self::Stopped => write!(f, "Listener stopped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A config payload was parsed into the store and became the new baseline.
    ConfigReceived { payload: String },

    /// The peer sent a zero-length frame asking for our configuration.
    ConfigRequested { peer: SocketAddr },

    StatusChanged(ConnectionStatus),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: BridgeEvent) {
        if self.tx.send(event).is_err() {
            debug!("No event subscribers");
        }
    }

    pub fn status(&self, status: ConnectionStatus) {
        self.publish(BridgeEvent::StatusChanged(status));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
