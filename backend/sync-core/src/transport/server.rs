//! Inbound listener.
//!
//! The accept loop is serial: one connection is read, dispatched and closed
//! before the next is accepted. A slow sender holds up the next one.
//!
//! Inbound failures never stop the loop. A bad header, a short payload or a
//! non-UTF-8 body is logged and only that connection is dropped.

use crate::error::CoreError;
use crate::error::protocol::ProtocolError;
use crate::error::transport::TransportError;
use crate::events::{BridgeEvent, ConnectionStatus};
use crate::settings::Settings;
use crate::store::ConfigState;
use crate::transport::frame::{self, Frame};
use crate::transport::handle::ListenerHandle;
use crate::LISTEN_HOST;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::watch;
use tokio::time::sleep as TokioSleep;

/// Pause after an unexpected accept failure before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Binds `0.0.0.0:<listen_port>` and starts the serial accept loop.
///
/// # Errors
///
/// Returns [`TransportError::Io`] if the port cannot be bound. Once bound,
/// nothing the loop encounters is reported here; it is logged and published
/// as a [`ConnectionStatus`] instead.
pub async fn start_listener(
    settings: &Settings,
    state: ConfigState,
) -> Result<ListenerHandle, TransportError> {
    let address = format!("{LISTEN_HOST}:{}", settings.listen_port);
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        error!("Failed to bind listener on {}: {}", address, e);
        TransportError::Io {
            message: format!("Failed to bind {address}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;
    let local_addr = listener.local_addr()?;

    info!("Listening for configuration on {}", local_addr);
    let events = state.events().clone();
    events.status(ConnectionStatus::Listening {
        port: local_addr.port(),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = TokioSpawn(accept_loop(
        listener,
        state,
        settings.max_payload_bytes,
        shutdown_rx,
    ));

    Ok(ListenerHandle::new(local_addr, shutdown_tx, task, events))
}

async fn accept_loop(
    listener: TcpListener,
    state: ConfigState,
    max_payload: usize,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let events = state.events().clone();
    let mut retry_delay = Constant::new(ACCEPT_ERROR_BACKOFF);

    loop {
        let accepted = tokio::select! {
            _ = wait_for_shutdown(&mut shutdown_rx) => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer)) => {
                info!("Client connected: {}", peer);
                events.status(ConnectionStatus::Receiving { peer });

                let outcome = tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown_rx) => {
                        info!("Session with {} abandoned for shutdown", peer);
                        break;
                    }
                    outcome = handle_session(stream, peer, &state, max_payload) => outcome,
                };

                match outcome {
                    Ok(()) => info!("Client disconnected: {}", peer),
                    Err(e) => {
                        warn!("Session with {} abandoned: {}", peer, e);
                        events.status(session_failure_status(&e));
                    }
                }
            }
            Err(e) => {
                error!("Accept failed: {}", e);
                events.status(ConnectionStatus::ReceiveError {
                    message: e.to_string(),
                });

                let delay = retry_delay.next_backoff().unwrap_or(ACCEPT_ERROR_BACKOFF);
                tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown_rx) => break,
                    _ = TokioSleep(delay) => {}
                }
            }
        }
    }

    info!("Listener stopped");
    events.status(ConnectionStatus::Stopped);
}

/// Reads one frame from `stream` and dispatches it.
///
/// The stream is owned here and closed when this returns, on every path.
///
/// # Protocol
///
/// - Length 0: configuration request. Logged and published; nothing is sent back.
/// - Length N: read N bytes, decode UTF-8, hand to the store as the received config.
async fn handle_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    state: &ConfigState,
    max_payload: usize,
) -> Result<(), CoreError> {
    let events = state.events();

    match frame::read_frame(&mut stream, max_payload).await? {
        Frame::Request => {
            info!("Configuration request (0-byte frame) received from {}", peer);
            events.publish(BridgeEvent::ConfigRequested { peer });
        }
        Frame::Config(payload) => {
            let bytes = payload.len();
            info!("Configuration payload received from {}: {} bytes", peer, bytes);
            state.apply_received(&payload).await;
            events.status(ConnectionStatus::Received { bytes });
        }
    }

    Ok(())
}

/// Resolves once shutdown is signalled, or the handle is gone.
async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
}

fn session_failure_status(error: &CoreError) -> ConnectionStatus {
    match error {
        CoreError::Protocol(ProtocolError::InvalidHeader { .. }) => ConnectionStatus::InvalidHeader,
        other => ConnectionStatus::ReceiveError {
            message: other.to_string(),
        },
    }
}
