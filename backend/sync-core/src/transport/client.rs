//! Outbound sends and requests.
//!
//! Each call opens a fresh connection, writes one frame, flushes and closes.
//! Every step is bounded by [`OUTBOUND_TIMEOUT`]; failures are logged and
//! returned so the caller can tell the user.

use crate::error::transport::TransportError;
use crate::transport::frame;

use std::future::Future;
use std::time::Duration;

use log::{error, info};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Send `text` as one frame to `host:port`. Returns the payload size in bytes.
pub async fn send_config(host: &str, port: u16, text: &str) -> Result<usize, TransportError> {
    let addr = format!("{host}:{port}");
    send_frame(&addr, text.as_bytes())
        .await
        .inspect_err(|e| error!("Config send to {} failed: {}", addr, e))
}

/// Ask `host:port` for its configuration: a frame with length 0 and no payload.
pub async fn request_config(host: &str, port: u16) -> Result<(), TransportError> {
    let addr = format!("{host}:{port}");
    send_frame(&addr, &[])
        .await
        .map(|_| info!("Configuration request (0-byte frame) sent to {}", addr))
        .inspect_err(|e| error!("Config request to {} failed: {}", addr, e))
}

async fn send_frame(addr: &str, payload: &[u8]) -> Result<usize, TransportError> {
    info!("Connecting to {}", addr);
    let mut stream = bounded("connect", TcpStream::connect(addr))
        .await?
        .map_err(|e| TransportError::connect(addr, &e))?;
    info!("Connected to {}", addr);

    bounded("write", frame::write_frame(&mut stream, payload)).await??;
    bounded("shutdown", stream.shutdown()).await??;

    info!("Sent frame with {}B payload to {}", payload.len(), addr);
    Ok(payload.len())
}

/// Run one outbound step under [`OUTBOUND_TIMEOUT`].
async fn bounded<F>(operation: &'static str, step: F) -> Result<F::Output, TransportError>
where
    F: Future,
{
    timeout(OUTBOUND_TIMEOUT, step)
        .await
        .map_err(|_| TransportError::timeout(operation, OUTBOUND_TIMEOUT.as_secs()))
}
