//! TCP transport for configuration frames.
//!
//! - One inbound listener that serves connections strictly one at a time
//! - Short-lived outbound connections for sends and requests
//!
//! # Protocol
//!
//! Symmetric in both directions: `<decimal length>\n` then that many UTF-8
//! bytes. Length 0 is a request for the receiver's configuration. See
//! [`frame`] for the codec.

pub mod client;
pub mod frame;
mod handle;
pub mod outbound;
mod server;

pub use client::{OUTBOUND_TIMEOUT, request_config, send_config};
pub use frame::{Frame, FrameHeader};
pub use handle::ListenerHandle;
pub use outbound::{OutboundAction, send_or_request};
pub use server::start_listener;
