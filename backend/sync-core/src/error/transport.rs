//! Errors raised while moving frames over a TCP stream.
//!
//! Inbound, these only ever abandon the current connection. Outbound, they are
//! returned to whoever asked for the send so the caller can retry or report it.

use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Connect Error: {addr}: {message} {location}")]
    Connect {
        addr: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {operation} exceeded {timeout_secs}s {location}")]
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Unexpected End Of Stream: received {received} of {expected} bytes {location}")]
    UnexpectedEof {
        expected: usize,
        received: usize,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl TransportError {
    #[track_caller]
    pub fn connect(addr: impl Into<String>, error: &IoError) -> Self {
        TransportError::Connect {
            addr: addr.into(),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(operation: &'static str, timeout_secs: u64) -> Self {
        TransportError::Timeout {
            operation,
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unexpected_eof(expected: usize, received: usize) -> Self {
        TransportError::UnexpectedEof {
            expected,
            received,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<IoError> for TransportError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        match error.kind() {
            ErrorKind::TimedOut => TransportError::Timeout {
                operation: "io",
                timeout_secs: 0,
                location: ErrorLocation::from(Location::caller()),
            },
            ErrorKind::UnexpectedEof => TransportError::UnexpectedEof {
                expected: 0,
                received: 0,
                location: ErrorLocation::from(Location::caller()),
            },
            _ => TransportError::Io {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}
