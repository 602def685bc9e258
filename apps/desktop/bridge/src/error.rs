use common::ErrorLocation;

use thiserror::Error;

/// Errors raised by the host binary.
///
/// Core errors are flattened to their message here; the core already logged
/// them with full location detail.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Error from this app (start-up, directories, runtime wiring)
    #[error("Bridge Error: {message} {location}")]
    Bridge {
        message: String,
        location: ErrorLocation,
    },

    /// Error from sync-core operations (settings, listener, send, save)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be installed
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Console input that is not a known command
    #[error("Command Error: {message} {location}")]
    Command {
        message: String,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub fn core(error: impl std::fmt::Display) -> Self {
        BridgeError::Core {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn command(message: impl Into<String>) -> Self {
        BridgeError::Command {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}
