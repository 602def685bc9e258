use common::ErrorLocation;

use std::panic::Location;
use std::string::FromUtf8Error;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Empty Header Error: peer sent no length header {location}")]
    EmptyHeader { location: ErrorLocation },

    #[error("Invalid Header Error: '{header}' is not a non-negative length {location}")]
    InvalidHeader {
        header: String,
        location: ErrorLocation,
    },

    #[error("Header Too Long Error: no newline within {limit} bytes {location}")]
    HeaderTooLong {
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Payload Too Large Error: declared {declared} bytes, limit {limit} {location}")]
    PayloadTooLarge {
        declared: usize,
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Encoding Error: {message} {location}")]
    Encoding {
        message: String,
        location: ErrorLocation,
    },
}

impl ProtocolError {
    #[track_caller]
    pub fn empty_header() -> Self {
        ProtocolError::EmptyHeader {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_header(header: impl Into<String>) -> Self {
        ProtocolError::InvalidHeader {
            header: header.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<FromUtf8Error> for ProtocolError {
    #[track_caller]
    fn from(error: FromUtf8Error) -> Self {
        ProtocolError::Encoding {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
