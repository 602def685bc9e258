//! Shared primitives for the config bridge workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): error-location tracking shared by every error enum
//! - **sync-core**: store, parser, serializer, framing transport
//! - **bridge**: host binary wiring logging, settings, listener and console
//!
//! Keeping the location type here lets both `sync-core` and `bridge` report
//! `[file:line:column]` in their error messages without depending on each other.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
