pub mod error;
pub mod events;
pub mod settings;
pub mod store;
pub mod transport;

#[cfg(test)]
mod tests;

/// Host the inbound listener binds to.
pub const LISTEN_HOST: &str = "0.0.0.0";
