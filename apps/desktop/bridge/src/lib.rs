//! Host side of the config bridge: CLI, console commands, logging.
//!
//! `main.rs` wires these to `sync-core`; tests drive them directly.

pub mod cli;
pub mod console;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;
