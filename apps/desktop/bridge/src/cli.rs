//! Command-line arguments of the bridge host.

use std::path::PathBuf;

use clap::Parser;

const APP_DIR_NAME: &str = "config-bridge";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_SETTINGS_FILE: &str = "bridge.toml";

#[derive(Debug, Parser)]
#[command(
    name = "bridge",
    version,
    about = "Synchronises INI-style configuration with a remote controller over TCP"
)]
pub struct Args {
    /// Deployment settings file (TOML). Missing file means defaults.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Directory for bridge.log. Defaults to the platform's local data directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn resolve_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME))
}
