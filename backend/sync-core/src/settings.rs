//! Deployment settings: where to listen, where the remote controller lives,
//! and where the persisted configuration file goes.
//!
//! Settings come from an optional TOML file, then environment overrides
//! (`BRIDGE_*`, optionally seeded from a `.env` file).

use crate::error::settings::SettingsError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use const_format::concatcp;
use log::{info, warn};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "BRIDGE_";
pub const ENV_LISTEN_PORT: &str = concatcp!(ENV_PREFIX, "LISTEN_PORT");
pub const ENV_REMOTE_HOST: &str = concatcp!(ENV_PREFIX, "REMOTE_HOST");
pub const ENV_REMOTE_PORT: &str = concatcp!(ENV_PREFIX, "REMOTE_PORT");
pub const ENV_CONFIG_PATH: &str = concatcp!(ENV_PREFIX, "CONFIG_PATH");
pub const ENV_BACKUP_PATH: &str = concatcp!(ENV_PREFIX, "BACKUP_PATH");

const DEFAULT_LISTEN_PORT: u16 = 12347;
const DEFAULT_REMOTE_HOST: &str = "192.168.4.100";
const DEFAULT_REMOTE_PORT: u16 = 12348;
const DEFAULT_CONFIG_PATH: &str = "config_received.ini";
const DEFAULT_BACKUP_PATH: &str = "config_backup.ini";
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_remote_host")]
    pub remote_host: String,

    #[serde(default = "default_remote_port")]
    pub remote_port: u16,

    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,

    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            remote_host: default_remote_host(),
            remote_port: default_remote_port(),
            config_path: default_config_path(),
            backup_path: default_backup_path(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}
fn default_remote_host() -> String {
    DEFAULT_REMOTE_HOST.to_string()
}
fn default_remote_port() -> u16 {
    DEFAULT_REMOTE_PORT
}
fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
fn default_backup_path() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_PATH)
}
fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Settings {
    /// Load settings from `path`, then apply process environment overrides.
    ///
    /// A missing file is not an error: defaults are used. A file that exists
    /// but cannot be read or parsed is.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                source: e,
            })?;
            let settings = Self::from_toml_str(&contents, path)?;
            info!("Settings loaded from {}", path.display());
            settings
        } else {
            info!(
                "Settings file not found at {}, using defaults",
                path.display()
            );
            Self::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(contents).map_err(|e| SettingsError::Parse {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `.env` from the working directory if there is one.
    pub fn load_dotenv() -> Option<PathBuf> {
        match dotenvy::dotenv() {
            Ok(path) => {
                info!("Loaded .env from: {}", path.display());
                Some(path)
            }
            Err(e) if e.not_found() => None,
            Err(e) => {
                warn!("Failed to parse .env: {}", e);
                None
            }
        }
    }

    /// Apply `BRIDGE_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_LISTEN_PORT) {
            self.listen_port = parse_port(ENV_LISTEN_PORT, &port)?;
        }
        if let Some(host) = lookup(ENV_REMOTE_HOST) {
            self.remote_host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_REMOTE_PORT) {
            self.remote_port = parse_port(ENV_REMOTE_PORT, &port)?;
        }
        if let Some(path) = lookup(ENV_CONFIG_PATH) {
            self.config_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_BACKUP_PATH) {
            self.backup_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.listen_port == 0 {
            return Err(validation("listen_port must be non-zero"));
        }
        if self.remote_port == 0 {
            return Err(validation("remote_port must be non-zero"));
        }
        if self.remote_host.trim().is_empty() {
            return Err(validation("remote_host cannot be empty"));
        }
        if self.config_path.as_os_str().is_empty() || self.backup_path.as_os_str().is_empty() {
            return Err(validation("config_path and backup_path cannot be empty"));
        }
        if self.config_path == self.backup_path {
            return Err(validation(format!(
                "backup_path must differ from config_path ({})",
                self.config_path.display()
            )));
        }
        if self.max_payload_bytes == 0 {
            return Err(validation("max_payload_bytes must be non-zero"));
        }
        Ok(())
    }

    pub fn remote_addr(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }
}

#[track_caller]
fn validation(reason: impl Into<String>) -> SettingsError {
    SettingsError::Validation {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}

fn parse_port(name: &str, raw: &str) -> Result<u16, SettingsError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| validation(format!("{name}='{raw}' is not a valid port: {e}")))
}
