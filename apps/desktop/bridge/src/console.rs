//! Line-oriented console: the bridge's stand-in for an editor UI.
//!
//! Each stdin line is parsed into a [`Command`] and run against the shared
//! [`ConfigState`]. Parsing is pure; execution goes through the same core
//! calls a graphical editor would make.

use crate::error::BridgeError;

use sync_core::settings::Settings;
use sync_core::store::ConfigState;
use sync_core::transport::{self, OutboundAction};

use humantime::format_rfc3339_seconds;
use log::info;

pub const HELP: &str = "\
commands:
  show                         persisted-file preview of the current config
  wire                         wire text that would be sent
  stats                        section/key counts and last receipt time
  changed                      values that differ from the last received config
  set <SECTION> <KEY> <VALUE>  edit a value
  check <SECTION> <KEY> <VALUE>  would this value count as changed?
  reset                        discard edits, back to the last received config
  save                         write the config file (previous file goes to backup)
  reload                       re-read the config file
  send                         send the config (or request it if none received yet)
  request                      ask the remote side for its config
  help                         this text
  quit                         stop the bridge";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Wire,
    Stats,
    Changed,
    Set {
        section: String,
        key: String,
        value: String,
    },
    Check {
        section: String,
        key: String,
        value: String,
    },
    Reset,
    Save,
    Reload,
    Send,
    Request,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

impl Command {
    /// Parse one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, BridgeError> {
        let (verb, rest) = split_word(line.trim());
        let command = match verb.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "show" => Command::Show,
            "wire" => Command::Wire,
            "stats" => Command::Stats,
            "changed" => Command::Changed,
            "set" => {
                let (section, key, value) = entry_args(verb, rest)?;
                Command::Set {
                    section,
                    key,
                    value,
                }
            }
            "check" => {
                let (section, key, value) = entry_args(verb, rest)?;
                Command::Check {
                    section,
                    key,
                    value,
                }
            }
            "reset" => Command::Reset,
            "save" => Command::Save,
            "reload" => Command::Reload,
            "send" => Command::Send,
            "request" => Command::Request,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(BridgeError::command(format!(
                    "unknown command '{other}' (try 'help')"
                )));
            }
        };
        Ok(Some(command))
    }
}

/// Run `command` against the shared state.
///
/// # Errors
///
/// Save, reload and network failures come back as [`BridgeError::Core`]; the
/// console prints them and keeps going.
pub async fn execute(
    command: Command,
    state: &ConfigState,
    settings: &Settings,
) -> Result<Outcome, BridgeError> {
    let output = match command {
        Command::Show => state.persisted_text().await,
        Command::Wire => {
            let text = state.wire_text().await;
            if text.is_empty() {
                "(store is empty)".to_string()
            } else {
                text
            }
        }
        Command::Stats => {
            let snapshot = state.snapshot().await;
            let stats = snapshot.stats();
            let last = stats
                .last_received
                .map(|at| format_rfc3339_seconds(at).to_string())
                .unwrap_or_else(|| "never".to_string());
            format!(
                "sections: {} [{}], keys: {}, last received: {}",
                stats.sections,
                snapshot.sections().join(", "),
                stats.keys,
                last
            )
        }
        Command::Changed => {
            let changed = state.changed_entries().await;
            if changed.is_empty() {
                "no changes".to_string()
            } else {
                changed
                    .iter()
                    .map(|entry| format!("[{}]{}={}\n", entry.section, entry.key, entry.value))
                    .collect()
            }
        }
        Command::Set {
            section,
            key,
            value,
        } => {
            state.set(&section, &key, &value).await;
            let marker = if state.is_changed(&section, &key, &value).await {
                "changed"
            } else {
                "unchanged"
            };
            format!("[{section}]{key}={value} ({marker})")
        }
        Command::Check {
            section,
            key,
            value,
        } => {
            if state.is_changed(&section, &key, &value).await {
                "changed".to_string()
            } else {
                "unchanged".to_string()
            }
        }
        Command::Reset => {
            state.reset().await;
            "local edits discarded".to_string()
        }
        Command::Save => {
            state.save().await.map_err(BridgeError::core)?;
            format!("saved to {}", settings.config_path.display())
        }
        Command::Reload => {
            if state.load_from_file().await.map_err(BridgeError::core)? {
                format!("reloaded {}", settings.config_path.display())
            } else {
                format!("no config file at {}", settings.config_path.display())
            }
        }
        Command::Send => match transport::send_or_request(state, settings)
            .await
            .map_err(BridgeError::core)?
        {
            OutboundAction::Requested => format!(
                "nothing received yet; requested configuration from {}",
                settings.remote_addr()
            ),
            OutboundAction::Sent { bytes } => {
                format!("sent {bytes} bytes to {}", settings.remote_addr())
            }
        },
        Command::Request => {
            transport::request_config(&settings.remote_host, settings.remote_port)
                .await
                .map_err(BridgeError::core)?;
            format!("requested configuration from {}", settings.remote_addr())
        }
        Command::Help => HELP.to_string(),
        Command::Quit => {
            info!("Quit requested from console");
            return Ok(Outcome::Quit);
        }
    };

    Ok(Outcome::Continue(output))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

fn entry_args(verb: &str, rest: &str) -> Result<(String, String, String), BridgeError> {
    let (section, rest) = split_word(rest);
    let (key, value) = split_word(rest);
    if section.is_empty() || key.is_empty() {
        return Err(BridgeError::command(format!(
            "usage: {verb} <SECTION> <KEY> <VALUE>"
        )));
    }
    Ok((section.to_string(), key.to_string(), value.trim_end().to_string()))
}
