//! In-memory configuration store.
//!
//! Holds two section→key→value maps side by side:
//!
//! - **current**: what the user is editing right now
//! - **baseline**: the last configuration confirmed received from the peer
//!
//! Baseline is always an owned copy of current at the moment of receipt, so
//! edits to one never show up in the other.

pub mod file;
pub mod parser;
pub mod serializer;
pub mod state;
mod tracker;

pub use state::ConfigState;

use std::collections::HashMap;
use std::time::SystemTime;

/// Keys of one section.
pub type Section = HashMap<String, String>;

/// Section name (case-sensitive) to its keys.
pub type Sections = HashMap<String, Section>;

/// Transport settings owned by the remote application. Never persisted locally.
pub const NETWORK_SECTION: &str = "NETWORK";

/// Port handshake section; rewritten before every outbound send.
pub const CONFIG_SYNC_SECTION: &str = "CONFIG_SYNC";

/// Port this bridge listens on, as told to the peer.
pub const LOCAL_RECV_PORT_KEY: &str = "WPF_RECV_PORT";

/// Port the peer listens on, as told to the peer.
pub const REMOTE_RECV_PORT_KEY: &str = "CPP_RECV_PORT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    current: Sections,
    baseline: Sections,
    last_received: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub sections: usize,
    pub keys: usize,
    pub last_received: Option<SystemTime>,
}

/// A value in current that differs from (or is missing in) the baseline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangedEntry {
    pub section: String,
    pub key: String,
    pub value: String,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Sections {
        &self.current
    }

    pub fn baseline(&self) -> &Sections {
        &self.baseline
    }

    /// Parse `text` and make it the current contents. Never merges.
    ///
    /// Returns the number of key/value items parsed (informational only).
    pub fn load_text(&mut self, text: &str) -> usize {
        let parsed = parser::parse(text);
        self.current = parsed.sections;
        parsed.items
    }

    /// Make the current contents the new baseline.
    pub fn commit_baseline(&mut self, received_at: SystemTime) {
        self.baseline = deep_copy(&self.current);
        self.last_received = Some(received_at);
    }

    /// Drop all edits; current becomes a fresh copy of the baseline.
    pub fn reset(&mut self) {
        self.current = deep_copy(&self.baseline);
    }

    pub fn has_baseline(&self) -> bool {
        self.last_received.is_some()
    }

    pub fn ensure_section(&mut self, section: &str) -> &mut Section {
        self.current.entry(section.to_string()).or_default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ensure_section(section)
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.current
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Section names in current, sorted.
    pub fn sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.current.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn section_count(&self) -> usize {
        self.current.len()
    }

    pub fn key_count(&self) -> usize {
        self.current.values().map(Section::len).sum()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sections: self.section_count(),
            keys: self.key_count(),
            last_received: self.last_received,
        }
    }

    /// Whether `candidate` differs from the baseline value for (section, key).
    pub fn is_changed(&self, section: &str, key: &str, candidate: &str) -> bool {
        tracker::is_changed(&self.baseline, section, key, candidate)
    }

    /// Every current value the change predicate flags, sorted by section then key.
    pub fn changed_entries(&self) -> Vec<ChangedEntry> {
        let mut changed: Vec<ChangedEntry> = self
            .current
            .iter()
            .flat_map(|(section, entries)| {
                entries.iter().filter_map(move |(key, value)| {
                    tracker::is_changed(&self.baseline, section, key, value).then(|| ChangedEntry {
                        section: section.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    })
                })
            })
            .collect();
        changed.sort();
        changed
    }
}

/// Structural copy of the nested map: every inner section is a new map.
fn deep_copy(sections: &Sections) -> Sections {
    sections
        .iter()
        .map(|(name, entries)| (name.clone(), entries.clone()))
        .collect()
}
