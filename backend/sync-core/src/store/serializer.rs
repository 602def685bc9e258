//! The two text forms of a store.
//!
//! Neither form escapes `=`, `[`, `]` or newlines inside values; a value
//! containing them will not read back the same.

use super::{CONFIG_SYNC_SECTION, NETWORK_SECTION, Sections};

use std::time::SystemTime;

use humantime::format_rfc3339_seconds;

const PERSISTED_HEADER: [&str; 2] = [
    "# Configuration file for the remote control application",
    "# Edited and synchronised by the config bridge",
];

/// Sections that belong to the link itself and stay out of the local file.
const PERSIST_EXCLUDED: [&str; 2] = [NETWORK_SECTION, CONFIG_SYNC_SECTION];

/// One `[SECTION]KEY=VALUE` line per key, in store order, every section included.
pub fn to_wire(sections: &Sections) -> String {
    let mut out = String::new();
    for (section, entries) in sections {
        for (key, value) in entries {
            out.push_str(&format!("[{section}]{key}={value}\n"));
        }
    }
    out
}

/// Human-editable INI text: comment header, sorted sections and keys.
pub fn to_persisted(sections: &Sections, generated_at: SystemTime) -> String {
    let mut out = String::new();
    for line in PERSISTED_HEADER {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!(
        "# Last updated: {}\n",
        format_rfc3339_seconds(generated_at)
    ));
    out.push('\n');

    let mut names: Vec<&String> = sections
        .keys()
        .filter(|name| !PERSIST_EXCLUDED.contains(&name.as_str()))
        .collect();
    names.sort();

    for name in names {
        out.push_str(&format!("[{name}]\n"));
        let entries = &sections[name];
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!("{key}={}\n", entries[key]));
        }
        out.push('\n');
    }
    out
}
