//! Tolerant reader for both configuration syntaxes.
//!
//! Accepts, in any mix:
//!
//! ```text
//! [SECTION]            ; persisted-file form: header, then key=value lines
//! KEY=VALUE
//!
//! [SECTION]KEY=VALUE   ; wire form: one self-contained record per line
//! ```
//!
//! Anything it does not understand is skipped rather than rejected.

use super::Sections;

use log::{debug, info};

#[derive(Debug, Default)]
pub struct ParsedConfig {
    pub sections: Sections,

    /// Key/value records accepted. Only for logging.
    pub items: usize,
}

pub fn parse(text: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    let mut current_section: Option<String> = None;
    let mut first_line = true;

    for line in text.split(['\n', '\r']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // A bare number on the first line is a length header that leaked into the text.
        let is_first = first_line;
        first_line = false;
        if is_first && line.bytes().all(|b| b.is_ascii_digit()) {
            debug!("Skipping leading numeric line '{line}'");
            continue;
        }

        if line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(section_end) = line.find(']').filter(|_| line.starts_with('[')) {
            let section = &line[1..section_end];
            let rest = &line[section_end + 1..];

            match rest.split_once('=') {
                Some((key, value)) => {
                    parsed
                        .sections
                        .entry(section.to_string())
                        .or_default()
                        .insert(key.to_string(), value.trim().to_string());
                    parsed.items += 1;
                }
                None => {
                    parsed.sections.entry(section.to_string()).or_default();
                    current_section = Some(section.to_string());
                }
            }
            continue;
        }

        // key=value only counts inside a [SECTION] header.
        if let (Some(section), Some((key, value))) = (&current_section, line.split_once('=')) {
            parsed
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
            parsed.items += 1;
        }
    }

    info!(
        "Config parsed: {} items in {} sections",
        parsed.items,
        parsed.sections.len()
    );
    parsed
}
