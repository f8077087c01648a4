//! Spreadsheet row with normalized headers.
//!
//! Source workbooks arrive with arbitrarily cased, wrapped headers
//! (e.g. `"Trans.\r\nCurrency"`). All downstream lookups go through the
//! canonical key space produced here.

use std::collections::HashMap;

/// Canonicalizes a raw header: newlines and whitespace runs collapse to a
/// single space, then trim and lowercase. Total over any input string.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// One spreadsheet row keyed by normalized header.
///
/// Missing columns read as the empty string, so the mapper never has to
/// distinguish "no column" from "blank cell".
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    /// Builds a row from raw header/value pairs, normalizing each header.
    pub fn from_raw<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (normalize_header(k.as_ref()), v.into()))
            .collect();
        Self { cells }
    }

    /// Returns the raw cell value for a normalized header, or `""`.
    pub fn get(&self, header: &str) -> &str {
        self.cells.get(header).map_or("", String::as_str)
    }

    /// Returns the trimmed cell value for a normalized header.
    pub fn trimmed(&self, header: &str) -> &str {
        self.get(header).trim()
    }

    /// Returns `true` if the cell is present and non-blank.
    pub fn has(&self, header: &str) -> bool {
        !self.trimmed(header).is_empty()
    }
}
