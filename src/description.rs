//! Free-text heuristics over the optional `description` column.
//!
//! These are substring and regex matches, not a parser. The fixture corpus
//! carries recurring typos ("transction", "electronik") that the patterns
//! must tolerate.

use std::sync::LazyLock;

use regex::Regex;

/// Authentication token injected for secure-commerce and 3-D-Secure rows.
/// Fixed test-environment constant, not computed.
pub const SECURE_AUTH_DATA: &str = "hpqlETCoVYR1CAAAiX8HBjAAAAA=";

static THREE_D_SECURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)3[-\s]?d\s*secure").unwrap());

// Matched against the normalized description; `transa?ct` covers both
// "transaction" and the corpus typo "transction".
static SECURE_COMMERCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"secure electroni[ck] commerce transa?ct").unwrap());

/// Lowercases, strips punctuation and collapses whitespace so the typo
/// patterns only have to deal with word shapes.
fn normalize(description: &str) -> String {
    let mut out = String::with_capacity(description.len());
    let mut last_was_space = false;
    for ch in description.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if ch.is_whitespace() && !last_was_space && !out.is_empty() {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Returns `true` when the description names a Secure Electronic Commerce
/// transaction (typo-tolerant, case-insensitive).
pub fn is_secure_commerce(description: &str) -> bool {
    SECURE_COMMERCE.is_match(&normalize(description))
}

/// Returns `true` when the description names a 3-D Secure transaction,
/// hyphenated or not. Independent of [`is_secure_commerce`].
pub fn is_three_d_secure(description: &str) -> bool {
    THREE_D_SECURE.is_match(description)
}

/// Returns `true` when the description marks a void transaction, which
/// selects PUT instead of POST at request-build time. Evaluated against the
/// raw description, anywhere in the string.
pub fn is_void(description: &str) -> bool {
    description.to_lowercase().contains("void")
}
