//! Fixture file serialization and discovery.
//!
//! Fixtures are standard pretty-printed JSON except for one deliberate
//! extension: a non-empty description is appended as a single trailing
//! `// "description": "..."` comment line just inside the closing brace.
//! The decoder strips exactly that line, never arbitrary comments, so
//! legitimate `//` sequences inside payload strings survive round trips.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

const COMMENT_PREFIX: &str = "\n  // \"description\": ";

/// A decoded fixture: the request payload plus the description carried in
/// the trailing comment line (empty when the line was absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub payload: Map<String, Value>,
    pub description: String,
}

/// Encodes a payload, appending the description comment line when present.
pub fn encode(payload: &Map<String, Value>, description: &str) -> serde_json::Result<String> {
    let pretty = serde_json::to_string_pretty(payload)?;
    if description.is_empty() {
        return Ok(pretty);
    }
    let quoted = serde_json::to_string(description)?;
    // Pretty-printed non-empty objects end with "\n}"; empty objects are
    // just "{}" and get the comment line without a leading comma.
    Ok(match pretty.strip_suffix("\n}") {
        Some(head) => format!("{head},\n  // \"description\": {quoted}\n}}"),
        None => format!("{{\n  // \"description\": {quoted}\n}}"),
    })
}

/// Decodes fixture text, re-attaching the commented description.
pub fn decode(text: &str) -> serde_json::Result<Fixture> {
    let (json_text, description) = match text.find(COMMENT_PREFIX) {
        Some(idx) => {
            let value_start = idx + COMMENT_PREFIX.len();
            let tail = &text[value_start..];
            let value_end = tail.find('\n').unwrap_or(tail.len());
            let description: String = serde_json::from_str(&tail[..value_end])?;

            let mut head = text[..idx].to_string();
            if head.ends_with(',') {
                head.pop();
            }
            head.push_str(&tail[value_end..]);
            (head, description)
        }
        None => (text.to_string(), String::new()),
    };

    let payload: Map<String, Value> = serde_json::from_str(&json_text)?;
    Ok(Fixture { payload, description })
}

/// Writes one fixture, creating the directory hierarchy as needed.
pub fn write(path: &Path, payload: &Map<String, Value>, description: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = encode(payload, description)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Reads one fixture back.
pub fn read(path: &Path) -> anyhow::Result<Fixture> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&text).with_context(|| format!("Invalid fixture {}", path.display()))
}

/// Finds all `.json` fixtures under a directory recursively, sorted by
/// path. Discovery order is the tie-break for equal-method requests within
/// a collection, so it must be deterministic.
pub fn discover(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.exists() {
        collect_json_files(dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_payload() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "action": "sale",
            "amount": "10.00",
            "billing_address": { "postal_code": "11747" },
            "order_number": "TEST001",
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn encode_without_description_is_plain_json() {
        let text = encode(&sample_payload(), "").unwrap();
        assert!(!text.contains("//"));
        let parsed: Map<String, Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample_payload());
    }

    #[test]
    fn encode_appends_single_comment_line() {
        let text = encode(&sample_payload(), "Void transaction").unwrap();
        assert!(text.ends_with("\n  // \"description\": \"Void transaction\"\n}"));
        // Only the one comment line, right before the closing brace.
        assert_eq!(text.matches("//").count(), 1);
    }

    #[test]
    fn round_trip_preserves_payload_and_description() {
        let payload = sample_payload();
        let description = "Void No encryption or tokenization SSL transaction.";
        let fixture = decode(&encode(&payload, description).unwrap()).unwrap();
        assert_eq!(fixture.payload, payload);
        assert_eq!(fixture.description, description);
    }

    #[test]
    fn round_trip_survives_slashes_in_payload_strings() {
        let mut payload = sample_payload();
        payload.insert("note".to_string(), json!("see https://example.com // not a comment"));
        let fixture = decode(&encode(&payload, "3-D Secure transaction").unwrap()).unwrap();
        assert_eq!(fixture.payload["note"], "see https://example.com // not a comment");
        assert_eq!(fixture.description, "3-D Secure transaction");
    }

    #[test]
    fn empty_payload_keeps_description() {
        let payload = Map::new();
        let text = encode(&payload, "Void transaction").unwrap();
        assert_eq!(text, "{\n  // \"description\": \"Void transaction\"\n}");

        let fixture = decode(&text).unwrap();
        assert!(fixture.payload.is_empty());
        assert_eq!(fixture.description, "Void transaction");
    }

    #[test]
    fn decode_plain_json_yields_empty_description() {
        let fixture = decode("{\n  \"order_number\": \"TEST001\"\n}").unwrap();
        assert_eq!(fixture.description, "");
        assert_eq!(fixture.payload["order_number"], "TEST001");
    }

    #[test]
    fn write_read_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("json/Sheet1/840/credit/sale/mc/TEST001.json");
        write(&nested, &sample_payload(), "Void transaction").unwrap();
        write(&dir.path().join("json/b.json"), &sample_payload(), "").unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0] < found[1]);

        let fixture = read(&nested).unwrap();
        assert_eq!(fixture.description, "Void transaction");
        assert_eq!(fixture.payload, sample_payload());
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        assert!(discover(Path::new("/nonexistent/fixtures")).unwrap().is_empty());
    }
}
