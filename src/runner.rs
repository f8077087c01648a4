//! Batch orchestration.
//!
//! Pipeline:
//! 1. `convert`: read the workbook, map every row, write one fixture per
//!    row under `<base>/json`.
//! 2. `postman`: discover fixtures under `<base>/json`, classify and group
//!    them, emit one collection document per group under `<base>/postman`.
//!
//! Both steps degrade per-row/per-file where they can; only I/O and
//! configuration errors abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::{info, warn};

use crate::excel;
use crate::fixture;
use crate::gateway::Gateway;
use crate::mapper;
use crate::paths;
use crate::postman;

/// Subdirectory of the output base that holds fixtures.
pub const FIXTURE_DIR: &str = "json";

/// Subdirectory of the output base that holds collection documents.
pub const COLLECTION_DIR: &str = "postman";

/// Counters reported after a `convert` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub sheets: usize,
    pub fixtures: usize,
}

/// Counters reported after a `postman` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostmanSummary {
    pub fixtures: usize,
    pub skipped: usize,
    pub collections: usize,
}

/// Converts a workbook into fixture files under `<base>/json`.
pub fn convert(excel_path: &Path, base_dir: &Path, gateway: Gateway) -> anyhow::Result<ConvertSummary> {
    let cfg = gateway.config();
    let fixture_base = base_dir.join(FIXTURE_DIR);
    let sheets = excel::read_workbook(excel_path)?;

    let mut summary = ConvertSummary::default();
    for sheet in &sheets {
        if sheet.rows.is_empty() {
            continue;
        }
        summary.sheets += 1;
        for row in &sheet.rows {
            let mapped = mapper::map_row(row, &cfg);
            let location = paths::build_output_location(row, &sheet.name, &fixture_base, &cfg);
            fixture::write(&location.file_path, &mapped.payload, &mapped.description)?;
            summary.fixtures += 1;
        }
        info!(sheet = %sheet.name, rows = sheet.rows.len(), "converted sheet");
    }

    Ok(summary)
}

/// Collection file names must be filesystem-safe; group keys carry spaces
/// and punctuation from free-form entry modes.
fn safe_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Output path for one collection document. The mandatory branch is only
/// present when the fixtures carried one.
fn collection_path(
    base_dir: &Path,
    key: &postman::GroupKey,
    name: &str,
    timestamp: &str,
) -> PathBuf {
    let mut dir = base_dir.join(COLLECTION_DIR);
    if let Some(mandatory) = key.mandatory {
        dir = dir.join(mandatory.as_str());
    }
    dir = dir.join(&key.sheet).join(&key.currency_label);
    dir.join(format!(
        "{}_{}_{timestamp}.json",
        name.to_lowercase(),
        safe_key(&key.collection_key)
    ))
}

/// Scans fixtures under `<base>/json` and writes one collection per group
/// under `<base>/postman`.
pub fn generate_collections(
    base_dir: &Path,
    gateway: Gateway,
    name: &str,
) -> anyhow::Result<PostmanSummary> {
    let fixture_base = base_dir.join(FIXTURE_DIR);
    let files = fixture::discover(&fixture_base)?;
    if files.is_empty() {
        anyhow::bail!("No fixtures found under {}", fixture_base.display());
    }

    let mut summary = PostmanSummary::default();
    let mut fixtures = Vec::new();
    for file in &files {
        let Some(fixture_path) = paths::decompose_fixture_path(file, FIXTURE_DIR) else {
            warn!(path = %file.display(), "fixture outside the json tree, skipping");
            summary.skipped += 1;
            continue;
        };
        match fixture::read(file) {
            Ok(fx) => fixtures.push((fixture_path, fx)),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "unreadable fixture, skipping");
                summary.skipped += 1;
            }
        }
    }
    summary.fixtures = fixtures.len();

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let groups = postman::group_items(gateway, &fixtures)?;

    for (key, mut requests) in groups {
        postman::sort_requests(&mut requests);
        let collection_name = format!(
            "{name}|{}|{}|{}-{timestamp}",
            key.sheet, key.currency_label, key.collection_key
        );
        let collection = postman::Collection::new(collection_name, requests);

        let path = collection_path(base_dir, &key, name, &timestamp);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&collection)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        summary.collections += 1;
    }

    Ok(summary)
}
