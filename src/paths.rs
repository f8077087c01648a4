//! Fixture path construction and decomposition.
//!
//! The directory hierarchy encodes the test taxonomy
//! (`<base>/<sheet>/<currency>/<payment>/<transaction>/<card>/<file>.json`)
//! and is both written by the converter and read back by the postman
//! generator. Decomposition is explicit and named here so the two sides
//! cannot drift apart by a directory level.

use std::path::{Component, Path, PathBuf};

use rand::Rng;
use tracing::warn;

use crate::currency;
use crate::gateway::{normalize_card_type, GatewayConfig, PathCurrencyStyle};
use crate::row::Row;

/// Directory and file path for one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub directory: PathBuf,
    pub file_path: PathBuf,
}

/// Lowercases a path segment and collapses whitespace to underscores,
/// degrading to `"unknown"` when blank.
fn segment(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "unknown".to_string();
    }
    raw.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Order number for file naming. A missing test-case number is a
/// data-quality gap in the source sheet; the random fallback keeps the
/// batch going but breaks idempotent regeneration, so it is logged.
pub fn order_number(row: &Row) -> String {
    let raw = row.trimmed("test case number");
    if raw.is_empty() {
        let fallback = format!("unknown-{}", random_base36(6));
        warn!(fallback, "row has no test case number, using random file name");
        fallback
    } else {
        raw.to_string()
    }
}

fn random_base36(len: usize) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])).collect()
}

/// Builds the output location for one row under `base_dir`.
pub fn build_output_location(
    row: &Row,
    sheet_name: &str,
    base_dir: &Path,
    cfg: &GatewayConfig,
) -> OutputLocation {
    let card_type = normalize_card_type(row.get("card type"));
    let payment_type = segment(row.get("payment type"));
    let transaction_type = {
        let t = row.trimmed("transaction type").to_lowercase();
        if t.is_empty() { "unknown".to_string() } else { t }
    };
    let order = order_number(row);

    let raw_code: String = {
        let c = row.trimmed("trans. currency");
        if c.is_empty() {
            "unknown".to_string()
        } else {
            c.to_uppercase().split_whitespace().collect()
        }
    };

    let (currency_segment, file_name) = match cfg.path_currency {
        PathCurrencyStyle::RawCode => (raw_code, format!("{order}.json")),
        PathCurrencyStyle::FullLabel => {
            let label = currency::label_or_raw(&raw_code);
            let file = format!("{order}_{label}.json");
            (label, file)
        }
    };

    let directory = base_dir
        .join(sheet_name)
        .join(currency_segment)
        .join(payment_type)
        .join(transaction_type)
        .join(card_type);
    let file_path = directory.join(file_name);

    OutputLocation { directory, file_path }
}

/// Whether a fixture sits under a `mandatory` or `non-mandatory` branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MandatoryClass {
    Mandatory,
    NonMandatory,
}

impl MandatoryClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::NonMandatory => "non-mandatory",
        }
    }

    fn from_segment(seg: &str) -> Option<Self> {
        match seg {
            "mandatory" => Some(Self::Mandatory),
            "non-mandatory" => Some(Self::NonMandatory),
            _ => None,
        }
    }
}

/// Named decomposition of a fixture path, anchored at the `json` segment.
/// Every taxonomy field is optional; the classifier falls back to payload
/// content for anything the path does not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixturePath {
    pub mandatory: Option<MandatoryClass>,
    pub sheet: Option<String>,
    pub currency: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_type: Option<String>,
    pub card_type: Option<String>,
    pub file_stem: String,
}

/// Splits a fixture path into named taxonomy segments. Returns `None` when
/// the anchor segment is absent entirely.
pub fn decompose_fixture_path(path: &Path, anchor: &str) -> Option<FixturePath> {
    let components: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => Some(os.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let anchor_idx = components.iter().position(|c| c == anchor)?;
    let file_stem = Path::new(components.last()?)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Segments strictly between the anchor and the file name.
    let mut rest = components
        .get(anchor_idx + 1..components.len().saturating_sub(1))
        .unwrap_or(&[]);

    let mandatory = rest.first().and_then(|s| MandatoryClass::from_segment(s));
    if mandatory.is_some() {
        rest = &rest[1..];
    }

    let field = |i: usize| rest.get(i).cloned();

    Some(FixturePath {
        mandatory,
        sheet: field(0),
        currency: field(1),
        payment_type: field(2),
        transaction_type: field(3),
        card_type: field(4),
        file_stem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use pretty_assertions::assert_eq;

    #[test]
    fn zgate_location_uses_raw_currency_code() {
        let row = Row::from_raw([
            ("card type", "MasterCard"),
            ("payment type", "Credit"),
            ("transaction type", "Authorization"),
            ("test case number", "TEST001"),
            ("trans. currency", "840"),
        ]);
        let loc =
            build_output_location(&row, "Sheet1", Path::new("out/json"), &Gateway::Zgate.config());
        assert_eq!(
            loc.file_path,
            Path::new("out/json/Sheet1/840/credit/authorization/mc/TEST001.json")
        );
    }

    #[test]
    fn oneco_location_repeats_currency_label_in_file_name() {
        let row = Row::from_raw([
            ("card type", "Visa"),
            ("payment type", "credit"),
            ("transaction type", "refund"),
            ("test case number", "TEST002"),
            ("trans. currency", "978"),
        ]);
        let loc =
            build_output_location(&row, "Sheet2", Path::new("out/json"), &Gateway::OneCo.config());
        assert_eq!(
            loc.file_path,
            Path::new("out/json/Sheet2/EUR_Europe_978/credit/refund/visa/TEST002_EUR_Europe_978.json")
        );
    }

    #[test]
    fn blank_taxonomy_degrades_to_unknown_segments() {
        let row = Row::from_raw([("test case number", "TEST003")]);
        let loc =
            build_output_location(&row, "Sheet1", Path::new("out/json"), &Gateway::Zgate.config());
        assert_eq!(
            loc.file_path,
            Path::new("out/json/Sheet1/unknown/unknown/unknown/unknown/TEST003.json")
        );
    }

    #[test]
    fn missing_order_number_gets_random_suffix() {
        let row = Row::from_raw([("card type", "visa")]);
        let loc =
            build_output_location(&row, "Sheet1", Path::new("out/json"), &Gateway::Zgate.config());
        let stem = loc.file_path.file_stem().unwrap().to_string_lossy().into_owned();
        assert!(stem.starts_with("unknown-"));
        assert_eq!(stem.len(), "unknown-".len() + 6);
    }

    #[test]
    fn decompose_reads_named_segments() {
        let path = Path::new(
            "out/json/mandatory/Sheet1/USD_UnitedStates_840/credit/authorization/mc/TEST001_USD_UnitedStates_840.json",
        );
        let fx = decompose_fixture_path(path, "json").unwrap();
        assert_eq!(fx.mandatory, Some(MandatoryClass::Mandatory));
        assert_eq!(fx.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(fx.currency.as_deref(), Some("USD_UnitedStates_840"));
        assert_eq!(fx.payment_type.as_deref(), Some("credit"));
        assert_eq!(fx.transaction_type.as_deref(), Some("authorization"));
        assert_eq!(fx.card_type.as_deref(), Some("mc"));
        assert_eq!(fx.file_stem, "TEST001_USD_UnitedStates_840");
    }

    #[test]
    fn decompose_without_mandatory_branch() {
        let path = Path::new("out/json/Sheet2/978/credit/refund/amex/TEST003.json");
        let fx = decompose_fixture_path(path, "json").unwrap();
        assert_eq!(fx.mandatory, None);
        assert_eq!(fx.sheet.as_deref(), Some("Sheet2"));
        assert_eq!(fx.currency.as_deref(), Some("978"));
        assert_eq!(fx.card_type.as_deref(), Some("amex"));
    }

    #[test]
    fn decompose_tolerates_short_paths() {
        let fx = decompose_fixture_path(Path::new("json/TEST004.json"), "json").unwrap();
        assert_eq!(fx.sheet, None);
        assert_eq!(fx.file_stem, "TEST004");
        assert_eq!(decompose_fixture_path(Path::new("elsewhere/TEST004.json"), "json"), None);
    }
}
