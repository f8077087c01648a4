//! Static ISO 4217 currency table.
//!
//! Keyed by the numeric code string as it appears in the `trans. currency`
//! column. Lookups never fail: callers choose between raw passthrough
//! (fixture paths) and an `_Unknown` suffix (postman grouping).

/// One entry of the currency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyEntry {
    /// Numeric ISO 4217 code, zero-padded as used in the spreadsheets.
    pub numeric: &'static str,
    /// Three-letter ISO code.
    pub iso: &'static str,
    /// Country name used for billing addresses.
    pub country: &'static str,
    /// Directory label, e.g. `USD_UnitedStates_840`.
    pub label: &'static str,
    /// Display symbol used by the currency report.
    pub symbol: &'static str,
    /// Currencies with no minor unit are never cents-converted.
    pub zero_decimal: bool,
}

const CURRENCIES: &[CurrencyEntry] = &[
    CurrencyEntry { numeric: "036", iso: "AUD", country: "Australia", label: "AUD_Australia_036", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "124", iso: "CAD", country: "Canada", label: "CAD_Canada_124", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "344", iso: "HKD", country: "HongKong", label: "HKD_HongKong_344", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "392", iso: "JPY", country: "Japan", label: "JPY_Japan_392", symbol: "\u{a5}", zero_decimal: true },
    CurrencyEntry { numeric: "400", iso: "JOD", country: "Jordan", label: "JOD_Jordan_400", symbol: "JOD", zero_decimal: false },
    CurrencyEntry { numeric: "554", iso: "NZD", country: "NewZealand", label: "NZD_NewZealand_554", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "702", iso: "SGD", country: "Singapore", label: "SGD_Singapore_702", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "764", iso: "THB", country: "Thailand", label: "THB_Thailand_764", symbol: "\u{e3f}", zero_decimal: false },
    CurrencyEntry { numeric: "840", iso: "USD", country: "United States", label: "USD_UnitedStates_840", symbol: "$", zero_decimal: false },
    CurrencyEntry { numeric: "978", iso: "EUR", country: "Europe", label: "EUR_Europe_978", symbol: "\u{20ac}", zero_decimal: false },
    CurrencyEntry { numeric: "826", iso: "GBP", country: "UnitedKingdom", label: "GBP_UnitedKingdom_826", symbol: "\u{a3}", zero_decimal: false },
];

/// Looks up a currency by numeric code. Tolerates missing zero padding
/// (`"36"` and `"036"` both resolve to AUD).
pub fn lookup(numeric: &str) -> Option<&'static CurrencyEntry> {
    let trimmed = numeric.trim();
    CURRENCIES
        .iter()
        .find(|c| c.numeric == trimmed || c.numeric.trim_start_matches('0') == trimmed)
}

/// Directory label for a code, passing the raw code through when unknown.
/// Used by the fixture writer so unrecognized currencies still land in a
/// stable directory.
pub fn label_or_raw(numeric: &str) -> String {
    lookup(numeric).map_or_else(|| numeric.trim().to_string(), |c| c.label.to_string())
}

/// Grouping label for a code, degrading to `<code>_Unknown`. Used by the
/// postman generator, which sees numeric codes in Zgate payloads and
/// three-letter codes in OneCo payloads, so both shapes resolve here.
pub fn label_or_unknown(code: &str) -> String {
    let trimmed = code.trim();
    lookup(trimmed)
        .or_else(|| CURRENCIES.iter().find(|c| c.iso.eq_ignore_ascii_case(trimmed)))
        .map_or_else(|| format!("{trimmed}_Unknown"), |c| c.label.to_string())
}

/// Three-letter ISO code, passing the raw value through when unknown.
pub fn iso_or_raw(numeric: &str) -> String {
    lookup(numeric).map_or_else(|| numeric.trim().to_string(), |c| c.iso.to_string())
}

/// Billing country for a code, or `""` when unknown.
pub fn country_or_empty(numeric: &str) -> &'static str {
    lookup(numeric).map_or("", |c| c.country)
}

/// Returns `true` for currencies whose amounts carry no minor unit.
pub fn is_zero_decimal(numeric: &str) -> bool {
    lookup(numeric).is_some_and(|c| c.zero_decimal)
}
