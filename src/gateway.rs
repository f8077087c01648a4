//! Per-gateway mapping configuration.
//!
//! The two target APIs share one mapper; everything that differs between
//! them lives in a `GatewayConfig` built here: the header table, the
//! constant defaults, and a handful of policy switches. Historical script
//! variants collapse into these two configurations.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Fatal configuration errors. Everything else in the pipeline degrades;
/// an unknown gateway selector rejects the whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown request type: {0}")]
    UnknownGateway(String),
}

/// Target gateway selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gateway {
    /// OneCo REST API (cents amounts, alpha currency codes).
    OneCo,
    /// Zgate transaction API (decimal amounts, numeric currency codes).
    Zgate,
}

impl Gateway {
    /// Parses a selector, case-insensitively (`"oneCo"` and `"oneco"` are
    /// both accepted). The CLI feeds `--gateway` / `--request-type`
    /// through here, so a bad selector rejects the run up front.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "oneco" => Ok(Self::OneCo),
            "zgate" => Ok(Self::Zgate),
            other => Err(Error::UnknownGateway(other.to_string())),
        }
    }

    /// Returns the full mapping configuration for this gateway.
    pub fn config(self) -> GatewayConfig {
        match self {
            Self::OneCo => GatewayConfig::oneco(),
            Self::Zgate => GatewayConfig::zgate(),
        }
    }
}

/// Per-key transform applied when a mapped column is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Trimmed string copy.
    Verbatim,
    /// First character of the trimmed value, uppercased (`"keyed"` → `"K"`).
    EntryModeLetter,
    /// Amount subject to the gateway's [`AmountPolicy`].
    Amount,
    /// Currency code subject to the gateway's [`CurrencyStyle`].
    Currency,
    /// Assembles the `billing_address` object from the row.
    BillingAddress,
    /// Bill-payment indicator subject to the gateway's [`BillPaymentStyle`].
    BillPayment,
    /// Card type, lowercased with the abbreviation table applied.
    CardTypeAbbrev,
}

/// How transaction and additional amounts are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Decimal string passthrough (`"10.00"` stays `"10.00"`).
    Passthrough,
    /// Integer minor-unit string (`"10.00"` → `"1000"`); zero-decimal
    /// currencies are exempt.
    Cents,
}

/// How the `currency_code` payload field is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyStyle {
    /// Numeric code passthrough (`"840"`).
    Numeric,
    /// Three-letter ISO code (`"840"` → `"USD"`), raw when unresolvable.
    IsoAlpha,
}

/// How the bill-payment indicator column lands in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillPaymentStyle {
    /// Raw string copy under `bill_payment`.
    Verbatim,
    /// Expanded flag cluster (`bill_payment`, `installment`, `recurring`, ...).
    FlagCluster,
}

/// How the currency appears in fixture paths and file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCurrencyStyle {
    /// Raw uppercased code segment, plain `<order>.json` file name.
    RawCode,
    /// Country label segment with the label repeated in the file name,
    /// keeping names unique across currency reruns of one order number.
    FullLabel,
}

/// Everything the mapper and path builder need to know about one gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub gateway: Gateway,
    /// Normalized header → (payload key, transform).
    pub field_map: &'static [(&'static str, &'static str, Transform)],
    pub amount_policy: AmountPolicy,
    pub currency_style: CurrencyStyle,
    pub bill_payment_style: BillPaymentStyle,
    pub path_currency: PathCurrencyStyle,
    /// Transaction type → action verb; `Some` makes the mapper emit an
    /// `action` key with lowercased-raw fallback.
    pub action_map: Option<&'static [(&'static str, &'static str)]>,
    /// Extra key forced in alongside `initiation_type` for COF rows.
    pub cof_type_zero: bool,
}

impl GatewayConfig {
    fn oneco() -> Self {
        Self {
            gateway: Gateway::OneCo,
            field_map: &[
                ("account number", "account_number", Transform::Verbatim),
                ("transaction amount", "transaction_amount", Transform::Amount),
                ("notification email address", "notification_email_address", Transform::Verbatim),
                ("ccv data", "cvv", Transform::Verbatim),
                ("entry mode", "entry_mode_id", Transform::EntryModeLetter),
                ("industry", "industry_type", Transform::Verbatim),
                ("trans. currency", "currency_code", Transform::Currency),
                ("test case number", "order_number", Transform::Verbatim),
                ("avs billing address", "billing_address", Transform::BillingAddress),
                ("bill payment indicator", "bill_payment", Transform::BillPayment),
                ("card type", "card_type", Transform::Verbatim),
                ("payment type", "payment_type", Transform::Verbatim),
                ("ebt type", "ebt_type", Transform::Verbatim),
            ],
            amount_policy: AmountPolicy::Cents,
            currency_style: CurrencyStyle::IsoAlpha,
            bill_payment_style: BillPaymentStyle::FlagCluster,
            path_currency: PathCurrencyStyle::FullLabel,
            action_map: None,
            cof_type_zero: false,
        }
    }

    fn zgate() -> Self {
        Self {
            gateway: Gateway::Zgate,
            field_map: &[
                ("avs billing address", "billing_street", Transform::Verbatim),
                ("avs billing postal code", "billing_zip", Transform::Verbatim),
                ("bill payment indicator", "bill_payment", Transform::BillPayment),
                ("tax indicator", "sales_tax", Transform::Verbatim),
                ("deferred payment plan", "deferred", Transform::Verbatim),
                ("transaction amount", "amount", Transform::Amount),
                ("account number", "account_number", Transform::Verbatim),
                ("entry mode", "entry_mode", Transform::Verbatim),
                ("trans. currency", "currency_code", Transform::Currency),
                ("card type", "card_type", Transform::CardTypeAbbrev),
                ("payment type", "payment_type", Transform::Verbatim),
                ("test case number", "order_number", Transform::Verbatim),
                ("ccv data", "cvv", Transform::Verbatim),
            ],
            amount_policy: AmountPolicy::Passthrough,
            currency_style: CurrencyStyle::Numeric,
            bill_payment_style: BillPaymentStyle::Verbatim,
            path_currency: PathCurrencyStyle::RawCode,
            action_map: Some(&[
                ("authorization", "sale"),
                ("refund", "return"),
                ("verification", "avsonly"),
            ]),
            cof_type_zero: true,
        }
    }

    /// Constant placeholder defaults seeded into every payload.
    pub fn defaults(&self) -> Map<String, Value> {
        let value = match self.gateway {
            Gateway::OneCo => json!({
                "location_id": "{{location_id}}",
                "product_transaction_id": "{{product_transaction_id_ecommerce}}",
                "exp_date": "1226",
            }),
            Gateway::Zgate => json!({
                "terminal_msr_capable": 0,
                "debit": 0,
                "card_id_code": "01",
                "secure_auth_data": "MDAwMDAwMDAwMDAwMDAwMzIyNzY=",
                "exp_date": "1226",
                "partial_auth_capability": "1",
                "card_present": false,
            }),
        };
        match value {
            Value::Object(map) => map,
            _ => unreachable!("defaults are object literals"),
        }
    }
}

/// Normalization table for additional-amount types.
pub const AMOUNT_TYPE_NORMALIZER: &[(&str, &str)] = &[
    ("hltcare", "healthcare"),
    ("rx", "rx"),
    ("clinical", "clinical"),
    ("dental", "dental"),
];

/// Card-type abbreviations shared by payloads and directory names.
pub const CARD_TYPE_ABBREVIATIONS: &[(&str, &str)] =
    &[("mastercard", "mc"), ("discover", "disc")];

/// Lowercases a card type, collapses whitespace to underscores and applies
/// the abbreviation table. Empty input degrades to `"unknown"`.
pub fn normalize_card_type(raw: &str) -> String {
    let base = if raw.trim().is_empty() { "unknown" } else { raw };
    let collapsed = base
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    CARD_TYPE_ABBREVIATIONS
        .iter()
        .find(|(from, _)| *from == collapsed)
        .map_or(collapsed, |(_, to)| (*to).to_string())
}
