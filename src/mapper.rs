//! Row-to-payload mapping engine.
//!
//! One pass over the gateway's header table plus a handful of derived
//! fields. The mapper never fails: absent or malformed input degrades to an
//! omitted key, a default, or a best-effort fallback. Downstream consumers
//! assert on key *absence*, so optional derived fields are left out
//! entirely rather than written as null or empty.

use serde_json::{json, Map, Value};

use crate::currency;
use crate::description;
use crate::gateway::{
    normalize_card_type, AmountPolicy, BillPaymentStyle, CurrencyStyle, GatewayConfig, Transform,
    AMOUNT_TYPE_NORMALIZER,
};
use crate::row::Row;

/// A mapped row: the request payload plus the raw description, which is
/// carried alongside (not inside) the payload for the fixture writer and
/// the void-detection rule.
#[derive(Debug, Clone)]
pub struct MappedRow {
    pub payload: Map<String, Value>,
    pub description: String,
}

/// Maps one normalized row to a gateway payload.
pub fn map_row(row: &Row, cfg: &GatewayConfig) -> MappedRow {
    let mut payload = cfg.defaults();
    let currency_code = row.trimmed("trans. currency");

    for (header, key, transform) in cfg.field_map {
        let raw = row.trimmed(header);
        if raw.is_empty() {
            continue;
        }
        match transform {
            Transform::Verbatim => {
                payload.insert((*key).to_string(), Value::String(raw.to_string()));
            }
            Transform::EntryModeLetter => {
                let letter: String = raw.chars().take(1).flat_map(char::to_uppercase).collect();
                payload.insert((*key).to_string(), Value::String(letter));
            }
            Transform::Amount => {
                let amount = convert_amount(raw, cfg.amount_policy, currency_code);
                payload.insert((*key).to_string(), Value::String(amount));
            }
            Transform::Currency => {
                let code = match cfg.currency_style {
                    CurrencyStyle::Numeric => raw.to_string(),
                    CurrencyStyle::IsoAlpha => currency::iso_or_raw(raw),
                };
                payload.insert((*key).to_string(), Value::String(code));
            }
            Transform::BillingAddress => {
                payload.insert("billing_address".to_string(), billing_address(row, currency_code));
            }
            Transform::BillPayment => match cfg.bill_payment_style {
                BillPaymentStyle::Verbatim => {
                    payload.insert((*key).to_string(), Value::String(raw.to_string()));
                }
                BillPaymentStyle::FlagCluster => apply_bill_payment_cluster(&mut payload, raw),
            },
            Transform::CardTypeAbbrev => {
                payload.insert((*key).to_string(), Value::String(normalize_card_type(raw)));
            }
        }
    }

    if let Some(action_map) = cfg.action_map {
        let transaction_type = row.trimmed("transaction type").to_lowercase();
        let action = action_map
            .iter()
            .find(|(from, _)| *from == transaction_type)
            .map_or_else(|| transaction_type.clone(), |(_, to)| (*to).to_string());
        payload.insert("action".to_string(), Value::String(action));
    }

    // COF is a stored-credential submission; the API requires the key to be
    // present even though the value is chosen at send time.
    if row.trimmed("entry mode").eq_ignore_ascii_case("cof") {
        payload.insert("initiation_type".to_string(), Value::String(String::new()));
        if cfg.cof_type_zero {
            payload.insert("cof_type".to_string(), json!(0));
        }
    }

    if let Some(amounts) = parse_additional_amounts(
        row.get("additional amount"),
        row.get("additional amount type"),
        cfg.amount_policy,
        currency_code,
    ) {
        payload.insert("additional_amounts".to_string(), amounts);
    }

    let desc = row.trimmed("description").to_string();
    if description::is_secure_commerce(&desc) {
        payload.insert(
            "secure_auth_data".to_string(),
            Value::String(description::SECURE_AUTH_DATA.to_string()),
        );
    }
    if description::is_three_d_secure(&desc) {
        payload.insert("threedsecure".to_string(), Value::String("1".to_string()));
        payload.insert(
            "secure_auth_data".to_string(),
            Value::String(description::SECURE_AUTH_DATA.to_string()),
        );
    }

    MappedRow { payload, description: desc }
}

/// Applies the gateway amount policy. Non-numeric input counts as zero in
/// cents mode; zero-decimal currencies are never converted.
fn convert_amount(raw: &str, policy: AmountPolicy, currency_code: &str) -> String {
    match policy {
        AmountPolicy::Passthrough => raw.to_string(),
        AmountPolicy::Cents => {
            if currency::is_zero_decimal(currency_code) {
                return raw.to_string();
            }
            let value = raw.parse::<f64>().unwrap_or(0.0);
            #[allow(clippy::cast_possible_truncation)]
            let cents = (value * 100.0).round() as i64;
            cents.to_string()
        }
    }
}

/// Billing country comes from the transaction currency, not a separate
/// column; the fixtures assume billing country == currency country.
fn billing_address(row: &Row, currency_code: &str) -> Value {
    json!({
        "city": "",
        "state": "",
        "postal_code": row.trimmed("avs billing postal code"),
        "phone": "",
        "country": currency::country_or_empty(currency_code),
    })
}

/// Expands the bill-payment indicator into its flag cluster. Only called
/// for non-empty values; an empty indicator leaves the whole cluster out.
fn apply_bill_payment_cluster(payload: &mut Map<String, Value>, value: &str) {
    payload.insert("bill_payment".to_string(), json!(true));
    payload.insert("installment".to_string(), json!(value == "Installment"));
    payload.insert("installment_number".to_string(), json!(1));
    payload.insert("installment_count".to_string(), json!(1));
    payload.insert("recurring".to_string(), json!(value == "Recurring"));
    payload.insert("recurring_number".to_string(), json!(1));
    if value == "Deferred" {
        payload.insert("deferred".to_string(), json!(true));
    }
}

/// Pairs the comma-separated amount list with the independently normalized
/// type list, truncating to the shorter of the two. Entries with an empty
/// side are dropped; an empty result means no key at all.
fn parse_additional_amounts(
    amounts: &str,
    types: &str,
    policy: AmountPolicy,
    currency_code: &str,
) -> Option<Value> {
    if amounts.trim().is_empty() || types.trim().is_empty() {
        return None;
    }

    let amount_list: Vec<&str> = amounts.split(',').map(str::trim).collect();
    let type_list: Vec<String> = types.split(',').map(|t| t.trim().to_lowercase()).collect();

    let mut entries = Vec::new();
    for (amount, raw_type) in amount_list.iter().zip(&type_list) {
        let normalized = AMOUNT_TYPE_NORMALIZER
            .iter()
            .find(|(from, _)| from == raw_type)
            .map_or(raw_type.as_str(), |(_, to)| *to);
        if normalized.is_empty() || amount.is_empty() {
            continue;
        }
        entries.push(json!({
            "type": normalized,
            "amount": convert_amount(amount, policy, currency_code),
        }));
    }

    if entries.is_empty() {
        None
    } else {
        Some(Value::Array(entries))
    }
}
