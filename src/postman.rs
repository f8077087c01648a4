//! Postman collection assembly.
//!
//! Turns discovered fixtures into Postman Collection v2.1.0 documents: one
//! request template per fixture, grouped by mandatory class, sheet,
//! currency and `<entry-mode-class>_<transaction-type>`, with POST
//! requests ordered before PUT requests inside every group.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::currency;
use crate::description;
use crate::fixture::Fixture;
use crate::gateway::Gateway;
use crate::paths::{FixturePath, MandatoryClass};

/// Collection schema identifier embedded in every emitted document.
pub const SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

const EXPORTER_ID: &str = "17429670";

/// Assertion script attached verbatim to every request. Payload for the
/// Postman runner, never executed here.
pub const TEST_SCRIPT: &[&str] = &[
    "let response = pm.response.json();",
    "",
    "pm.test(`Transaction status must be 'approved'`, function () {",
    "    pm.expect(response.status.toLowerCase()).to.eql(\"approved\");",
    "});",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
}

impl Method {
    /// POST sorts before PUT within a collection.
    const fn sort_rank(self) -> u8 {
        match self {
            Self::Post => 0,
            Self::Put => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub key: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub mode: &'static str,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestUrl {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
}

/// One HTTP request template.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub header: Vec<Header>,
    pub body: Body,
    pub url: RequestUrl,
}

#[derive(Debug, Clone, Serialize)]
struct Script {
    #[serde(rename = "type")]
    kind: &'static str,
    exec: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Event {
    listen: &'static str,
    script: Script,
}

/// A named request plus its test script, as one collection item.
#[derive(Debug, Clone, Serialize)]
pub struct RequestItem {
    pub name: String,
    event: Vec<Event>,
    pub request: RequestDescriptor,
    response: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
struct Folder {
    name: &'static str,
    item: Vec<RequestItem>,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    #[serde(rename = "_postman_id")]
    postman_id: String,
    name: String,
    schema: &'static str,
    #[serde(rename = "_exporter_id")]
    exporter_id: &'static str,
}

/// A complete collection document.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    info: Info,
    item: Vec<Folder>,
}

impl Collection {
    /// Wraps sorted requests in a fresh document with a random id.
    pub fn new(name: String, requests: Vec<RequestItem>) -> Self {
        Self {
            info: Info {
                postman_id: Uuid::new_v4().to_string(),
                name,
                schema: SCHEMA_URL,
                exporter_id: EXPORTER_ID,
            },
            item: vec![Folder { name: "Test Cases", item: requests }],
        }
    }

    #[cfg(test)]
    fn requests(&self) -> &[RequestItem] {
        &self.item[0].item
    }
}

/// Entry-mode class used in collection keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryModeClass {
    Cof,
    Keyed,
    Other(String),
}

impl EntryModeClass {
    pub fn label(&self) -> String {
        match self {
            Self::Cof => "COF".to_string(),
            Self::Keyed => "KEYED".to_string(),
            Self::Other(mode) => {
                let collapsed: String =
                    mode.to_uppercase().split_whitespace().collect::<Vec<_>>().join("");
                if collapsed.is_empty() { "OTHER".to_string() } else { collapsed }
            }
        }
    }
}

/// Grouping key for one collection. `BTreeMap` iteration over these keys
/// makes emission order deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub mandatory: Option<MandatoryClass>,
    pub sheet: String,
    pub currency_label: String,
    pub collection_key: String,
}

/// Classification of one fixture, derived from its path segments with
/// payload fields as fallback (path wins where both exist).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mandatory: Option<MandatoryClass>,
    pub sheet: String,
    pub currency_label: String,
    pub payment_type: String,
    pub transaction_type: String,
    pub card_type: String,
    pub entry_mode: String,
    pub entry_class: EntryModeClass,
    pub order_number: String,
}

impl Classification {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            mandatory: self.mandatory,
            sheet: self.sheet.clone(),
            currency_label: self.currency_label.clone(),
            collection_key: format!("{}_{}", self.entry_class.label(), self.transaction_type),
        }
    }

    /// Descriptive request name shown in the Postman sidebar.
    pub fn request_name(&self) -> String {
        format!(
            "{} - {} - {} - {} - {}",
            self.transaction_type,
            self.card_type,
            self.entry_mode.to_uppercase(),
            self.currency_label,
            self.order_number
        )
    }
}

fn payload_str(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Classifies one discovered fixture.
pub fn classify(fixture_path: &FixturePath, fixture: &Fixture) -> Classification {
    let payload = &fixture.payload;

    let sheet = fixture_path.sheet.clone().unwrap_or_else(|| "UNKNOWN_SHEET".to_string());
    let payment_type = fixture_path
        .payment_type
        .clone()
        .or_else(|| payload_str(payload, "payment_type"))
        .unwrap_or_else(|| "unknown".to_string())
        .to_uppercase();
    let transaction_type = fixture_path
        .transaction_type
        .clone()
        .unwrap_or_else(|| "unknown".to_string())
        .to_uppercase();
    let card_type = fixture_path
        .card_type
        .clone()
        .or_else(|| payload_str(payload, "card_type"))
        .unwrap_or_else(|| "unknown".to_string())
        .to_uppercase();

    let entry_mode = payload_str(payload, "entry_mode")
        .or_else(|| payload_str(payload, "entry_mode_id"))
        .unwrap_or_default()
        .to_lowercase();

    // Any cof_type other than empty/0/false marks a stored-credential
    // fixture regardless of entry mode.
    let cof_type = payload.get("cof_type").map(|v| match v {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    });
    let cof_flag =
        cof_type.is_some_and(|c| !c.is_empty() && c != "0" && c != "false");

    let entry_class = if cof_flag || entry_mode == "c" || entry_mode == "cof" {
        EntryModeClass::Cof
    } else if entry_mode == "k" || entry_mode == "keyed" {
        EntryModeClass::Keyed
    } else {
        EntryModeClass::Other(entry_mode.clone())
    };

    let currency_code = payload_str(payload, "currency_code")
        .or_else(|| fixture_path.currency.clone())
        .unwrap_or_default()
        .to_uppercase()
        .split_whitespace()
        .collect::<String>();
    let currency_label = currency::label_or_unknown(&currency_code);

    let order_number =
        payload_str(payload, "order_number").unwrap_or_else(|| fixture_path.file_stem.clone());

    Classification {
        mandatory: fixture_path.mandatory,
        sheet,
        currency_label,
        payment_type,
        transaction_type,
        card_type,
        entry_mode,
        entry_class,
        order_number,
    }
}

fn headers_for(gateway: Gateway) -> Vec<Header> {
    match gateway {
        Gateway::Zgate => vec![
            Header { key: "user-id", value: "{{ecomm_user_id}}" },
            Header { key: "user-key", value: "{{ecomm_user_key}}" },
            Header { key: "Content-Type", value: "application/json" },
        ],
        Gateway::OneCo => vec![
            Header { key: "user-id", value: "{{user-id}}" },
            Header { key: "user-api-key", value: "{{user-api-key}}" },
            Header { key: "Content-Type", value: "application/json" },
            Header { key: "developer-id", value: "{{developer-id}}" },
            Header { key: "Accept", value: "application/json" },
            Header { key: "access-token", value: "{{access-token}}" },
        ],
    }
}

/// Void placeholder: the referenced transaction id is the preceding order
/// number, formatted as a Postman variable. Non-numeric order numbers fall
/// back to a literal placeholder token.
fn void_dynamic_value(order_number: &str) -> String {
    order_number
        .trim()
        .parse::<i64>()
        .map_or_else(|_| "{{dynamicValue}}".to_string(), |n| format!("{{{{{}}}}}", n - 1))
}

/// Builds the HTTP request template for one fixture. A description
/// containing "void" selects PUT against the void endpoint with an empty
/// body; everything else is a POST to the gateway's submission endpoint.
pub fn build_request(
    gateway: Gateway,
    json_body: String,
    request_description: &str,
    order_number: &str,
) -> RequestDescriptor {
    let host = vec!["{{url}}".to_string()];

    if description::is_void(request_description) {
        let dynamic = void_dynamic_value(order_number);
        return RequestDescriptor {
            method: Method::Put,
            header: headers_for(gateway),
            body: Body { mode: "raw", raw: String::new() },
            url: RequestUrl {
                raw: format!("{{{{url}}}}/{{{{namespace}}}}/transactions/{dynamic}/void"),
                host,
                path: vec![
                    "{{namespace}}".to_string(),
                    "transactions".to_string(),
                    dynamic,
                    "void".to_string(),
                ],
            },
        };
    }

    let url = match gateway {
        Gateway::Zgate => RequestUrl {
            raw: "{{url}}/{{namespace}}/transactions".to_string(),
            host,
            path: vec!["{{namespace}}".to_string(), "transactions".to_string()],
        },
        Gateway::OneCo => RequestUrl {
            raw: "{{url}}/{{namespace}}/transactions/cc/sale/keyed".to_string(),
            host,
            path: vec!["{{namespace}}".to_string(), "transactions/cc/sale/keyed".to_string()],
        },
    };

    RequestDescriptor {
        method: Method::Post,
        header: headers_for(gateway),
        body: Body { mode: "raw", raw: json_body },
        url,
    }
}

/// Builds one collection item from a classified fixture.
pub fn build_item(
    gateway: Gateway,
    classification: &Classification,
    fixture: &Fixture,
) -> serde_json::Result<RequestItem> {
    let json_body = serde_json::to_string_pretty(&fixture.payload)?;
    let request = build_request(
        gateway,
        json_body,
        &fixture.description,
        &classification.order_number,
    );
    Ok(RequestItem {
        name: classification.request_name(),
        event: vec![Event {
            listen: "test",
            script: Script {
                kind: "text/javascript",
                exec: TEST_SCRIPT.iter().map(|s| (*s).to_string()).collect(),
            },
        }],
        request,
        response: Vec::new(),
    })
}

/// Groups classified fixtures into collections, preserving discovery order
/// within each group.
pub fn group_items(
    gateway: Gateway,
    fixtures: &[(FixturePath, Fixture)],
) -> serde_json::Result<BTreeMap<GroupKey, Vec<RequestItem>>> {
    let mut groups: BTreeMap<GroupKey, Vec<RequestItem>> = BTreeMap::new();
    for (fixture_path, fixture) in fixtures {
        let classification = classify(fixture_path, fixture);
        let item = build_item(gateway, &classification, fixture)?;
        groups.entry(classification.group_key()).or_default().push(item);
    }
    Ok(groups)
}

/// Stable sort placing POST requests before PUT requests; relative order
/// within each method follows discovery order.
pub fn sort_requests(requests: &mut [RequestItem]) {
    requests.sort_by_key(|item| item.request.method.sort_rank());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture(payload: Value, description: &str) -> Fixture {
        let Value::Object(map) = payload else { unreachable!() };
        Fixture { payload: map, description: description.to_string() }
    }

    fn path_for(raw: &str) -> FixturePath {
        crate::paths::decompose_fixture_path(std::path::Path::new(raw), "json").unwrap()
    }

    #[test]
    fn classify_keyed_fixture_from_path_and_payload() {
        let fx = fixture(
            json!({
                "action": "sale",
                "amount": "10.00",
                "entry_mode": "keyed",
                "currency_code": "840",
                "order_number": "TEST001",
            }),
            "",
        );
        let fp = path_for(
            "out/json/non-mandatory/Sheet1/USD_UnitedStates_840/credit/authorization/mc/TEST001_USD_UnitedStates_840.json",
        );
        let c = classify(&fp, &fx);
        assert_eq!(c.mandatory, Some(MandatoryClass::NonMandatory));
        assert_eq!(c.sheet, "Sheet1");
        assert_eq!(c.currency_label, "USD_UnitedStates_840");
        assert_eq!(c.transaction_type, "AUTHORIZATION");
        assert_eq!(c.card_type, "MC");
        assert_eq!(c.entry_class, EntryModeClass::Keyed);
        assert_eq!(c.group_key().collection_key, "KEYED_AUTHORIZATION");
        assert_eq!(
            c.request_name(),
            "AUTHORIZATION - MC - KEYED - USD_UnitedStates_840 - TEST001"
        );
    }

    #[test]
    fn classify_cof_via_cof_type_and_letter_mode() {
        let by_type = fixture(
            json!({ "entry_mode": "keyed", "cof_type": 1, "order_number": "A" }),
            "",
        );
        let fp = path_for("out/json/Sheet1/840/credit/authorization/visa/A.json");
        assert_eq!(classify(&fp, &by_type).entry_class, EntryModeClass::Cof);

        let zero_type = fixture(
            json!({ "entry_mode": "keyed", "cof_type": 0, "order_number": "A" }),
            "",
        );
        assert_eq!(classify(&fp, &zero_type).entry_class, EntryModeClass::Keyed);

        let by_letter = fixture(json!({ "entry_mode_id": "C", "order_number": "A" }), "");
        assert_eq!(classify(&fp, &by_letter).entry_class, EntryModeClass::Cof);
    }

    #[test]
    fn classify_unknown_entry_mode_uses_other_label() {
        let fx = fixture(json!({ "entry_mode": "contactless tap" }), "");
        let fp = path_for("out/json/Sheet1/840/credit/sale/mc/X.json");
        let c = classify(&fp, &fx);
        assert_eq!(c.entry_class, EntryModeClass::Other("contactless tap".to_string()));
        assert_eq!(c.group_key().collection_key, "CONTACTLESSTAP_SALE");

        let blank = fixture(json!({}), "");
        assert_eq!(classify(&fp, &blank).group_key().collection_key, "OTHER_SALE");
    }

    #[test]
    fn classify_falls_back_to_payload_and_file_stem() {
        let fx = fixture(
            json!({ "payment_type": "credit", "card_type": "amex", "currency_code": "978" }),
            "",
        );
        let fp = path_for("json/X42.json");
        let c = classify(&fp, &fx);
        assert_eq!(c.sheet, "UNKNOWN_SHEET");
        assert_eq!(c.payment_type, "CREDIT");
        assert_eq!(c.card_type, "AMEX");
        assert_eq!(c.currency_label, "EUR_Europe_978");
        assert_eq!(c.order_number, "X42");
    }

    #[test]
    fn post_request_urls_per_gateway() {
        let zgate = build_request(Gateway::Zgate, "{}".to_string(), "Regular transaction", "1");
        assert_eq!(zgate.method, Method::Post);
        assert_eq!(zgate.url.raw, "{{url}}/{{namespace}}/transactions");
        assert_eq!(zgate.url.path, vec!["{{namespace}}", "transactions"]);
        assert_eq!(zgate.header.len(), 3);
        assert_eq!(zgate.body.raw, "{}");

        let oneco = build_request(Gateway::OneCo, "{}".to_string(), "Regular transaction", "1");
        assert_eq!(oneco.url.raw, "{{url}}/{{namespace}}/transactions/cc/sale/keyed");
        assert_eq!(oneco.url.path, vec!["{{namespace}}", "transactions/cc/sale/keyed"]);
        assert!(oneco.header.iter().any(|h| h.key == "developer-id"));
        assert!(oneco.header.iter().any(|h| h.key == "access-token"));
    }

    #[test]
    fn void_description_selects_put_with_dynamic_url() {
        let req = build_request(
            Gateway::Zgate,
            "{\"a\":1}".to_string(),
            "Void transaction test",
            "100392430031",
        );
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.url.raw, "{{url}}/{{namespace}}/transactions/{{100392430030}}/void");
        assert_eq!(
            req.url.path,
            vec!["{{namespace}}", "transactions", "{{100392430030}}", "void"]
        );
        assert_eq!(req.body.raw, "");
    }

    #[test]
    fn void_dynamic_value_arithmetic() {
        assert_eq!(void_dynamic_value("1"), "{{0}}");
        assert_eq!(void_dynamic_value("100392440022"), "{{100392440021}}");
        assert_eq!(void_dynamic_value("TEST001"), "{{dynamicValue}}");
        assert_eq!(void_dynamic_value(""), "{{dynamicValue}}");
    }

    #[test]
    fn posts_sort_before_puts_stably() {
        let fp = path_for("out/json/Sheet1/840/credit/authorization/mc/A.json");
        let mk = |order: &str, desc: &str| {
            let fx = fixture(json!({ "order_number": order }), desc);
            build_item(Gateway::Zgate, &classify(&fp, &fx), &fx).unwrap()
        };
        let mut requests = vec![
            mk("100392430031", "This is a void transaction"),
            mk("TEST001", ""),
            mk("100392440022", "Void SSL transaction."),
            mk("TEST002", ""),
        ];
        sort_requests(&mut requests);

        let methods: Vec<Method> = requests.iter().map(|r| r.request.method).collect();
        assert_eq!(methods, vec![Method::Post, Method::Post, Method::Put, Method::Put]);
        // Stable within each method.
        assert!(requests[0].name.ends_with("TEST001"));
        assert!(requests[1].name.ends_with("TEST002"));
        assert!(requests[2].name.ends_with("100392430031"));
        assert!(requests[3].name.ends_with("100392440022"));
    }

    #[test]
    fn grouping_splits_by_entry_class_and_transaction_type() {
        let fixtures = vec![
            (
                path_for("out/json/Sheet1/840/credit/authorization/mc/T1.json"),
                fixture(json!({ "entry_mode": "keyed", "order_number": "T1" }), ""),
            ),
            (
                path_for("out/json/Sheet1/840/credit/authorization/visa/T2.json"),
                fixture(json!({ "entry_mode": "cof", "order_number": "T2" }), ""),
            ),
            (
                path_for("out/json/Sheet2/978/credit/refund/amex/T3.json"),
                fixture(json!({ "entry_mode": "keyed", "order_number": "T3" }), ""),
            ),
        ];
        let groups = group_items(Gateway::Zgate, &fixtures).unwrap();
        // BTreeMap keys iterate in sorted order: sheet first, then key.
        let keys: Vec<String> = groups.keys().map(|k| k.collection_key.clone()).collect();
        assert_eq!(keys, vec!["COF_AUTHORIZATION", "KEYED_AUTHORIZATION", "KEYED_REFUND"]);
        assert!(groups.keys().all(|k| k.mandatory.is_none()));
    }

    #[test]
    fn collection_document_shape() {
        let fp = path_for("out/json/Sheet1/840/credit/authorization/mc/T1.json");
        let fx = fixture(json!({ "entry_mode": "keyed", "order_number": "T1" }), "");
        let item = build_item(Gateway::Zgate, &classify(&fp, &fx), &fx).unwrap();
        let collection = Collection::new("Zgate|Sheet1".to_string(), vec![item]);

        let doc = serde_json::to_value(&collection).unwrap();
        assert_eq!(doc["info"]["schema"], SCHEMA_URL);
        assert_eq!(doc["info"]["_exporter_id"], EXPORTER_ID);
        assert_eq!(doc["info"]["name"], "Zgate|Sheet1");
        assert_eq!(doc["item"][0]["name"], "Test Cases");
        assert_eq!(doc["item"][0]["item"][0]["request"]["method"], "POST");
        assert_eq!(doc["item"][0]["item"][0]["event"][0]["listen"], "test");
        assert_eq!(
            doc["item"][0]["item"][0]["event"][0]["script"]["exec"][0],
            "let response = pm.response.json();"
        );
        // Fresh v4 id per document.
        assert_eq!(collection.requests().len(), 1);
        assert_eq!(doc["info"]["_postman_id"].as_str().unwrap().len(), 36);
    }
}
