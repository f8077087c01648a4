//! Grouped currency test-case report.
//!
//! Filters the first sheet of a workbook to one transaction currency,
//! pulls the network indicator values out of each free-text description,
//! then collapses test cases that share every extracted parameter into a
//! single CSV line listing all of their test case numbers.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use crate::currency;
use crate::description;
use crate::excel;
use crate::row::Row;

static ECOMM_TXN_IND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EcommTxnInd.*?value of (\d{2})").unwrap());
static REFUND_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)RefundType.*?'(\w+)'").unwrap());
static VISA_AUTH_IND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VisaAuthInd.*?'(\w+)'").unwrap());

pub const CSV_HEADERS: &[&str] = &[
    "Sr. No.",
    "Test Case Numbers",
    "Transaction Amount",
    "EcommTxnInd",
    "VisaAuthInd",
    "RefundType",
    "Transaction Description",
    "Card Type",
];

/// Counters reported after a `report` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub rows: usize,
    pub groups: usize,
}

/// The parameters one report line groups on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportEntry {
    amount: String,
    ecomm_txn_ind: String,
    visa_auth_ind: String,
    refund_type: String,
    transaction_description: String,
    card_type: String,
    test_case_numbers: Vec<String>,
}

fn first_capture(re: &Regex, text: &str) -> String {
    re.captures(text).and_then(|c| c.get(1)).map_or_else(String::new, |m| m.as_str().to_string())
}

/// Security class of a transaction, read off the same heuristics the
/// payload mapper uses. Blank when the text names none of the three
/// classes.
fn describe_transaction(raw: &str) -> &'static str {
    if description::is_three_d_secure(raw) {
        "Non-authenticated 3-D Secure transaction"
    } else if description::is_secure_commerce(raw) {
        "Secure Electronic Commerce transaction"
    } else if raw.to_lowercase().contains("ssl transaction") {
        "SSL transaction"
    } else {
        ""
    }
}

fn entry_for(row: &Row, currency_code: &str) -> ReportEntry {
    let desc = row.trimmed("description");
    let symbol = currency::lookup(currency_code).map_or("", |c| c.symbol);
    let amount = row.trimmed("transaction amount");
    let suffix = if description::is_void(desc) { " (Void)" } else { " (Authorization)" };

    ReportEntry {
        amount: if amount.is_empty() { String::new() } else { format!("{symbol}{amount}") },
        ecomm_txn_ind: first_capture(&ECOMM_TXN_IND, desc),
        visa_auth_ind: first_capture(&VISA_AUTH_IND, desc),
        refund_type: first_capture(&REFUND_TYPE, desc),
        transaction_description: describe_transaction(desc).to_string(),
        card_type: row.trimmed("card type").to_string(),
        test_case_numbers: vec![format!("{}{suffix}", row.trimmed("test case number"))],
    }
}

fn same_group(a: &ReportEntry, b: &ReportEntry) -> bool {
    a.amount == b.amount
        && a.ecomm_txn_ind == b.ecomm_txn_ind
        && a.visa_auth_ind == b.visa_auth_ind
        && a.refund_type == b.refund_type
        && a.transaction_description == b.transaction_description
        && a.card_type == b.card_type
}

/// Groups matching rows in first-seen order.
fn group_rows(rows: &[Row], currency_code: &str) -> Vec<ReportEntry> {
    let mut groups: Vec<ReportEntry> = Vec::new();
    for row in rows {
        if row.trimmed("trans. currency") != currency_code.trim() {
            continue;
        }
        let entry = entry_for(row, currency_code);
        match groups.iter_mut().find(|g| same_group(g, &entry)) {
            Some(existing) => existing.test_case_numbers.extend(entry.test_case_numbers),
            None => groups.push(entry),
        }
    }
    groups
}

/// Reads the workbook's first sheet and writes the grouped CSV report.
pub fn write_report(
    excel_path: &Path,
    currency_code: &str,
    output: &Path,
) -> anyhow::Result<ReportSummary> {
    let sheets = excel::read_workbook(excel_path)?;
    let first = sheets
        .first()
        .with_context(|| format!("{} has no sheets", excel_path.display()))?;

    let groups = group_rows(&first.rows, currency_code);
    let rows = groups.iter().map(|g| g.test_case_numbers.len()).sum();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    writer.write_record(CSV_HEADERS)?;
    for (i, group) in groups.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string().as_str(),
            &group.test_case_numbers.join(", "),
            &group.amount,
            &group.ecomm_txn_ind,
            &group.visa_auth_ind,
            &group.refund_type,
            &group.transaction_description,
            &group.card_type,
        ])?;
    }
    writer.flush()?;

    Ok(ReportSummary { groups: groups.len(), rows })
}
