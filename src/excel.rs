//! Excel workbook reading.
//!
//! Loads every sheet of an input workbook into header-keyed string rows.
//! The first row of each sheet is the header row; missing cells default to
//! the empty string so downstream mapping never sees absent columns.

use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::row::Row;

/// One sheet of the workbook.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Converts a cell to its spreadsheet-visible string form. Whole-number
/// floats render without a decimal point, matching how numeric currency
/// codes and test-case numbers appear in the sheets.
#[allow(clippy::cast_possible_truncation)]
fn cell_to_string(data: &Data) -> String {
    match data {
        Data::Empty | Data::Error(_) => String::new(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

/// Reads all sheets of a workbook into header-keyed rows. Rows that are
/// entirely blank are skipped.
pub fn read_workbook(path: &Path) -> anyhow::Result<Vec<Sheet>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    let mut sheets = Vec::new();

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet {name}"))?;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .map(|r| r.iter().map(cell_to_string).collect())
            .unwrap_or_default();

        let mut rows = Vec::new();
        for data_row in rows_iter {
            let values: Vec<String> = (0..headers.len())
                .map(|i| data_row.get(i).map(cell_to_string).unwrap_or_default())
                .collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            rows.push(Row::from_raw(headers.iter().map(String::as_str).zip(values)));
        }

        sheets.push(Sheet { name, rows });
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn cell_rendering_matches_sheet_display() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Float(840.0)), "840");
        assert_eq!(cell_to_string(&Data::Float(10.5)), "10.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::String("keyed".to_string())), "keyed");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn reads_header_keyed_rows_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1").unwrap();
        sheet.write(0, 0, "Trans.\nCurrency").unwrap();
        sheet.write(0, 1, "Transaction Amount").unwrap();
        sheet.write(0, 2, "Test Case Number").unwrap();
        sheet.write(1, 0, 840.0).unwrap();
        sheet.write(1, 1, "10.00").unwrap();
        sheet.write(1, 2, "TEST001").unwrap();
        // Row 2 left blank entirely; row 3 partially filled.
        sheet.write(3, 0, 978.0).unwrap();
        sheet.write(3, 2, "TEST002").unwrap();
        workbook.save(&path).unwrap();

        let sheets = read_workbook(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Sheet1");

        let rows = &sheets[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("trans. currency"), "840");
        assert_eq!(rows[0].get("transaction amount"), "10.00");
        assert_eq!(rows[1].get("trans. currency"), "978");
        assert_eq!(rows[1].get("transaction amount"), "");
        assert_eq!(rows[1].get("test case number"), "TEST002");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_workbook(Path::new("/nonexistent/book.xlsx")).is_err());
    }
}
