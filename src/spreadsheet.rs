//! Spreadsheet parsing for member imports.
//!
//! Accepts `.xlsx`/`.xls` files with `(name, phone)` rows in the first two
//! columns of the first sheet. Excel likes to store phone numbers as floats;
//! those are rendered back to plain digit strings.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use wagon_core::error::WagonError;

/// Render one cell as a trimmed string. Floats lose their fractional part
/// (phone columns come back as e.g. `923001234567.0`).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Whether a first row looks like a header rather than data.
fn is_header(name: &str, phone: &str) -> bool {
    let phone_lower = phone.to_lowercase();
    let name_lower = name.to_lowercase();
    phone_lower.contains("phone")
        || phone_lower.contains("number")
        || name_lower == "name"
        || name_lower == "member name"
}

/// Parse spreadsheet bytes into `(name, phone)` rows.
///
/// Rows with an empty phone cell are skipped; a missing name falls back to
/// the phone number. A recognizable header row is skipped.
pub fn parse_member_rows(bytes: &[u8]) -> Result<Vec<(String, String)>, WagonError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| WagonError::Validation(format!("unreadable spreadsheet: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| WagonError::Validation("spreadsheet has no sheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| WagonError::Validation(format!("failed to read sheet: {e}")))?;

    let mut rows = Vec::new();
    for (i, row) in range.rows().enumerate() {
        let name = row.first().map(cell_text).unwrap_or_default();
        let phone = row.get(1).map(cell_text).unwrap_or_default();

        if i == 0 && is_header(&name, &phone) {
            continue;
        }
        if phone.is_empty() {
            continue;
        }
        let name = if name.is_empty() { phone.clone() } else { name };
        rows.push((name, phone));
    }

    if rows.is_empty() {
        return Err(WagonError::Validation(
            "spreadsheet contains no member rows".into(),
        ));
    }
    Ok(rows)
}

/// CSV sample served by the import-template endpoint.
pub const IMPORT_TEMPLATE_CSV: &str = "name,phone\nAlice Khan,03001234567\nBilal Ahmed,+923007654321\n";
