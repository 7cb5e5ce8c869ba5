use crate::ExtractionError;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

/// Read every sheet of an xls/xlsx/ods workbook into `Sheet:`/`Row n:` text.
pub fn extract_spreadsheet_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ExtractionError::Failed(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractionError::Failed(e.to_string()))?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        sheets.push((name, rows));
    }

    Ok(format_sheets(&sheets))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// One `Sheet: <name>` heading per sheet, then a `Row <n>: ` line per row
/// with at least one non-empty cell. Rows are numbered from 1 and keep their
/// position even when earlier rows are skipped.
pub fn format_sheets(sheets: &[(String, Vec<Vec<String>>)]) -> String {
    sheets
        .iter()
        .map(|(name, rows)| {
            let mut out = format!("Sheet: {}\n", name);
            for (i, row) in rows.iter().enumerate() {
                if row.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                out.push_str(&format!("Row {}: {}\n", i + 1, row.join("\t")));
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}
