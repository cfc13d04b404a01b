// Spreadsheet import (xlsx, xlsm, xlsb, xls, ods) via calamine.
//
// One-way conversion: each workbook sheet becomes an engine Sheet with
// the first row as headers and the rest as header-keyed records. Cell
// typing is preserved (numbers stay numbers); semantic interpretation
// happens downstream in the engine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use tallygrid_engine::cell::CellValue;
use tallygrid_engine::sheet::{Row, Sheet};

use crate::headers;

/// Per-sheet load statistics.
#[derive(Debug, Clone)]
pub struct SheetStats {
    pub name: String,
    pub rows_loaded: usize,
    pub columns: usize,
}

/// Result summary of one workbook load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sheet_stats: Vec<SheetStats>,
    /// Actionable notes (skipped sheets, renamed headers), not boilerplate.
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub(crate) fn single(sheet: &Sheet) -> Self {
        Self {
            sheet_stats: vec![SheetStats {
                name: sheet.name.clone(),
                rows_loaded: sheet.row_count(),
                columns: sheet.headers.len(),
            }],
            warnings: Vec::new(),
        }
    }

    /// One-line summary suitable for display.
    pub fn summary(&self) -> String {
        let rows: usize = self.sheet_stats.iter().map(|s| s.rows_loaded).sum();
        let mut out = format!(
            "{} sheet{}, {} row{}",
            self.sheet_stats.len(),
            if self.sheet_stats.len() == 1 { "" } else { "s" },
            rows,
            if rows == 1 { "" } else { "s" },
        );
        if !self.warnings.is_empty() {
            out.push_str(&format!(", {} warning(s)", self.warnings.len()));
        }
        out
    }
}

/// Load every sheet of a workbook. Sheets with no cells at all are
/// skipped (with a warning); a workbook where *every* sheet is empty is
/// an error, since no aggregation can run against it.
pub fn load_workbook(path: &Path) -> Result<(Vec<Sheet>, LoadReport), String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();
    let mut report = LoadReport::default();

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| format!("sheet {:?}: {}", name, e))?;

        let mut rows_iter = range.rows();
        let header_row = match rows_iter.next() {
            Some(r) => r,
            None => {
                report.warnings.push(format!("sheet {:?} is empty, skipped", name));
                continue;
            }
        };

        let raw_headers: Vec<String> = header_row.iter().map(cell_text).collect();
        let sheet_headers = headers::normalize(&raw_headers);

        let mut rows: Vec<Row> = Vec::new();
        for data_row in rows_iter {
            let mut row = Row::default();
            for (header, cell) in sheet_headers.iter().zip(data_row.iter()) {
                let value = cell_value(cell);
                if value != CellValue::Empty {
                    row.insert(header.clone(), value);
                }
            }
            rows.push(row);
        }

        report.sheet_stats.push(SheetStats {
            name: name.clone(),
            rows_loaded: rows.len(),
            columns: sheet_headers.len(),
        });
        sheets.push(Sheet::new(name, sheet_headers, rows));
    }

    if sheets.is_empty() {
        return Err("workbook contains no non-empty sheets".to_string());
    }
    Ok((sheets, report))
}

/// Decoder cell -> engine cell. Decode errors become Empty: there is
/// nothing usable in them, and Empty is what the engine's coercion and
/// blank-label rules already handle.
fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Header cells always flatten to text.
fn cell_text(data: &Data) -> String {
    cell_value(data).label()
}
