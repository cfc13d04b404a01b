//! The sheet model: an ordered header list plus header-keyed rows.
//!
//! Sheets are immutable once built — a new upload replaces them
//! wholesale, it never patches them. Every downstream computation
//! (role detection, aggregation, comparison) is a pure read over this
//! structure, so concurrent readers need no locking or copies.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::coerce;

/// One data row, keyed by header name.
///
/// Cells for headers absent from the record are simply missing; readers
/// treat a missing cell as [`CellValue::Empty`].
pub type Row = FxHashMap<String, CellValue>;

/// An immutable sheet: name, ordered headers, and rows keyed by header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a sheet from (header, cells...) test-friendly string data.
    /// Rows shorter than the header list leave the trailing cells empty.
    pub fn from_strings(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| {
                headers
                    .iter()
                    .zip(cells.iter())
                    .filter(|(_, c)| !c.is_empty())
                    .map(|(h, c)| (h.clone(), CellValue::from(*c)))
                    .collect()
            })
            .collect();
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell for `header` in `row`, or Empty if the row has no such cell.
    pub fn cell<'a>(row: &'a Row, header: &str) -> &'a CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        row.get(header).unwrap_or(&EMPTY)
    }

    /// Does this sheet have a column with the given header?
    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }
}

/// Find the first column, in header order, that holds usable numbers:
/// at least one row must coerce to a nonzero value.
///
/// This is the caller-side resolution step for the `sum` measure — the
/// aggregator itself never goes looking for a numeric column. Returns
/// `None` when no column qualifies, which the caller surfaces as an
/// explicit "no numeric column detected" error (single-sheet view) or
/// an all-zero aggregate (comparison mode).
pub fn resolve_numeric_column(sheet: &Sheet) -> Option<&str> {
    sheet.headers.iter().map(String::as_str).find(|header| {
        sheet
            .rows
            .iter()
            .any(|row| coerce::to_number(Sheet::cell(row, header)) != 0.0)
    })
}
