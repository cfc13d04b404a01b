//! Raw cell values as delivered by the io layer.
//!
//! A `CellValue` is whatever the decoder found in one cell: nothing, a
//! number, text, or a boolean. The engine never mutates cells; it only
//! reads them through two lenses:
//! - as a *label* (trimmed display string, see [`CellValue::label`])
//! - as a *number* (lossy coercion, see [`crate::coerce::to_number`])

use serde::{Deserialize, Serialize};

/// One cell as loaded from a workbook or CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Empty cell (also used for decoder errors — nothing usable).
    Empty,
    /// Numeric cell (dates arrive here as serial numbers).
    Number(f64),
    /// Text cell (raw, untrimmed).
    Text(String),
    /// Boolean cell.
    Bool(bool),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// True if this cell carries nothing usable as a label:
    /// empty, or text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell as a grouping label: trimmed text, numbers without a
    /// trailing `.0` when integral, booleans as TRUE/FALSE.
    ///
    /// Blank cells yield an empty string; the aggregator skips those
    /// rows entirely rather than grouping them under "".
    pub fn label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}
