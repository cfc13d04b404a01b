//! Multi-sheet comparison: align independently-aggregated sheets on a
//! shared, ranked label axis.
//!
//! Sheets being compared do not share a schema. Each one aggregates on
//! its own label column, and — for the `sum` measure — resolves its own
//! numeric column. A sheet with no qualifying numeric column does not
//! fail the comparison; it contributes its labels at value zero.
//!
//! The output matrix is dense: every sheet has a value for every ranked
//! label, defaulting to 0, never absent.

use std::fmt;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_with, Aggregate, Measure, ValueSource};
use crate::sheet::{resolve_numeric_column, Sheet};

/// Bounds on how many sheets one comparison may cover.
pub const MIN_COMPARE_SHEETS: usize = 2;
pub const MAX_COMPARE_SHEETS: usize = 5;

/// One sheet's slot in a comparison: the sheet plus the label column to
/// group it by (each sheet brings its own).
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub sheet: &'a Sheet,
    pub label_key: &'a str,
}

/// One sheet's aggregate inside a comparison result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetAggregate {
    pub sheet_name: String,
    pub aggregate: Aggregate,
}

/// One row of the cross-tab: a label and its per-sheet values, aligned
/// with `Comparison::per_sheet` order. A sheet lacking the label holds
/// 0.0 at its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Result of comparing 2–5 sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub per_sheet: Vec<SheetAggregate>,
    /// Labels ranked by cross-sheet total, descending, ties by
    /// ascending label. At most the requested N (0 = unlimited).
    pub top_labels: Vec<String>,
    pub table: Vec<CompareRow>,
}

/// Comparison preconditions. Checked before any aggregation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareError {
    /// Number of selected sheets is outside [2, 5].
    SheetCount(usize),
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareError::SheetCount(n) => write!(
                f,
                "comparison needs {} to {} sheets, got {}",
                MIN_COMPARE_SHEETS, MAX_COMPARE_SHEETS, n
            ),
        }
    }
}

impl std::error::Error for CompareError {}

/// Compare the selected sheets under `measure`, keeping the `top_n`
/// highest-ranked labels (0 = all).
pub fn compare(
    selections: &[Selection<'_>],
    measure: Measure,
    top_n: usize,
) -> Result<Comparison, CompareError> {
    if selections.len() < MIN_COMPARE_SHEETS || selections.len() > MAX_COMPARE_SHEETS {
        return Err(CompareError::SheetCount(selections.len()));
    }

    // Each sheet aggregates independently, with no search filter.
    let per_sheet: Vec<SheetAggregate> = selections
        .iter()
        .map(|sel| {
            let source = match measure {
                Measure::Count => ValueSource::PerRow,
                Measure::Sum => match resolve_numeric_column(sel.sheet) {
                    Some(key) => ValueSource::Column(key),
                    // Non-fatal: labels survive at value zero.
                    None => ValueSource::Zero,
                },
            };
            SheetAggregate {
                sheet_name: sel.sheet.name.clone(),
                aggregate: aggregate_with(&sel.sheet.rows, sel.label_key, source, None),
            }
        })
        .collect();

    // Union the label spaces, summing values across sheets.
    let mut overall: FxHashMap<&str, f64> = FxHashMap::default();
    for sa in &per_sheet {
        for entry in &sa.aggregate.list {
            *overall.entry(entry.name.as_str()).or_insert(0.0) += entry.value;
        }
    }

    let mut ranked: Vec<(&str, f64)> = overall.into_iter().collect();
    ranked.sort_by(|a, b| {
        OrderedFloat(b.1)
            .cmp(&OrderedFloat(a.1))
            .then_with(|| a.0.cmp(b.0))
    });
    if top_n > 0 {
        ranked.truncate(top_n);
    }
    let top_labels: Vec<String> = ranked.iter().map(|(name, _)| name.to_string()).collect();

    // Dense cross-tab, per_sheet order.
    let table: Vec<CompareRow> = top_labels
        .iter()
        .map(|label| CompareRow {
            label: label.clone(),
            values: per_sheet
                .iter()
                .map(|sa| {
                    sa.aggregate
                        .list
                        .iter()
                        .find(|e| &e.name == label)
                        .map(|e| e.value)
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    Ok(Comparison {
        per_sheet,
        top_labels,
        table,
    })
}
