//! Row aggregation into ranked category distributions.
//!
//! One aggregator run groups a sheet's rows by a label column under a
//! chosen measure and produces the *full* distribution — display
//! trimming (top-N, "Other" bucketing, sort direction) happens later in
//! [`crate::view`] and never feeds back into this result.
//!
//! Ordering contract: the list is sorted by value descending, ties
//! broken by ascending label. Identical input always yields an
//! identical list — map iteration order never leaks into the output.

use std::fmt;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::sheet::{Row, Sheet};

/// How a group's value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Row frequency per label.
    Count,
    /// Sum of a numeric column per label. Requires the caller to have
    /// resolved a numeric key (see [`crate::sheet::resolve_numeric_column`]).
    Sum,
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Count
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Count => write!(f, "count"),
            Measure::Sum => write!(f, "sum"),
        }
    }
}

/// One label's accumulated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub name: String,
    pub value: f64,
}

/// The full, unfiltered result of one aggregator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Entries sorted by value descending, ties by ascending label.
    pub list: Vec<AggregateEntry>,
    /// Sum of all entry values. Equals `rows_count` for `count`.
    pub total: f64,
    /// Rows that actually contributed: non-blank label, passing the
    /// search filter. Blank-label rows are excluded, not zero-valued.
    pub rows_count: usize,
    /// Number of distinct labels (`list.len()`).
    pub distinct_labels: usize,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Aggregation failures. These are caller errors or data preconditions,
/// surfaced before any partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// `sum` requested but no numeric column was resolved.
    NoNumericColumn,
    /// The sheet has no usable label column (empty header list).
    NoLabelColumn,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::NoNumericColumn => write!(f, "no numeric column detected"),
            AggregateError::NoLabelColumn => write!(f, "no usable label column"),
        }
    }
}

impl std::error::Error for AggregateError {}

/// Where a row's value comes from. `Zero` exists for comparison mode,
/// where a sheet without a qualifying numeric column still contributes
/// its labels — at value zero — instead of failing the whole operation.
#[derive(Clone, Copy)]
pub(crate) enum ValueSource<'a> {
    PerRow,
    Column(&'a str),
    Zero,
}

/// Aggregate `rows` by `label_key` under `measure`.
///
/// - Rows with a blank label are skipped entirely (no count, no sum,
///   not in `rows_count`).
/// - `search`, when non-empty, drops rows whose label does not contain
///   it (case-insensitive) *before* grouping, so `total`/`rows_count`
///   describe the searched subset.
/// - `Measure::Sum` without a `numeric_key` is a caller error.
pub fn aggregate(
    rows: &[Row],
    label_key: &str,
    measure: Measure,
    numeric_key: Option<&str>,
    search: Option<&str>,
) -> Result<Aggregate, AggregateError> {
    if label_key.is_empty() {
        return Err(AggregateError::NoLabelColumn);
    }
    let source = match measure {
        Measure::Count => ValueSource::PerRow,
        Measure::Sum => match numeric_key {
            Some(key) => ValueSource::Column(key),
            None => return Err(AggregateError::NoNumericColumn),
        },
    };
    Ok(aggregate_with(rows, label_key, source, search))
}

/// The grouping core. Infallible: preconditions are the caller's job.
pub(crate) fn aggregate_with(
    rows: &[Row],
    label_key: &str,
    source: ValueSource<'_>,
    search: Option<&str>,
) -> Aggregate {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut groups: FxHashMap<String, f64> = FxHashMap::default();
    let mut rows_count = 0usize;

    for row in rows {
        let label = Sheet::cell(row, label_key).label();
        if label.is_empty() {
            continue;
        }
        if let Some(needle) = &needle {
            if !label.to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }
        let value = match source {
            ValueSource::PerRow => 1.0,
            ValueSource::Column(key) => coerce::to_number(Sheet::cell(row, key)),
            ValueSource::Zero => 0.0,
        };
        *groups.entry(label).or_insert(0.0) += value;
        rows_count += 1;
    }

    let mut list: Vec<AggregateEntry> = groups
        .into_iter()
        .map(|(name, value)| AggregateEntry { name, value })
        .collect();
    sort_canonical(&mut list);

    let total = list.iter().map(|e| e.value).sum();
    let distinct_labels = list.len();
    Aggregate {
        list,
        total,
        rows_count,
        distinct_labels,
    }
}

/// Canonical ordering: value descending, ascending label on ties.
pub(crate) fn sort_canonical(list: &mut [AggregateEntry]) {
    list.sort_by(|a, b| {
        OrderedFloat(b.value)
            .cmp(&OrderedFloat(a.value))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Sheet;

    #[test]
    fn count_measure_basic() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat"],
            &[&["A"], &["A"], &["B"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Count, None, None).unwrap();
        assert_eq!(agg.list.len(), 2);
        assert_eq!(agg.list[0].name, "A");
        assert_eq!(agg.list[0].value, 2.0);
        assert_eq!(agg.list[1].name, "B");
        assert_eq!(agg.list[1].value, 1.0);
        assert_eq!(agg.total, 3.0);
        assert_eq!(agg.rows_count, 3);
        assert_eq!(agg.distinct_labels, 2);
    }

    #[test]
    fn sum_measure_coerces_malformed_cells_to_zero() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat", "amt"],
            &[&["x", "1,200"], &["x", "abc"], &["x", "300"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Sum, Some("amt"), None).unwrap();
        assert_eq!(agg.total, 1500.0);
        assert_eq!(agg.rows_count, 3);
        assert_eq!(agg.list, vec![AggregateEntry { name: "x".into(), value: 1500.0 }]);
    }

    #[test]
    fn blank_labels_are_excluded_not_zero_valued() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat", "amt"],
            &[&["a", "5"], &["   ", "7"], &["", "9"], &["b", "3"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Sum, Some("amt"), None).unwrap();
        assert_eq!(agg.rows_count, 2);
        assert_eq!(agg.total, 8.0);
        assert_eq!(agg.distinct_labels, 2);
    }

    #[test]
    fn labels_are_trimmed_before_grouping() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat"],
            &[&["  A"], &["A  "], &["A"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Count, None, None).unwrap();
        assert_eq!(agg.distinct_labels, 1);
        assert_eq!(agg.list[0].value, 3.0);
    }

    #[test]
    fn search_filters_before_grouping() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat"],
            &[&["Widget A"], &["Widget B"], &["Gadget"]],
        );
        let agg =
            aggregate(&sheet.rows, "cat", Measure::Count, None, Some("widget")).unwrap();
        assert_eq!(agg.rows_count, 2);
        assert_eq!(agg.total, 2.0);
        assert_eq!(agg.distinct_labels, 2);
    }

    #[test]
    fn blank_search_is_no_filter() {
        let sheet = Sheet::from_strings("s", &["cat"], &[&["a"], &["b"]]);
        let agg = aggregate(&sheet.rows, "cat", Measure::Count, None, Some("  ")).unwrap();
        assert_eq!(agg.rows_count, 2);
    }

    #[test]
    fn ties_break_by_ascending_label() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat"],
            &[&["zeta"], &["alpha"], &["mid"], &["mid"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Count, None, None).unwrap();
        let names: Vec<&str> = agg.list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat"],
            &[&["c"], &["a"], &["b"], &["a"], &["c"], &["b"]],
        );
        let a = aggregate(&sheet.rows, "cat", Measure::Count, None, None).unwrap();
        let b = aggregate(&sheet.rows, "cat", Measure::Count, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sum_without_numeric_key_is_a_caller_error() {
        let sheet = Sheet::from_strings("s", &["cat"], &[&["a"]]);
        let err = aggregate(&sheet.rows, "cat", Measure::Sum, None, None).unwrap_err();
        assert_eq!(err, AggregateError::NoNumericColumn);
    }

    #[test]
    fn empty_label_key_is_rejected() {
        let sheet = Sheet::from_strings("s", &[], &[]);
        let err = aggregate(&sheet.rows, "", Measure::Count, None, None).unwrap_err();
        assert_eq!(err, AggregateError::NoLabelColumn);
    }

    #[test]
    fn total_matches_list_sum() {
        let sheet = Sheet::from_strings(
            "s",
            &["cat", "amt"],
            &[&["a", "1.5"], &["b", "2.25"], &["a", "3"]],
        );
        let agg = aggregate(&sheet.rows, "cat", Measure::Sum, Some("amt"), None).unwrap();
        let sum: f64 = agg.list.iter().map(|e| e.value).sum();
        assert!((agg.total - sum).abs() < 1e-9);
    }
}
