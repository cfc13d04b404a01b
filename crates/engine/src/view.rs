//! Display-only transforms over a full aggregate.
//!
//! The view layer never mutates the aggregate it reads. Selection into
//! the visible head vs the bucketed tail always uses the aggregate's
//! canonical descending order; the sort direction is applied *after*
//! selection, so toggling it reorders the display but never changes
//! which labels are visible versus folded into "Other".

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, AggregateEntry, Measure};

/// Chart the view feeds. The engine doesn't render; consumers do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
    Line,
}

/// Display sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// Hard cap on the minimum-share threshold, in percent.
pub const MAX_MIN_SHARE_PCT: f64 = 25.0;

/// Per-sheet, user-controlled display state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub chart: ChartKind,
    pub measure: Measure,
    /// Keep only the N highest-value groups. 0 = unlimited.
    pub top_n: usize,
    /// Drop groups below this share of the total, percent, 0–25.
    pub min_share_pct: f64,
    pub sort: SortDir,
    /// Case-insensitive label filter, applied upstream at aggregation
    /// time (not re-applied by the view builder).
    pub label_search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            chart: ChartKind::Bar,
            measure: Measure::Count,
            top_n: 0,
            min_share_pct: 0.0,
            sort: SortDir::Desc,
            label_search: String::new(),
        }
    }
}

/// One display row: a surviving aggregate entry, or the synthetic
/// "Other" bucket that carries everything trimmed away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub name: String,
    pub value: f64,
    /// True only for the synthetic tail bucket.
    pub is_other: bool,
    /// The tail entries folded into "Other", in canonical order.
    /// Empty for ordinary entries. Grouping re-buckets value, it never
    /// drops it — the underlying detail stays reachable here.
    pub children: Vec<AggregateEntry>,
}

impl DisplayEntry {
    fn plain(entry: &AggregateEntry) -> Self {
        Self {
            name: entry.name.clone(),
            value: entry.value,
            is_other: false,
            children: Vec::new(),
        }
    }

    fn other(children: Vec<AggregateEntry>) -> Self {
        let value = children.iter().map(|e| e.value).sum();
        Self {
            name: "Other".to_string(),
            value,
            is_other: true,
            children,
        }
    }
}

/// Build the display list for an aggregate under a view state.
///
/// Steps: top-N cutoff, then minimum-share cutoff, both against the
/// canonical descending list; everything excluded lands in one "Other"
/// entry; finally the display order is applied.
pub fn build_view(aggregate: &Aggregate, view: &ViewState) -> Vec<DisplayEntry> {
    let min_share = view.min_share_pct.clamp(0.0, MAX_MIN_SHARE_PCT);
    let min_value = (min_share / 100.0) * aggregate.total;

    let head_cap = if view.top_n > 0 {
        view.top_n.min(aggregate.list.len())
    } else {
        aggregate.list.len()
    };

    let mut head: Vec<DisplayEntry> = Vec::new();
    let mut tail: Vec<AggregateEntry> = Vec::new();

    for (i, entry) in aggregate.list.iter().enumerate() {
        if i < head_cap && entry.value >= min_value {
            head.push(DisplayEntry::plain(entry));
        } else {
            tail.push(entry.clone());
        }
    }

    if !tail.is_empty() {
        head.push(DisplayEntry::other(tail));
    }

    apply_sort_dir(&mut head, view.sort);
    head
}

/// Reorder for display. Descending is the canonical order the entries
/// already carry; ascending is its exact reverse (tie-breaks included),
/// so toggling direction is an involution.
fn apply_sort_dir(entries: &mut [DisplayEntry], dir: SortDir) {
    if dir == SortDir::Asc {
        entries.reverse();
    }
}
