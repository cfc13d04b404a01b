//! Per-upload analytics session: the stateful layer around the pure
//! engine functions.
//!
//! The engine modules ([`crate::aggregate`], [`crate::view`],
//! [`crate::compare`]) are pure; this module owns the mutable state a
//! calling application needs — role mappings and view states keyed by
//! sheet name, generated aggregates, and the per-sheet phase machine:
//!
//! ```text
//! Configuring --generate--> Generated --edit--> Dirty --generate--> Generated
//!      ^                        |
//!      +---------clear----------+
//! ```
//!
//! Aggregation runs only on an explicit generate; mapping and view
//! edits never recompute anything implicitly. Loading a new workbook
//! replaces sheets and discards *all* derived state in one step, so
//! nothing stale can reference columns of the previous schema.

use std::collections::HashMap;
use std::fmt;

use crate::aggregate::{aggregate, Aggregate, AggregateError, Measure};
use crate::compare::{compare, CompareError, Comparison, Selection};
use crate::roles::{detect_roles, RoleMapping};
use crate::sheet::{resolve_numeric_column, Sheet};
use crate::view::{build_view, DisplayEntry, ViewState};

/// Where a sheet sits in its generate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No aggregate yet (or cleared).
    #[default]
    Configuring,
    /// Aggregate present and in sync with the controls.
    Generated,
    /// Aggregate present but controls changed since it was built.
    Dirty,
}

/// Session-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownSheet(String),
    Aggregate(AggregateError),
    Compare(CompareError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownSheet(name) => write!(f, "no such sheet: {}", name),
            SessionError::Aggregate(e) => write!(f, "{}", e),
            SessionError::Compare(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<AggregateError> for SessionError {
    fn from(e: AggregateError) -> Self {
        SessionError::Aggregate(e)
    }
}

impl From<CompareError> for SessionError {
    fn from(e: CompareError) -> Self {
        SessionError::Compare(e)
    }
}

/// One upload's worth of sheets plus everything derived from them.
#[derive(Debug, Default)]
pub struct Session {
    sheets: Vec<Sheet>,
    /// Copy the first sheet's mapping to newly-visited sheets instead
    /// of detecting independently.
    lock_mapping: bool,
    default_view: ViewState,
    mappings: HashMap<String, RoleMapping>,
    views: HashMap<String, ViewState>,
    results: HashMap<String, Aggregate>,
    phases: HashMap<String, Phase>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose lazily-created view states start from `default_view`.
    pub fn with_defaults(default_view: ViewState, lock_mapping: bool) -> Self {
        Self {
            default_view,
            lock_mapping,
            ..Self::default()
        }
    }

    /// Replace the loaded sheets. All derived state — mappings, view
    /// states, aggregates, phases — is discarded together.
    pub fn load(&mut self, sheets: Vec<Sheet>) {
        self.sheets = sheets;
        self.mappings.clear();
        self.views.clear();
        self.results.clear();
        self.phases.clear();
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn set_lock_mapping(&mut self, lock: bool) {
        self.lock_mapping = lock;
    }

    pub fn phase(&self, name: &str) -> Phase {
        self.phases.get(name).copied().unwrap_or_default()
    }

    pub fn result(&self, name: &str) -> Option<&Aggregate> {
        self.results.get(name)
    }

    /// The sheet's role mapping, detecting (or copying, under lock
    /// mapping) on first access.
    pub fn mapping(&mut self, name: &str) -> Result<&RoleMapping, SessionError> {
        self.ensure_known(name)?;
        self.ensure_mapping(name);
        Ok(&self.mappings[name])
    }

    /// Override a sheet's mapping. Marks a generated sheet dirty.
    pub fn set_mapping(&mut self, name: &str, mapping: RoleMapping) -> Result<(), SessionError> {
        self.ensure_known(name)?;
        self.mappings.insert(name.to_string(), mapping);
        self.mark_dirty(name);
        Ok(())
    }

    /// The sheet's view state, created from the session default on
    /// first access.
    pub fn view(&mut self, name: &str) -> Result<&ViewState, SessionError> {
        self.ensure_known(name)?;
        if !self.views.contains_key(name) {
            self.views
                .insert(name.to_string(), self.default_view.clone());
        }
        Ok(&self.views[name])
    }

    /// Edit a sheet's view state in place. Marks a generated sheet
    /// dirty; nothing recomputes until the next generate.
    pub fn update_view<F>(&mut self, name: &str, edit: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut ViewState),
    {
        self.ensure_known(name)?;
        let entry = self
            .views
            .entry(name.to_string())
            .or_insert_with(|| self.default_view.clone());
        edit(entry);
        self.mark_dirty(name);
        Ok(())
    }

    /// Run the aggregator for one sheet (the explicit Generate /
    /// Regenerate action).
    ///
    /// On failure — no usable label column, or `sum` with no numeric
    /// column — the prior result and phase are left exactly as they
    /// were; a refused generate never clears a working view.
    pub fn generate(&mut self, name: &str) -> Result<&Aggregate, SessionError> {
        self.ensure_known(name)?;
        self.ensure_mapping(name);
        if !self.views.contains_key(name) {
            self.views
                .insert(name.to_string(), self.default_view.clone());
        }

        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SessionError::UnknownSheet(name.to_string()))?;
        let mapping = &self.mappings[name];
        let view = &self.views[name];

        let numeric_key = match view.measure {
            Measure::Count => None,
            Measure::Sum => Some(resolve_numeric_key(sheet, mapping)
                .ok_or(AggregateError::NoNumericColumn)?),
        };

        let agg = aggregate(
            &sheet.rows,
            &mapping.label_key,
            view.measure,
            numeric_key,
            Some(view.label_search.as_str()),
        )?;

        self.results.insert(name.to_string(), agg);
        self.phases.insert(name.to_string(), Phase::Generated);
        Ok(&self.results[name])
    }

    /// Display list for the sheet's current aggregate, under its
    /// current view state. None until a generate has succeeded.
    ///
    /// While a sheet is Dirty this intentionally reads the *previous*
    /// aggregate — re-aggregation is always a deliberate action.
    pub fn display(&self, name: &str) -> Option<Vec<DisplayEntry>> {
        let agg = self.results.get(name)?;
        let view = self.views.get(name)?;
        Some(build_view(agg, view))
    }

    /// Drop a sheet's aggregate and return it to Configuring.
    pub fn clear(&mut self, name: &str) {
        self.results.remove(name);
        self.phases.insert(name.to_string(), Phase::Configuring);
    }

    /// Compare the named sheets (2–5 of them) under `measure`.
    ///
    /// Orthogonal to the single-sheet pipeline: uses each sheet's
    /// mapping for its label column but never touches phases, results,
    /// or view states.
    pub fn compare_sheets(
        &mut self,
        names: &[&str],
        measure: Measure,
        top_n: usize,
    ) -> Result<Comparison, SessionError> {
        for name in names {
            self.ensure_known(name)?;
            self.ensure_mapping(name);
        }
        let mut selections: Vec<Selection<'_>> = Vec::with_capacity(names.len());
        for name in names {
            let sheet = self
                .sheets
                .iter()
                .find(|s| s.name == *name)
                .ok_or_else(|| SessionError::UnknownSheet(name.to_string()))?;
            selections.push(Selection {
                sheet,
                label_key: self.mappings[*name].label_key.as_str(),
            });
        }
        Ok(compare(&selections, measure, top_n)?)
    }

    fn ensure_known(&self, name: &str) -> Result<(), SessionError> {
        if self.sheet(name).is_some() {
            Ok(())
        } else {
            Err(SessionError::UnknownSheet(name.to_string()))
        }
    }

    fn ensure_mapping(&mut self, name: &str) {
        if self.mappings.contains_key(name) {
            return;
        }
        let mapping = if self.lock_mapping {
            self.first_sheet_mapping()
        } else {
            None
        };
        let mapping = mapping.unwrap_or_else(|| {
            let headers = self
                .sheet(name)
                .map(|s| s.headers.clone())
                .unwrap_or_default();
            detect_roles(&headers)
        });
        self.mappings.insert(name.to_string(), mapping);
    }

    /// Mapping of the first loaded sheet, detecting it on demand.
    /// Used by the lock-mapping policy.
    fn first_sheet_mapping(&mut self) -> Option<RoleMapping> {
        let first = self.sheets.first()?.name.clone();
        if !self.mappings.contains_key(&first) {
            let headers = self.sheets.first()?.headers.clone();
            self.mappings.insert(first.clone(), detect_roles(&headers));
        }
        self.mappings.get(&first).cloned()
    }

    fn mark_dirty(&mut self, name: &str) {
        if self.phase(name) == Phase::Generated {
            self.phases.insert(name.to_string(), Phase::Dirty);
        }
    }
}

/// Numeric key for the `sum` measure: an explicit duration-role column
/// wins; otherwise scan for the first column with usable numbers.
fn resolve_numeric_key<'a>(sheet: &'a Sheet, mapping: &'a RoleMapping) -> Option<&'a str> {
    if let Some(key) = mapping.numeric_duration_key.as_deref() {
        if sheet.has_header(key) {
            return Some(key);
        }
    }
    resolve_numeric_column(sheet)
}
