//! Column role detection.
//!
//! Given a sheet's headers, guess which column plays which semantic
//! role. This is a convenience default, not a validated schema: the
//! detector is deterministic (same headers, same mapping) but two
//! headers may both plausibly serve a role, and the user can override
//! any guess afterward.
//!
//! Matching rule: for each role, an ordered pattern list is tried in
//! priority order; the first header (in header order) matching the
//! first pattern that matches *any* header wins the role.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Semantic roles a column can play in the analytics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Label,
    Status,
    Satisfaction,
    Assignee,
    NumericDuration,
}

/// Which header serves which role, for one sheet.
///
/// `label_key` is the only mandatory slot: it falls back to the first
/// header, so any sheet with at least one column has a usable label
/// column. A sheet with no headers at all yields an empty `label_key`,
/// which callers must reject before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub label_key: String,
    pub status_key: Option<String>,
    pub satisfaction_key: Option<String>,
    pub assignee_key: Option<String>,
    pub numeric_duration_key: Option<String>,
}

impl RoleMapping {
    /// True when the mapping has no usable label column.
    pub fn is_unusable(&self) -> bool {
        self.label_key.is_empty()
    }
}

/// Pattern tables, highest priority first. Order inside each list is
/// load-bearing: "ticket.?id" must win over the bare "id" fallback.
const LABEL_PATTERNS: &[&str] = &["ticket.?id", "\\bid\\b", "subject", "title", "name", "label"];
const STATUS_PATTERNS: &[&str] = &["status", "state", "stage"];
const SATISFACTION_PATTERNS: &[&str] = &["satisfaction", "csat", "score", "rating"];
const ASSIGNEE_PATTERNS: &[&str] = &["assignee", "assigned", "agent", "owner", "handler"];
const DURATION_PATTERNS: &[&str] = &[
    "resolution.?time",
    "duration",
    "hours",
    "days",
    "elapsed",
    "time.?spent",
];

struct RoleTable {
    role: Role,
    patterns: Vec<Regex>,
}

fn role_tables() -> &'static [RoleTable] {
    static TABLES: OnceLock<Vec<RoleTable>> = OnceLock::new();
    TABLES.get_or_init(|| {
        let compile = |role: Role, raw: &[&str]| RoleTable {
            role,
            patterns: raw
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).expect("static role pattern"))
                .collect(),
        };
        vec![
            compile(Role::Label, LABEL_PATTERNS),
            compile(Role::Status, STATUS_PATTERNS),
            compile(Role::Satisfaction, SATISFACTION_PATTERNS),
            compile(Role::Assignee, ASSIGNEE_PATTERNS),
            compile(Role::NumericDuration, DURATION_PATTERNS),
        ]
    })
}

/// First header matching the first pattern that matches anything.
fn find_role_header<'a>(headers: &'a [String], patterns: &[Regex]) -> Option<&'a str> {
    for pattern in patterns {
        for header in headers {
            if pattern.is_match(header) {
                return Some(header.as_str());
            }
        }
    }
    None
}

/// Detect the role mapping for a header list.
pub fn detect_roles(headers: &[String]) -> RoleMapping {
    let mut mapping = RoleMapping::default();
    for table in role_tables() {
        let hit = find_role_header(headers, &table.patterns);
        match table.role {
            Role::Label => {
                mapping.label_key = hit
                    .map(str::to_string)
                    .or_else(|| headers.first().cloned())
                    .unwrap_or_default();
            }
            Role::Status => mapping.status_key = hit.map(str::to_string),
            Role::Satisfaction => mapping.satisfaction_key = hit.map(str::to_string),
            Role::Assignee => mapping.assignee_key = hit.map(str::to_string),
            Role::NumericDuration => mapping.numeric_duration_key = hit.map(str::to_string),
        }
    }
    mapping
}
