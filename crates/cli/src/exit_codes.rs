//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, bad column)   |
//! | 3-4     | Files     | I/O and decode errors                    |
//! | 10-19   | Analytics | Aggregation/comparison preconditions     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use tallygrid_engine::aggregate::AggregateError;
use tallygrid_engine::compare::CompareError;
use tallygrid_engine::session::SessionError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

// Code 1 stays reserved for unspecified failures; every error path in
// this binary carries a specific code instead.

/// Usage error - bad arguments, unknown sheet or column.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Files (3-4)
// =============================================================================

/// I/O error - file missing or unreadable.
pub const EXIT_IO: u8 = 3;

/// Decode error - file opened but could not be parsed as tabular data.
pub const EXIT_DECODE: u8 = 4;

// =============================================================================
// Analytics (10-19)
// =============================================================================

/// `sum` measure requested but no qualifying numeric column exists.
/// The single-sheet report refuses the run; nothing partial is printed.
pub const EXIT_NO_NUMERIC_COLUMN: u8 = 10;

/// The sheet has no usable label column (no headers at all).
pub const EXIT_NO_LABEL_COLUMN: u8 = 11;

/// Comparison selection outside the allowed 2-5 sheet range.
pub const EXIT_COMPARE_SELECTION: u8 = 12;

/// Map an engine session error to its exit code.
pub fn session_exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::UnknownSheet(_) => EXIT_USAGE,
        SessionError::Aggregate(AggregateError::NoNumericColumn) => EXIT_NO_NUMERIC_COLUMN,
        SessionError::Aggregate(AggregateError::NoLabelColumn) => EXIT_NO_LABEL_COLUMN,
        SessionError::Compare(CompareError::SheetCount(_)) => EXIT_COMPARE_SELECTION,
    }
}
