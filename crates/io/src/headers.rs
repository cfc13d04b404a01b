//! Header normalization shared by the CSV and workbook decoders.
//!
//! Row records are keyed by header, so headers must be non-empty and
//! unique within a sheet. Decoded files routinely violate both; this
//! module patches them up without touching already-valid names.

use std::collections::HashSet;

/// Turn a decoded header row into usable keys:
/// - trims surrounding whitespace
/// - blank headers become `Column N` (1-based position)
/// - duplicates get a ` (2)`, ` (3)`, ... suffix in encounter order
pub fn normalize(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (i, header) in raw.iter().enumerate() {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() {
            format!("Column {}", i + 1)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.clone()) {
            name = format!("{} ({})", base, n);
            n += 1;
        }
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_headers_untouched() {
        assert_eq!(normalize(&hs(&["a", "b"])), vec!["a", "b"]);
    }

    #[test]
    fn blanks_get_positional_names() {
        assert_eq!(
            normalize(&hs(&["a", "", "  "])),
            vec!["a", "Column 2", "Column 3"]
        );
    }

    #[test]
    fn duplicates_get_suffixes() {
        assert_eq!(
            normalize(&hs(&["x", "x", "x"])),
            vec!["x", "x (2)", "x (3)"]
        );
    }

    #[test]
    fn trimming_can_create_duplicates() {
        assert_eq!(normalize(&hs(&["a", " a "])), vec!["a", "a (2)"]);
    }
}
