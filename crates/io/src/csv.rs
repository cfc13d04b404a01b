// CSV/TSV import

use std::io::Read;
use std::path::Path;

use tallygrid_engine::cell::CellValue;
use tallygrid_engine::sheet::{Row, Sheet};

use crate::headers;

pub fn import(path: &Path) -> Result<Sheet, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter, sheet_name_for(path))
}

pub fn import_tsv(path: &Path) -> Result<Sheet, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t', sheet_name_for(path))
}

fn sheet_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse CSV content into one sheet. The first record is the header
/// row; remaining records become header-keyed rows. Cells stay raw text
/// — numeric coercion is the engine's job, at aggregation time.
pub fn import_from_string(content: &str, delimiter: u8, name: String) -> Result<Sheet, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        Some(r) => r.map_err(|e| e.to_string())?,
        None => return Ok(Sheet::new(name, Vec::new(), Vec::new())),
    };
    let raw_headers: Vec<String> = header_record.iter().map(|f| f.to_string()).collect();
    let sheet_headers = headers::normalize(&raw_headers);

    let mut rows: Vec<Row> = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        let mut row = Row::default();
        for (header, field) in sheet_headers.iter().zip(record.iter()) {
            if !field.is_empty() {
                row.insert(header.clone(), CellValue::Text(field.to_string()));
            }
        }
        rows.push(row);
    }

    Ok(Sheet::new(name, sheet_headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_str(content: &str) -> Sheet {
        import_from_string(content, sniff_delimiter(content), "test".into()).unwrap()
    }

    #[test]
    fn basic_comma_file() {
        let sheet = import_str("name,amount\nwidget,5\ngadget,3\n");
        assert_eq!(sheet.headers, vec!["name", "amount"]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(Sheet::cell(&sheet.rows[0], "name").label(), "widget");
        assert_eq!(Sheet::cell(&sheet.rows[1], "amount").label(), "3");
    }

    #[test]
    fn sniffs_semicolons() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a,b\n1,2\n"), b',');
    }

    #[test]
    fn single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("justonecolumn\nvalue\n"), b',');
    }

    #[test]
    fn short_rows_leave_cells_missing() {
        let sheet = import_str("a,b,c\n1,2\n");
        assert!(Sheet::cell(&sheet.rows[0], "c").is_blank());
    }

    #[test]
    fn blank_and_duplicate_headers_are_disambiguated() {
        let sheet = import_str("x,,x\n1,2,3\n");
        assert_eq!(sheet.headers, vec!["x", "Column 2", "x (2)"]);
        assert_eq!(Sheet::cell(&sheet.rows[0], "x (2)").label(), "3");
    }

    #[test]
    fn empty_content_yields_empty_sheet() {
        let sheet = import_from_string("", b',', "empty".into()).unwrap();
        assert!(sheet.headers.is_empty());
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn windows_1252_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "café" in Windows-1252: e9 is é
        std::fs::write(&path, b"name\ncaf\xe9\n").unwrap();
        let sheet = import(&path).unwrap();
        assert_eq!(Sheet::cell(&sheet.rows[0], "name").label(), "café");
    }

    #[test]
    fn sheet_named_after_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("returns_q3.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        let sheet = import(&path).unwrap();
        assert_eq!(sheet.name, "returns_q3");
    }
}
