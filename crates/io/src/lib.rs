// File decoding into engine sheets.
//
// The engine only ever sees `{name, headers, rows}` per sheet; whether
// the bytes were a CSV or a multi-sheet spreadsheet is decided here and
// nowhere else.

use std::path::Path;

use tallygrid_engine::sheet::Sheet;

pub mod csv;
pub mod headers;
pub mod workbook;

pub use workbook::LoadReport;

/// Load any supported tabular file into sheets, dispatching on the
/// file extension. CSV/TSV yield a single sheet named after the file
/// stem; spreadsheet formats yield one sheet per workbook sheet.
pub fn load_tables(path: &Path) -> Result<(Vec<Sheet>, LoadReport), String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => {
            let sheet = if ext == "tsv" {
                csv::import_tsv(path)?
            } else {
                csv::import(path)?
            };
            let report = LoadReport::single(&sheet);
            Ok((vec![sheet], report))
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::load_workbook(path),
        other => Err(format!("unsupported file extension: {:?}", other)),
    }
}
