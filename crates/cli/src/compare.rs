// compare command: align 2-5 sheets on a shared, ranked label axis.

use std::path::Path;

use serde_json::{json, Map, Value};

use tallygrid_config::Settings;
use tallygrid_engine::aggregate::Measure;
use tallygrid_engine::compare::{MAX_COMPARE_SHEETS, MIN_COMPARE_SHEETS};
use tallygrid_engine::session::Session;

use crate::exit_codes::EXIT_COMPARE_SELECTION;
use crate::report::view_from_settings;
use crate::util::{format_value, pad_left, pad_right};
use crate::{load_tables, CliError, MeasureArg};

pub(crate) fn cmd_compare(
    file: &Path,
    sheet_names: &[String],
    measure: Option<MeasureArg>,
    top: Option<usize>,
    json_out: bool,
) -> Result<(), CliError> {
    // Selection size is a precondition, checked before the engine does
    // any aggregation work.
    if sheet_names.len() < MIN_COMPARE_SHEETS || sheet_names.len() > MAX_COMPARE_SHEETS {
        return Err(CliError {
            code: EXIT_COMPARE_SELECTION,
            message: format!(
                "comparison needs {} to {} sheets, got {}",
                MIN_COMPARE_SHEETS,
                MAX_COMPARE_SHEETS,
                sheet_names.len()
            ),
            hint: Some("repeat --sheet between 2 and 5 times".to_string()),
        });
    }

    let settings = Settings::load();
    let measure: Measure = measure
        .map(Into::into)
        .unwrap_or(view_from_settings(&settings).measure);
    let top_n = top.unwrap_or(settings.compare_top_n);

    let (sheets, _report) = load_tables(file)?;
    let mut session = Session::with_defaults(view_from_settings(&settings), settings.lock_mapping);
    session.load(sheets);

    let names: Vec<&str> = sheet_names.iter().map(String::as_str).collect();
    let comparison = session
        .compare_sheets(&names, measure, top_n)
        .map_err(CliError::session)?;

    if json_out {
        let sheet_list: Vec<&str> = comparison
            .per_sheet
            .iter()
            .map(|sa| sa.sheet_name.as_str())
            .collect();
        let table: Vec<Value> = comparison
            .table
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                obj.insert("label".to_string(), json!(row.label));
                for (sheet, value) in sheet_list.iter().zip(row.values.iter()) {
                    obj.insert(sheet.to_string(), json!(value));
                }
                Value::Object(obj)
            })
            .collect();
        let out = json!({
            "measure": measure.to_string(),
            "sheets": sheet_list,
            "top_labels": comparison.top_labels,
            "table": table,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).map_err(|e| CliError::decode(e.to_string()))?
        );
        return Ok(());
    }

    // Cross-tab: label column then one value column per sheet.
    let label_width = comparison
        .top_labels
        .iter()
        .map(|l| crate::util::display_width(l))
        .max()
        .unwrap_or(5)
        .clamp(5, 40);

    let mut header = pad_right("label", label_width + 2);
    for sa in &comparison.per_sheet {
        header.push_str(&pad_left(&sa.sheet_name, 12));
    }
    println!("{}", header);

    for row in &comparison.table {
        let mut line = pad_right(&row.label, label_width + 2);
        for value in &row.values {
            line.push_str(&pad_left(&format_value(*value), 12));
        }
        println!("{}", line);
    }

    Ok(())
}
