// sheets / detect commands: inspect a file without aggregating it.

use std::path::Path;

use serde_json::{json, Map, Value};

use tallygrid_engine::roles::{detect_roles, RoleMapping};
use tallygrid_engine::sheet::Sheet;

use crate::util::pad_right;
use crate::{load_tables, CliError};

// ============================================================================
// sheets
// ============================================================================

pub(crate) fn cmd_sheets(file: &Path, json_out: bool) -> Result<(), CliError> {
    let (sheets, report) = load_tables(file)?;

    if json_out {
        let list: Vec<Value> = sheets
            .iter()
            .map(|s| {
                json!({
                    "name": s.name,
                    "rows": s.row_count(),
                    "headers": s.headers,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list).map_err(|e| CliError::decode(e.to_string()))?);
        return Ok(());
    }

    let name_width = sheets
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{}  {:>6}  headers", pad_right("sheet", name_width), "rows");
    for sheet in &sheets {
        println!(
            "{}  {:>6}  {}",
            pad_right(&sheet.name, name_width),
            sheet.row_count(),
            sheet.headers.join(", "),
        );
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

// ============================================================================
// detect
// ============================================================================

pub(crate) fn cmd_detect(
    file: &Path,
    sheet: Option<&str>,
    lock: bool,
    json_out: bool,
) -> Result<(), CliError> {
    let (sheets, _report) = load_tables(file)?;

    let targets: Vec<&Sheet> = match sheet {
        Some(name) => vec![crate::pick_sheet(&sheets, Some(name))?],
        None => sheets.iter().collect(),
    };

    // Lock mapping: everything copies the first loaded sheet's mapping.
    let locked: Option<RoleMapping> = if lock {
        sheets.first().map(|s| detect_roles(&s.headers))
    } else {
        None
    };

    let mut out = Map::new();
    for sheet in &targets {
        let mapping = locked
            .clone()
            .unwrap_or_else(|| detect_roles(&sheet.headers));

        if json_out {
            out.insert(sheet.name.clone(), mapping_json(&mapping));
        } else {
            println!("{}:", sheet.name);
            print_role("label", Some(mapping.label_key.as_str()).filter(|k| !k.is_empty()));
            print_role("status", mapping.status_key.as_deref());
            print_role("satisfaction", mapping.satisfaction_key.as_deref());
            print_role("assignee", mapping.assignee_key.as_deref());
            print_role("duration", mapping.numeric_duration_key.as_deref());
        }
    }

    if json_out {
        println!(
            "{}",
            serde_json::to_string_pretty(&Value::Object(out))
                .map_err(|e| CliError::decode(e.to_string()))?
        );
    }
    Ok(())
}

fn print_role(role: &str, header: Option<&str>) {
    match header {
        Some(h) => println!("  {:<14} {}", role, h),
        None => println!("  {:<14} -", role),
    }
}

fn mapping_json(mapping: &RoleMapping) -> Value {
    json!({
        "label": mapping.label_key,
        "status": mapping.status_key,
        "satisfaction": mapping.satisfaction_key,
        "assignee": mapping.assignee_key,
        "duration": mapping.numeric_duration_key,
    })
}
