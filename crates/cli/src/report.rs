// report command: the single-sheet pipeline (detect -> aggregate -> view).

use std::path::PathBuf;

use serde_json::{json, Value};

use tallygrid_config::Settings;
use tallygrid_engine::aggregate::Measure;
use tallygrid_engine::session::Session;
use tallygrid_engine::view::{ChartKind, DisplayEntry, SortDir, ViewState};

use crate::util::{format_value, pad_left, pad_right};
use crate::{load_tables, pick_sheet, CliError, MeasureArg, SortArg};

pub(crate) struct ReportArgs {
    pub file: PathBuf,
    pub sheet: Option<String>,
    pub measure: Option<MeasureArg>,
    pub label: Option<String>,
    pub value: Option<String>,
    pub search: Option<String>,
    pub top: Option<usize>,
    pub min_share: Option<f64>,
    pub sort: Option<SortArg>,
    pub json: bool,
    pub csv: bool,
}

/// Default view state from user settings; CLI flags override per run.
pub(crate) fn view_from_settings(settings: &Settings) -> ViewState {
    ViewState {
        chart: match settings.default_chart.as_str() {
            "pie" => ChartKind::Pie,
            "line" => ChartKind::Line,
            _ => ChartKind::Bar,
        },
        measure: match settings.default_measure.as_str() {
            "sum" => Measure::Sum,
            _ => Measure::Count,
        },
        top_n: settings.default_top_n,
        min_share_pct: settings.default_min_share_pct,
        sort: match settings.default_sort.as_str() {
            "asc" => SortDir::Asc,
            _ => SortDir::Desc,
        },
        label_search: String::new(),
    }
}

pub(crate) fn cmd_report(args: ReportArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let (sheets, _report) = load_tables(&args.file)?;
    let sheet_name = pick_sheet(&sheets, args.sheet.as_deref())?.name.clone();

    let mut session = Session::with_defaults(view_from_settings(&settings), settings.lock_mapping);
    session.load(sheets);

    // Column overrides are validated against the sheet before use so a
    // typo fails as a usage error, not as an empty aggregate.
    let mut mapping = session
        .mapping(&sheet_name)
        .map_err(CliError::session)?
        .clone();
    if let Some(label) = &args.label {
        require_header(&session, &sheet_name, label)?;
        mapping.label_key = label.clone();
    }
    if let Some(value) = &args.value {
        require_header(&session, &sheet_name, value)?;
        mapping.numeric_duration_key = Some(value.clone());
    }
    session
        .set_mapping(&sheet_name, mapping)
        .map_err(CliError::session)?;

    session
        .update_view(&sheet_name, |view| {
            if let Some(measure) = args.measure {
                view.measure = measure.into();
            }
            if let Some(top) = args.top {
                view.top_n = top;
            }
            if let Some(min_share) = args.min_share {
                view.min_share_pct = min_share;
            }
            if let Some(sort) = args.sort {
                view.sort = sort.into();
            }
            if let Some(search) = &args.search {
                view.label_search = search.clone();
            }
        })
        .map_err(CliError::session)?;

    let aggregate = session
        .generate(&sheet_name)
        .map_err(CliError::session)?
        .clone();
    let display = session.display(&sheet_name).unwrap_or_default();
    let measure = session
        .view(&sheet_name)
        .map_err(CliError::session)?
        .measure;

    if args.json {
        print_json(&sheet_name, measure, &aggregate, &display)?;
    } else if args.csv {
        print_csv(&aggregate, &display);
    } else {
        print_table(&sheet_name, measure, &aggregate, &display);
    }
    Ok(())
}

fn require_header(session: &Session, sheet_name: &str, header: &str) -> Result<(), CliError> {
    let sheet = session
        .sheet(sheet_name)
        .ok_or_else(|| CliError::args(format!("no such sheet: {}", sheet_name)))?;
    if sheet.has_header(header) {
        Ok(())
    } else {
        Err(CliError::args(format!("no such column: {}", header))
            .with_hint(format!("available columns: {}", sheet.headers.join(", "))))
    }
}

fn print_table(
    sheet_name: &str,
    measure: Measure,
    aggregate: &tallygrid_engine::aggregate::Aggregate,
    display: &[DisplayEntry],
) {
    println!("{} ({} measure)", sheet_name, measure);

    let label_width = display
        .iter()
        .map(|e| crate::util::display_width(&e.name))
        .max()
        .unwrap_or(5)
        .clamp(5, 40);

    for entry in display {
        let share = if aggregate.total != 0.0 {
            format!("{:.1}%", 100.0 * entry.value / aggregate.total)
        } else {
            "-".to_string()
        };
        let name = if entry.is_other {
            format!("Other (+{})", entry.children.len())
        } else {
            entry.name.clone()
        };
        println!(
            "{}  {}  {}",
            pad_right(&name, label_width + 4),
            pad_left(&format_value(entry.value), 10),
            pad_left(&share, 7),
        );
    }

    println!(
        "rows {}  labels {}  total {}",
        aggregate.rows_count,
        aggregate.distinct_labels,
        format_value(aggregate.total),
    );
}

fn print_csv(aggregate: &tallygrid_engine::aggregate::Aggregate, display: &[DisplayEntry]) {
    println!("name,value,share");
    for entry in display {
        let share = if aggregate.total != 0.0 {
            format!("{:.4}", entry.value / aggregate.total)
        } else {
            String::new()
        };
        println!("{},{},{}", csv_field(&entry.name), entry.value, share);
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn print_json(
    sheet_name: &str,
    measure: Measure,
    aggregate: &tallygrid_engine::aggregate::Aggregate,
    display: &[DisplayEntry],
) -> Result<(), CliError> {
    let entries: Vec<Value> = display
        .iter()
        .map(|e| {
            if e.is_other {
                let children: Vec<Value> = e
                    .children
                    .iter()
                    .map(|c| json!({"name": c.name, "value": c.value}))
                    .collect();
                json!({"name": e.name, "value": e.value, "other": true, "children": children})
            } else {
                json!({"name": e.name, "value": e.value})
            }
        })
        .collect();

    let out = json!({
        "sheet": sheet_name,
        "measure": measure.to_string(),
        "total": aggregate.total,
        "rows": aggregate.rows_count,
        "distinct_labels": aggregate.distinct_labels,
        "entries": entries,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).map_err(|e| CliError::decode(e.to_string()))?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
