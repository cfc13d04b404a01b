// TallyGrid CLI - headless spreadsheet analytics
//
// Loads tabular files, detects column roles, and prints ranked
// category distributions and multi-sheet comparisons.

mod compare;
mod exit_codes;
mod report;
mod sheet_ops;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tallygrid_engine::aggregate::Measure;
use tallygrid_engine::session::SessionError;
use tallygrid_engine::sheet::Sheet;
use tallygrid_engine::view::SortDir;
use tallygrid_io::LoadReport;

use exit_codes::{session_exit_code, EXIT_DECODE, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Spreadsheet analytics: ranked distributions and cross-sheet comparisons")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets in a file, with headers and row counts
    Sheets {
        /// Input file (xlsx, xlsm, xlsb, xls, ods, csv, tsv)
        file: PathBuf,

        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show the detected column role mapping for each sheet
    #[command(after_help = "\
Examples:
  tally detect returns.xlsx
  tally detect returns.xlsx --sheet Q3 --json
  tally detect returns.xlsx --lock")]
    Detect {
        file: PathBuf,

        /// Only this sheet
        #[arg(long)]
        sheet: Option<String>,

        /// Copy the first sheet's mapping to all sheets instead of
        /// detecting each independently
        #[arg(long)]
        lock: bool,

        #[arg(long)]
        json: bool,
    },

    /// Aggregate one sheet into a ranked category distribution
    #[command(after_help = "\
Examples:
  tally report returns.csv
  tally report returns.xlsx --sheet Q3 --measure sum
  tally report returns.xlsx --label Status --top 5 --min-share 2
  tally report returns.csv --search widget --sort asc --json")]
    Report {
        file: PathBuf,

        /// Sheet to aggregate (defaults to the first)
        #[arg(long)]
        sheet: Option<String>,

        /// count = row frequency, sum = total of a numeric column
        #[arg(long, value_enum)]
        measure: Option<MeasureArg>,

        /// Label column to group by (overrides detection)
        #[arg(long)]
        label: Option<String>,

        /// Numeric column for --measure sum (overrides detection)
        #[arg(long)]
        value: Option<String>,

        /// Keep only rows whose label contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Keep only the N largest groups; the rest fold into "Other" (0 = all)
        #[arg(long)]
        top: Option<usize>,

        /// Fold groups below this share of the total into "Other" (percent, 0-25)
        #[arg(long)]
        min_share: Option<f64>,

        /// Display order (never changes which groups fold into "Other")
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        #[arg(long)]
        json: bool,

        /// CSV output (name,value,share per row)
        #[arg(long, conflicts_with = "json")]
        csv: bool,
    },

    /// Compare 2-5 sheets on a shared, ranked label axis
    #[command(after_help = "\
Examples:
  tally compare year.xlsx --sheet Q1 --sheet Q2
  tally compare year.xlsx --sheet Q1 --sheet Q2 --sheet Q3 --measure sum --top 10")]
    Compare {
        file: PathBuf,

        /// Sheet to include (repeat 2-5 times)
        #[arg(long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,

        #[arg(long, value_enum)]
        measure: Option<MeasureArg>,

        /// Size of the ranked label axis (0 = all labels)
        #[arg(long)]
        top: Option<usize>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MeasureArg {
    Count,
    Sum,
}

impl From<MeasureArg> for Measure {
    fn from(m: MeasureArg) -> Self {
        match m {
            MeasureArg::Count => Measure::Count,
            MeasureArg::Sum => Measure::Sum,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDir {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Asc => SortDir::Asc,
            SortArg::Desc => SortDir::Desc,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: tally <command> [options]");
            eprintln!("       tally --help for more information");
            Ok(())
        }
        Some(Commands::Sheets { file, json }) => sheet_ops::cmd_sheets(&file, json),
        Some(Commands::Detect { file, sheet, lock, json }) => {
            sheet_ops::cmd_detect(&file, sheet.as_deref(), lock, json)
        }
        Some(Commands::Report {
            file,
            sheet,
            measure,
            label,
            value,
            search,
            top,
            min_share,
            sort,
            json,
            csv,
        }) => report::cmd_report(report::ReportArgs {
            file,
            sheet,
            measure,
            label,
            value,
            search,
            top,
            min_share,
            sort,
            json,
            csv,
        }),
        Some(Commands::Compare { file, sheets, measure, top, json }) => {
            compare::cmd_compare(&file, &sheets, measure, top, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DECODE, message: msg.into(), hint: None }
    }

    /// Create error from an engine session error with proper exit code.
    pub fn session(err: SessionError) -> Self {
        let hint = match &err {
            SessionError::Aggregate(
                tallygrid_engine::aggregate::AggregateError::NoNumericColumn,
            ) => Some("pass --value COLUMN, or use --measure count".to_string()),
            SessionError::Compare(_) => {
                Some("repeat --sheet between 2 and 5 times".to_string())
            }
            _ => None,
        };
        Self { code: session_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Load a tabular file, mapping failures to exit codes: missing or
/// unreadable file is an I/O error, anything past that is a decode
/// error.
pub(crate) fn load_tables(path: &Path) -> Result<(Vec<Sheet>, LoadReport), CliError> {
    if !path.exists() {
        return Err(CliError::io(format!("no such file: {}", path.display())));
    }
    tallygrid_io::load_tables(path).map_err(CliError::decode)
}

/// Pick a sheet by name, or the first one when no name is given.
pub(crate) fn pick_sheet<'a>(
    sheets: &'a [Sheet],
    name: Option<&str>,
) -> Result<&'a Sheet, CliError> {
    match name {
        Some(n) => sheets.iter().find(|s| s.name == n).ok_or_else(|| {
            let known: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
            CliError::args(format!("no such sheet: {}", n))
                .with_hint(format!("available sheets: {}", known.join(", ")))
        }),
        None => sheets
            .first()
            .ok_or_else(|| CliError::decode("file contains no sheets".to_string())),
    }
}
