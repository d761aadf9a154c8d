//! mdsheet command-line tool
//!
//! Converts Markdown tables to Excel workbooks, and workbooks or CSV files to Markdown.
//!
//! ```sh
//! mdsheet report.md                       # -> report.xlsx
//! mdsheet book.xlsx -s Summary -o out.md  # one sheet -> out.md
//! mdsheet prices.csv -e shift_jis         # -> prices.md
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use mdsheet::{ConverterBuilder, MdSheetError, SheetSelector, TargetFormat};
use tracing_subscriber::EnvFilter;

/// Convert between Markdown tables, Excel workbooks and CSV
#[derive(Parser, Debug)]
#[command(name = "mdsheet", version, about)]
struct Args {
    /// Input file (.md, .xlsx, .xls, .ods, .csv, ...)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to the input path with .xlsx or .md)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Conversion target
    #[arg(short = 't', long = "to", value_enum, default_value = "auto")]
    to: TargetArg,

    /// Read only this worksheet
    #[arg(short, long, value_name = "NAME")]
    sheet: Option<String>,

    /// Input encoding (skips detection)
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// First CSV delimiter to try
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Base sheet name when writing a workbook
    #[arg(long, value_name = "NAME", default_value = mdsheet::DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    /// Markdown -> Excel
    Excel,
    /// Excel / CSV -> Markdown
    Md,
    /// Decide from the input extension
    Auto,
}

impl From<TargetArg> for TargetFormat {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Excel => TargetFormat::Excel,
            TargetArg::Md => TargetFormat::Markdown,
            TargetArg::Auto => TargetFormat::Auto,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(output) => {
            println!(
                "Conversion completed: {} -> {}",
                args.input.display(),
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            handle_error(e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, MdSheetError> {
    let mut builder = ConverterBuilder::new()
        .with_delimiter(args.delimiter)
        .with_sheet_name(args.sheet_name.as_str());
    if let Some(sheet) = &args.sheet {
        builder = builder.with_sheet_selector(SheetSelector::Name(sheet.clone()));
    }
    if let Some(label) = &args.encoding {
        builder = builder.with_encoding(label.as_str());
    }
    let converter = builder.build()?;

    let report = converter.convert(&args.input, args.output.as_deref(), args.to.into())?;
    tracing::debug!(?report, "conversion finished");

    Ok(report.output)
}

/// RUST_LOGが設定されていればそれを優先し、-v / -qが指定された場合は上書きする
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    };

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_error(error: MdSheetError) {
    match &error {
        MdSheetError::Read { .. } | MdSheetError::Io(_) => {
            eprintln!("I/O Error: {}", error);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        MdSheetError::Write { .. } => {
            eprintln!("Write Error: {}", error);
            eprintln!("Please check that the output location is writable.");
        }
        MdSheetError::Decode { .. } => {
            eprintln!("Decode Error: {}", error);
            eprintln!("Try specifying the input encoding with --encoding.");
        }
        MdSheetError::NoTablesFound { .. } | MdSheetError::EmptyTable { .. } => {
            eprintln!("Nothing to convert: {}", error);
        }
        MdSheetError::UnsupportedDelimiter { .. } => {
            eprintln!("CSV Error: {}", error);
            eprintln!("Try specifying the delimiter with --delimiter.");
        }
        MdSheetError::Spreadsheet(_) => {
            eprintln!("Spreadsheet Error: {}", error);
            eprintln!("The file may not be a valid workbook or may be corrupted.");
        }
        MdSheetError::InputTooLarge { .. } => {
            eprintln!("Input Error: {}", error);
        }
        MdSheetError::Config(_) => {
            eprintln!("Configuration Error: {}", error);
        }
    }
}
