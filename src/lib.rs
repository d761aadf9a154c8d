//! mdsheet - Markdown table ⇄ Excel / CSV converter
//!
//! This crate extracts GitHub-style pipe tables from Markdown documents and writes
//! them to XLSX workbooks, and renders workbook sheets or CSV files back to Markdown.
//! Text inputs are decoded after detecting their character encoding.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use mdsheet::{ConverterBuilder, TargetFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // report.md -> report.xlsx
//!     let report = converter.convert(Path::new("report.md"), None, TargetFormat::Auto)?;
//!     println!("{} table(s) written to {}", report.tables, report.output.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::path::Path;
//! use mdsheet::{ConverterBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Summary".to_string()))
//!         .with_encoding_candidates(["utf-8", "shift_jis", "euc-jp"])
//!         .with_delimiter(';')
//!         .build()?;
//!
//!     converter.excel_to_markdown(Path::new("book.xlsx"), Some(Path::new("summary.md")))?;
//!     converter.csv_to_markdown(Path::new("prices.csv"), None)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Working with Strings
//!
//! ```rust
//! use mdsheet::{extract_tables, render_table};
//!
//! let tables = extract_tables("| a | b |\n|---|---|\n| 1 | 2 |\n");
//! assert_eq!(tables.len(), 1);
//! assert_eq!(render_table(&tables[0]), "| a | b |\n| --- | --- |\n| 1 | 2 |\n");
//! ```

mod api;
mod builder;
mod delimited;
mod encoding;
mod error;
mod formatter;
mod markdown;
mod sheet;
mod table;

// 公開API
pub use api::{SheetSelector, SourceFormat, TargetFormat};
pub use builder::{
    ConversionReport, Converter, ConverterBuilder, DEFAULT_MAX_INPUT_SIZE, DEFAULT_SHEET_NAME,
};
pub use delimited::{CsvTable, FALLBACK_DELIMITERS};
pub use encoding::{
    ChardetngDetector, EncodingDetector, EncodingGuess, StatisticalDetector, TextEncoding,
    DEFAULT_ENCODING, DEFAULT_ENCODING_CANDIDATES, DEFAULT_MIN_CONFIDENCE, DEFAULT_SAMPLE_SIZE,
    DEFAULT_VERIFY_CHARS,
};
pub use error::{BoxedSource, MdSheetError, Result};
pub use markdown::{extract_tables, render_sheets, render_table};
pub use table::{NamedTable, Table};
