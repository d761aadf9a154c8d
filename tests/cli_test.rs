//! CLI Tests for mdsheet
//!
//! Runs the `mdsheet` binary and checks exit codes and messages.

use mdsheet::ConverterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TABLE_MD: &str = "| Name | Qty |\n|---|---|\n| apple | 3 |\n";

/// latin-1で「café」を含む表（UTF-8としては不正）
const LATIN1_MD: &[u8] = b"| caf\xE9 |\n|---|\n| x |\n";

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn mdsheet<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_mdsheet"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_success_exit_code() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.md", TABLE_MD.as_bytes());

    let output = mdsheet([arg(&input)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Conversion completed"));
    assert!(dir.path().join("report.xlsx").exists());
}

#[test]
fn test_explicit_output_and_target() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.txt", TABLE_MD.as_bytes());
    let out = dir.path().join("custom.xlsx");

    let output = mdsheet([arg(&input), "-t", "excel", "-o", arg(&out)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(out.exists());
}

#[test]
fn test_no_tables_exit_code() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "notes.md", b"# Notes\n\nNothing tabular here.\n");

    let output = mdsheet([arg(&input)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No Markdown tables found"));
    assert!(!dir.path().join("notes.xlsx").exists());
}

#[test]
fn test_unknown_encoding_exit_code() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.md", TABLE_MD.as_bytes());

    let output = mdsheet([arg(&input), "-e", "klingon"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown encoding: 'klingon'"));
}

#[test]
fn test_invalid_target_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.md", TABLE_MD.as_bytes());

    let output = mdsheet([arg(&input), "-t", "pdf"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("report.xlsx").exists());
}

#[test]
fn test_missing_input_argument_is_usage_error() {
    let output = mdsheet(Vec::<&str>::new());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_encoding_flag_overrides_detection() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "cafe.md", LATIN1_MD);

    // 自動判定ではlatin-1として読み込める
    let output = mdsheet([arg(&input)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    // utf-8を指定するとデコードに失敗する
    fs::remove_file(dir.path().join("cafe.xlsx")).unwrap();
    let output = mdsheet([arg(&input), "-e", "utf-8"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to decode"));
    assert!(!dir.path().join("cafe.xlsx").exists());

    let output = mdsheet([arg(&input), "--encoding", "latin-1"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let converter = ConverterBuilder::new().build().unwrap();
    let sheets = converter
        .read_spreadsheet(&dir.path().join("cafe.xlsx"))
        .unwrap();
    assert_eq!(sheets[0].table.columns(), &["café"]);
}

#[test]
fn test_sheet_flag_selects_one_sheet() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "two.md",
        b"| A |\n|---|\n| 1 |\n\ntext\n\n| B |\n|---|\n| 2 |\n",
    );
    let xlsx = dir.path().join("two.xlsx");
    let md = dir.path().join("second.md");

    let output = mdsheet([arg(&input)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let output = mdsheet([arg(&xlsx), "-s", "Sheet1_2", "-o", arg(&md)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(fs::read_to_string(&md).unwrap(), "| B |\n| --- |\n| 2 |\n\n");
}
