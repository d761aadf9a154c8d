//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;
use thiserror::Error;

/// 書き込み側のエラー要因（I/Oエラーまたはワークブック書き込みエラー）
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// mdsheetクレート全体で使用するエラー型
///
/// ファイルの読み込み、文字コードの判定、表の抽出、出力の書き込み中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Read` / `Write`: 入出力ファイルのI/Oエラー（パス付き）
/// - `Decode`: 判定した文字コードでファイルをデコードできなかった
/// - `NoTablesFound` / `EmptyTable`: 変換対象の表が存在しない
/// - `UnsupportedDelimiter`: すべての区切り文字でCSVの解析に失敗した
/// - `Spreadsheet`: ワークブックの解析エラー（calamine由来）
/// - `Config`: 設定の検証に失敗したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use mdsheet::{ConverterBuilder, MdSheetError};
///
/// let converter = ConverterBuilder::new().build().unwrap();
/// match converter.read_markdown("notes.md".as_ref()) {
///     Err(MdSheetError::NoTablesFound { path }) => {
///         eprintln!("{} contains no tables", path.display());
///     }
///     Err(e) => eprintln!("{}", e),
///     Ok(tables) => println!("{} tables", tables.len()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum MdSheetError {
    /// 入力ファイルを開く、または読み込む際に発生したエラー
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        /// 読み込もうとしたファイル
        path: PathBuf,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// 出力ファイルの書き込みに失敗したエラー
    ///
    /// Markdownファイルの書き込み（I/Oエラー）と、rust_xlsxwriterによる
    /// ワークブックの保存エラーの両方をこのバリアントで扱います。
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        /// 書き込もうとしたファイル
        path: PathBuf,
        /// 元のエラー
        #[source]
        source: BoxedSource,
    },

    /// 選択された文字コードでファイル全体をデコードできなかったエラー
    #[error("Failed to decode '{}' as {encoding}", path.display())]
    Decode {
        /// デコード対象のファイル
        path: PathBuf,
        /// 使用した文字コード名
        encoding: String,
    },

    /// Markdown入力に解析可能な表が1つも含まれていない
    #[error("No Markdown tables found in '{}'", path.display())]
    NoTablesFound {
        /// 入力ファイル
        path: PathBuf,
    },

    /// CSV入力にヘッダー以外のデータ行が存在しない
    #[error("No data rows found in '{}'", path.display())]
    EmptyTable {
        /// 入力ファイル
        path: PathBuf,
    },

    /// すべての区切り文字候補でCSVの解析に失敗したエラー
    #[error("Could not parse '{}' with any delimiter (tried {tried})", path.display())]
    UnsupportedDelimiter {
        /// 入力ファイル
        path: PathBuf,
        /// 試行した区切り文字（表示用に整形済み）
        tried: String,
    },

    /// ワークブックの解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// 入力ファイルがサイズ上限を超えている
    #[error("Input '{}' is {size} bytes, exceeding the limit of {limit} bytes", path.display())]
    InputTooLarge {
        /// 入力ファイル
        path: PathBuf,
        /// 実際のサイズ
        size: u64,
        /// 設定された上限
        limit: u64,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時の検証、存在しないシート名の指定、
    /// 変換方向を拡張子から判断できない場合などに発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 出力先ライターへの書き込みエラー（パスを持たない場合）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MdSheetError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MdSheetError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<BoxedSource>) -> Self {
        MdSheetError::Write {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// クレート内で使用するResult型のエイリアス
pub type Result<T> = std::result::Result<T, MdSheetError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_read_error_display() {
        let error = MdSheetError::read(
            "input.md",
            io::Error::new(io::ErrorKind::NotFound, "File not found"),
        );

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to read"));
        assert!(error_msg.contains("input.md"));
        assert!(error_msg.contains("File not found"));
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error as _;

        let error = MdSheetError::read(
            "input.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        let source = error.source().expect("source should be kept");
        assert_eq!(source.to_string(), "Permission denied");
    }

    #[test]
    fn test_write_error_from_io() {
        let error = MdSheetError::write("out.md", io::Error::other("disk full"));
        match error {
            MdSheetError::Write { path, source } => {
                assert_eq!(path, PathBuf::from("out.md"));
                assert_eq!(source.to_string(), "disk full");
            }
            _ => panic!("Expected Write error"),
        }
    }

    #[test]
    fn test_decode_error_display() {
        let error = MdSheetError::Decode {
            path: PathBuf::from("table.md"),
            encoding: "utf-8".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to decode 'table.md' as utf-8");
    }

    #[test]
    fn test_unsupported_delimiter_display() {
        let error = MdSheetError::UnsupportedDelimiter {
            path: PathBuf::from("data.csv"),
            tried: "',', ';', '\\t', '|'".to_string(),
        };
        let error_msg = error.to_string();
        assert!(error_msg.contains("data.csv"));
        assert!(error_msg.contains("';'"));
    }

    #[test]
    fn test_spreadsheet_error_from_calamine() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: MdSheetError = parse_err.into();

        assert!(matches!(error, MdSheetError::Spreadsheet(_)));
        assert!(error.to_string().starts_with("Failed to parse spreadsheet"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<()> {
            let _file = std::fs::File::open("nonexistent_file.md")?;
            Ok(())
        }

        match io_operation() {
            Err(MdSheetError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let config_err = MdSheetError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let no_tables = MdSheetError::NoTablesFound {
            path: PathBuf::from("a.md"),
        };
        assert!(no_tables.to_string().starts_with("No Markdown tables found"));

        let empty = MdSheetError::EmptyTable {
            path: PathBuf::from("a.csv"),
        };
        assert!(empty.to_string().starts_with("No data rows found"));

        let too_large = MdSheetError::InputTooLarge {
            path: PathBuf::from("big.md"),
            size: 10,
            limit: 5,
        };
        assert!(too_large.to_string().contains("exceeding the limit of 5 bytes"));
    }
}
