//! Delimited Text Module
//!
//! CSV / TSVを表として読み込むモジュール。
//! 指定された区切り文字で解析できない場合は、固定の候補（`;`、タブ、`|`）を順に試します。

use std::fmt;

use crate::table::Table;

/// 指定された区切り文字が失敗した場合に試す区切り文字（優先順）
pub const FALLBACK_DELIMITERS: &[u8] = &[b';', b'\t', b'|'];

/// CSVから読み込んだ表と、実際に使用した区切り文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    /// 表データ
    pub table: Table,
    /// 解析に成功した区切り文字
    pub delimiter: u8,
}

/// 1つの区切り文字による解析が失敗した理由
#[derive(Debug)]
enum AttemptError {
    Csv(csv::Error),
    NoHeader,
    TooManyFields { line: Option<u64>, found: usize, expected: usize },
    SingleColumn { found: u8 },
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Csv(e) => write!(f, "{}", e),
            AttemptError::NoHeader => f.write_str("no header row"),
            AttemptError::TooManyFields {
                line,
                found,
                expected,
            } => match line {
                Some(line) => write!(f, "line {} has {} fields, expected {}", line, found, expected),
                None => write!(f, "record has {} fields, expected {}", found, expected),
            },
            AttemptError::SingleColumn { found } => write!(
                f,
                "single column whose name contains {}",
                describe_delimiter(*found)
            ),
        }
    }
}

impl From<csv::Error> for AttemptError {
    fn from(e: csv::Error) -> Self {
        AttemptError::Csv(e)
    }
}

/// 区切り文字のフォールバック付きCSVリーダー
#[derive(Debug, Clone)]
pub(crate) struct CsvReader {
    delimiter: u8,
}

impl CsvReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 試行する区切り文字の一覧（指定された区切り文字、続いてフォールバック、重複なし）
    pub fn delimiter_order(&self) -> Vec<u8> {
        let mut order = vec![self.delimiter];
        for &delimiter in FALLBACK_DELIMITERS {
            if !order.contains(&delimiter) {
                order.push(delimiter);
            }
        }
        order
    }

    /// テキストを表として解析する
    ///
    /// 区切り文字を順に試し、最初に成功した結果を返します。次の場合、その区切り文字は失敗とみなします。
    ///
    /// - csvクレートがエラーを返した
    /// - ヘッダー行が存在しない
    /// - ヘッダーより多いフィールドを持つレコードがある
    /// - 1列しか得られず、その列名に後続の候補の区切り文字が含まれている
    ///
    /// ヘッダーより短いレコードは空セルで補います。
    ///
    /// # 戻り値
    ///
    /// * `Some(CsvTable)` - いずれかの区切り文字で成功した場合
    /// * `None` - すべての区切り文字で失敗した場合
    pub fn parse(&self, text: &str) -> Option<CsvTable> {
        let order = self.delimiter_order();

        for (idx, &delimiter) in order.iter().enumerate() {
            match parse_with(text, delimiter, &order[idx + 1..]) {
                Ok(table) => return Some(CsvTable { table, delimiter }),
                Err(reason) => tracing::debug!(
                    delimiter = %describe_delimiter(delimiter),
                    %reason,
                    "CSV parse attempt failed"
                ),
            }
        }

        None
    }
}

fn parse_with(text: &str, delimiter: u8, later: &[u8]) -> Result<Table, AttemptError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if columns.is_empty() {
        return Err(AttemptError::NoHeader);
    }
    if columns.len() == 1 {
        if let Some(&found) = later.iter().find(|&&d| columns[0].as_bytes().contains(&d)) {
            return Err(AttemptError::SingleColumn { found });
        }
    }

    let width = columns.len();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        if record.len() > width {
            return Err(AttemptError::TooManyFields {
                line: record.position().map(|p| p.line()),
                found: record.len(),
                expected: width,
            });
        }

        let mut cells: Vec<String> = record.iter().map(String::from).collect();
        cells.resize(width, String::new());
        table.push_row(cells);
    }

    Ok(table)
}

/// 区切り文字を表示用に整形する（`','`、`'\t'`など）
pub(crate) fn describe_delimiter(delimiter: u8) -> String {
    format!("{:?}", delimiter as char)
}
