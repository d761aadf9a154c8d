//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::api::{SheetSelector, SourceFormat, TargetFormat};
use crate::delimited::{describe_delimiter, CsvReader, CsvTable};
use crate::encoding::{EncodingDetector, TextEncoding};
use crate::error::{MdSheetError, Result};
use crate::markdown::{extract_tables, render_sheets, render_table};
use crate::sheet::{numbered_sheet_names, WorkbookReader, WorkbookWriter, MAX_SHEET_NAME_CHARS};
use crate::table::{NamedTable, Table};

/// 入力ファイルサイズの既定の上限（2GiB）
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 2_147_483_648;

/// Markdownからワークブックに変換する際の既定のシート名
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// ワークブックから読み込むシート
    pub sheet_selector: SheetSelector,

    /// 文字コードの明示指定（Noneの場合は自動判定）
    pub encoding_override: Option<String>,

    /// 文字コード検出器
    pub detector: EncodingDetector,

    /// CSVの最初に試す区切り文字
    pub delimiter: char,

    /// Markdownからワークブックを作成する際のシート名
    pub sheet_name: String,

    /// 入力ファイルサイズの上限（バイト）
    pub max_input_size: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::All,
            encoding_override: None,
            detector: EncodingDetector::default(),
            delimiter: ',',
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use mdsheet::{ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), mdsheet::MdSheetError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Summary".to_string()))
///     .with_encoding("gbk")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 文字コード: 自動判定（既定の候補リスト、サンプル1024バイト）
    /// - CSV区切り文字: `,`
    /// - シート名: `Sheet1`
    /// - 入力サイズ上限: 2GiB
    pub fn new() -> Self {
        Self::default()
    }

    /// ワークブックから読み込むシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 入力の文字コードを明示的に指定する（自動判定を行わない）
    ///
    /// 未知のラベルは`build()`時に`MdSheetError::Config`になります。
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.config.encoding_override = Some(label.into());
        self
    }

    /// 自動判定で試す文字コードの候補を優先順に指定する
    pub fn with_encoding_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.detector = self.config.detector.with_candidates(candidates);
        self
    }

    /// 自動判定のサンプルサイズ（バイト）を指定する
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.config.detector = self.config.detector.with_sample_size(sample_size);
        self
    }

    /// 文字コード検出器を置き換える
    pub fn with_encoding_detector(mut self, detector: EncodingDetector) -> Self {
        self.config.detector = detector;
        self
    }

    /// CSVの最初に試す区切り文字を指定する
    ///
    /// ASCII文字のみ指定できます。
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Markdownからワークブックを作成する際のシート名を指定する
    ///
    /// 表が複数ある場合、2つ目以降は`<name>_2`、`<name>_3`、… となります。
    /// 番号を付けると31文字を超える場合は`<name>`の末尾が切り詰められます。
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// 入力ファイルサイズの上限（バイト）を指定する
    pub fn with_max_input_size(mut self, max_input_size: u64) -> Self {
        self.config.max_input_size = max_input_size;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `MdSheetError::Config(String)`:
    ///   * 未知の文字コードラベル（明示指定または既定の文字コード）
    ///   * サンプルサイズが0
    ///   * ASCII以外、引用符、改行の区切り文字
    ///   * 空、31文字超、または使用できない文字を含むシート名
    pub fn build(self) -> Result<Converter> {
        // 1. 文字コードの検証
        let encoding_override = match &self.config.encoding_override {
            Some(label) => Some(TextEncoding::for_label(label).ok_or_else(|| {
                MdSheetError::Config(format!("Unknown encoding: '{}'", label))
            })?),
            None => None,
        };

        let default_label = self.config.detector.default_encoding();
        if TextEncoding::for_label(default_label).is_none() {
            return Err(MdSheetError::Config(format!(
                "Unknown default encoding: '{}'",
                default_label
            )));
        }

        if self.config.detector.sample_size() == 0 {
            return Err(MdSheetError::Config(
                "Encoding sample size must be greater than 0".to_string(),
            ));
        }

        // 2. 区切り文字の検証
        let delimiter = self.config.delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(MdSheetError::Config(format!(
                "Invalid delimiter: {:?}",
                delimiter
            )));
        }

        // 3. シート名の検証
        validate_sheet_name(&self.config.sheet_name)?;

        Ok(Converter {
            config: self.config,
            encoding_override,
        })
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MdSheetError::Config("Sheet name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_SHEET_NAME_CHARS {
        return Err(MdSheetError::Config(format!(
            "Sheet name '{}' exceeds {} characters",
            name, MAX_SHEET_NAME_CHARS
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
    {
        return Err(MdSheetError::Config(format!(
            "Sheet name '{}' contains invalid character '{}'",
            name, c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(MdSheetError::Config(format!(
            "Sheet name '{}' must not start or end with an apostrophe",
            name
        )));
    }
    Ok(())
}

/// 変換処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// 書き込んだファイル
    pub output: PathBuf,

    /// 出力した表（シート）の数
    pub tables: usize,

    /// テキスト入力の場合、デコードに使用した文字コード
    pub encoding: Option<&'static str>,

    /// CSV入力の場合、解析に使用した区切り文字
    pub delimiter: Option<char>,
}

/// 変換の方向（入力形式と変換先の組み合わせ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    MarkdownToExcel,
    SpreadsheetToMarkdown,
    CsvToMarkdown,
}

/// 変換処理のファサード
///
/// `ConverterBuilder`を使用して構築された設定に基づいて変換処理を実行します。
/// 各変換は独立しており、ファイルハンドルは読み書きの間だけ保持されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use mdsheet::{ConverterBuilder, TargetFormat};
/// use std::path::Path;
///
/// # fn main() -> Result<(), mdsheet::MdSheetError> {
/// let converter = ConverterBuilder::new().build()?;
/// let report = converter.convert(Path::new("report.md"), None, TargetFormat::Auto)?;
/// println!("saved to {}", report.output.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
    encoding_override: Option<TextEncoding>,
}

impl Converter {
    /// ファイルの文字コードを自動判定する（明示指定は無視する）
    pub fn detect_encoding(&self, path: &Path) -> Result<TextEncoding> {
        self.config.detector.detect(path)
    }

    /// 入力に使用する文字コードを決定する
    ///
    /// 明示指定がある場合はそれを、ない場合は自動判定の結果を返します。
    pub fn resolve_encoding(&self, path: &Path) -> Result<TextEncoding> {
        match self.encoding_override {
            Some(encoding) => {
                tracing::info!(path = %path.display(), encoding = %encoding, "using configured encoding");
                Ok(encoding)
            }
            None => {
                let encoding = self.detect_encoding(path)?;
                tracing::info!(path = %path.display(), encoding = %encoding, "detected encoding");
                Ok(encoding)
            }
        }
    }

    /// テキストファイルを読み込み、UTF-8の文字列にデコードする
    ///
    /// 先頭のBOM（U+FEFF）は取り除きます。
    ///
    /// # 戻り値
    ///
    /// * `Ok((String, TextEncoding))` - デコードした文字列と使用した文字コード
    /// * `Err(MdSheetError::Decode)` - 選択した文字コードでデコードできない場合
    pub fn read_text(&self, path: &Path) -> Result<(String, TextEncoding)> {
        let encoding = self.resolve_encoding(path)?;
        let bytes = self.read_bytes(path)?;

        let mut text = encoding.decode(&bytes).ok_or_else(|| MdSheetError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        })?;
        if text.starts_with('\u{feff}') {
            text.remove(0);
        }

        Ok((text, encoding))
    }

    /// Markdownファイルからすべての表を抽出する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Table>)` - 1つ以上の表
    /// * `Err(MdSheetError::NoTablesFound)` - 表が1つも見つからない場合
    pub fn read_markdown(&self, path: &Path) -> Result<Vec<Table>> {
        let (text, _) = self.read_text(path)?;
        let tables = extract_tables(&text);
        if tables.is_empty() {
            return Err(MdSheetError::NoTablesFound {
                path: path.to_path_buf(),
            });
        }
        Ok(tables)
    }

    /// ワークブックから選択されたシートを読み込む
    pub fn read_spreadsheet(&self, path: &Path) -> Result<Vec<NamedTable>> {
        let bytes = self.read_bytes(path)?;
        let mut reader = WorkbookReader::open(bytes)?;
        reader.read_tables(&self.config.sheet_selector)
    }

    /// CSVファイルを表として読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(CsvTable)` - 表と使用した区切り文字
    /// * `Err(MdSheetError::UnsupportedDelimiter)` - すべての区切り文字で解析に失敗した場合
    /// * `Err(MdSheetError::EmptyTable)` - データ行が存在しない場合
    pub fn read_csv(&self, path: &Path) -> Result<CsvTable> {
        let (text, _) = self.read_text(path)?;
        self.parse_csv(path, &text)
    }

    fn parse_csv(&self, path: &Path, text: &str) -> Result<CsvTable> {
        // build()でASCIIであることを検証済み
        let reader = CsvReader::new(self.config.delimiter as u8);

        let parsed = reader.parse(text).ok_or_else(|| MdSheetError::UnsupportedDelimiter {
            path: path.to_path_buf(),
            tried: reader
                .delimiter_order()
                .into_iter()
                .map(describe_delimiter)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        if parsed.delimiter != reader.delimiter_order()[0] {
            tracing::info!(delimiter = %describe_delimiter(parsed.delimiter), "using fallback delimiter");
        }
        if parsed.table.is_empty() {
            return Err(MdSheetError::EmptyTable {
                path: path.to_path_buf(),
            });
        }

        Ok(parsed)
    }

    /// Markdownの表をワークブックに変換する
    ///
    /// 出力先を省略した場合は、入力ファイルの拡張子を`.xlsx`に置き換えたパスに書き込みます。
    pub fn markdown_to_excel(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        let output = output_path(input, output, "xlsx");
        let (text, encoding) = self.read_text(input)?;

        let tables = extract_tables(&text);
        if tables.is_empty() {
            return Err(MdSheetError::NoTablesFound {
                path: input.to_path_buf(),
            });
        }
        tracing::info!(count = tables.len(), "found Markdown tables");

        let names = numbered_sheet_names(&self.config.sheet_name, tables.len());
        let sheets: Vec<NamedTable> = names
            .into_iter()
            .zip(tables)
            .map(|(name, table)| NamedTable::new(name, table))
            .collect();

        WorkbookWriter::new().save(&sheets, &output)?;

        Ok(ConversionReport {
            output,
            tables: sheets.len(),
            encoding: Some(encoding.name()),
            delimiter: None,
        })
    }

    /// ワークブックをMarkdownに変換する
    ///
    /// 出力先を省略した場合は、入力ファイルの拡張子を`.md`に置き換えたパスに書き込みます。
    pub fn excel_to_markdown(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        let output = output_path(input, output, "md");
        let sheets = self.read_spreadsheet(input)?;

        write_text(&output, &render_sheets(&sheets))?;

        Ok(ConversionReport {
            output,
            tables: sheets.len(),
            encoding: None,
            delimiter: None,
        })
    }

    /// CSVをMarkdownに変換する
    ///
    /// 出力先を省略した場合は、入力ファイルの拡張子を`.md`に置き換えたパスに書き込みます。
    pub fn csv_to_markdown(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        let output = output_path(input, output, "md");
        let (text, encoding) = self.read_text(input)?;
        let parsed = self.parse_csv(input, &text)?;

        write_text(&output, &render_table(&parsed.table))?;

        Ok(ConversionReport {
            output,
            tables: 1,
            encoding: Some(encoding.name()),
            delimiter: Some(parsed.delimiter as char),
        })
    }

    /// シートをMarkdownとして任意のライターに書き出す
    ///
    /// 標準出力やメモリ上のバッファへの出力に使用します。
    pub fn write_markdown<W: Write>(&self, sheets: &[NamedTable], mut writer: W) -> Result<()> {
        writer.write_all(render_sheets(sheets).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// 変換先の形式に応じて変換を実行する
    ///
    /// # 変換方向の決定
    ///
    /// * `TargetFormat::Excel` - 入力をMarkdownとして読み込む
    /// * `TargetFormat::Markdown` - `.csv` / `.tsv`はCSVとして、それ以外はワークブックとして読み込む
    /// * `TargetFormat::Auto` - 拡張子から判断する。判断できない場合は`MdSheetError::Config`
    pub fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
        target: TargetFormat,
    ) -> Result<ConversionReport> {
        match plan(input, target)? {
            Direction::MarkdownToExcel => self.markdown_to_excel(input, output),
            Direction::SpreadsheetToMarkdown => self.excel_to_markdown(input, output),
            Direction::CsvToMarkdown => self.csv_to_markdown(input, output),
        }
    }

    /// サイズ上限を確認してファイル全体を読み込む
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let size = fs::metadata(path)
            .map_err(|e| MdSheetError::read(path, e))?
            .len();
        if size > self.config.max_input_size {
            return Err(MdSheetError::InputTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.config.max_input_size,
            });
        }

        fs::read(path).map_err(|e| MdSheetError::read(path, e))
    }
}

fn plan(input: &Path, target: TargetFormat) -> Result<Direction> {
    let source = SourceFormat::from_path(input);

    let target = match target {
        TargetFormat::Auto => source.map(SourceFormat::default_target).ok_or_else(|| {
            MdSheetError::Config(format!(
                "Cannot infer conversion direction for '{}'; specify the target format",
                input.display()
            ))
        })?,
        explicit => explicit,
    };

    Ok(match target {
        TargetFormat::Excel => Direction::MarkdownToExcel,
        _ if source == Some(SourceFormat::Delimited) => Direction::CsvToMarkdown,
        _ => Direction::SpreadsheetToMarkdown,
    })
}

fn output_path(input: &Path, output: Option<&Path>, extension: &str) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(extension))
}

/// UTF-8でテキストを書き込む
fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content.as_bytes()).map_err(|e| MdSheetError::write(path, e))
}
