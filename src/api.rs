//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use std::path::Path;

/// シート選択方式
///
/// ワークブックからMarkdownに変換するシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートをワークブックの順に変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),
}

/// 変換先の形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum TargetFormat {
    /// Markdownの表をExcelワークブック（.xlsx）に変換
    Excel,

    /// ワークブックまたはCSVをMarkdownに変換
    Markdown,

    /// 入力ファイルの拡張子から判断（デフォルト）
    ///
    /// - `.md` / `.markdown` → Excel
    /// - `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` / `.csv` / `.tsv` → Markdown
    #[default]
    Auto,
}

/// 入力ファイルの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceFormat {
    /// Markdownテキスト
    Markdown,

    /// ワークブック（calamineが読み込める形式）
    Spreadsheet,

    /// 区切り文字付きテキスト（CSV / TSV）
    Delimited,
}

impl SourceFormat {
    /// 拡張子から入力形式を判定する（大文字・小文字は区別しない）
    ///
    /// # 戻り値
    ///
    /// * `Some(SourceFormat)` - 既知の拡張子の場合
    /// * `None` - 拡張子がない、または未知の拡張子の場合
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(SourceFormat::Markdown),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            "csv" | "tsv" => Some(SourceFormat::Delimited),
            _ => None,
        }
    }

    /// この形式を`Auto`で変換した場合の変換先
    pub fn default_target(self) -> TargetFormat {
        match self {
            SourceFormat::Markdown => TargetFormat::Excel,
            SourceFormat::Spreadsheet | SourceFormat::Delimited => TargetFormat::Markdown,
        }
    }
}
