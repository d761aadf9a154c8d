//! Table Module
//!
//! 変換処理の中間表現となる表データ型を定義するモジュール。
//! Markdown、ワークブック、CSVのいずれの入力も一度`Table`に変換されます。

/// 列名と行データからなる表
///
/// # 不変条件
///
/// すべての行のセル数は列数と一致します。列数と異なる行は
/// [`Table::push_row`]で拒否され、修復はされません。
///
/// 列名は一意である必要はありません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// 列名を指定して、行を持たない表を生成
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// 行を追加する
    ///
    /// # 戻り値
    ///
    /// * `true` - 行のセル数が列数と一致し、追加された場合
    /// * `false` - セル数が一致せず、行が破棄された場合
    pub fn push_row(&mut self, row: Vec<String>) -> bool {
        if row.len() != self.columns.len() {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// 列名と行データから表を生成し、列数と一致しない行を除外する
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 列または行が1つも存在しない場合に`true`
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// シート名付きの表（ワークブックの1シートに相当）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    /// シート名
    pub name: String,
    /// 表データ
    pub table: Table,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}
