//! Workbook Reader
//!
//! calamineを使用してワークブックの各シートを表として読み込む。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::Cursor;

use crate::api::SheetSelector;
use crate::error::{MdSheetError, Result};
use crate::formatter::CellFormatter;
use crate::table::{NamedTable, Table};

/// ワークブックリーダー
///
/// calamineのラッパーとして、シートの選択と表への変換を提供します。
/// XLSX / XLSM / XLSB / XLS / ODSの各形式を内容から自動判別します。
pub(crate) struct WorkbookReader {
    workbook: Sheets<Cursor<Vec<u8>>>,
    formatter: CellFormatter,
}

impl WorkbookReader {
    /// メモリ上のワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - ワークブックの読み込みに成功した場合
    /// * `Err(MdSheetError::Spreadsheet)` - 形式が不正、または破損している場合
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
        })
    }

    /// すべてのシート名をワークブックの順に取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト
    /// * `Err(MdSheetError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>> {
        let all_sheet_names = self.sheet_names();

        match selector {
            SheetSelector::All => Ok(all_sheet_names),

            SheetSelector::Index(index) => all_sheet_names
                .get(*index)
                .map(|name| vec![name.clone()])
                .ok_or_else(|| {
                    MdSheetError::Config(format!(
                        "Sheet index {} is out of range (total: {})",
                        index,
                        all_sheet_names.len()
                    ))
                }),

            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(MdSheetError::Config(format!(
                        "Sheet '{}' not found (available: {})",
                        name,
                        all_sheet_names.join(", ")
                    )));
                }
                Ok(vec![name.clone()])
            }
        }
    }

    /// 選択されたシートを順に読み込む
    pub fn read_tables(&mut self, selector: &SheetSelector) -> Result<Vec<NamedTable>> {
        let names = self.select_sheets(selector)?;
        names
            .into_iter()
            .map(|name| self.read_sheet(&name))
            .collect()
    }

    /// 1つのシートを表として読み込む
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<NamedTable> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        let table = self.range_to_table(&range);

        tracing::debug!(
            sheet = sheet_name,
            columns = table.column_count(),
            rows = table.row_count(),
            "read sheet"
        );

        Ok(NamedTable::new(sheet_name, table))
    }

    /// セル範囲を表に変換する
    ///
    /// 使用範囲の先頭行をヘッダーとし、空のヘッダーセルは`Unnamed: <列番号>`とします。
    /// すべてのセルが空の行はスキップします。
    fn range_to_table(&self, range: &Range<Data>) -> Table {
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Table::default();
        };

        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if self.formatter.is_blank(cell) {
                    format!("Unnamed: {}", idx)
                } else {
                    self.formatter.format_cell(cell)
                }
            })
            .collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        for row in rows {
            if row.iter().all(|cell| self.formatter.is_blank(cell)) {
                continue;
            }

            let mut cells: Vec<String> = row
                .iter()
                .map(|cell| self.formatter.format_cell(cell))
                .collect();
            cells.resize(width, String::new());
            table.push_row(cells);
        }

        table
    }
}
