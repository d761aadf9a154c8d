//! Workbook Writer
//!
//! rust_xlsxwriterを使用して表をXLSXワークブックに書き出す。

use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, XlsxError};
use std::path::Path;

use crate::error::{MdSheetError, Result};
use crate::table::{NamedTable, Table};

/// ワークブックライター
///
/// 1つの表を1つのシートとして書き出します。ヘッダー行は太字・罫線付き、
/// セルはすべて文字列として書き込みます。
#[derive(Debug)]
pub(crate) struct WorkbookWriter {
    header_format: Format,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            header_format: Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center),
        }
    }

    /// ワークブックをファイルに保存する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 保存に成功した場合
    /// * `Err(MdSheetError::Write)` - シート名が不正、または書き込みに失敗した場合
    pub fn save(&self, sheets: &[NamedTable], path: &Path) -> Result<()> {
        let mut workbook = self
            .build(sheets)
            .map_err(|e| MdSheetError::write(path, e))?;
        workbook
            .save(path)
            .map_err(|e| MdSheetError::write(path, e))
    }

    /// ワークブックをメモリ上のバイト列として生成する
    pub fn to_buffer(&self, sheets: &[NamedTable]) -> std::result::Result<Vec<u8>, XlsxError> {
        let mut workbook = self.build(sheets)?;
        workbook.save_to_buffer()
    }

    fn build(&self, sheets: &[NamedTable]) -> std::result::Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();

        for sheet in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            self.write_table(worksheet, &sheet.table)?;
        }

        Ok(workbook)
    }

    fn write_table(
        &self,
        worksheet: &mut rust_xlsxwriter::Worksheet,
        table: &Table,
    ) -> std::result::Result<(), XlsxError> {
        for (col_idx, name) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, col_num(col_idx), name, &self.header_format)?;
        }

        for (row_idx, row) in table.rows().iter().enumerate() {
            let row_num = row_num(row_idx + 1);
            for (col_idx, cell) in row.iter().enumerate() {
                // 空セルは書き込まない
                if cell.is_empty() {
                    continue;
                }
                worksheet.write_string(row_num, col_num(col_idx), cell)?;
            }
        }

        Ok(())
    }
}

// 範囲外の値は上限に丸め、rust_xlsxwriterの行・列数チェックでエラーにする
fn row_num(idx: usize) -> RowNum {
    RowNum::try_from(idx).unwrap_or(RowNum::MAX)
}

fn col_num(idx: usize) -> ColNum {
    ColNum::try_from(idx).unwrap_or(ColNum::MAX)
}

/// Excelのシート名の最大文字数
pub(crate) const MAX_SHEET_NAME_CHARS: usize = 31;

/// 複数の表に割り当てるシート名を生成する
///
/// 1つ目は`base`、2つ目以降は`<base>_2`、`<base>_3`、… となります。
/// 番号付きの名前が31文字を超える場合は、`base`の末尾を文字単位で切り詰めます。
pub(crate) fn numbered_sheet_names(base: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| {
            if idx == 0 {
                return base.to_string();
            }
            let suffix = format!("_{}", idx + 1);
            let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            let head: String = base.chars().take(keep).collect();
            head + &suffix
        })
        .collect()
}
