//! Markdown Table Renderer
//!
//! 表データをMarkdownのパイプテーブル構文に変換する。

use crate::table::{NamedTable, Table};

/// 1つの表をMarkdownテーブルとして出力する
///
/// ヘッダー行、`---`の区切り行、データ行の順に出力します。
/// セルの内容はそのまま出力し、改行のみ`<br>`に置き換えます。
///
/// # 使用例
///
/// ```rust
/// use mdsheet::{render_table, Table};
///
/// let mut table = Table::new(["x_col", "y_col"]);
/// table.push_row(vec!["x".to_string(), "y".to_string()]);
///
/// assert_eq!(
///     render_table(&table),
///     "| x_col | y_col |\n| --- | --- |\n| x | y |\n"
/// );
/// ```
pub fn render_table(table: &Table) -> String {
    let mut out = String::new();
    write_table(&mut out, table);
    out
}

/// 複数のシートをMarkdownとして出力する
///
/// シートが2つ以上ある場合は、各表の前にシート名を`##`見出しとして出力します。
/// 各シートの後には空行を1行出力します。列または行のないシートは見出しのみになります。
pub fn render_sheets(sheets: &[NamedTable]) -> String {
    let mut out = String::new();
    let with_headings = sheets.len() > 1;

    for sheet in sheets {
        if with_headings {
            out.push_str("## ");
            out.push_str(&sheet.name);
            out.push_str("\n\n");
        }
        if !sheet.table.is_empty() {
            write_table(&mut out, &sheet.table);
        }
        out.push('\n');
    }

    out
}

fn write_table(out: &mut String, table: &Table) {
    write_row(out, table.columns());

    let separator = vec!["---"; table.column_count()];
    write_row(out, &separator);

    for row in table.rows() {
        write_row(out, row);
    }
}

fn write_row<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    out.push_str("| ");
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push_str(" | ");
        }
        out.push_str(&escape_line_breaks(cell.as_ref()));
    }
    out.push_str(" |\n");
}

/// 行がMarkdownテーブルの1行に収まるよう、改行を`<br>`に置き換える
fn escape_line_breaks(s: &str) -> String {
    s.replace("\r\n", "<br>")
        .replace('\n', "<br>")
        .replace('\r', "<br>")
}
