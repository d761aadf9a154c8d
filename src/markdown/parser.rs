//! Markdown Table Parser
//!
//! Markdownテキストからパイプテーブルを抽出する行スキャナー。

use crate::table::Table;

/// Markdownテキストに含まれるすべての表を抽出する
///
/// 連続する表の行（前後の空白を除いて`|`で始まる行）を1つのブロックとして集め、
/// 表以外の行または入力の終端でブロックを閉じて解析します。
/// 解析に成功したブロックのみを文書順に返します。
///
/// # 使用例
///
/// ```rust
/// use mdsheet::extract_tables;
///
/// let tables = extract_tables("| A | B |\n|---|---|\n| 1 | 2 |");
/// assert_eq!(tables.len(), 1);
/// assert_eq!(tables[0].columns(), &["A", "B"]);
/// assert_eq!(tables[0].rows(), &[vec!["1".to_string(), "2".to_string()]]);
/// ```
pub fn extract_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 0;

    for (line_no, line) in text.split('\n').enumerate() {
        let line = line.trim_end();

        if is_table_line(line) {
            if block.is_empty() {
                block_start = line_no + 1;
            }
            block.push(line);
        } else if !block.is_empty() {
            close_block(&block, block_start, &mut tables);
            block.clear();
        }
    }

    if !block.is_empty() {
        close_block(&block, block_start, &mut tables);
    }

    tables
}

fn close_block(block: &[&str], start_line: usize, tables: &mut Vec<Table>) {
    match parse_block(block, start_line) {
        Some(table) => tables.push(table),
        None => tracing::debug!(line = start_line, lines = block.len(), "ignoring table block"),
    }
}

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// 行を`|`で分割し、外側のパイプが作る先頭と末尾のフィールドを除いて返す
fn split_cells(line: &str) -> Vec<&str> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 2 {
        return Vec::new();
    }
    fields[1..fields.len() - 1].to_vec()
}

fn trimmed_cells(line: &str) -> Vec<String> {
    split_cells(line)
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// 区切り行（`|---|:---:|`）かどうかを判定
///
/// すべてのフィールドが空でなく、空白・`:`・`-`のみで構成されている必要があります。
fn is_separator_line(line: &str) -> bool {
    let cells = split_cells(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            !cell.is_empty()
                && cell
                    .chars()
                    .all(|c| c.is_whitespace() || c == ':' || c == '-')
        })
}

/// 1つのブロックを表に変換する
///
/// # 戻り値
///
/// * `Some(Table)` - 2行以上あり、ヘッダーに列が存在する場合
/// * `None` - 1行のみのブロック、または列のないヘッダーの場合
fn parse_block(lines: &[&str], start_line: usize) -> Option<Table> {
    if lines.len() < 2 {
        return None;
    }

    let columns = trimmed_cells(lines[0]);
    if columns.is_empty() {
        return None;
    }

    let data_start = if is_separator_line(lines[1]) { 2 } else { 1 };
    let mut table = Table::new(columns);

    for (offset, line) in lines.iter().enumerate().skip(data_start) {
        if line.trim().is_empty() || !line.contains('|') {
            continue;
        }

        let cells = trimmed_cells(line);
        let found = cells.len();
        if !table.push_row(cells) {
            tracing::debug!(
                line = start_line + offset,
                expected = table.column_count(),
                found,
                "dropping row with mismatched cell count"
            );
        }
    }

    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_extract_simple_table() {
        let tables = extract_tables("| A | B |\n|---|---|\n| 1 | 2 |");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns(), &["A", "B"]);
        assert_eq!(tables[0].rows(), &[row(&["1", "2"])]);
    }

    #[test]
    fn test_extract_multiple_tables_in_order() {
        let text = "# Title\n\
                    | A | B |\n\
                    |---|---|\n\
                    | 1 | 2 |\n\
                    \n\
                    Some paragraph.\n\
                    | X |\n\
                    |---|\n\
                    | y |\n\
                    | z |\n\
                    trailing text\n\
                    | P | Q | R |\n\
                    | :--- | :---: | ---: |\n\
                    | a | b | c |";
        let tables = extract_tables(text);

        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].columns(), &["A", "B"]);
        assert_eq!(tables[1].columns(), &["X"]);
        assert_eq!(tables[1].rows(), &[row(&["y"]), row(&["z"])]);
        assert_eq!(tables[2].columns(), &["P", "Q", "R"]);
        assert_eq!(tables[2].rows(), &[row(&["a", "b", "c"])]);
    }

    #[test]
    fn test_mismatched_rows_are_dropped() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |\n| only |\n| 3 | 4 | 5 |\n| 6 | 7 |";
        let tables = extract_tables(text);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows(), &[row(&["1", "2"]), row(&["6", "7"])]);
    }

    #[test]
    fn test_single_line_block_yields_nothing() {
        assert!(extract_tables("| A | B |").is_empty());
        assert!(extract_tables("text\n| A | B |\nmore text").is_empty());
    }

    #[test]
    fn test_header_only_with_separator_yields_empty_table() {
        let tables = extract_tables("| A | B |\n|---|---|");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns(), &["A", "B"]);
        assert_eq!(tables[0].row_count(), 0);
    }

    #[test]
    fn test_missing_separator_treats_second_line_as_data() {
        let tables = extract_tables("| A | B |\n| 1 | 2 |\n| 3 | 4 |");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows(), &[row(&["1", "2"]), row(&["3", "4"])]);
    }

    #[test]
    fn test_empty_header_yields_nothing() {
        // "|" は分割後にフィールドが1つしかなく、列が存在しない
        assert!(extract_tables("|\n|---|").is_empty());
    }

    #[test]
    fn test_indented_and_crlf_lines() {
        let text = "   | A | B |  \r\n  |---|---|\r\n  | 1 | 2 |\r\n";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns(), &["A", "B"]);
        assert_eq!(tables[0].rows(), &[row(&["1", "2"])]);
    }

    #[test]
    fn test_empty_cells_are_kept() {
        let tables = extract_tables("| A | B |\n| --- | --- |\n|  | x |");
        assert_eq!(tables[0].rows(), &[row(&["", "x"])]);
    }

    #[test]
    fn test_missing_trailing_pipe_drops_last_field() {
        // 末尾のパイプがない行は最後のフィールドが欠落し、列数が合わなくなる
        let tables = extract_tables("| A | B |\n|---|---|\n| 1 | 2");
        assert_eq!(tables[0].row_count(), 0);
    }

    #[test]
    fn test_is_separator_line() {
        assert!(is_separator_line("|---|---|"));
        assert!(is_separator_line("| :--- | ---: |"));
        assert!(is_separator_line("|---|"));
        assert!(is_separator_line("|   |   |"));
        assert!(!is_separator_line("| --- | abc |"));
        assert!(!is_separator_line("|||"));
        assert!(!is_separator_line("| 1 | 2 |"));
    }

    #[test]
    fn test_blank_lines_split_blocks() {
        let text = "| A |\n|---|\n| 1 |\n\n| A |\n|---|\n| 2 |";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].rows(), &[row(&["2"])]);
    }
}
