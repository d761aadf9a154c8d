//! Spreadsheet Adapters
//!
//! ワークブックの読み込み（calamine）と書き出し（rust_xlsxwriter）を提供するモジュール。

mod reader;
mod writer;

pub(crate) use reader::WorkbookReader;
pub(crate) use writer::{numbered_sheet_names, WorkbookWriter, MAX_SHEET_NAME_CHARS};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SheetSelector;
    use crate::error::MdSheetError;
    use crate::table::{NamedTable, Table};
    use rust_xlsxwriter::{Format, Workbook};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn two_sheet_workbook() -> Vec<u8> {
        let mut first = Table::new(["Name", "Qty"]);
        first.push_row(row(&["apple", "3"]));
        first.push_row(row(&["pear", ""]));
        let mut second = Table::new(["Only"]);
        second.push_row(row(&["x"]));

        WorkbookWriter::new()
            .to_buffer(&[
                NamedTable::new("Fruits", first),
                NamedTable::new("Other", second),
            ])
            .unwrap()
    }

    #[test]
    fn test_write_then_read_all_sheets() {
        let mut reader = WorkbookReader::open(two_sheet_workbook()).unwrap();
        assert_eq!(reader.sheet_names(), vec!["Fruits", "Other"]);

        let tables = reader.read_tables(&SheetSelector::All).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "Fruits");
        assert_eq!(tables[0].table.columns(), &["Name", "Qty"]);
        assert_eq!(
            tables[0].table.rows(),
            &[row(&["apple", "3"]), row(&["pear", ""])]
        );
        assert_eq!(tables[1].table.rows(), &[row(&["x"])]);
    }

    #[test]
    fn test_select_by_name_and_index() {
        let mut reader = WorkbookReader::open(two_sheet_workbook()).unwrap();

        let tables = reader
            .read_tables(&SheetSelector::Name("Other".to_string()))
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Other");

        let tables = reader.read_tables(&SheetSelector::Index(0)).unwrap();
        assert_eq!(tables[0].name, "Fruits");
    }

    #[test]
    fn test_unknown_sheet_name() {
        let reader = WorkbookReader::open(two_sheet_workbook()).unwrap();
        match reader.select_sheets(&SheetSelector::Name("Missing".to_string())) {
            Err(MdSheetError::Config(msg)) => {
                assert!(msg.contains("Missing"));
                assert!(msg.contains("Fruits, Other"));
            }
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let reader = WorkbookReader::open(two_sheet_workbook()).unwrap();
        assert!(matches!(
            reader.select_sheets(&SheetSelector::Index(5)),
            Err(MdSheetError::Config(_))
        ));
    }

    #[test]
    fn test_numbers_blank_header_and_blank_rows() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Item").unwrap();
        // B1は空のまま
        worksheet.write_string(0, 2, "Price").unwrap();
        worksheet.write_string(1, 0, "tea").unwrap();
        worksheet.write_number(1, 1, 2.0).unwrap();
        worksheet.write_number(1, 2, 1.5).unwrap();
        // 3行目は空行
        worksheet.write_string(3, 0, "milk").unwrap();
        worksheet.write_boolean(3, 1, true).unwrap();
        let buffer = workbook.save_to_buffer().unwrap();

        let mut reader = WorkbookReader::open(buffer).unwrap();
        let tables = reader.read_tables(&SheetSelector::All).unwrap();
        let table = &tables[0].table;

        assert_eq!(table.columns(), &["Item", "Unnamed: 1", "Price"]);
        assert_eq!(
            table.rows(),
            &[row(&["tea", "2", "1.5"]), row(&["milk", "True", ""])]
        );
    }

    #[test]
    fn test_date_cell_beyond_excel_range() {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "When").unwrap();
        worksheet.write_number_with_format(1, 0, 45659.0, &date_format).unwrap();
        worksheet.write_number_with_format(2, 0, 1e15, &date_format).unwrap();
        let buffer = workbook.save_to_buffer().unwrap();

        let mut reader = WorkbookReader::open(buffer).unwrap();
        let tables = reader.read_tables(&SheetSelector::All).unwrap();
        assert_eq!(
            tables[0].table.rows(),
            &[row(&["2025-01-02 00:00:00"]), row(&["1000000000000000"])]
        );
    }

    #[test]
    fn test_empty_sheet() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let buffer = workbook.save_to_buffer().unwrap();

        let mut reader = WorkbookReader::open(buffer).unwrap();
        let tables = reader.read_tables(&SheetSelector::All).unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].table.is_empty());
    }

    #[test]
    fn test_open_invalid_data() {
        assert!(matches!(
            WorkbookReader::open(b"not a workbook".to_vec()),
            Err(MdSheetError::Spreadsheet(_))
        ));
    }
}
