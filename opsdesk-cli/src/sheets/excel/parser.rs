//! Workbook parsing: raw xlsx bytes to an in-memory document tree
//!
//! The whole file is parsed before any persistence decision is made. Shape
//! limits are checked against the finished tree, so an oversized workbook is
//! rejected wholesale and nothing from it ever reaches the index.

use std::io::Cursor;

use anyhow::{Result, bail};
use calamine::{Data, Range, Reader, Xlsx};

use crate::sheets::excel::normalize::normalize_cell;
use crate::sheets::types::{IngestError, ParsedCell, ParsedRow, ParsedSheet, ParsedWorkbook};

/// Maximum number of sheets per workbook
pub const MAX_SHEETS: usize = 50;
/// Maximum number of retained (non-empty) cells per workbook
pub const MAX_CELLS: usize = 100_000;

/// Parse workbook bytes into a document tree, enforcing shape limits
pub fn parse_workbook(bytes: &[u8], original_name: &str) -> Result<ParsedWorkbook> {
    let mut workbook: Xlsx<_> = match Xlsx::new(Cursor::new(bytes)) {
        Ok(wb) => wb,
        Err(e) => bail!(IngestError::Validation(format!(
            "'{}' is not a readable workbook: {}",
            original_name, e
        ))),
    };

    let sheet_names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for (index, name) in sheet_names.iter().enumerate() {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => bail!(IngestError::Validation(format!(
                "failed to read sheet '{}' of '{}': {}",
                name, original_name, e
            ))),
        };
        sheets.push(parse_sheet(name, index as u32, &range));
    }

    let doc = ParsedWorkbook { sheets };

    // Limits are checked only after the full tree is built; a violation
    // rejects the whole upload, never a truncated document.
    if doc.sheets.len() > MAX_SHEETS {
        bail!(IngestError::Validation(format!(
            "workbook has {} sheets, maximum is {}",
            doc.sheets.len(),
            MAX_SHEETS
        )));
    }
    let total_cells = doc.total_cells();
    if total_cells > MAX_CELLS {
        bail!(IngestError::Validation(format!(
            "workbook has {} non-empty cells, maximum is {}",
            total_cells, MAX_CELLS
        )));
    }

    Ok(doc)
}

/// Parse one sheet: row 0 is the header, every later row keeps its one-based
/// source position and is retained only if it has a non-empty cell
fn parse_sheet(name: &str, index: u32, range: &Range<Data>) -> ParsedSheet {
    let mut rows_iter = range.rows();

    let mut headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let value = normalize_cell(cell);
                if value.is_empty() {
                    format!("Column_{}", col + 1)
                } else {
                    value
                }
            })
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut widest = headers.len();

    for (row_idx, raw_row) in rows_iter.enumerate() {
        let mut cells = Vec::new();
        for (col, raw) in raw_row.iter().enumerate() {
            let value = normalize_cell(raw);
            if !value.is_empty() {
                cells.push(ParsedCell {
                    column_index: col as u32,
                    value,
                });
            }
        }

        // Rows with no content are dropped entirely, not stored as
        // placeholders; later rows still keep their source position.
        if cells.is_empty() {
            continue;
        }

        if let Some(last) = cells.last() {
            widest = widest.max(last.column_index as usize + 1);
        }

        rows.push(ParsedRow {
            row_number: row_idx as u32 + 1,
            cells,
        });
    }

    // Data can be wider than the header row; pad with synthesized names so
    // every column has exactly one header.
    while headers.len() < widest {
        headers.push(format!("Column_{}", headers.len() + 1));
    }

    ParsedSheet {
        name: name.to_string(),
        index,
        headers,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut Workbook)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(&mut workbook);
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let err = parse_workbook(b"not a zip archive", "junk.xlsx").unwrap_err();
        let cat = err.downcast_ref::<IngestError>().unwrap();
        assert!(matches!(cat, IngestError::Validation(_)));
    }

    #[test]
    fn test_headers_and_rows() {
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.set_name("Servers").unwrap();
            ws.write_string(0, 0, "Name").unwrap();
            ws.write_string(0, 1, "IP").unwrap();
            ws.write_string(1, 0, "srv1").unwrap();
            ws.write_string(1, 1, "10.0.0.1").unwrap();
        });

        let doc = parse_workbook(&bytes, "servers.xlsx").unwrap();
        assert_eq!(doc.sheets.len(), 1);

        let sheet = &doc.sheets[0];
        assert_eq!(sheet.name, "Servers");
        assert_eq!(sheet.index, 0);
        assert_eq!(sheet.headers, vec!["Name", "IP"]);
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_number, 1);
        assert_eq!(sheet.rows[0].cells.len(), 2);
        assert_eq!(sheet.rows[0].cells[0].value, "srv1");
        assert_eq!(sheet.rows[0].cells[1].value, "10.0.0.1");
    }

    #[test]
    fn test_blank_header_is_synthesized() {
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "Name").unwrap();
            // column 1 header left blank
            ws.write_string(0, 2, "IP").unwrap();
            ws.write_string(1, 0, "srv1").unwrap();
            ws.write_string(1, 1, "rack4").unwrap();
            ws.write_string(1, 2, "10.0.0.1").unwrap();
        });

        let doc = parse_workbook(&bytes, "servers.xlsx").unwrap();
        let sheet = &doc.sheets[0];
        assert_eq!(sheet.headers, vec!["Name", "Column_2", "IP"]);
    }

    #[test]
    fn test_row_wider_than_header_pads_headers() {
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "Name").unwrap();
            ws.write_string(1, 0, "srv1").unwrap();
            ws.write_string(1, 2, "stray").unwrap();
        });

        let doc = parse_workbook(&bytes, "servers.xlsx").unwrap();
        let sheet = &doc.sheets[0];
        assert_eq!(sheet.headers, vec!["Name", "Column_2", "Column_3"]);
        assert_eq!(sheet.column_count(), 3);
        assert_eq!(sheet.header_for(2), "Column_3");
    }

    #[test]
    fn test_empty_rows_are_dropped_but_positions_kept() {
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "Name").unwrap();
            ws.write_string(1, 0, "first").unwrap();
            ws.write_string(2, 0, "   ").unwrap(); // whitespace only: dropped
            ws.write_string(3, 0, "fourth").unwrap();
        });

        let doc = parse_workbook(&bytes, "servers.xlsx").unwrap();
        let sheet = &doc.sheets[0];
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].row_number, 1);
        assert_eq!(sheet.rows[0].cells[0].value, "first");
        assert_eq!(sheet.rows[1].row_number, 3);
        assert_eq!(sheet.rows[1].cells[0].value, "fourth");
    }

    #[test]
    fn test_numbers_and_bools_normalize_through_parse() {
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "Count").unwrap();
            ws.write_string(0, 1, "Load").unwrap();
            ws.write_string(0, 2, "Up").unwrap();
            ws.write_number(1, 0, 42.0).unwrap();
            ws.write_number(1, 1, 0.5).unwrap();
            ws.write_boolean(1, 2, true).unwrap();
        });

        let doc = parse_workbook(&bytes, "metrics.xlsx").unwrap();
        let cells = &doc.sheets[0].rows[0].cells;
        assert_eq!(cells[0].value, "42");
        assert_eq!(cells[1].value, "0.5");
        assert_eq!(cells[2].value, "true");
    }

    #[test]
    fn test_datetime_cells_render_per_midnight_rule() {
        use rust_xlsxwriter::{ExcelDateTime, Format};

        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            let fmt = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
            ws.write_string(0, 0, "Installed").unwrap();
            ws.write_string(0, 1, "LastSeen").unwrap();
            let date = ExcelDateTime::from_ymd(2024, 3, 15).unwrap();
            let stamp = ExcelDateTime::from_ymd(2024, 3, 15)
                .unwrap()
                .and_hms(14, 30, 5)
                .unwrap();
            ws.write_datetime_with_format(1, 0, &date, &fmt).unwrap();
            ws.write_datetime_with_format(1, 1, &stamp, &fmt).unwrap();
        });

        let doc = parse_workbook(&bytes, "audit.xlsx").unwrap();
        let cells = &doc.sheets[0].rows[0].cells;
        assert_eq!(cells[0].value, "2024-03-15");
        assert_eq!(cells[1].value, "2024-03-15 14:30:05");
    }

    #[test]
    fn test_sheet_count_limit() {
        let bytes = workbook_bytes(|wb| {
            for i in 0..51 {
                let ws = wb.add_worksheet();
                ws.write_string(0, 0, format!("h{}", i)).unwrap();
            }
        });

        let err = parse_workbook(&bytes, "many.xlsx").unwrap_err();
        match err.downcast_ref::<IngestError>().unwrap() {
            IngestError::Validation(msg) => assert!(msg.contains("51 sheets")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_count_limit() {
        // 8 data rows x 13000 columns = 104000 cells, over the 100k cap
        let bytes = workbook_bytes(|wb| {
            let ws = wb.add_worksheet();
            for row in 0..9u32 {
                for col in 0..13000u16 {
                    ws.write_number(row, col, 1.0).unwrap();
                }
            }
        });

        let err = parse_workbook(&bytes, "huge.xlsx").unwrap_err();
        match err.downcast_ref::<IngestError>().unwrap() {
            IngestError::Validation(msg) => assert!(msg.contains("non-empty cells")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_sheet_with_no_rows_at_all() {
        let bytes = workbook_bytes(|wb| {
            wb.add_worksheet();
        });

        let doc = parse_workbook(&bytes, "empty.xlsx").unwrap();
        assert_eq!(doc.sheets.len(), 1);
        assert!(doc.sheets[0].headers.is_empty());
        assert!(doc.sheets[0].rows.is_empty());
        assert_eq!(doc.total_cells(), 0);
    }
}
