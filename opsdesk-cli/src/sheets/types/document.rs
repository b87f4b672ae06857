//! In-memory document tree produced by the workbook parser
//!
//! Nothing here touches persistence: the parser builds the full tree first,
//! shape limits are checked against it, and only then does the indexer write
//! anything.

/// A fully parsed workbook, ready for indexing
#[derive(Debug, Clone)]
pub struct ParsedWorkbook {
    /// Sheets in source order
    pub sheets: Vec<ParsedSheet>,
}

impl ParsedWorkbook {
    /// Total retained (non-empty) rows across all sheets
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }

    /// Total retained (non-empty) cells across all sheets
    pub fn total_cells(&self) -> usize {
        self.sheets
            .iter()
            .flat_map(|s| s.rows.iter())
            .map(|r| r.cells.len())
            .sum()
    }
}

/// One parsed sheet (tab) within a workbook
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    /// Sheet name as it appears in the workbook
    pub name: String,
    /// Zero-based position within the workbook
    pub index: u32,
    /// One header per column; blanks synthesized as "Column_N" (1-based)
    pub headers: Vec<String>,
    /// Retained data rows (rows with at least one non-empty cell)
    pub rows: Vec<ParsedRow>,
}

impl ParsedSheet {
    /// Number of columns, always equal to `headers.len()`
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Header name for a column, synthesized when the row is wider than
    /// the header list
    pub fn header_for(&self, column_index: u32) -> String {
        self.headers
            .get(column_index as usize)
            .cloned()
            .unwrap_or_else(|| format!("Column_{}", column_index + 1))
    }
}

/// One retained data row
#[derive(Debug, Clone)]
pub struct ParsedRow {
    /// One-based row number; the header row is row 0 and is never stored
    pub row_number: u32,
    /// Non-empty cells only, in column order
    pub cells: Vec<ParsedCell>,
}

/// One non-empty cell within a retained row
#[derive(Debug, Clone)]
pub struct ParsedCell {
    /// Zero-based column index
    pub column_index: u32,
    /// Normalized display value, non-empty after trimming
    pub value: String,
}
