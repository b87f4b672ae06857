//! Search query and result types

use serde::Serialize;
use uuid::Uuid;

/// Maximum number of keyword slots per query; callers needing more terms
/// narrow the scope with filters instead
pub const MAX_KEYWORDS: usize = 5;

/// A keyword search over the cell index
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// 1 to [`MAX_KEYWORDS`] keywords; a cell matches only if it contains
    /// every one of them (case-insensitive substring AND)
    pub keywords: Vec<String>,
    /// Restrict matches to one file
    pub file_id: Option<Uuid>,
    /// Restrict matches to sheets with this name (case-insensitive)
    pub sheet_name: Option<String>,
    /// One-based page number
    pub page: u32,
    /// Matches per page
    pub page_size: u32,
}

/// One cell within a reconstructed row
#[derive(Debug, Clone, Serialize)]
pub struct RowCell {
    pub column_header: String,
    pub column_index: i64,
    pub cell_value: String,
    /// True for exactly one cell per match: the one the keywords hit
    pub is_matched_cell: bool,
}

/// One matched cell with its full-row context
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub cell_id: Uuid,
    pub file_id: Uuid,
    pub file_name: String,
    pub sheet_id: Uuid,
    pub sheet_name: String,
    pub column_header: String,
    pub row_number: i64,
    pub column_index: i64,
    pub cell_value: String,
    /// All persisted cells of the matched (sheet, row), in column order
    pub row_data: Vec<RowCell>,
}

/// One page of search results with total-count reporting
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub matches: Vec<SearchMatch>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

impl SearchPage {
    /// Number of pages needed for the full result set
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size as i64 - 1) / self.page_size as i64
        }
    }
}
