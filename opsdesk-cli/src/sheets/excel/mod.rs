//! Workbook parsing and cell normalization

pub mod normalize;
pub mod parser;

pub use normalize::normalize_cell;
pub use parser::{MAX_CELLS, MAX_SHEETS, parse_workbook};
