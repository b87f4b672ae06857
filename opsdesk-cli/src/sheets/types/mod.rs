//! Core types for spreadsheet ingestion and search

mod document;
mod error;
mod records;
mod search;

pub use document::*;
pub use error::*;
pub use records::*;
pub use search::*;
