//! Spreadsheet ingestion and search subsystem
//!
//! Pipeline: uploaded bytes are parsed fully in memory, the original file is
//! persisted to the blob store, and the parsed tree is indexed into the
//! relational store as one unit of work. Search runs against the sparse
//! cell index and reconstructs full rows on demand.

pub mod blob;
pub mod excel;
pub mod indexer;
pub mod search;
pub mod service;
pub mod types;

pub use blob::BlobStore;
pub use excel::{normalize_cell, parse_workbook};
pub use service::{DeletionGate, RoleGate, SheetService};
pub use types::*;
