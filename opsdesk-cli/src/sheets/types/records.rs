//! Persisted records and role types
//!
//! Ownership is strictly tree-shaped: a file owns its sheets, a sheet owns
//! its cells. The only mutation a file ever sees after creation is the
//! status flip to `Deleted`; sheets and cells are immutable once indexed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Active,
    Deleted,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Active => "active",
            FileStatus::Deleted => "deleted",
        }
    }

    /// Parse a status column value; unknown values are treated as deleted
    /// so a corrupt row can never become searchable
    pub fn from_str(s: &str) -> Self {
        match s {
            "active" => FileStatus::Active,
            _ => FileStatus::Deleted,
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One uploaded spreadsheet file
///
/// Counters are write-once at creation, taken from the parsed document tree;
/// they are never recomputed incrementally.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub original_name: String,
    pub storage_path: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub sheet_count: i64,
    pub row_count: i64,
    pub cell_count: i64,
    pub status: FileStatus,
}

/// One sheet (tab) within an uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct SheetRecord {
    pub id: Uuid,
    pub file_id: Uuid,
    pub name: String,
    pub sheet_index: i64,
    pub row_count: i64,
    pub column_count: i64,
    pub headers: Vec<String>,
}

/// File summary plus its sheet metadata, as returned by the info operation
#[derive(Debug, Clone, Serialize)]
pub struct FileDetails {
    #[serde(flatten)]
    pub file: FileRecord,
    pub sheets: Vec<SheetRecord>,
}

/// Live aggregate counts over the whole index
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_files: i64,
    pub active_files: i64,
    pub total_sheets: i64,
    pub total_cells: i64,
    pub total_storage_bytes: i64,
}

/// Caller role, threaded explicitly into every operation that needs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "operator" => Ok(Role::Operator),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!(
                "unknown role '{}', expected admin, operator or viewer",
                other
            )),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Operator => write!(f, "operator"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(FileStatus::from_str("active"), FileStatus::Active);
        assert_eq!(FileStatus::from_str("deleted"), FileStatus::Deleted);
        assert_eq!(FileStatus::Active.as_str(), "active");
    }

    #[test]
    fn test_unknown_status_is_deleted() {
        assert_eq!(FileStatus::from_str("garbage"), FileStatus::Deleted);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("Operator").unwrap(), Role::Operator);
        assert!(Role::from_str("root").is_err());
    }
}
