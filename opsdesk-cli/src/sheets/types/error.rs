//! Error taxonomy for the ingestion and search pipeline
//!
//! Errors travel inside `anyhow::Error`; callers that need to distinguish
//! categories (the CLI, tests) downcast to `IngestError`.

/// Category of a pipeline failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Rejected input: empty/oversized upload, wrong file type, parse
    /// failure, or a post-parse shape-limit violation. Nothing persisted.
    Validation(String),
    /// Unknown or soft-deleted file/sheet/blob
    NotFound(String),
    /// Ownership/role gate denied the operation
    PermissionDenied(String),
    /// Blob read/write I/O failure
    Storage(String),
    /// Persistence failure during indexing
    Index(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Validation(msg) => write!(f, "validation failed: {}", msg),
            IngestError::NotFound(msg) => write!(f, "not found: {}", msg),
            IngestError::PermissionDenied(msg) => write!(f, "permission denied: {}", msg),
            IngestError::Storage(msg) => write!(f, "storage failure: {}", msg),
            IngestError::Index(msg) => write!(f, "indexing failure: {}", msg),
        }
    }
}

impl std::error::Error for IngestError {}

impl IngestError {
    /// Short machine-readable tag, used by the CLI for exit reporting
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Validation(_) => "validation",
            IngestError::NotFound(_) => "not_found",
            IngestError::PermissionDenied(_) => "permission_denied",
            IngestError::Storage(_) => "storage",
            IngestError::Index(_) => "index",
        }
    }
}
