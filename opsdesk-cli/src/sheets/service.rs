//! Ingestion orchestration: upload, lookup, deletion and stats
//!
//! Upload is a manual two-phase write: blob first, index second, with a
//! compensating blob delete when indexing fails. The two stores are never
//! pretended to be atomic with each other.

use std::path::Path;

use anyhow::{Result, anyhow, bail};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::repository::files;
use crate::sheets::blob::BlobStore;
use crate::sheets::excel::parse_workbook;
use crate::sheets::indexer;
use crate::sheets::search;
use crate::sheets::types::{
    FileDetails, FileRecord, FileStatus, IngestError, Role, SearchPage, SearchQuery, StatsReport,
};

/// Content types accepted as declaring an xlsx upload
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Decides whether a requester may delete a file
///
/// Implemented outside the pipeline; the orchestrator only consumes the
/// verdict.
pub trait DeletionGate: Send + Sync {
    fn can_delete(&self, file: &FileRecord, requester: &str, roles: &[Role]) -> bool;
}

/// Standard gate: admins always may, operators only for their own uploads
pub struct RoleGate;

impl DeletionGate for RoleGate {
    fn can_delete(&self, file: &FileRecord, requester: &str, roles: &[Role]) -> bool {
        if roles.contains(&Role::Admin) {
            return true;
        }
        if roles.contains(&Role::Operator) {
            return file.uploaded_by == requester;
        }
        false
    }
}

/// Orchestrates the parse -> store -> index pipeline and the read side
pub struct SheetService {
    pool: SqlitePool,
    blob: BlobStore,
    max_upload_bytes: u64,
    gate: Box<dyn DeletionGate>,
}

impl SheetService {
    /// The gate is injected rather than looked up anywhere ambient; hosts
    /// with their own role model pass their own implementation.
    pub fn new(
        pool: SqlitePool,
        blob: BlobStore,
        max_upload_bytes: u64,
        gate: Box<dyn DeletionGate>,
    ) -> Self {
        SheetService {
            pool,
            blob,
            max_upload_bytes,
            gate,
        }
    }

    /// Actual on-disk size of a file's stored blob, `None` when missing
    pub fn stored_blob_size(&self, file: &FileRecord) -> Option<u64> {
        if !self.blob.exists(&file.storage_path) {
            return None;
        }
        self.blob.size(&file.storage_path).ok()
    }

    /// Validate, parse, store and index one uploaded workbook
    pub async fn upload(
        &self,
        bytes: &[u8],
        original_name: &str,
        content_type: Option<&str>,
        uploaded_by: &str,
    ) -> Result<FileRecord> {
        self.validate_upload(bytes, original_name, content_type)?;

        // parse fully in memory before a single byte is persisted
        let doc = parse_workbook(bytes, original_name)?;

        let storage_path = self.blob.store(bytes, original_name)?;

        match indexer::index_workbook(
            &self.pool,
            &doc,
            original_name,
            &storage_path,
            bytes.len() as u64,
            uploaded_by,
        )
        .await
        {
            Ok(file) => Ok(file),
            Err(e) => {
                // compensation: the blob was written outside the index
                // transaction and must not outlive the failed upload
                log::warn!(
                    "indexing '{}' failed, removing blob {}",
                    original_name,
                    storage_path
                );
                self.blob.delete(&storage_path);
                Err(e.context(IngestError::Index(format!(
                    "failed to index '{}'",
                    original_name
                ))))
            }
        }
    }

    /// File summary plus sheet metadata; deleted files read as absent
    pub async fn file_details(&self, id: Uuid) -> Result<FileDetails> {
        let file = self.get_active_file(id).await?;
        let sheets = files::get_sheets(&self.pool, id).await?;
        Ok(FileDetails { file, sheets })
    }

    /// Page of active files, newest first
    pub async fn list_files(&self, page: u32, page_size: u32) -> Result<(Vec<FileRecord>, i64)> {
        if page < 1 {
            bail!(IngestError::Validation("page must be at least 1".to_string()));
        }
        if page_size < 1 || page_size > search::MAX_PAGE_SIZE {
            bail!(IngestError::Validation(format!(
                "page size must be between 1 and {}",
                search::MAX_PAGE_SIZE
            )));
        }
        files::list_files(&self.pool, page, page_size).await
    }

    /// Keyword search over the cell index
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        search::search(&self.pool, query).await
    }

    /// Soft-delete a file after the ownership gate allows it
    ///
    /// The status flip and the blob removal are deliberately not atomic; a
    /// blob that cannot be removed is logged and left for manual cleanup.
    pub async fn delete(&self, id: Uuid, requester: &str, roles: &[Role]) -> Result<()> {
        let file = self.get_active_file(id).await?;

        if !self.gate.can_delete(&file, requester, roles) {
            bail!(IngestError::PermissionDenied(format!(
                "'{}' may not delete file {}",
                requester, id
            )));
        }

        files::soft_delete_cascade(&self.pool, id).await?;
        self.blob.delete(&file.storage_path);

        log::info!("deleted file {} ('{}')", id, file.original_name);
        Ok(())
    }

    /// Live aggregate counts
    pub async fn stats(&self) -> Result<StatsReport> {
        files::stats(&self.pool).await
    }

    async fn get_active_file(&self, id: Uuid) -> Result<FileRecord> {
        let file = files::get_file(&self.pool, id)
            .await?
            .ok_or_else(|| anyhow!(IngestError::NotFound(format!("file {}", id))))?;

        if file.status == FileStatus::Deleted {
            bail!(IngestError::NotFound(format!("file {} is deleted", id)));
        }

        Ok(file)
    }

    fn validate_upload(
        &self,
        bytes: &[u8],
        original_name: &str,
        content_type: Option<&str>,
    ) -> Result<()> {
        if bytes.is_empty() {
            bail!(IngestError::Validation("uploaded file is empty".to_string()));
        }

        if bytes.len() as u64 > self.max_upload_bytes {
            bail!(IngestError::Validation(format!(
                "file is {} bytes, ceiling is {}",
                bytes.len(),
                self.max_upload_bytes
            )));
        }

        let extension_ok = Path::new(original_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        let content_type_ok = content_type
            .map(|ct| ALLOWED_CONTENT_TYPES.contains(&ct))
            .unwrap_or(false);

        // rejected only when neither signal indicates a spreadsheet
        if !extension_ok && !content_type_ok {
            bail!(IngestError::Validation(format!(
                "'{}' does not look like an xlsx spreadsheet",
                original_name
            )));
        }

        Ok(())
    }
}
