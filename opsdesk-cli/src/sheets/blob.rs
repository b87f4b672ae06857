//! Filesystem blob store for original upload bytes
//!
//! Content-oblivious byte storage: each stored file gets a collision-free
//! generated name under a year/month directory, and the path string is the
//! only key anything else ever holds. Deletion is idempotent and best-effort
//! so a missing or undeletable blob can never block a caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::sheets::types::IngestError;

/// Extension given to every stored blob
const BLOB_EXT: &str = "xlsx";

/// Stores, retrieves and deletes original file bytes under a base directory
#[derive(Debug, Clone)]
pub struct BlobStore {
    base: PathBuf,
}

impl BlobStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        BlobStore { base: base.into() }
    }

    /// Persist bytes under `<base>/<year>/<month>/<token>.xlsx` and return
    /// the path relative to the base directory
    pub fn store(&self, bytes: &[u8], original_name: &str) -> Result<String> {
        let now = Utc::now();
        let subdir = format!("{}/{:02}", now.year(), now.month());
        let dir = self.base.join(&subdir);

        if let Err(e) = fs::create_dir_all(&dir) {
            bail!(IngestError::Storage(format!(
                "failed to create blob directory {}: {}",
                dir.display(),
                e
            )));
        }

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), BLOB_EXT);
        let path = dir.join(&file_name);

        if let Err(e) = fs::write(&path, bytes) {
            bail!(IngestError::Storage(format!(
                "failed to write blob for '{}' at {}: {}",
                original_name,
                path.display(),
                e
            )));
        }

        log::debug!("stored {} byte blob for '{}' at {}", bytes.len(), original_name, subdir);
        Ok(format!("{}/{}", subdir, file_name))
    }

    /// Delete a stored blob; a missing file logs a warning and nothing here
    /// ever raises. Empty year/month parents are pruned best-effort.
    pub fn delete(&self, path: &str) {
        let full = self.base.join(path);

        match fs::remove_file(&full) {
            Ok(()) => log::debug!("deleted blob {}", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("blob {} already missing on delete", path);
            }
            Err(e) => {
                log::warn!("failed to delete blob {}: {}", path, e);
            }
        }

        // remove_dir refuses non-empty directories, which is exactly the
        // best-effort pruning wanted here
        if let Some(month_dir) = full.parent() {
            prune_dir(month_dir);
            if let Some(year_dir) = month_dir.parent() {
                if year_dir != self.base {
                    prune_dir(year_dir);
                }
            }
        }
    }

    /// Whether a stored blob still exists
    pub fn exists(&self, path: &str) -> bool {
        self.base.join(path).is_file()
    }

    /// Size in bytes of a stored blob
    pub fn size(&self, path: &str) -> Result<u64> {
        match fs::metadata(self.base.join(path)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                bail!(IngestError::NotFound(format!("blob {}", path)))
            }
            Err(e) => bail!(IngestError::Storage(format!(
                "failed to stat blob {}: {}",
                path, e
            ))),
        }
    }
}

fn prune_dir(dir: &Path) {
    if let Err(e) = fs::remove_dir(dir) {
        log::debug!("left blob directory {} in place: {}", dir.display(), e);
    }
}
