//! Repository for uploaded file and sheet metadata

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::sheets::types::{FileRecord, FileStatus, SheetRecord, StatsReport};

fn file_from_row(row: &SqliteRow) -> Result<FileRecord> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    Ok(FileRecord {
        id: Uuid::parse_str(&id).context("Malformed file id in database")?,
        original_name: row.try_get("original_name")?,
        storage_path: row.try_get("storage_path")?,
        file_size: row.try_get("file_size")?,
        uploaded_by: row.try_get("uploaded_by")?,
        uploaded_at: row.try_get::<DateTime<Utc>, _>("uploaded_at")?,
        sheet_count: row.try_get("sheet_count")?,
        row_count: row.try_get("row_count")?,
        cell_count: row.try_get("cell_count")?,
        status: FileStatus::from_str(&status),
    })
}

fn sheet_from_row(row: &SqliteRow) -> Result<SheetRecord> {
    let id: String = row.try_get("id")?;
    let file_id: String = row.try_get("file_id")?;
    let headers_json: String = row.try_get("headers")?;
    Ok(SheetRecord {
        id: Uuid::parse_str(&id).context("Malformed sheet id in database")?,
        file_id: Uuid::parse_str(&file_id).context("Malformed file id in database")?,
        name: row.try_get("name")?,
        sheet_index: row.try_get("sheet_index")?,
        row_count: row.try_get("row_count")?,
        column_count: row.try_get("column_count")?,
        headers: serde_json::from_str(&headers_json).context("Malformed header list in database")?,
    })
}

/// Get a file by id regardless of status
pub async fn get_file(pool: &SqlitePool, id: Uuid) -> Result<Option<FileRecord>> {
    let row = sqlx::query("SELECT * FROM files WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .context("Failed to get file")?;

    row.as_ref().map(file_from_row).transpose()
}

/// Get the sheets of a file in source order
pub async fn get_sheets(pool: &SqlitePool, file_id: Uuid) -> Result<Vec<SheetRecord>> {
    let rows = sqlx::query("SELECT * FROM sheets WHERE file_id = ? ORDER BY sheet_index")
        .bind(file_id.to_string())
        .fetch_all(pool)
        .await
        .context("Failed to get sheets")?;

    rows.iter().map(sheet_from_row).collect()
}

/// List active files, newest first, with total-count reporting
pub async fn list_files(
    pool: &SqlitePool,
    page: u32,
    page_size: u32,
) -> Result<(Vec<FileRecord>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE status = 'active'")
        .fetch_one(pool)
        .await
        .context("Failed to count files")?;

    let offset = (page as i64 - 1) * page_size as i64;
    let rows = sqlx::query(
        "SELECT * FROM files WHERE status = 'active'
         ORDER BY uploaded_at DESC, id
         LIMIT ? OFFSET ?",
    )
    .bind(page_size as i64)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list files")?;

    let files = rows.iter().map(file_from_row).collect::<Result<Vec<_>>>()?;
    Ok((files, total))
}

/// Flip a file to deleted and cascade over its dependent rows
///
/// The status flip and the sheet/cell deletes commit as one unit, so readers
/// never observe a half-removed file.
pub async fn soft_delete_cascade(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin delete transaction")?;
    let id_str = id.to_string();

    sqlx::query("UPDATE files SET status = 'deleted' WHERE id = ?")
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .context("Failed to mark file deleted")?;

    sqlx::query("DELETE FROM cells WHERE sheet_id IN (SELECT id FROM sheets WHERE file_id = ?)")
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .context("Failed to delete cells of file")?;

    sqlx::query("DELETE FROM sheets WHERE file_id = ?")
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .context("Failed to delete sheets of file")?;

    tx.commit().await.context("Failed to commit delete transaction")?;
    Ok(())
}

/// Live aggregate counts; no caching, every call hits the tables
pub async fn stats(pool: &SqlitePool) -> Result<StatsReport> {
    let total_files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
        .fetch_one(pool)
        .await
        .context("Failed to count files")?;

    let active_files: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE status = 'active'")
            .fetch_one(pool)
            .await
            .context("Failed to count active files")?;

    let total_sheets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sheets")
        .fetch_one(pool)
        .await
        .context("Failed to count sheets")?;

    let total_cells: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cells")
        .fetch_one(pool)
        .await
        .context("Failed to count cells")?;

    let total_storage_bytes: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(file_size), 0) FROM files WHERE status = 'active'",
    )
    .fetch_one(pool)
    .await
    .context("Failed to sum storage bytes")?;

    Ok(StatsReport {
        total_files,
        active_files,
        total_sheets,
        total_cells,
        total_storage_bytes,
    })
}
