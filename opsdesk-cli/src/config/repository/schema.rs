//! Schema bootstrap
//!
//! Every statement is idempotent; init runs unconditionally at startup.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS files (
        id TEXT PRIMARY KEY,
        original_name TEXT NOT NULL,
        storage_path TEXT NOT NULL,
        file_size INTEGER NOT NULL,
        uploaded_by TEXT NOT NULL,
        uploaded_at TEXT NOT NULL,
        sheet_count INTEGER NOT NULL,
        row_count INTEGER NOT NULL,
        cell_count INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active'
    )",
    "CREATE TABLE IF NOT EXISTS sheets (
        id TEXT PRIMARY KEY,
        file_id TEXT NOT NULL REFERENCES files(id),
        name TEXT NOT NULL,
        sheet_index INTEGER NOT NULL,
        row_count INTEGER NOT NULL,
        column_count INTEGER NOT NULL,
        headers TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS cells (
        id TEXT PRIMARY KEY,
        sheet_id TEXT NOT NULL REFERENCES sheets(id),
        row_number INTEGER NOT NULL,
        column_index INTEGER NOT NULL,
        column_header TEXT NOT NULL,
        value TEXT NOT NULL,
        value_lower TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_sheets_file ON sheets(file_id)",
    "CREATE INDEX IF NOT EXISTS idx_cells_sheet_row ON cells(sheet_id, row_number)",
    "CREATE INDEX IF NOT EXISTS idx_cells_value_lower ON cells(value_lower)",
];

/// Create tables and indexes if they do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply schema statement")?;
    }
    Ok(())
}
