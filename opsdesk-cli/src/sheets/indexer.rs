//! Indexing: persist a parsed workbook as one unit of work
//!
//! Everything a workbook contributes (file row, sheet rows, cell rows) is
//! written inside a single transaction; readers see the whole file or none
//! of it. Cell inserts go out in fixed-size batches purely to bound buffer
//! growth on large workbooks.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::sheets::types::{FileRecord, FileStatus, ParsedWorkbook};

/// Cell rows buffered before each flush
pub const CELL_BATCH_SIZE: usize = 500;

struct PendingCell {
    id: String,
    sheet_id: String,
    row_number: i64,
    column_index: i64,
    column_header: String,
    value: String,
}

/// Persist a parsed workbook and return the created file record
pub async fn index_workbook(
    pool: &SqlitePool,
    doc: &ParsedWorkbook,
    original_name: &str,
    storage_path: &str,
    file_size: u64,
    uploaded_by: &str,
) -> Result<FileRecord> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin indexing transaction")?;

    let file = FileRecord {
        id: Uuid::new_v4(),
        original_name: original_name.to_string(),
        storage_path: storage_path.to_string(),
        file_size: file_size as i64,
        uploaded_by: uploaded_by.to_string(),
        uploaded_at: Utc::now(),
        sheet_count: doc.sheets.len() as i64,
        row_count: doc.total_rows() as i64,
        cell_count: doc.total_cells() as i64,
        status: FileStatus::Active,
    };

    sqlx::query(
        "INSERT INTO files (id, original_name, storage_path, file_size, uploaded_by,
                            uploaded_at, sheet_count, row_count, cell_count, status)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(file.id.to_string())
    .bind(&file.original_name)
    .bind(&file.storage_path)
    .bind(file.file_size)
    .bind(&file.uploaded_by)
    .bind(file.uploaded_at)
    .bind(file.sheet_count)
    .bind(file.row_count)
    .bind(file.cell_count)
    .bind(file.status.as_str())
    .execute(&mut *tx)
    .await
    .context("Failed to insert file record")?;

    let mut batch: Vec<PendingCell> = Vec::with_capacity(CELL_BATCH_SIZE);

    for sheet in &doc.sheets {
        let sheet_id = Uuid::new_v4();
        let headers_json =
            serde_json::to_string(&sheet.headers).context("Failed to serialize header list")?;

        sqlx::query(
            "INSERT INTO sheets (id, file_id, name, sheet_index, row_count, column_count, headers)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(sheet_id.to_string())
        .bind(file.id.to_string())
        .bind(&sheet.name)
        .bind(sheet.index as i64)
        .bind(sheet.rows.len() as i64)
        .bind(sheet.column_count() as i64)
        .bind(&headers_json)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert sheet '{}'", sheet.name))?;

        for row in &sheet.rows {
            for cell in &row.cells {
                batch.push(PendingCell {
                    id: Uuid::new_v4().to_string(),
                    sheet_id: sheet_id.to_string(),
                    row_number: row.row_number as i64,
                    column_index: cell.column_index as i64,
                    column_header: sheet.header_for(cell.column_index),
                    value: cell.value.clone(),
                });

                if batch.len() == CELL_BATCH_SIZE {
                    flush_cells(&mut tx, &mut batch).await?;
                }
            }
        }
    }

    flush_cells(&mut tx, &mut batch).await?;

    tx.commit()
        .await
        .context("Failed to commit indexing transaction")?;

    log::info!(
        "indexed '{}': {} sheets, {} rows, {} cells",
        original_name,
        file.sheet_count,
        file.row_count,
        file.cell_count
    );

    Ok(file)
}

/// Write the buffered cells as one multi-row insert and clear the buffer
///
/// The case-folded copy is derived from the display value here, at the only
/// place cell rows are ever written.
async fn flush_cells(tx: &mut Transaction<'_, Sqlite>, batch: &mut Vec<PendingCell>) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO cells (id, sheet_id, row_number, column_index, column_header, value, value_lower) ",
    );
    builder.push_values(batch.drain(..), |mut b, cell| {
        let value_lower = cell.value.to_lowercase();
        b.push_bind(cell.id)
            .push_bind(cell.sheet_id)
            .push_bind(cell.row_number)
            .push_bind(cell.column_index)
            .push_bind(cell.column_header)
            .push_bind(cell.value)
            .push_bind(value_lower);
    });

    builder
        .build()
        .execute(&mut **tx)
        .await
        .context("Failed to insert cell batch")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::schema::init_schema;
    use crate::sheets::excel::parse_workbook;
    use rust_xlsxwriter::Workbook;
    use sqlx::Row;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn inventory_bytes() -> Vec<u8> {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Servers").unwrap();
        ws.write_string(0, 0, "Name").unwrap();
        ws.write_string(0, 1, "IP").unwrap();
        ws.write_string(1, 0, "Alpha-Server").unwrap();
        ws.write_string(1, 1, "10.0.0.1").unwrap();
        ws.write_string(2, 0, "beta-server").unwrap();
        // IP intentionally blank on row 2: sparse index skips it
        wb.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn test_index_counts_and_sparseness() {
        let pool = test_pool().await;
        let doc = parse_workbook(&inventory_bytes(), "inv.xlsx").unwrap();

        let file = index_workbook(&pool, &doc, "inv.xlsx", "2024/01/x.xlsx", 321, "ops")
            .await
            .unwrap();

        assert_eq!(file.sheet_count, 1);
        assert_eq!(file.row_count, 2);
        assert_eq!(file.cell_count, 3);
        assert_eq!(file.status, FileStatus::Active);

        let cells: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cells")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cells, 3);
    }

    #[tokio::test]
    async fn test_value_lower_invariant_holds_for_every_cell() {
        let pool = test_pool().await;
        let doc = parse_workbook(&inventory_bytes(), "inv.xlsx").unwrap();
        index_workbook(&pool, &doc, "inv.xlsx", "2024/01/x.xlsx", 321, "ops")
            .await
            .unwrap();

        let rows = sqlx::query("SELECT value, value_lower FROM cells")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert!(!rows.is_empty());
        for row in rows {
            let value: String = row.try_get("value").unwrap();
            let lower: String = row.try_get("value_lower").unwrap();
            assert_eq!(lower, value.to_lowercase());
            assert!(!value.trim().is_empty());
        }
    }

    #[tokio::test]
    async fn test_cell_header_resolution() {
        let pool = test_pool().await;
        let doc = parse_workbook(&inventory_bytes(), "inv.xlsx").unwrap();
        index_workbook(&pool, &doc, "inv.xlsx", "2024/01/x.xlsx", 321, "ops")
            .await
            .unwrap();

        let header: String = sqlx::query_scalar(
            "SELECT column_header FROM cells WHERE value = '10.0.0.1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(header, "IP");
    }

    #[tokio::test]
    async fn test_batching_survives_more_than_one_flush() {
        // 2 columns x 301 data rows = 602 cells, crossing the 500 boundary
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.write_string(0, 0, "A").unwrap();
        ws.write_string(0, 1, "B").unwrap();
        for row in 1..=301u32 {
            ws.write_number(row, 0, row as f64).unwrap();
            ws.write_string(row, 1, format!("item{}", row)).unwrap();
        }
        let bytes = wb.save_to_buffer().unwrap();

        let pool = test_pool().await;
        let doc = parse_workbook(&bytes, "big.xlsx").unwrap();
        let file = index_workbook(&pool, &doc, "big.xlsx", "2024/01/big.xlsx", 1, "ops")
            .await
            .unwrap();

        assert_eq!(file.cell_count, 602);
        let cells: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cells")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(cells, 602);
    }

    #[tokio::test]
    async fn test_failed_indexing_leaves_nothing_behind() {
        let pool = test_pool().await;
        sqlx::query("DROP TABLE cells").execute(&pool).await.unwrap();

        let doc = parse_workbook(&inventory_bytes(), "inv.xlsx").unwrap();
        let result = index_workbook(&pool, &doc, "inv.xlsx", "2024/01/x.xlsx", 321, "ops").await;
        assert!(result.is_err());

        let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(files, 0);
    }
}
