//! Keyword search over the cell index with full-row reconstruction
//!
//! A cell matches when its case-folded value contains every keyword as a
//! substring. Matches come back in (sheet, row, column) order with the whole
//! row attached, so callers get context without a second round trip.

use anyhow::{Context, Result, bail};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::sheets::types::{
    IngestError, MAX_KEYWORDS, RowCell, SearchMatch, SearchPage, SearchQuery,
};

/// Largest allowed page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Run a search and reconstruct the full row for every match
pub async fn search(pool: &SqlitePool, query: &SearchQuery) -> Result<SearchPage> {
    let keywords = fold_keywords(&query.keywords)?;

    if query.page < 1 {
        bail!(IngestError::Validation("page must be at least 1".to_string()));
    }
    if query.page_size < 1 || query.page_size > MAX_PAGE_SIZE {
        bail!(IngestError::Validation(format!(
            "page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let mut count_builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*)");
    push_match_clauses(&mut count_builder, &keywords, query);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .context("Failed to count matches")?;

    let mut select_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT c.id AS cell_id, c.row_number, c.column_index, c.column_header, c.value,
                s.id AS sheet_id, s.name AS sheet_name, f.id AS file_id,
                f.original_name AS file_name",
    );
    push_match_clauses(&mut select_builder, &keywords, query);
    select_builder.push(" ORDER BY s.id, c.row_number, c.column_index LIMIT ");
    select_builder.push_bind(query.page_size as i64);
    select_builder.push(" OFFSET ");
    select_builder.push_bind((query.page as i64 - 1) * query.page_size as i64);

    let rows = select_builder
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to fetch matches")?;

    let mut matches = Vec::with_capacity(rows.len());
    for row in &rows {
        let hit = match_from_row(row)?;
        let row_data = reconstruct_row(pool, hit.sheet_id, hit.row_number, hit.cell_id).await?;
        matches.push(SearchMatch { row_data, ..hit });
    }

    Ok(SearchPage {
        matches,
        page: query.page,
        page_size: query.page_size,
        total,
    })
}

/// Fetch every persisted cell of one (sheet, row) in column order, flagging
/// the matched cell
async fn reconstruct_row(
    pool: &SqlitePool,
    sheet_id: Uuid,
    row_number: i64,
    matched_cell: Uuid,
) -> Result<Vec<RowCell>> {
    let rows = sqlx::query(
        "SELECT id, column_header, column_index, value
         FROM cells
         WHERE sheet_id = ? AND row_number = ?
         ORDER BY column_index",
    )
    .bind(sheet_id.to_string())
    .bind(row_number)
    .fetch_all(pool)
    .await
    .context("Failed to reconstruct row")?;

    let matched_id = matched_cell.to_string();
    let mut cells = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        cells.push(RowCell {
            column_header: row.try_get("column_header")?,
            column_index: row.try_get("column_index")?,
            cell_value: row.try_get("value")?,
            is_matched_cell: id == matched_id,
        });
    }
    Ok(cells)
}

/// Shared FROM/WHERE section of the count and select queries
fn push_match_clauses(
    builder: &mut QueryBuilder<Sqlite>,
    keywords: &[String],
    query: &SearchQuery,
) {
    builder.push(
        " FROM cells c
          JOIN sheets s ON s.id = c.sheet_id
          JOIN files f ON f.id = s.file_id
          WHERE f.status = 'active'",
    );

    for keyword in keywords {
        builder.push(" AND c.value_lower LIKE ");
        builder.push_bind(format!("%{}%", escape_like(keyword)));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(file_id) = query.file_id {
        builder.push(" AND f.id = ");
        builder.push_bind(file_id.to_string());
    }

    if let Some(sheet_name) = &query.sheet_name {
        builder.push(" AND lower(s.name) = ");
        builder.push_bind(sheet_name.to_lowercase());
    }
}

fn match_from_row(row: &SqliteRow) -> Result<SearchMatch> {
    let cell_id: String = row.try_get("cell_id")?;
    let sheet_id: String = row.try_get("sheet_id")?;
    let file_id: String = row.try_get("file_id")?;
    Ok(SearchMatch {
        cell_id: Uuid::parse_str(&cell_id).context("Malformed cell id in database")?,
        file_id: Uuid::parse_str(&file_id).context("Malformed file id in database")?,
        file_name: row.try_get("file_name")?,
        sheet_id: Uuid::parse_str(&sheet_id).context("Malformed sheet id in database")?,
        sheet_name: row.try_get("sheet_name")?,
        column_header: row.try_get("column_header")?,
        row_number: row.try_get("row_number")?,
        column_index: row.try_get("column_index")?,
        cell_value: row.try_get("value")?,
        row_data: Vec::new(),
    })
}

/// Case-fold and bound the keyword list: 1 to [`MAX_KEYWORDS`] non-blank
/// entries
fn fold_keywords(raw: &[String]) -> Result<Vec<String>> {
    let keywords: Vec<String> = raw
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        bail!(IngestError::Validation(
            "at least one search keyword is required".to_string()
        ));
    }
    if keywords.len() > MAX_KEYWORDS {
        bail!(IngestError::Validation(format!(
            "at most {} keywords are supported, got {}; narrow the scope instead",
            MAX_KEYWORDS,
            keywords.len()
        )));
    }

    Ok(keywords)
}

/// Escape LIKE wildcards so keywords match literally
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
