//! Search command handler

use anyhow::Result;

use crate::cli::{OutputFormat, SearchArgs};
use crate::sheets::SheetService;
use crate::sheets::types::SearchQuery;

pub async fn handle_search(service: &SheetService, args: SearchArgs) -> Result<()> {
    let keywords: Vec<String> = args
        .keywords
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let query = SearchQuery {
        keywords,
        file_id: args.file_id,
        sheet_name: args.sheet,
        page: args.page,
        page_size: args.page_size,
    };

    let page = service.search(&query).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Table => {
            for hit in &page.matches {
                println!(
                    "{} / {} / row {} / {} = {}",
                    hit.file_name, hit.sheet_name, hit.row_number, hit.column_header, hit.cell_value
                );
                for cell in &hit.row_data {
                    let marker = if cell.is_matched_cell { ">" } else { " " };
                    println!("  {} {}: {}", marker, cell.column_header, cell.cell_value);
                }
            }
            println!(
                "{} match(es), page {} of {}",
                page.total,
                page.page,
                page.total_pages()
            );
        }
    }

    Ok(())
}
