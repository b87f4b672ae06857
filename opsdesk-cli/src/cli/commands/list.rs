//! List command handler

use anyhow::Result;
use serde_json::json;

use crate::cli::{ListArgs, OutputFormat};
use crate::sheets::SheetService;

pub async fn handle_list(service: &SheetService, args: ListArgs) -> Result<()> {
    let (files, total) = service.list_files(args.page, args.page_size).await?;

    match args.format {
        OutputFormat::Json => {
            let payload = json!({
                "files": files,
                "page": args.page,
                "page_size": args.page_size,
                "total": total,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Table => {
            for file in &files {
                println!(
                    "{}  {}  {} bytes  {} sheets  by {}  {}",
                    file.id,
                    file.original_name,
                    file.file_size,
                    file.sheet_count,
                    file.uploaded_by,
                    file.uploaded_at
                );
            }
            println!("{} of {} active file(s), page {}", files.len(), total, args.page);
        }
    }

    Ok(())
}
