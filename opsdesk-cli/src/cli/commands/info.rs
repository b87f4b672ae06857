//! Info command handler

use anyhow::Result;

use crate::cli::{InfoArgs, OutputFormat};
use crate::sheets::SheetService;

pub async fn handle_info(service: &SheetService, args: InfoArgs) -> Result<()> {
    let details = service.file_details(args.id).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Table => {
            let file = &details.file;
            println!("{} ({})", file.original_name, file.id);
            println!("  uploaded by {} at {}", file.uploaded_by, file.uploaded_at);
            println!("  {} bytes, status {}", file.file_size, file.status);
            match service.stored_blob_size(file) {
                Some(bytes) => println!("  blob: {} ({} bytes)", file.storage_path, bytes),
                None => println!("  blob: {} (missing)", file.storage_path),
            }
            println!(
                "  {} sheets, {} rows, {} cells",
                file.sheet_count, file.row_count, file.cell_count
            );
            for sheet in &details.sheets {
                println!(
                    "  [{}] {} - {} rows x {} columns",
                    sheet.sheet_index, sheet.name, sheet.row_count, sheet.column_count
                );
                println!("      headers: {}", sheet.headers.join(", "));
            }
        }
    }

    Ok(())
}
