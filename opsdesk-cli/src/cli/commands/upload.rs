//! Upload command handler

use std::fs;

use anyhow::{Context, Result};

use crate::cli::{OutputFormat, UploadArgs};
use crate::sheets::SheetService;

pub async fn handle_upload(service: &SheetService, args: UploadArgs) -> Result<()> {
    let bytes = fs::read(&args.path)
        .with_context(|| format!("Failed to read file: {}", args.path.display()))?;

    let original_name = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.path.display().to_string());

    let file = service
        .upload(&bytes, &original_name, args.content_type.as_deref(), &args.user)
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&file)?),
        OutputFormat::Table => {
            println!("Uploaded {}", file.original_name);
            println!("  id:       {}", file.id);
            println!("  size:     {} bytes", file.file_size);
            println!("  uploader: {}", file.uploaded_by);
            println!(
                "  indexed:  {} sheets, {} rows, {} cells",
                file.sheet_count, file.row_count, file.cell_count
            );
        }
    }

    Ok(())
}
