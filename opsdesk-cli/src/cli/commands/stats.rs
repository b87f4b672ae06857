//! Stats command handler

use anyhow::Result;

use crate::cli::{OutputFormat, StatsArgs};
use crate::sheets::SheetService;

pub async fn handle_stats(service: &SheetService, args: StatsArgs) -> Result<()> {
    let stats = service.stats().await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => {
            println!("files:         {} ({} active)", stats.total_files, stats.active_files);
            println!("sheets:        {}", stats.total_sheets);
            println!("cells:         {}", stats.total_cells);
            println!("stored bytes:  {}", stats.total_storage_bytes);
        }
    }

    Ok(())
}
