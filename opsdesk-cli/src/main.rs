use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod sheets;

use crate::cli::commands::{delete, info, list, search, stats, upload};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::sheets::types::IngestError;
use crate::sheets::{BlobStore, RoleGate, SheetService};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let kind = err
            .downcast_ref::<IngestError>()
            .map(IngestError::kind)
            .unwrap_or("internal");
        eprintln!("error ({}): {:#}", kind, err);
        std::process::exit(exit_code(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let pool = config::open_database(&config.db_path).await?;
    config::repository::schema::init_schema(&pool).await?;

    let service = SheetService::new(
        pool,
        BlobStore::new(&config.storage_dir),
        config.max_upload_bytes,
        Box::new(RoleGate),
    );

    match cli.command {
        Commands::Upload(args) => upload::handle_upload(&service, args).await,
        Commands::Info(args) => info::handle_info(&service, args).await,
        Commands::List(args) => list::handle_list(&service, args).await,
        Commands::Search(args) => search::handle_search(&service, args).await,
        Commands::Delete(args) => delete::handle_delete(&service, args).await,
        Commands::Stats(args) => stats::handle_stats(&service, args).await,
    }
}

/// Exit codes mirror the error taxonomy so scripts can tell rejection
/// classes apart
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<IngestError>() {
        Some(IngestError::Validation(_)) => 2,
        Some(IngestError::NotFound(_)) => 3,
        Some(IngestError::PermissionDenied(_)) => 4,
        Some(IngestError::Storage(_)) => 5,
        Some(IngestError::Index(_)) => 6,
        None => 1,
    }
}
