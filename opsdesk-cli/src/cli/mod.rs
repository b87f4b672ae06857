//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::sheets::types::Role;

#[derive(Parser)]
#[command(name = "opsdesk", about = "Operations-support toolkit: spreadsheet ingestion and search", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload and index a spreadsheet
    Upload(UploadArgs),
    /// Show a file's summary and sheet metadata
    Info(InfoArgs),
    /// List uploaded files
    List(ListArgs),
    /// Search indexed cells
    Search(SearchArgs),
    /// Delete a file and its stored blob
    Delete(DeleteArgs),
    /// Show aggregate index statistics
    Stats(StatsArgs),
}

/// Output rendering for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args)]
pub struct UploadArgs {
    /// Path of the spreadsheet to upload
    pub path: PathBuf,
    /// Identity recorded as the uploader
    #[arg(long)]
    pub user: String,
    /// Declared content type (defaults to none; the file extension decides)
    #[arg(long)]
    pub content_type: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct InfoArgs {
    /// File id
    pub id: Uuid,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Comma-separated keywords (1 to 5); a cell must contain all of them
    pub keywords: String,
    /// Restrict matches to one file
    #[arg(long)]
    pub file_id: Option<Uuid>,
    /// Restrict matches to sheets with this name (case-insensitive)
    #[arg(long)]
    pub sheet: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// File id
    pub id: Uuid,
    /// Identity requesting the deletion
    #[arg(long)]
    pub user: String,
    /// Roles held by the requester (repeatable)
    #[arg(long = "role", required = true)]
    pub roles: Vec<Role>,
}

#[derive(Args)]
pub struct StatsArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
