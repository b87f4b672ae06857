//! Delete command handler

use anyhow::Result;

use crate::cli::DeleteArgs;
use crate::sheets::SheetService;

pub async fn handle_delete(service: &SheetService, args: DeleteArgs) -> Result<()> {
    service.delete(args.id, &args.user, &args.roles).await?;
    println!("Deleted file {}", args.id);
    Ok(())
}
