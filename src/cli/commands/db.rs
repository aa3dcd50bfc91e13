use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{load_config, output_success};
use crate::cli::OutputFormat;
use crate::config::DatabaseBackend;
use crate::database::DatabaseManager;
use crate::state::open_store;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Check that the configured database answers")]
    Ping,

    #[command(about = "Create the MongoDB indexes the API relies on")]
    Indexes,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;

    match cmd {
        DbCommands::Ping => {
            let store = open_store(&config).await?;
            store.health_check().await?;
            output_success(
                &output_format,
                "Database is reachable",
                Some(json!({ "database": config.database.name })),
            )
        }
        DbCommands::Indexes => {
            if config.database.backend != DatabaseBackend::MongoDb {
                anyhow::bail!("Indexes only apply to the MongoDB backend");
            }
            let manager = DatabaseManager::connect(&config.database).await?;
            manager.ensure_indexes().await?;
            manager.shutdown().await;
            output_success(&output_format, "Indexes are in place", None)
        }
    }
}
