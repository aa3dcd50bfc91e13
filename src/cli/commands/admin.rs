use clap::Subcommand;
use serde_json::json;

use crate::api::format::AdminView;
use crate::cli::utils::{connect_state, output_success};
use crate::cli::OutputFormat;
use crate::services::NewAdmin;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an admin directly in the database (bootstraps the first account)")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "ELIBLE_ADMIN_PASSWORD", help = "Password")]
        password: String,
        #[arg(long, default_value = "", help = "Email address")]
        email: String,
        #[arg(long, default_value = "", help = "Full name")]
        full_name: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { username, password, email, full_name } => {
            let state = connect_state().await?;
            let admin = state
                .admins
                .register(NewAdmin { username, password, email, full_name })
                .await?;

            output_success(
                &output_format,
                &format!("Admin '{}' created", admin.username),
                Some(json!(AdminView::from(&admin))),
            )
        }
    }
}
