use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_state, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ImportCommands {
    #[command(about = "Import universities and study programs into a catalog entry")]
    Programs {
        #[arg(help = "Spreadsheet file (.xlsx, .xls, .ods)")]
        file: PathBuf,
        #[arg(long, help = "Knowledge base year")]
        year: String,
        #[arg(long, help = "Knowledge program name")]
        program: String,
    },

    #[command(about = "Import schools and students")]
    Students {
        #[arg(help = "Spreadsheet file (.xlsx, .xls, .ods)")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: ImportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = connect_state().await?;

    match cmd {
        ImportCommands::Programs { file, year, program } => {
            let result = state
                .imports
                .import_programs_file(&year, &program, &file)
                .await?;
            output_success(
                &output_format,
                &format!("Imported {}", file.display()),
                Some(json!(result)),
            )
        }
        ImportCommands::Students { file } => {
            let result = state.imports.import_students_file(&file).await?;
            output_success(
                &output_format,
                &format!("Imported {}", file.display()),
                Some(json!(result)),
            )
        }
    }
}
