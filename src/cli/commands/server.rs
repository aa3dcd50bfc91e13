use std::time::{Duration, Instant};

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Health check a running server via its /health endpoint")]
    Ping {
        #[arg(default_value = "http://localhost:8080", help = "Server base URL")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Ping { url } => {
            let base = url::Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            let health = base.join("health")?;

            let client = reqwest::Client::new();
            let started = Instant::now();
            let response = client
                .get(health.clone())
                .timeout(Duration::from_secs(5))
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("Server at {} is down: {}", base, e))?;
            let elapsed = started.elapsed();

            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if !status.is_success() {
                anyhow::bail!("Server at {} answered {}", base, status);
            }

            output_success(
                &output_format,
                &format!("Server at {} is up", base),
                Some(json!({
                    "url": health.as_str(),
                    "latency_ms": elapsed.as_millis() as u64,
                    "version": body["data"]["results"]["version"],
                })),
            )
        }
    }
}
