use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::state::{open_store, AppState};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(data_value) = data {
                print_text_fields(&data_value, 1);
            }
        }
    }
    Ok(())
}

/// Indented `key: value` lines for nested JSON objects
fn print_text_fields(value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                match item {
                    Value::Object(_) => {
                        println!("{}{}:", indent, key);
                        print_text_fields(item, depth + 1);
                    }
                    Value::Array(items) if items.is_empty() => println!("{}{}: -", indent, key),
                    Value::Array(items) => {
                        let joined: Vec<String> = items.iter().map(Value::to_string).collect();
                        println!("{}{}: {}", indent, key, joined.join(", "));
                    }
                    Value::String(s) => println!("{}{}: {}", indent, key, s),
                    other => println!("{}{}: {}", indent, key, other),
                }
            }
        }
        other => println!("{}{}", indent, other),
    }
}

/// Configuration from `.env` and the process environment.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let _ = dotenvy::dotenv();
    AppConfig::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
}

/// Services over the configured database, as the server would build them.
pub async fn connect_state() -> anyhow::Result<AppState> {
    let config = load_config()?;
    let store = open_store(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;
    Ok(AppState::new(config, store))
}
