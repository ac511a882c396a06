//! Configuration commands for managing nearby settings.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::catalog::ListKind;
use crate::config::Config;
use crate::error::{NearbyError, Result};

const ACCESS_TOKEN_KEY: &str = "auth.access_token";

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Show current configuration
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.access_token().is_some();

    let lists_json: serde_json::Map<String, serde_json::Value> = ListKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.to_string(),
                json!({
                    "page_size": config.page_size(*kind),
                    "debounce_ms": config.debounce(*kind).as_millis() as u64,
                }),
            )
        })
        .collect();

    let json_output = json!({
        "api": {
            "base_url": config.base_url(),
        },
        "auth": {
            "access_token_configured": token_configured,
        },
        "remote_timeout": config.remote_timeout,
        "lists": lists_json,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();

    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "api".cyan()));
    text_output.push_str(&format!("  base_url: {}\n", config.base_url()));
    text_output.push_str(&format!("  remote_timeout: {}s\n", config.remote_timeout));

    text_output.push('\n');

    // Auth status (don't show the actual token)
    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    text_output.push_str(&format!("  access_token: {token_status}\n"));

    text_output.push('\n');

    text_output.push_str(&format!("{}:\n", "lists".cyan()));
    for kind in ListKind::ALL {
        let overridden = config.lists.contains_key(&kind);
        let line = format!(
            "  {kind}: page_size {}, debounce {}ms",
            config.page_size(kind),
            config.debounce(kind).as_millis()
        );
        if overridden {
            text_output.push_str(&format!("{line} {}\n", "(override)".yellow()));
        } else {
            text_output.push_str(&format!("{line}\n"));
        }
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json: bool) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let shown = if key == ACCESS_TOKEN_KEY {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    });
    let text_output = format!("Set {} to {}", key.cyan(), shown);

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, json: bool) -> Result<()> {
    let config = Config::load()?;

    let Some(value) = config.get(key)? else {
        return Err(NearbyError::Config(format!("{key} not set")));
    };

    let (json_output, text_output) = if key == ACCESS_TOKEN_KEY {
        let masked = mask_sensitive_value(&value);
        let json = json!({
            "key": key,
            "value": masked,
            "configured": true,
            "masked": true,
        });
        let text = format!("{masked} (masked - showing first 2 and last 2 characters)");
        (json, text)
    } else {
        let json = json!({
            "key": key,
            "value": value,
            "configured": true,
        });
        (json, value)
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}
