//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::kv("Config file", &config_path.display().to_string());
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Set a dotted `section.key` on a copy of the settings.
fn set_value(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| anyhow!("Key must look like section.key, got '{}'", key))?;

    let mut root = toml::Value::try_from(settings)?;
    let table = root
        .get_mut(section)
        .and_then(|v| v.as_table_mut())
        .ok_or_else(|| anyhow!("Unknown config section: {}", section))?;

    let parsed = match table.get(field) {
        Some(existing) => coerce(existing, value)?,
        // Optional fields are absent from the serialized form until set.
        None => toml::Value::String(value.to_string()),
    };
    table.insert(field.to_string(), parsed);

    root.try_into()
        .map_err(|e| anyhow!("Invalid value for {}: {}", key, e))
}

fn coerce(existing: &toml::Value, value: &str) -> Result<toml::Value> {
    Ok(match existing {
        toml::Value::Integer(_) => toml::Value::Integer(value.parse()?),
        toml::Value::Float(_) => toml::Value::Float(value.parse()?),
        toml::Value::Boolean(_) => toml::Value::Boolean(value.parse()?),
        toml::Value::String(_) => toml::Value::String(value.to_string()),
        _ => bail!("Cannot set a nested value from the command line"),
    })
}
