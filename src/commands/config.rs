//! Config commands.

use super::CommandResult;
use crate::config::{AgendaConfig, AppPaths, ResolvedConfig};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    /// Where the value came from: cli, config or default
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub path: PathBuf,
    pub entries: Vec<ConfigEntry>,
}

impl CommandResult for ConfigShow {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Config ({}):", self.path.display())];
        for entry in &self.entries {
            lines.push(format!(
                "  {:<18} {:<10} [{}]",
                entry.key,
                if entry.value.is_empty() { "\"\"" } else { &entry.value },
                entry.source
            ));
        }
        lines.join("\n")
    }
}

/// Effective configuration with the source of each value.
pub fn config_show(paths: &AppPaths, resolved: &ResolvedConfig) -> ConfigShow {
    let entries = vec![
        ConfigEntry {
            key: "output-format",
            value: resolved.output_format.value.to_string(),
            source: resolved.output_format.source.to_string(),
        },
        ConfigEntry {
            key: "default-priority",
            value: resolved.default_priority.value.to_string(),
            source: resolved.default_priority.source.to_string(),
        },
        ConfigEntry {
            key: "default-category",
            value: resolved.default_category.value.clone(),
            source: resolved.default_category.source.to_string(),
        },
        ConfigEntry {
            key: "log-level",
            value: resolved.log_level.value.clone(),
            source: resolved.log_level.source.to_string(),
        },
    ];
    ConfigShow {
        path: paths.config_file.clone(),
        entries,
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSet {
    pub key: String,
    pub value: String,
    pub path: PathBuf,
}

impl CommandResult for ConfigSet {
    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

/// Update one key in config.kdl.
///
/// An unparsable file is replaced, starting from defaults.
pub fn config_set(paths: &AppPaths, key: &str, value: &str) -> Result<ConfigSet> {
    let mut config = AgendaConfig::load(&paths.config_file).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "rewriting unparsable config file");
        AgendaConfig::new()
    });
    config.set(key, value)?;
    config.save(&paths.config_file)?;
    tracing::info!(key, value, "config updated");
    Ok(ConfigSet {
        key: key.to_string(),
        value: value.to_string(),
        path: paths.config_file.clone(),
    })
}
