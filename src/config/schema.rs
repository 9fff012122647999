//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The [`AgendaConfig`] struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and single-key updates used by `agenda config set`

use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Levels accepted by `log-level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Keys accepted by `agenda config set`.
pub const CONFIG_KEYS: [&str; 4] = [
    "output-format",
    "default-priority",
    "default-category",
    "log-level",
];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"  // or "json"
/// default-priority 2
/// default-category "General"
/// log-level "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Default priority for new tasks (1-3, where 3 is highest)
    pub default_priority: Option<u8>,

    /// Category applied to new tasks when none is given
    pub default_category: Option<String>,

    /// Level filter for the log file
    pub log_level: Option<String>,
}

impl AgendaConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(priority) = self.default_priority {
            if !(1..=3).contains(&priority) {
                return Err(format!("default-priority must be 1-3, got {}", priority));
            }
        }
        if let Some(ref category) = self.default_category {
            if category.chars().count() > 50 {
                return Err("default-category cannot exceed 50 characters".to_string());
            }
        }
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "log-level must be one of {}, got {}",
                    LOG_LEVELS.join("|"),
                    level
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Entries with the wrong type or out-of-range values are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "output-format") {
            config.output_format = OutputFormat::parse(s);
        }

        if let Some(node) = doc.get("default-priority") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    if (1..=3).contains(&i) {
                        config.default_priority = Some(i as u8);
                    }
                }
            }
        }

        if let Some(s) = first_string(doc, "default-category") {
            config.default_category = Some(s.to_string());
        }

        if let Some(s) = first_string(doc, "log-level") {
            let level = s.to_lowercase();
            if LOG_LEVELS.contains(&level.as_str()) {
                config.log_level = Some(level);
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(priority) = self.default_priority {
            let mut node = KdlNode::new("default-priority");
            node.push(KdlEntry::new(KdlValue::Integer(priority as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref category) = self.default_category {
            let mut node = KdlNode::new("default-category");
            node.push(KdlEntry::new(KdlValue::String(category.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(ref level) = self.log_level {
            let mut node = KdlNode::new("log-level");
            node.push(KdlEntry::new(KdlValue::String(level.clone())));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Render config.kdl text, one node per line.
    pub fn to_kdl_string(&self) -> String {
        let mut doc = self.to_kdl();
        doc.autoformat();
        doc.to_string()
    }

    /// Set a single key from its string form, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "output-format" => {
                let format = OutputFormat::parse(value).ok_or_else(|| {
                    Error::Config(format!("output-format must be json or human, got {}", value))
                })?;
                updated.output_format = Some(format);
            }
            "default-priority" => {
                let priority = value.parse::<u8>().map_err(|_| {
                    Error::Config(format!("default-priority must be 1-3, got {}", value))
                })?;
                updated.default_priority = Some(priority);
            }
            "default-category" => updated.default_category = Some(value.trim().to_string()),
            "log-level" => updated.log_level = Some(value.to_lowercase()),
            other => {
                return Err(Error::Config(format!(
                    "Unknown key '{}'. Valid keys: {}",
                    other,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }

        updated.validate().map_err(Error::Config)?;
        *self = updated;
        Ok(())
    }

    /// Read config.kdl, returning defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_kdl(&doc))
    }

    /// Write config.kdl.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_kdl_string())?;
        Ok(())
    }
}

/// First string argument of the named node, if present.
fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_config_default() {
        let config = AgendaConfig::default();
        assert_eq!(config.output_format, None);
        assert_eq!(config.default_priority, None);
        assert_eq!(config.default_category, None);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_config_validate_invalid_priority() {
        let config = AgendaConfig {
            default_priority: Some(4),
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.unwrap_err().contains("default-priority must be 1-3"));
    }

    #[test]
    fn test_config_from_kdl() {
        let doc: KdlDocument = r#"
            output-format "human"
            default-priority 3
            default-category "Support"
            log-level "DEBUG"
        "#
        .parse()
        .unwrap();

        let config = AgendaConfig::from_kdl(&doc);
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert_eq!(config.default_priority, Some(3));
        assert_eq!(config.default_category.as_deref(), Some("Support"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_config_from_kdl_ignores_out_of_range() {
        let doc: KdlDocument = "default-priority 9\nlog-level \"loud\"".parse().unwrap();
        let config = AgendaConfig::from_kdl(&doc);
        assert_eq!(config.default_priority, None);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_config_kdl_roundtrip() {
        let config = AgendaConfig {
            output_format: Some(OutputFormat::Json),
            default_priority: Some(2),
            default_category: Some("Finance".to_string()),
            log_level: Some("warn".to_string()),
        };
        let text = config.to_kdl_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(AgendaConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = AgendaConfig::new();
        let err = config.set("editor", "vim").unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
    }

    #[test]
    fn test_set_invalid_value_leaves_config_unchanged() {
        let mut config = AgendaConfig {
            default_priority: Some(2),
            ..Default::default()
        };
        assert!(config.set("default-priority", "7").is_err());
        assert_eq!(config.default_priority, Some(2));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AgendaConfig::load(&temp.path().join("config.kdl")).unwrap();
        assert_eq!(config, AgendaConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.kdl");

        let mut config = AgendaConfig::new();
        config.set("output-format", "human").unwrap();
        config.set("default-category", "Ops").unwrap();
        config.save(&path).unwrap();

        assert_eq!(AgendaConfig::load(&path).unwrap(), config);
    }
}
