//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `<data-dir>/config.kdl`
//! 3. Built-in defaults

use crate::config::{AgendaConfig, OutputFormat};

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub default_priority: Resolved<u8>,
    pub default_category: Resolved<String>,
    pub log_level: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            default_priority: Resolved::new(1, ValueSource::Default),
            default_category: Resolved::new(String::new(), ValueSource::Default),
            log_level: Resolved::new("info".to_string(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Whether output should be human-readable.
    pub fn human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }

    pub fn default_priority(&self) -> u8 {
        self.default_priority.value
    }

    pub fn default_category(&self) -> &str {
        &self.default_category.value
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Output format override from CLI flag
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(file: &AgendaConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(ref format) = overrides.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    } else if let Some(ref format) = file.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::ConfigFile);
    }

    if let Some(priority) = file.default_priority {
        result.default_priority = Resolved::new(priority, ValueSource::ConfigFile);
    }

    if let Some(ref category) = file.default_category {
        result.default_category = Resolved::new(category.clone(), ValueSource::ConfigFile);
    }

    if let Some(ref level) = file.log_level {
        result.log_level = Resolved::new(level.clone(), ValueSource::ConfigFile);
    }

    result
}
