//! Split configuration.
//!
//! A [`Config`] is built once per invocation (project file defaults, then
//! command-line overrides) and passed by reference through the pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};

/// Options for one split invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Selection growth in pixels; half of it is applied when >= 2.
    pub tolerance: u32,

    /// Text inserted between the source name and the index.
    pub suffix: String,

    /// Append a zero-padded running index to each output name.
    pub add_count: bool,

    /// Pixels added on every side of each region's bounds.
    pub padding: u32,

    /// Region count above which the CLI asks for confirmation.
    pub confirm_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: 0,
            suffix: "_".to_string(),
            add_count: true,
            padding: 0,
            confirm_threshold: 20,
        }
    }
}

/// Per-field overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub tolerance: Option<u32>,
    pub suffix: Option<String>,
    pub add_count: Option<bool>,
    pub padding: Option<u32>,
    pub confirm_threshold: Option<usize>,
}

impl Config {
    /// Load a config from a standalone YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SplitError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse a config from a YAML string. Missing fields take defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| SplitError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(
                "Known keys: tolerance, suffix, addCount, padding, confirmThreshold".to_string(),
            ),
        })
    }

    /// Apply overrides, returning a new config.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            tolerance: overrides.tolerance.unwrap_or(self.tolerance),
            suffix: overrides.suffix.clone().unwrap_or_else(|| self.suffix.clone()),
            add_count: overrides.add_count.unwrap_or(self.add_count),
            padding: overrides.padding.unwrap_or(self.padding),
            confirm_threshold: overrides
                .confirm_threshold
                .unwrap_or(self.confirm_threshold),
        }
    }

    /// Whether `regions` is above the confirmation threshold.
    pub fn exceeds_threshold(&self, regions: usize) -> bool {
        regions > self.confirm_threshold
    }
}
