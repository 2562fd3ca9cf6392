//! Display configuration
//!
//! How the driver binary presents store snapshots: plain or coloured text,
//! or JSON lines.

use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Snapshot output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Valid options: text, json", s)),
        }
    }
}

/// Display settings for the driver binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Whether colours are enabled
    pub color: bool,
    /// Whether to respect the NO_COLOR environment variable
    pub respect_no_color: bool,
    pub output: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            respect_no_color: true,
            output: OutputFormat::Text,
        }
    }
}

impl DisplayConfig {
    /// Resolve the configured preference against the environment
    pub fn should_use_colours(&self) -> bool {
        if !self.color || self.output == OutputFormat::Json {
            return false;
        }
        !(self.respect_no_color && std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()))
    }
}
