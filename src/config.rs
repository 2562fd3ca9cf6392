use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::display::{DisplayConfig, OutputFormat};
use crate::notifications::{IdStrategy, NotificationConfig};

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "TOASTQ_CONFIG";

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    overrides: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            overrides: Configuration::new(),
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Self {
            config,
            overrides: Configuration::new(),
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// File this configuration was read from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: command line -> selected_section -> specified section -> base
        if let Some(value) = self.overrides.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Override a setting from the command line
    pub fn set_override(&mut self, section: &str, key: &str, value: impl Into<String>) {
        debug!("Command line override: {}.{}", section, key);
        self.overrides
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Get boolean value with type conversion
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    /// Get unsigned integer value with type conversion
    pub fn get_u64(&self, section: &str, key: &str) -> Result<Option<u64>> {
        match self.get_value(section, key) {
            Some(value) => value
                .parse::<u64>()
                .map(Some)
                .with_context(|| format!("Invalid number for {}.{}: {}", section, key, value)),
            None => Ok(None),
        }
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get notification store settings from config file
    pub fn get_notification_config(&self) -> Result<NotificationConfig> {
        let mut config = NotificationConfig::default();

        if let Some(ttl) = self.get_u64("notifications", "default-ttl-ms")? {
            config.default_ttl_ms = ttl;
        }

        if let Some(strategy) = self.get_value("notifications", "id-strategy") {
            config.id_strategy = strategy.parse::<IdStrategy>()
                .with_context(|| format!("Invalid id-strategy value in config: {}", strategy))?;
        }

        if let Some(prefix) = self.get_value("notifications", "id-prefix") {
            config.id_prefix = prefix.clone();
        }

        if let Some(capacity) = self.get_u64("notifications", "event-capacity")? {
            config.event_capacity = usize::try_from(capacity)
                .with_context(|| format!("event-capacity out of range: {}", capacity))?;
        }

        config.validate()
            .with_context(|| "Notification configuration validation failed")?;

        Ok(config)
    }

    /// Get display settings from config file
    pub fn get_display_config(&self) -> Result<DisplayConfig> {
        let mut config = DisplayConfig::default();

        if let Some(color) = self.get_bool("display", "color")? {
            config.color = color;
        }

        if let Some(output) = self.get_value("display", "output") {
            config.output = output.parse::<OutputFormat>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }

        Ok(config)
    }

    /// Render the effective settings as a complete TOML document
    pub fn export_complete_config(&self) -> Result<String> {
        let notifications = self.get_notification_config()?;
        let display = self.get_display_config()?;

        let mut base = toml::Table::new();
        for key in ["console-level", "log-format", "log-file", "file-log-level"] {
            if let Some(value) = self.get_value("base", key) {
                base.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        let default_ttl_ms = i64::try_from(notifications.default_ttl_ms)
            .with_context(|| format!("default-ttl-ms too large to export: {}", notifications.default_ttl_ms))?;
        let event_capacity = i64::try_from(notifications.event_capacity)
            .with_context(|| format!("event-capacity too large to export: {}", notifications.event_capacity))?;

        let mut notifications_table = toml::Table::new();
        notifications_table.insert("default-ttl-ms".into(), Value::Integer(default_ttl_ms));
        notifications_table.insert("id-strategy".into(), Value::String(notifications.id_strategy.to_string()));
        notifications_table.insert("id-prefix".into(), Value::String(notifications.id_prefix));
        notifications_table.insert("event-capacity".into(), Value::Integer(event_capacity));

        let mut display_table = toml::Table::new();
        display_table.insert("color".into(), Value::Boolean(display.color));
        display_table.insert("output".into(), Value::String(display.output.as_str().to_string()));

        let mut root = toml::Table::new();
        root.insert("base".into(), Value::Table(base));
        root.insert("notifications".into(), Value::Table(notifications_table));
        root.insert("display".into(), Value::Table(display_table));

        toml::to_string_pretty(&root).context("Failed to serialize configuration")
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $TOASTQ_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("toastq").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".toastq.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.toastq.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().all(|v| !v.is_table()) => {
                // Leaf table: a configuration section
                let section_map = subtable
                    .iter()
                    .map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue)))
                    .collect();
                config.insert(section_name, section_map);
            }
            Value::Table(subtable) => flatten_toml_table(subtable, section_name, config),
            _ => {
                // Top-level scalars belong to [base]
                let target = if prefix.is_empty() { "base".to_string() } else { prefix.clone() };
                config
                    .entry(target)
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        // Complex types keep their TOML representation
        other => other.to_string(),
    }
}
