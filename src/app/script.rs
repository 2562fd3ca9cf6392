//! Scenario scripts
//!
//! A scenario is a TOML file of `[[step]]` tables replayed in order against a
//! store. Labels given to `add` steps let later `remove` steps refer to the
//! notification without knowing its generated id.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::notifications::NotificationKind;

/// One scenario action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Add {
        kind: NotificationKind,
        title: String,
        #[serde(default)]
        body: String,
        /// Falls back to the configured default ttl
        #[serde(rename = "ttl-ms")]
        ttl_ms: Option<u64>,
        label: Option<String>,
    },
    Remove {
        label: String,
    },
    Clear,
    List,
    Wait {
        ms: u64,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Add { .. } => "add",
            Step::Remove { .. } => "remove",
            Step::Clear => "clear",
            Step::List => "list",
            Step::Wait { .. } => "wait",
        }
    }

    pub fn wait_duration(&self) -> Option<Duration> {
        match self {
            Step::Wait { ms } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// An ordered list of steps
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse and validate scenario TOML
    pub fn parse(content: &str) -> Result<Self> {
        let script: Script = toml::from_str(content).context("Failed to parse scenario")?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid scenario file: {}", path.display()))
    }

    /// Saved/OK with a 100ms lifetime, observed either side of its expiry
    pub fn builtin() -> Self {
        Self {
            steps: vec![
                Step::Add {
                    kind: NotificationKind::Success,
                    title: "Saved".to_string(),
                    body: "OK".to_string(),
                    ttl_ms: Some(100),
                    label: Some("saved".to_string()),
                },
                Step::List,
                Step::Wait { ms: 99 },
                Step::List,
                Step::Wait { ms: 2 },
                Step::List,
            ],
        }
    }

    /// Every `remove` must name a label bound by an earlier `add`
    pub fn validate(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Add { label: Some(label), .. } => {
                    labels.insert(label.as_str());
                }
                Step::Remove { label } if !labels.contains(label.as_str()) => {
                    return Err(anyhow::anyhow!(
                        "Step {}: remove refers to unknown label '{}'", index + 1, label
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_all_actions() {
        let script = Script::parse(r#"
[[step]]
action = "add"
kind = "warning"
title = "Offline"
ttl-ms = 0
label = "offline"

[[step]]
action = "list"

[[step]]
action = "wait"
ms = 250

[[step]]
action = "remove"
label = "offline"

[[step]]
action = "clear"
"#).unwrap();

        assert_eq!(script.len(), 5);
        assert_eq!(
            script.steps[0],
            Step::Add {
                kind: NotificationKind::Warning,
                title: "Offline".to_string(),
                body: String::new(),
                ttl_ms: Some(0),
                label: Some("offline".to_string()),
            }
        );
        assert_eq!(script.steps[2].wait_duration(), Some(Duration::from_millis(250)));
        let names: Vec<_> = script.steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["add", "list", "wait", "remove", "clear"]);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let result = Script::parse(r#"
[[step]]
action = "remove"
label = "ghost"
"#);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("unknown label 'ghost'"));
    }

    #[test]
    fn test_label_must_precede_remove() {
        let result = Script::parse(r#"
[[step]]
action = "remove"
label = "later"

[[step]]
action = "add"
kind = "info"
title = "Later"
label = "later"
"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_kind_and_action() {
        assert!(Script::parse("[[step]]\naction = \"add\"\nkind = \"fatal\"\ntitle = \"x\"\n").is_err());
        assert!(Script::parse("[[step]]\naction = \"explode\"\n").is_err());
        assert!(Script::parse("[[step]]\naction = \"wait\"\n").is_err());
    }

    #[test]
    fn test_empty_script() {
        let script = Script::parse("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_builtin_scenario() {
        let script = Script::builtin();
        assert!(script.validate().is_ok());
        assert_eq!(script.len(), 6);
        let total_wait: Duration = script.steps.iter().filter_map(Step::wait_duration).sum();
        assert_eq!(total_wait, Duration::from_millis(101));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(&file, "[[step]]\naction = \"list\"\n").unwrap();
        assert_eq!(Script::load(file.path()).unwrap().steps, vec![Step::List]);

        assert!(Script::load(Path::new("/nonexistent/scenario.toml")).is_err());
    }
}
