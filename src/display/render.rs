//! Snapshot and event rendering
//!
//! Stands in for the views that consume the store: renders `list()` output
//! and change events as terminal text or JSON lines.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::notifications::{Notification, StoreEvent};
use super::colours::ColourManager;
use super::config::OutputFormat;

#[derive(Serialize)]
struct JsonSnapshot<'a> {
    label: &'a str,
    active: usize,
    notifications: &'a [Notification],
}

/// Renders store snapshots for the driver binary
#[derive(Debug, Clone)]
pub struct NotificationRenderer {
    colours: ColourManager,
    format: OutputFormat,
}

impl NotificationRenderer {
    pub fn new(colours: ColourManager, format: OutputFormat) -> Self {
        Self { colours, format }
    }

    /// Plain text, no colours
    pub fn plain() -> Self {
        Self::new(ColourManager::with_colours(false), OutputFormat::Text)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a point-in-time snapshot under a heading
    pub fn render_snapshot(&self, label: &str, notifications: &[Notification]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let snapshot = JsonSnapshot {
                    label,
                    active: notifications.len(),
                    notifications,
                };
                serde_json::to_string(&snapshot).context("Failed to serialize snapshot")
            }
            OutputFormat::Text => Ok(self.render_text_snapshot(label, notifications)),
        }
    }

    fn render_text_snapshot(&self, label: &str, notifications: &[Notification]) -> String {
        let heading = format!("{} ({} active)", label, notifications.len());
        let mut lines = vec![self.colours.highlight(&heading).to_string()];

        if notifications.is_empty() {
            lines.push(format!("  {}", self.colours.dim("(none)")));
        }
        for notification in notifications {
            lines.push(format!("  {}", self.render_line(notification)));
        }
        lines.join("\n")
    }

    /// One notification: glyph, title, body, then id and ttl
    pub fn render_line(&self, notification: &Notification) -> String {
        let kind = notification.kind();
        let head = format!("{} {}", kind.icon(), notification.title());
        let ttl = if notification.is_persistent() {
            "persistent".to_string()
        } else {
            format!("ttl {}ms", notification.ttl_ms())
        };
        let meta = format!("[{}, {}]", notification.id(), ttl);

        if notification.body().is_empty() {
            format!("{} {}", self.colours.kind(kind, &head), self.colours.dim(&meta))
        } else {
            format!(
                "{}: {} {}",
                self.colours.kind(kind, &head),
                notification.body(),
                self.colours.dim(&meta)
            )
        }
    }

    /// Render a change event as a single line
    pub fn render_event(&self, event: &StoreEvent) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(event).context("Failed to serialize event"),
            OutputFormat::Text => Ok(match event {
                StoreEvent::Added { notification } => {
                    format!("+ {}", self.render_line(notification))
                }
                StoreEvent::Removed { id, reason } => {
                    format!("- {} ({})", id, reason.as_str())
                }
                StoreEvent::Cleared { ids } => format!("x cleared {} notifications", ids.len()),
            }),
        }
    }
}
