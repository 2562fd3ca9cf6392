//! Notification Value Types
//!
//! A notification is an immutable value: once the store builds it, nothing
//! changes it until it is removed.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::notifications::error::NotificationError;

/// Default time-to-live applied when the caller does not give one
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// Lowercase name used in configuration, scenarios and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }

    /// Glyph shown next to the title
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Warning => "⚠",
            NotificationKind::Info => "ℹ",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(NotificationKind::Success),
            "error" => Ok(NotificationKind::Error),
            "warning" => Ok(NotificationKind::Warning),
            "info" => Ok(NotificationKind::Info),
            _ => Err(NotificationError::invalid_kind(s)),
        }
    }
}

/// Opaque notification identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// An active, user-facing message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    id: NotificationId,
    kind: NotificationKind,
    title: String,
    body: String,
    ttl_ms: u64,
    created_at: DateTime<Local>,
}

impl Notification {
    pub(crate) fn new(
        id: NotificationId,
        kind: NotificationKind,
        title: String,
        body: String,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            kind,
            title,
            body,
            ttl_ms: ttl.as_millis().min(u64::MAX as u128) as u64,
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Time-to-live in milliseconds; zero means the notification never expires
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn is_persistent(&self) -> bool {
        self.ttl_ms == 0
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}
