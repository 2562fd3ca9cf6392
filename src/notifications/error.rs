//! Notification System Error Types
//!
//! Store operations themselves are total. These errors cover misconfiguration:
//! using the store before it exists, building it outside a runtime, or feeding
//! it settings that cannot be interpreted.

use thiserror::Error;

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Configuration errors raised by the notification system
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// A consumer asked for the store before one was installed
    #[error("Notification store not initialized")]
    NotInitialized,

    /// A store was installed into a context that already holds one
    #[error("Notification store already initialized")]
    AlreadyInitialized,

    /// The store was built without a tokio runtime to run its timers on
    #[error("Notification store requires a tokio runtime: {0}")]
    NoRuntime(String),

    /// Unknown notification kind
    #[error("Invalid notification kind: {0}. Valid kinds: success, error, warning, info")]
    InvalidKind(String),

    /// A setting could not be interpreted
    #[error("Invalid notification setting {key} = '{value}'")]
    InvalidSetting { key: String, value: String },
}

impl NotificationError {
    /// Create an invalid kind error
    pub fn invalid_kind(kind: impl Into<String>) -> Self {
        Self::InvalidKind(kind.into())
    }

    /// Create an invalid setting error
    pub fn invalid_setting(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
        }
    }
}
