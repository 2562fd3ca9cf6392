//! Notification Id Generators
//!
//! Ids come from an injectable generator so tests can predict them. A
//! generator must never hand out the same value twice over its lifetime;
//! the store relies on that to keep removed ids from coming back.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::notifications::error::NotificationError;
use crate::notifications::model::NotificationId;

/// Source of fresh notification ids
pub trait IdGenerator: Send + Sync {
    /// Produce an id never returned before by this generator
    fn next_id(&self) -> NotificationId;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Monotonic counter ids: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub const DEFAULT_PREFIX: &'static str = "toast";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> NotificationId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        NotificationId::new(format!("{}-{}", self.prefix, n))
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Time-ordered UUID v7 ids
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> NotificationId {
        NotificationId::new(uuid::Uuid::now_v7().to_string())
    }

    fn name(&self) -> &'static str {
        "uuid"
    }
}

/// Which generator a store is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Sequential,
    Uuid,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Sequential => "sequential",
            IdStrategy::Uuid => "uuid",
        }
    }

    /// Build the generator for this strategy
    pub fn generator(&self, prefix: &str) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Sequential => Box::new(SequentialIds::with_prefix(prefix)),
            IdStrategy::Uuid => Box::new(UuidIds),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(IdStrategy::Sequential),
            "uuid" => Ok(IdStrategy::Uuid),
            _ => Err(NotificationError::invalid_setting("id-strategy", s)),
        }
    }
}
