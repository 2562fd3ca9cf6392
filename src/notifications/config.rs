//! Notification Store Configuration
//!
//! Settings read from the `[notifications]` config section and CLI flags,
//! and the bridge from those settings to a built store.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::ids::{IdStrategy, SequentialIds};
use crate::notifications::model::DEFAULT_TTL;
use crate::notifications::store::{NotificationStore, DEFAULT_EVENT_CAPACITY};

/// Store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Time-to-live for `add` without an explicit ttl; zero disables expiry
    pub default_ttl_ms: u64,
    #[serde(with = "id_strategy_serde")]
    pub id_strategy: IdStrategy,
    /// Prefix for sequential ids
    pub id_prefix: String,
    /// Change feed capacity
    pub event_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            id_strategy: IdStrategy::default(),
            id_prefix: SequentialIds::DEFAULT_PREFIX.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl NotificationConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn validate(&self) -> NotificationResult<()> {
        if self.event_capacity == 0 {
            return Err(NotificationError::invalid_setting("event-capacity", "0"));
        }
        if self.id_strategy == IdStrategy::Sequential && self.id_prefix.trim().is_empty() {
            return Err(NotificationError::invalid_setting("id-prefix", self.id_prefix.clone()));
        }
        Ok(())
    }

    /// Build a store on the current tokio runtime
    pub fn build_store(&self) -> NotificationResult<NotificationStore> {
        self.validate()?;
        NotificationStore::builder()
            .default_ttl(self.default_ttl())
            .id_generator(self.id_strategy.generator(&self.id_prefix))
            .event_capacity(self.event_capacity)
            .build()
    }
}

mod id_strategy_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use crate::notifications::ids::IdStrategy;

    pub fn serialize<S: Serializer>(strategy: &IdStrategy, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(strategy.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IdStrategy, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
