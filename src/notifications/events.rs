//! Store Change Events
//!
//! Every mutation of the store is announced on a broadcast channel so views
//! know when to re-render. Receivers that fall behind get a lag error from
//! the channel and should resynchronise from `NotificationStore::list`.

use serde::Serialize;

use crate::notifications::model::{Notification, NotificationId};

/// Why a notification left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    /// Removed by an explicit `remove` call
    Dismissed,
    /// Removed by its own timer
    Expired,
}

impl RemovalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalReason::Dismissed => "dismissed",
            RemovalReason::Expired => "expired",
        }
    }
}

/// A change to the active notification set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Notification appended to the active list
    Added { notification: Notification },

    /// Single notification removed
    Removed {
        id: NotificationId,
        reason: RemovalReason,
    },

    /// Every active notification dropped at once
    Cleared { ids: Vec<NotificationId> },
}

impl StoreEvent {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            StoreEvent::Added { .. } => "added",
            StoreEvent::Removed { reason: RemovalReason::Dismissed, .. } => "dismissed",
            StoreEvent::Removed { reason: RemovalReason::Expired, .. } => "expired",
            StoreEvent::Cleared { .. } => "cleared",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = StoreEvent::Removed {
            id: "toast-3".into(),
            reason: RemovalReason::Expired,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"removed""#));
        assert!(json.contains(r#""reason":"expired""#));
        assert_eq!(event.label(), "expired");

        let event = StoreEvent::Cleared { ids: vec!["a".into(), "b".into()] };
        assert_eq!(event.label(), "cleared");
    }
}
