//! Transient Notification System
//!
//! An ordered set of ephemeral, user-facing messages. Each notification may
//! carry a time-to-live after which it removes itself; any notification can
//! be dismissed early, and the whole set can be cleared at once.
//!
//! # Architecture
//!
//! - **NotificationStore**: owns the active list and is the only code that mutates it
//! - **TimerSupervisor**: one cancellable countdown per notification, fires at most once
//! - **IdGenerator**: pluggable source of unique ids
//! - **StoreEvent**: change feed for views that render the list
//! - **NotificationContext**: hands the store to consumers, fails fast if missing
//!
//! # Example Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use toastq::notifications::{NotificationKind, NotificationStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = NotificationStore::new()?;
//!
//! let id = store.add_with_ttl(NotificationKind::Success, "Saved", "OK", Duration::from_millis(100));
//! assert_eq!(store.list().len(), 1);
//!
//! store.remove(&id);
//! store.remove(&id); // no-op
//! assert!(store.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod ids;
pub mod model;
pub mod store;
pub mod timers;


pub use config::NotificationConfig;
pub use context::NotificationContext;
pub use error::{NotificationError, NotificationResult};
pub use events::{RemovalReason, StoreEvent};
pub use ids::{IdGenerator, IdStrategy, SequentialIds, UuidIds};
pub use model::{Notification, NotificationId, NotificationKind, DEFAULT_TTL};
pub use store::{NotificationStore, StoreBuilder, DEFAULT_EVENT_CAPACITY};
pub use timers::{TimerState, TimerStats};
