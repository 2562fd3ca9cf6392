//! Notification Store
//!
//! Authoritative registry of active notifications. The store is a cheap,
//! cloneable handle; every clone sees the same state. All operations are
//! synchronous and total, and each runs under a single lock so none can
//! observe another half-applied.

use std::sync::{Arc, Weak};
use std::time::Duration;
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::events::{RemovalReason, StoreEvent};
use crate::notifications::ids::{IdGenerator, SequentialIds};
use crate::notifications::model::{Notification, NotificationId, NotificationKind, DEFAULT_TTL};
use crate::notifications::timers::{TimerStats, TimerSupervisor, TimerTicket};

/// Default capacity of the change feed
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Mutable state guarded by the store lock
struct StoreState {
    active: Vec<Notification>,
    timers: TimerSupervisor,
}

impl StoreState {
    fn position(&self, id: &NotificationId) -> Option<usize> {
        self.active.iter().position(|n| n.id() == id)
    }
}

struct Shared {
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    ids: Box<dyn IdGenerator>,
    runtime: Handle,
    default_ttl: Duration,
}

impl Shared {
    fn publish(&self, event: StoreEvent) {
        // No receivers is the normal case when nothing renders
        let _ = self.events.send(event);
    }

    /// Drop `id` from the active list. Callers hold the lock.
    fn remove_locked(&self, state: &mut StoreState, id: &NotificationId, reason: RemovalReason) -> bool {
        match state.position(id) {
            Some(index) => {
                state.active.remove(index);
                debug!("Removed notification '{}' ({:?}), {} active", id, reason, state.active.len());
                self.publish(StoreEvent::Removed { id: id.clone(), reason });
                true
            }
            None => false,
        }
    }

    /// Expiry path taken by timer callbacks
    fn expire(&self, id: &NotificationId, ticket: TimerTicket) {
        let mut state = self.state.lock();
        if state.timers.fire(id, ticket) {
            self.remove_locked(&mut state, id, RemovalReason::Expired);
        }
    }
}

/// Builder for [`NotificationStore`]
pub struct StoreBuilder {
    default_ttl: Duration,
    ids: Option<Box<dyn IdGenerator>>,
    event_capacity: usize,
    runtime: Option<Handle>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            ids: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            runtime: None,
        }
    }

    /// Time-to-live used by [`NotificationStore::add`]; zero disables expiry
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Spawn timers on this runtime instead of the current one
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> NotificationResult<NotificationStore> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| NotificationError::NoRuntime(e.to_string()))?,
        };

        if self.event_capacity == 0 {
            return Err(NotificationError::invalid_setting("event-capacity", "0"));
        }

        let ids = self.ids.unwrap_or_else(|| Box::new(SequentialIds::new()));
        let (events, _) = broadcast::channel(self.event_capacity);

        debug!(
            "Created notification store (default ttl {:?}, {} ids)",
            self.default_ttl,
            ids.name()
        );

        Ok(NotificationStore {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    active: Vec::new(),
                    timers: TimerSupervisor::new(),
                }),
                events,
                ids,
                runtime,
                default_ttl: self.default_ttl,
            }),
        })
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered set of active, auto-expiring notifications
#[derive(Clone)]
pub struct NotificationStore {
    shared: Arc<Shared>,
}

impl NotificationStore {
    /// Create a store with default settings on the current tokio runtime
    pub fn new() -> NotificationResult<Self> {
        StoreBuilder::new().build()
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Add a notification with the store's default time-to-live
    pub fn add(&self, kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> NotificationId {
        self.add_with_ttl(kind, title, body, self.shared.default_ttl)
    }

    /// Add a notification that removes itself after `ttl`; a zero `ttl` keeps
    /// it until removed explicitly. Returns immediately.
    pub fn add_with_ttl(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        ttl: Duration,
    ) -> NotificationId {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        let id = shared.ids.next_id();
        if state.position(&id).is_some() {
            warn!("Id generator '{}' repeated active id '{}'", shared.ids.name(), id);
        }

        let notification = Notification::new(id.clone(), kind, title.into(), body.into(), ttl);
        state.active.push(notification.clone());

        if !ttl.is_zero() {
            let weak: Weak<Shared> = Arc::downgrade(shared);
            let armed = state.timers.arm(&shared.runtime, id.clone(), ttl, move |id, ticket| {
                if let Some(shared) = weak.upgrade() {
                    shared.expire(&id, ticket);
                }
            });
            if armed.is_none() {
                debug!("Notification '{}' ttl {:?} exceeds the clock range, it will not expire", id, ttl);
            }
        }

        debug!("Added {} notification '{}' (ttl {:?}), {} active", kind, id, ttl, state.active.len());
        shared.publish(StoreEvent::Added { notification });
        id
    }

    /// Remove a notification. Absent ids are ignored.
    pub fn remove(&self, id: &NotificationId) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        state.timers.cancel(id);
        if !shared.remove_locked(&mut state, id, RemovalReason::Dismissed) {
            debug!("Ignoring removal of absent notification '{}'", id);
        }
    }

    /// Remove every notification and cancel every armed timer
    pub fn clear_all(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let cancelled = state.timers.cancel_all();
        let ids: Vec<NotificationId> = state.active.drain(..).map(|n| n.id().clone()).collect();
        debug!("Cleared {} notifications ({} timers cancelled)", ids.len(), cancelled);
        shared.publish(StoreEvent::Cleared { ids });
    }

    /// Snapshot of active notifications in insertion order
    pub fn list(&self) -> Vec<Notification> {
        self.shared.state.lock().active.clone()
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        let state = self.shared.state.lock();
        state.position(id).map(|index| state.active[index].clone())
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.shared.state.lock().position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn default_ttl(&self) -> Duration {
        self.shared.default_ttl
    }

    /// Whether `id` still has a countdown running
    pub fn has_armed_timer(&self, id: &NotificationId) -> bool {
        self.shared.state.lock().timers.is_armed(id)
    }

    /// When the countdown for `id` is due, on the runtime's clock
    pub fn expires_at(&self, id: &NotificationId) -> Option<tokio::time::Instant> {
        self.shared.state.lock().timers.deadline(id)
    }

    pub fn timer_stats(&self) -> TimerStats {
        self.shared.state.lock().timers.stats()
    }

    /// Receive every change made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.shared.events.subscribe()
    }

    /// Clear the store at application stop. The store remains usable.
    pub fn shutdown(&self) {
        let stats = self.timer_stats();
        let remaining = self.len();
        self.clear_all();
        info!(
            "Notification store shut down ({} dropped, {} fired, {} cancelled)",
            remaining, stats.fired, stats.cancelled + stats.armed as u64
        );
    }
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("NotificationStore")
            .field("active", &state.active.len())
            .field("timers", &state.timers.stats())
            .field("default_ttl", &self.shared.default_ttl)
            .finish()
    }
}
