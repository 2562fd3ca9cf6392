//! Timer Supervisor
//!
//! Owns one cancellable countdown per notification id. A countdown moves from
//! `Armed` to exactly one of `Fired` or `Cancelled`:
//!
//! - the expiry callback only acts if `fire` accepts its ticket, and `fire`
//!   accepts a ticket at most once;
//! - `cancel` and `cancel_all` forget the ticket before returning, so a
//!   callback already woken but not yet run is rejected by `fire`.
//!
//! The supervisor lives inside the store's lock, which makes both checks
//! atomic with respect to store operations.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use log::trace;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::notifications::model::NotificationId;

/// Lifecycle of a single countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Armed,
    Fired,
    Cancelled,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Armed => "armed",
            TimerState::Fired => "fired",
            TimerState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Identifies one arming of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket(u64);

/// Counters describing supervisor activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Countdowns currently running
    pub armed: usize,
    /// Countdowns that reached their deadline and triggered removal
    pub fired: u64,
    /// Countdowns stopped before they could fire
    pub cancelled: u64,
}

struct ArmedTimer {
    ticket: TimerTicket,
    deadline: Instant,
    token: CancellationToken,
}

/// Map of notification id to its running countdown
pub(crate) struct TimerSupervisor {
    armed: HashMap<NotificationId, ArmedTimer>,
    root: CancellationToken,
    next_ticket: u64,
    fired: u64,
    cancelled: u64,
}

impl TimerSupervisor {
    pub fn new() -> Self {
        Self {
            armed: HashMap::new(),
            root: CancellationToken::new(),
            next_ticket: 1,
            fired: 0,
            cancelled: 0,
        }
    }

    /// Start a countdown for `id` on `runtime`.
    ///
    /// When the deadline passes, `on_expiry` runs on the runtime with the id
    /// and ticket; it must call back into `fire` (through the store) before
    /// acting. Re-arming an id cancels its previous countdown.
    ///
    /// Returns `None` without arming when `ttl` reaches past the end of the
    /// clock's range; such a countdown could never fire.
    pub fn arm<F>(&mut self, runtime: &Handle, id: NotificationId, ttl: Duration, on_expiry: F) -> Option<TimerTicket>
    where
        F: FnOnce(NotificationId, TimerTicket) + Send + 'static,
    {
        self.cancel(&id);

        // Deadline is taken from the runtime's clock now, not when the task is first polled
        let _guard = runtime.enter();
        let Some(deadline) = Instant::now().checked_add(ttl) else {
            trace!("Timer for '{}' not armed: {:?} is beyond the clock range", id, ttl);
            return None;
        };

        let ticket = TimerTicket(self.next_ticket);
        self.next_ticket += 1;

        let token = self.root.child_token();
        let task_token = token.clone();
        let task_id = id.clone();

        runtime.spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => on_expiry(task_id, ticket),
            }
        });

        trace!("Timer {:?} for '{}' {} ({:?})", ticket, id, TimerState::Armed, ttl);
        self.armed.insert(id, ArmedTimer { ticket, deadline, token });
        Some(ticket)
    }

    /// Accept an expiry callback. Returns true only for the ticket currently
    /// armed for `id`; the countdown is then discarded.
    pub fn fire(&mut self, id: &NotificationId, ticket: TimerTicket) -> bool {
        match self.armed.get(id) {
            Some(timer) if timer.ticket == ticket => {
                self.armed.remove(id);
                self.fired += 1;
                trace!("Timer {:?} for '{}' {}", ticket, id, TimerState::Fired);
                true
            }
            _ => {
                trace!("Ignoring stale timer {:?} for '{}'", ticket, id);
                false
            }
        }
    }

    /// Stop the countdown for `id`, if one is armed
    pub fn cancel(&mut self, id: &NotificationId) -> bool {
        match self.armed.remove(id) {
            Some(timer) => {
                timer.token.cancel();
                self.cancelled += 1;
                trace!("Timer {:?} for '{}' {}", timer.ticket, id, TimerState::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Stop every armed countdown, returning how many were stopped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.armed.len();
        for (_, timer) in self.armed.drain() {
            timer.token.cancel();
        }
        self.cancelled += count as u64;
        if count > 0 {
            trace!("Cancelled {} armed timers", count);
        }
        count
    }

    pub fn is_armed(&self, id: &NotificationId) -> bool {
        self.armed.contains_key(id)
    }

    /// Deadline of the countdown armed for `id`
    pub fn deadline(&self, id: &NotificationId) -> Option<Instant> {
        self.armed.get(id).map(|timer| timer.deadline)
    }

    pub fn stats(&self) -> TimerStats {
        TimerStats {
            armed: self.armed.len(),
            fired: self.fired,
            cancelled: self.cancelled,
        }
    }
}

impl Drop for TimerSupervisor {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use parking_lot::Mutex;

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_timer_state_names() {
        assert_eq!(TimerState::Armed.to_string(), "armed");
        assert_eq!(TimerState::Fired.to_string(), "fired");
        assert_eq!(TimerState::Cancelled.to_string(), "cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_callback_runs_after_deadline() {
        let supervisor = Arc::new(Mutex::new(TimerSupervisor::new()));
        let expired = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&expired);
        supervisor.lock().arm(
            &Handle::current(),
            "a".into(),
            Duration::from_millis(50),
            move |id, ticket| sink.lock().push((id, ticket)),
        );

        tokio::time::advance(Duration::from_millis(49)).await;
        settle().await;
        assert!(expired.lock().is_empty());

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        let calls = expired.lock().clone();
        assert_eq!(calls.len(), 1);

        let (id, ticket) = &calls[0];
        let mut supervisor = supervisor.lock();
        assert!(supervisor.fire(id, *ticket));
        assert!(!supervisor.fire(id, *ticket), "a ticket fires at most once");
        assert_eq!(supervisor.stats(), TimerStats { armed: 0, fired: 1, cancelled: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_calls_back() {
        let mut supervisor = TimerSupervisor::new();
        let expired = Arc::new(Mutex::new(0usize));

        let sink = Arc::clone(&expired);
        supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(10), move |_, _| {
            *sink.lock() += 1;
        });
        assert!(supervisor.is_armed(&"a".into()));
        assert!(supervisor.cancel(&"a".into()));
        assert!(!supervisor.cancel(&"a".into()));

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(*expired.lock(), 0);
        assert_eq!(supervisor.stats().cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_rejected_after_cancel_all() {
        let mut supervisor = TimerSupervisor::new();
        let ticket = supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(1), |_, _| {}).unwrap();
        supervisor.arm(&Handle::current(), "b".into(), Duration::from_millis(1), |_, _| {});

        assert_eq!(supervisor.cancel_all(), 2);
        assert!(!supervisor.fire(&"a".into(), ticket));
        assert_eq!(supervisor.stats(), TimerStats { armed: 0, fired: 0, cancelled: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_ticket() {
        let mut supervisor = TimerSupervisor::new();
        let first = supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(5), |_, _| {}).unwrap();
        let second = supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(5), |_, _| {}).unwrap();

        assert_ne!(first, second);
        assert!(!supervisor.fire(&"a".into(), first));
        assert!(supervisor.fire(&"a".into(), second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_uses_arming_time() {
        let mut supervisor = TimerSupervisor::new();
        let before = Instant::now();
        supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(100), |_, _| {});
        assert_eq!(supervisor.deadline(&"a".into()), Some(before + Duration::from_millis(100)));
        assert_eq!(supervisor.deadline(&"missing".into()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_deadline_is_not_armed() {
        let mut supervisor = TimerSupervisor::new();
        supervisor.arm(&Handle::current(), "a".into(), Duration::from_millis(5), |_, _| {});

        let ticket = supervisor.arm(&Handle::current(), "a".into(), Duration::MAX, |_, _| {});
        assert!(ticket.is_none());
        assert!(!supervisor.is_armed(&"a".into()));
        assert_eq!(supervisor.stats(), TimerStats { armed: 0, fired: 0, cancelled: 1 });
    }
}
