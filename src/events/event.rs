//! # Lifecycle events emitted by the queue.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: task flow (queued, starting, completed, failed,
//!   canceled)
//! - **Scheduling events**: cooldown gating and queue drain
//! - **Subscriber events**: fan-out diagnostics (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! task id, error messages, and cooldown delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use taskgate::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::TaskFailed)
//!     .with_task(7)
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task, Some(7));
//! assert_eq!(ev.error.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// Task was submitted and appended to the queue.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskQueued,

    /// Task transitioned `Queued → Running` and its work was invoked.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskStarting,

    /// Task settled successfully; its handle resolved with the result.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskCompleted,

    /// Task settled with an error (work failure or panic); its handle
    /// rejected.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `error`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskFailed,

    /// Task was canceled before it started and removed from the queue.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskCanceled,

    // === Scheduling events ===
    /// A settlement scheduled the next start after a cooldown delay.
    ///
    /// Sets:
    /// - `delay`: the cooldown delay
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CooldownScheduled,

    /// The tracked set became empty (all tasks reached a terminal state).
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    QueueDrained,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `error`: reason string (e.g., "full", "closed")
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `error`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,
}

/// Queue event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the task, if applicable.
    pub task: Option<u64>,
    /// Human-readable error/reason (failures, overflow details, etc.).
    pub error: Option<Arc<str>>,
    /// Cooldown delay before the next start, if applicable.
    pub delay: Option<Duration>,
    /// Name of the subscriber, for fan-out diagnostics.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            error: None,
            delay: None,
            subscriber: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: u64) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a human-readable error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a cooldown delay.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::now(EventKind::SubscriberOverflow).with_error(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::now(EventKind::SubscriberPanicked).with_error(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Returns `true` for terminal task events (completed/failed/canceled).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskCompleted | EventKind::TaskFailed | EventKind::TaskCanceled
        )
    }
}
