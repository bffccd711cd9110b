//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`] — distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N
//!   while B processes N+5
//! - **Overflow**: event dropped for that subscriber only,
//!   `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! Subscriber-diagnostic events are never re-reported on overflow, so a full
//! queue cannot feed itself.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// Manages per-subscriber queues and worker tasks: concurrent delivery,
/// isolation, panic safety, and overflow reporting.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Workers start immediately and process events until their queue
    /// closes. Minimum queue capacity is 1 (enforced). Must be called within
    /// a Tokio runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());

        for subscriber in subscribers {
            let capacity = subscriber.queue_capacity().max(1);
            let name = subscriber.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(capacity);
            let worker_bus = bus.clone();

            tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = subscriber.on_event(ev.as_ref());
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        worker_bus.publish(Event::subscriber_panicked(
                            subscriber.name(),
                            panic_message(payload.as_ref()),
                        ));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self { channels, bus }
    }

    /// Emits an event to all subscribers without blocking.
    ///
    /// The event is cloned once into an `Arc` and `try_send`-delivered to
    /// each per-subscriber queue. A full or closed queue drops the event for
    /// that subscriber only and publishes `SubscriberOverflow` — unless the
    /// event is itself a subscriber diagnostic, which is never re-reported.
    pub fn emit(&self, event: &Event) {
        if self.channels.is_empty() {
            return;
        }
        let diagnostic = matches!(
            event.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        );
        let event = Arc::new(event.clone());

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !diagnostic {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Returns the number of attached subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` when the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
