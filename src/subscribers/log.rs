//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [queued] task=3
//! [starting] task=3
//! [failed] task=3 err="connection refused"
//! [cooldown] delay=250ms
//! [canceled] task=4
//! [drained]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskQueued => {
                println!("[queued] task={:?}", e.task);
            }
            EventKind::TaskStarting => {
                println!("[starting] task={:?}", e.task);
            }
            EventKind::TaskCompleted => {
                println!("[completed] task={:?}", e.task);
            }
            EventKind::TaskFailed => {
                println!("[failed] task={:?} err={:?}", e.task, e.error);
            }
            EventKind::TaskCanceled => {
                println!("[canceled] task={:?}", e.task);
            }
            EventKind::CooldownScheduled => {
                println!("[cooldown] delay={:?}", e.delay);
            }
            EventKind::QueueDrained => {
                println!("[drained]");
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.subscriber, e.error
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.subscriber.unwrap_or("unknown"),
                    e.error.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
