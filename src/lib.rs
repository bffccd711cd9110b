//! # taskgate
//!
//! **Taskgate** is a bounded-concurrency task queue for async Rust.
//!
//! It throttles asynchronous work: callers submit zero-argument units of
//! work, the queue starts them in strict FIFO order capped by a concurrency
//! limit, with an optional cooldown between a completion and the next start.
//! Both policies may be dynamic, re-evaluated at every scheduling decision.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!    caller ── submit(work) ──► Queue
//!                                 │ append FIFO, return TaskHandle
//!                                 ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │ Scheduler (single-mutex state machine)                         │
//! │  - queued: VecDeque<Entry>   (submission order)                │
//! │  - running count             (0..=concurrency())               │
//! │  - Concurrency / Cooldown    (re-evaluated per decision)       │
//! │  - drain waiters             (backing `done`)                  │
//! └───────┬────────────────────────────────────────────────────────┘
//!         │ slot free? pop front ► Running ► tokio::spawn(work)
//!         ▼                                        │
//!   Bus (broadcast) ◄── lifecycle events ──── settlement
//!         │                                        │
//!         ▼                              per-task oneshot ──► TaskHandle
//!   SubscriberSet ──► worker ──► subscriber.on_event()     resolves/rejects
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Queued ──start──► Running ──settle(ok)───► Completed
//!    │                  └────settle(err)──► Failed
//!    └───cancel────► Canceled
//!
//! start:  only by the scheduler, FIFO, while running < concurrency()
//! settle: frees the slot, resolves the handle, waits cooldown(), re-arms
//! cancel: pre-start only; running tasks always complete
//! ```
//!
//! ## Features
//! | Area            | Description                                               | Key types                             |
//! |-----------------|-----------------------------------------------------------|---------------------------------------|
//! | **Submission**  | Queue work, get a dual-mode handle.                       | [`Queue`], [`TaskHandle`]             |
//! | **Wrapping**    | Turn any function into a queued version of itself.        | [`Queue::wrap`], [`Outcome`]          |
//! | **Policies**    | Fixed or dynamic concurrency/cooldown.                    | [`Concurrency`], [`Cooldown`]         |
//! | **Inspection**  | Task state, cancellation, queue length, drain future.     | [`Task`], [`TaskState`]               |
//! | **Errors**      | Verbatim work errors, panics, cancellation.               | [`TaskError`]                         |
//! | **Observability**| Lifecycle events, pluggable subscribers.                 | [`Event`], [`Subscribe`], [`Bus`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use taskgate::{Queue, QueueConfig, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     // At most two tasks in flight, 50ms breather between starts.
//!     let queue = Queue::new(
//!         QueueConfig::default()
//!             .with_concurrency(2)
//!             .with_cooldown(Duration::from_millis(50)),
//!     );
//!
//!     let handle = queue.submit(|| async {
//!         // do work...
//!         Ok::<_, TaskError>("Hello")
//!     });
//!
//!     // Inspect synchronously...
//!     assert!(handle.is_running() || handle.is_queued());
//!
//!     // ...or await the outcome.
//!     assert_eq!(handle.await?, "Hello");
//!
//!     queue.done().await;
//!     assert!(queue.is_empty());
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Queue, QueueBuilder, QueueConfig};
pub use error::TaskError;
pub use events::{Bus, Event, EventKind};
pub use policies::{Concurrency, Cooldown};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Awaitable, Outcome, Task, TaskHandle, TaskState};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
