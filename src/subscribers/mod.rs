//! Event subscribers: trait, fan-out set, and built-ins.
//!
//! Attach subscribers through [`Queue::builder`](crate::Queue::builder) to
//! observe task lifecycle events for logging, metrics or alerting. Each
//! subscriber gets a dedicated worker with a bounded queue, so a slow
//! subscriber never blocks the scheduler or other subscribers.
//!
//! ## Contents
//! - [`Subscribe`] — the extension point
//! - [`SubscriberSet`] — per-subscriber queues + workers
//! - `LogWriter` — simple stdout printer (feature `logging`)

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
