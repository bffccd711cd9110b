//! Task representation and dual-mode handles.
//!
//! ## Contents
//! - [`Task`], [`TaskState`] — the inspectable record tracked by the queue
//! - [`Awaitable`] — generic sync-record + future wrapper
//! - [`TaskHandle`], [`Outcome`] — what [`Queue::submit`](crate::Queue::submit)
//!   and [`Queue::wrap`](crate::Queue::wrap) hand back to callers
//!
//! A handle is both views at once: deref to the [`Task`] record to inspect or
//! cancel without consuming anything, or await it to consume the outcome.

mod awaitable;
mod handle;
mod task;

pub use awaitable::Awaitable;
pub use handle::{Outcome, TaskHandle};
pub(crate) use handle::bind;
pub use task::{Task, TaskState};
