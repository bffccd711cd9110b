//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the queue scheduler and
//! the subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the scheduler (task lifecycle, cooldown, drain) and
//!   [`SubscriberSet`](crate::SubscriberSet) workers (overflow/panic).
//! - **Consumers**: the queue's subscriber listener, and anything holding a
//!   receiver from [`Queue::events`](crate::Queue::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
