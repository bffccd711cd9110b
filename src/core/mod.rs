//! Queue core: public facade, scheduler state machine, configuration.
//!
//! The only public API from this module is [`Queue`] (with its builder) and
//! [`QueueConfig`]. The scheduler itself is internal:
//!
//! - [`queue`]: caller-facing facade (`submit`, `wrap`, `cancel`, `len`,
//!   `done`) and subscriber wiring;
//! - [`scheduler`]: FIFO state machine, concurrency gate, cooldown timer,
//!   settlement path;
//! - [`config`]: construction-time options.

mod config;
mod queue;
mod scheduler;

pub use config::QueueConfig;
pub use queue::{Queue, QueueBuilder};
pub(crate) use scheduler::Scheduler;
