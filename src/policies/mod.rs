//! Scheduling policies: concurrency limit and cooldown delay.
//!
//! Both policies are small strategy values with a single `current()`
//! operation. They hold either a fixed value or a caller-supplied closure,
//! and the queue re-evaluates them **fresh at every scheduling decision**, so
//! external conditions (load, free memory, time of day) can vary them live.
//!
//! - [`Concurrency`]: how many tasks may be `Running` at once
//! - [`Cooldown`]: how long to wait after a settlement before the next start

mod concurrency;
mod cooldown;

pub use concurrency::Concurrency;
pub use cooldown::Cooldown;
