//! # Cooldown policy: the delay between a settlement and the next start.
//!
//! [`Cooldown`] is the minimum time the queue waits after a task settles
//! before starting the next queued task. Like [`Concurrency`](crate::Concurrency)
//! it is either a fixed duration or a closure evaluated fresh after every
//! settlement, so the throttle can track a live signal.
//!
//! A zero cooldown (the default) makes the queue start the next task
//! immediately on the completion path, without going through a timer.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskgate::Cooldown;
//!
//! let fixed = Cooldown::fixed(Duration::from_millis(250));
//! assert_eq!(fixed.current(), Duration::from_millis(250));
//!
//! let none = Cooldown::default();
//! assert!(none.current().is_zero());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Minimum delay between a task's settlement and the next task's start.
///
/// Defaults to [`Duration::ZERO`] (no throttling).
#[derive(Clone)]
pub struct Cooldown {
    source: Source,
}

#[derive(Clone)]
enum Source {
    Fixed(Duration),
    Dynamic(Arc<dyn Fn() -> Duration + Send + Sync>),
}

impl Cooldown {
    /// Creates a fixed cooldown.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            source: Source::Fixed(delay),
        }
    }

    /// Creates a cooldown backed by a closure, evaluated fresh after every
    /// settlement.
    pub fn dynamic(provider: impl Fn() -> Duration + Send + Sync + 'static) -> Self {
        Self {
            source: Source::Dynamic(Arc::new(provider)),
        }
    }

    /// Returns the current delay.
    pub fn current(&self) -> Duration {
        match &self.source {
            Source::Fixed(delay) => *delay,
            Source::Dynamic(provider) => provider(),
        }
    }
}

impl Default for Cooldown {
    /// No delay between tasks.
    fn default() -> Self {
        Self::fixed(Duration::ZERO)
    }
}

impl From<Duration> for Cooldown {
    fn from(delay: Duration) -> Self {
        Self::fixed(delay)
    }
}

impl fmt::Debug for Cooldown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Fixed(delay) => f.debug_tuple("Cooldown::fixed").field(delay).finish(),
            Source::Dynamic(_) => f.write_str("Cooldown::dynamic(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_default_is_zero() {
        assert!(Cooldown::default().current().is_zero());
    }

    #[test]
    fn test_fixed_value() {
        let policy = Cooldown::fixed(Duration::from_millis(100));
        assert_eq!(policy.current(), Duration::from_millis(100));
    }

    #[test]
    fn test_dynamic_is_reevaluated() {
        let millis = Arc::new(AtomicU64::new(10));
        let reads = Arc::clone(&millis);
        let policy = Cooldown::dynamic(move || Duration::from_millis(reads.load(Ordering::SeqCst)));

        assert_eq!(policy.current(), Duration::from_millis(10));
        millis.store(500, Ordering::SeqCst);
        assert_eq!(policy.current(), Duration::from_millis(500));
    }
}
