//! # Concurrency policy: the maximum number of running tasks.
//!
//! [`Concurrency`] caps how many tasks the queue allows in the `Running`
//! state simultaneously. It is either a fixed number or a closure evaluated
//! at every scheduling decision, so the cap can track a live signal.
//!
//! ## Non-positive limits
//! A limit `<= 0` is accepted and never validated: the queue then accepts
//! submissions forever without starting any of them. This is occasionally
//! useful (it guarantees a task stays `Queued`, e.g. to exercise pre-start
//! cancellation) but a caller can also create a permanently stalled queue
//! without noticing. There is no error raised for it.
//!
//! # Example
//! ```
//! use taskgate::Concurrency;
//!
//! let fixed = Concurrency::fixed(4);
//! assert_eq!(fixed.current(), 4);
//!
//! // Track an external signal; re-evaluated at each scheduling decision.
//! let dynamic = Concurrency::dynamic(|| 2 * 3);
//! assert_eq!(dynamic.current(), 6);
//! ```

use std::fmt;
use std::sync::Arc;

/// Maximum number of tasks allowed to run simultaneously.
///
/// Defaults to `1` (strictly sequential execution).
#[derive(Clone)]
pub struct Concurrency {
    source: Source,
}

#[derive(Clone)]
enum Source {
    Fixed(i64),
    Dynamic(Arc<dyn Fn() -> i64 + Send + Sync>),
}

impl Concurrency {
    /// Creates a fixed concurrency limit.
    ///
    /// Values `<= 0` stall the queue (see module docs).
    pub fn fixed(limit: i64) -> Self {
        Self {
            source: Source::Fixed(limit),
        }
    }

    /// Creates a limit backed by a closure, evaluated fresh at every
    /// scheduling decision.
    pub fn dynamic(provider: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            source: Source::Dynamic(Arc::new(provider)),
        }
    }

    /// Returns the current limit.
    pub fn current(&self) -> i64 {
        match &self.source {
            Source::Fixed(limit) => *limit,
            Source::Dynamic(provider) => provider(),
        }
    }
}

impl Default for Concurrency {
    /// Sequential execution: one running task at a time.
    fn default() -> Self {
        Self::fixed(1)
    }
}

impl From<i64> for Concurrency {
    fn from(limit: i64) -> Self {
        Self::fixed(limit)
    }
}

impl fmt::Debug for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Fixed(limit) => f.debug_tuple("Concurrency::fixed").field(limit).finish(),
            Source::Dynamic(_) => f.write_str("Concurrency::dynamic(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_default_is_one() {
        assert_eq!(Concurrency::default().current(), 1);
    }

    #[test]
    fn test_fixed_value() {
        assert_eq!(Concurrency::fixed(4).current(), 4);
        assert_eq!(Concurrency::from(7).current(), 7);
    }

    #[test]
    fn test_negative_value_is_accepted() {
        assert_eq!(Concurrency::fixed(-1).current(), -1);
    }

    #[test]
    fn test_dynamic_is_reevaluated() {
        let signal = Arc::new(AtomicI64::new(1));
        let reads = Arc::clone(&signal);
        let policy = Concurrency::dynamic(move || reads.load(Ordering::SeqCst));

        assert_eq!(policy.current(), 1);
        signal.store(8, Ordering::SeqCst);
        assert_eq!(policy.current(), 8);
    }
}
