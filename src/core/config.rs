//! # Queue configuration.
//!
//! Provides [`QueueConfig`], the construction-time settings for a
//! [`Queue`](crate::Queue).
//!
//! ## Sentinel values
//! - `concurrency <= 0` → the queue accepts submissions but never starts
//!   them (no validation is performed; see [`Concurrency`] docs)
//! - `cooldown = 0` → the next task starts immediately on the completion
//!   path, without a timer

use crate::policies::{Concurrency, Cooldown};

/// Construction-time configuration for a [`Queue`](crate::Queue).
///
/// ## Field semantics
/// - `concurrency`: maximum simultaneously running tasks (default 1;
///   re-evaluated at every scheduling decision when dynamic)
/// - `cooldown`: minimum delay between a settlement and the next start
///   (default zero; re-evaluated after every settlement when dynamic)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
///
/// All fields are public for flexibility; the `with_*` chainers cover the
/// common cases.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskgate::{Concurrency, Cooldown, QueueConfig};
///
/// let cfg = QueueConfig::default()
///     .with_concurrency(4)
///     .with_cooldown(Duration::from_millis(50));
///
/// assert_eq!(cfg.concurrency.current(), 4);
/// assert_eq!(cfg.cooldown.current(), Duration::from_millis(50));
/// ```
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Maximum number of tasks to run concurrently.
    pub concurrency: Concurrency,

    /// Minimum delay between a task's settlement and the next task's start.
    pub cooldown: Cooldown,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by the
    /// bus).
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Returns a config with the given concurrency policy.
    pub fn with_concurrency(mut self, concurrency: impl Into<Concurrency>) -> Self {
        self.concurrency = concurrency.into();
        self
    }

    /// Returns a config with the given cooldown policy.
    pub fn with_cooldown(mut self, cooldown: impl Into<Cooldown>) -> Self {
        self.cooldown = cooldown.into();
        self
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `concurrency = 1` (strictly sequential)
    /// - `cooldown = 0` (no throttling)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            concurrency: Concurrency::default(),
            cooldown: Cooldown::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.concurrency.current(), 1);
        assert!(cfg.cooldown.current().is_zero());
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_chainers() {
        let cfg = QueueConfig::default()
            .with_concurrency(Concurrency::fixed(-1))
            .with_cooldown(Cooldown::fixed(Duration::from_millis(10)));
        assert_eq!(cfg.concurrency.current(), -1);
        assert_eq!(cfg.cooldown.current(), Duration::from_millis(10));
    }

    #[test]
    fn test_bus_capacity_clamp() {
        let mut cfg = QueueConfig::default();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
