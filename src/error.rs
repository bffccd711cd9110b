//! Error types produced by queued work.
//!
//! This module defines [`TaskError`], the error observed when awaiting a task
//! handle. Failures are always local to their task: the queue converts a
//! failed or panicking work item into a `Failed` settlement and keeps
//! scheduling, so one task's error is never visible to another.
//!
//! The helper methods (`as_label`, `as_message`) provide short stable strings
//! for logging/metrics.

use thiserror::Error;

/// # Errors produced by a queued task.
///
/// Awaiting a [`TaskHandle`](crate::TaskHandle) surfaces exactly one of:
/// - the work item's own failure ([`TaskError::Fail`], message verbatim),
/// - a panic raised while the work was running ([`TaskError::Panicked`]),
/// - a pre-start cancellation ([`TaskError::Canceled`]).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Work item failed with an application error.
    ///
    /// The message is rendered verbatim; the queue never wraps or renames
    /// errors raised by submitted work.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Work item panicked while running.
    ///
    /// The panic is caught at the point of invocation and converted into a
    /// failed settlement; the queue itself keeps running.
    #[error("task panicked: {error}")]
    Panicked {
        /// The panic payload, when it carried a message.
        error: String,
    },

    /// Task was canceled before it started.
    ///
    /// Raised only by a successful [`Queue::cancel`](crate::Queue::cancel) on
    /// a still-queued task; tasks that already started always run to
    /// completion.
    #[error("Task canceled")]
    Canceled,
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from any displayable error.
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { error } => format!("panic: {error}"),
            TaskError::Canceled => "canceled before start".to_string(),
        }
    }

    /// Indicates whether the error comes from cancellation rather than from
    /// the work item itself.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_display_is_verbatim() {
        let err = TaskError::fail("Oops!");
        assert_eq!(err.to_string(), "Oops!");
    }

    #[test]
    fn test_canceled_display() {
        assert_eq!(TaskError::Canceled.to_string(), "Task canceled");
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { error: "x".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn test_is_cancellation() {
        assert!(TaskError::Canceled.is_cancellation());
        assert!(!TaskError::fail("x").is_cancellation());
    }
}
