//! # Task record and lifecycle state.
//!
//! [`Task`] is the synchronously inspectable record for one submitted unit of
//! work. It is a cheap cloneable handle over shared state; identity is the
//! process-unique [`Task::id`], and tasks are never reused.
//!
//! ## State machine
//! ```text
//! Queued ──start──► Running ──settle(ok)───► Completed
//!    │                  └────settle(err)──► Failed
//!    └───cancel────► Canceled
//! ```
//! `Completed`, `Failed` and `Canceled` are terminal; reaching one removes
//! the task from the queue's tracked set. There is no `Running → Canceled`
//! edge: cancellation is effective only before a task starts.

use std::sync::Weak;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use crate::core::Scheduler;

/// Global counter for task identity.
static TASK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle state of a submitted task.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for a concurrency slot, in submission order.
    Queued = 0,
    /// Work was invoked and has not settled yet.
    Running = 1,
    /// Work settled successfully (terminal).
    Completed = 2,
    /// Work settled with an error or panic (terminal).
    Failed = 3,
    /// Canceled before it started (terminal).
    Canceled = 4,
}

impl TaskState {
    /// Returns `true` for `Completed`, `Failed` and `Canceled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
        }
    }

    fn from_u8(raw: u8) -> TaskState {
        match raw {
            0 => TaskState::Queued,
            1 => TaskState::Running,
            2 => TaskState::Completed,
            3 => TaskState::Failed,
            _ => TaskState::Canceled,
        }
    }
}

/// # Inspectable record for one submitted task.
///
/// Cloning is cheap (shared core). The record stays readable after the task
/// settles, even though the queue no longer tracks it.
///
/// # Example
/// ```no_run
/// use taskgate::{Queue, QueueConfig, TaskState};
///
/// # async fn demo() {
/// let queue = Queue::new(QueueConfig::default());
/// let handle = queue.submit(|| async { Ok::<_, taskgate::TaskError>(42) });
///
/// // Deref gives the plain record view without consuming the handle.
/// assert!(matches!(handle.state(), TaskState::Queued | TaskState::Running));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Task {
    core: std::sync::Arc<TaskCore>,
}

#[derive(Debug)]
struct TaskCore {
    id: u64,
    state: AtomicU8,
    scheduler: Weak<Scheduler>,
}

impl Task {
    /// Creates a fresh record in the `Queued` state, bound to its scheduler.
    pub(crate) fn new(scheduler: Weak<Scheduler>) -> Self {
        Self {
            core: std::sync::Arc::new(TaskCore {
                id: TASK_SEQ.fetch_add(1, Ordering::Relaxed),
                state: AtomicU8::new(TaskState::Queued as u8),
                scheduler,
            }),
        }
    }

    /// Returns the process-unique task id.
    pub fn id(&self) -> u64 {
        self.core.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.core.state.load(Ordering::Acquire))
    }

    /// Returns `true` while the task waits for a concurrency slot.
    pub fn is_queued(&self) -> bool {
        self.state() == TaskState::Queued
    }

    /// Returns `true` while the task's work is in flight.
    pub fn is_running(&self) -> bool {
        self.state() == TaskState::Running
    }

    /// Returns `true` once the task reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Requests cancellation.
    ///
    /// Effective only while the task is still `Queued`: the task is removed
    /// from the queue and its handle rejects with
    /// [`TaskError::Canceled`](crate::TaskError::Canceled). Returns `false`
    /// (and does nothing) when the task already started, already settled, or
    /// the queue is gone — started work always runs to completion.
    pub fn cancel(&self) -> bool {
        match self.core.scheduler.upgrade() {
            Some(scheduler) => scheduler.cancel(self.id()),
            None => false,
        }
    }

    pub(crate) fn set_state(&self, state: TaskState) {
        self.core.state.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = Task::new(Weak::new());
        let b = Task::new(Weak::new());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_new_task_is_queued() {
        let task = Task::new(Weak::new());
        assert_eq!(task.state(), TaskState::Queued);
        assert!(task.is_queued());
        assert!(!task.is_running());
        assert!(!task.is_terminal());
    }

    #[test]
    fn test_state_transitions_visible_through_clones() {
        let task = Task::new(Weak::new());
        let view = task.clone();
        task.set_state(TaskState::Running);
        assert!(view.is_running());
        task.set_state(TaskState::Completed);
        assert!(view.is_terminal());
    }

    #[test]
    fn test_cancel_without_scheduler_is_noop() {
        let task = Task::new(Weak::new());
        assert!(!task.cancel());
        assert_eq!(task.state(), TaskState::Queued);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Canceled.is_terminal());
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }
}
