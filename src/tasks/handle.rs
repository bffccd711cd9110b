//! # Task handles: the values `submit` and `wrap` return.
//!
//! - [`TaskHandle`] — the dual-mode handle from
//!   [`Queue::submit`](crate::Queue::submit): derefs to the [`Task`] record
//!   (inspect, cancel) and awaits to the task's outcome.
//! - [`Outcome`] — just the future portion, as returned by
//!   [`Queue::wrap`](crate::Queue::wrap)ped functions.
//!
//! Completion is signaled per task over a dedicated oneshot channel: the
//! scheduler resolves or rejects the sender exactly once, after its own
//! bookkeeping, so a resolved handle always observes the queue's updated
//! length.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::tasks::{Awaitable, Task};

/// Dual-mode handle for a submitted task.
///
/// Deref to [`Task`] for the synchronous view (`state()`, `is_running()`,
/// `cancel()`); await it for the asynchronous view. Awaiting surfaces the
/// work's own result or error verbatim, or
/// [`TaskError::Canceled`] when the task was canceled before starting.
pub type TaskHandle<T> = Awaitable<Task, Result<T, TaskError>>;

/// Future portion of a task handle.
///
/// Resolves exactly once with the task's settlement. If the queue is dropped
/// with the task still pending, resolves with [`TaskError::Canceled`].
pub struct Outcome<T> {
    rx: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> Outcome<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, TaskError>>) -> Self {
        Self { rx }
    }
}

impl<T> Future for Outcome<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(settlement)) => Poll::Ready(settlement),
            // Sender dropped without settling: the queue went away.
            Poll::Ready(Err(_closed)) => Poll::Ready(Err(TaskError::Canceled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Binds a task record and its completion channel into a [`TaskHandle`].
pub(crate) fn bind<T: Send + 'static>(
    task: Task,
    rx: oneshot::Receiver<Result<T, TaskError>>,
) -> TaskHandle<T> {
    Awaitable::new(task, Outcome::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;

    #[tokio::test]
    async fn test_outcome_resolves_with_settlement() {
        let (tx, rx) = oneshot::channel::<Result<u32, TaskError>>();
        tx.send(Ok(5)).unwrap();
        assert_eq!(Outcome::new(rx).await, Ok(5));
    }

    #[tokio::test]
    async fn test_outcome_maps_closed_channel_to_canceled() {
        let (tx, rx) = oneshot::channel::<Result<u32, TaskError>>();
        drop(tx);
        assert_eq!(Outcome::new(rx).await, Err(TaskError::Canceled));
    }

    #[tokio::test]
    async fn test_handle_exposes_record_and_outcome() {
        let (tx, rx) = oneshot::channel::<Result<&'static str, TaskError>>();
        let task = Task::new(Weak::new());
        let id = task.id();
        let handle = bind(task, rx);

        assert_eq!(handle.id(), id);
        assert!(handle.is_queued());

        tx.send(Ok("Hello")).unwrap();
        assert_eq!(handle.await, Ok("Hello"));
    }
}
