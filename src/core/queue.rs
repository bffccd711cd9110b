//! # Queue: the caller-facing facade.
//!
//! [`Queue`] owns the scheduler and the event bus, wires optional
//! subscribers, and exposes the submission API:
//!
//! - [`Queue::submit`] — enqueue work, get a dual-mode [`TaskHandle`]
//! - [`Queue::wrap`] — turn a function into a queued version of itself
//! - [`Queue::cancel`] — pre-start cancellation
//! - [`Queue::len`] / [`Queue::done`] — tracked count and drain future
//!
//! ## Example
//! ```no_run
//! use taskgate::{Queue, QueueConfig, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let queue = Queue::new(QueueConfig::default().with_concurrency(2));
//!
//!     let handle = queue.submit(|| async { Ok::<_, TaskError>("Hello") });
//!     assert_eq!(handle.await?, "Hello");
//!     assert_eq!(queue.len(), 0);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::core::config::QueueConfig;
use crate::core::scheduler::Scheduler;
use crate::error::TaskError;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{Outcome, Task, TaskHandle, bind};

/// Bounded-concurrency FIFO task queue.
///
/// Cloning is cheap and clones share the same queue. The queue lives for as
/// long as any clone (or undelivered handle) does; it is never implicitly
/// shut down.
///
/// All submission paths require a running Tokio runtime: started work
/// executes on `tokio::spawn`.
#[derive(Clone)]
pub struct Queue {
    scheduler: Arc<Scheduler>,
    subscribers: Option<Arc<SubscriberSet>>,
}

impl Queue {
    /// Creates a queue with the given configuration and no subscribers.
    pub fn new(config: QueueConfig) -> Self {
        QueueBuilder::new(config).build_without_listener()
    }

    /// Starts building a queue, allowing subscribers to be attached.
    pub fn builder(config: QueueConfig) -> QueueBuilder {
        QueueBuilder::new(config)
    }

    /// Queues a unit of work and returns its dual-mode handle.
    ///
    /// Synchronous call, asynchronous completion: the work is appended in
    /// FIFO order, the scheduler immediately starts as much queued work as
    /// the concurrency limit allows, and the call returns without blocking.
    ///
    /// Awaiting the handle yields the work's own result or error verbatim;
    /// deref gives the inspectable [`Task`] record.
    ///
    /// # Example
    /// ```no_run
    /// # use taskgate::{Queue, QueueConfig, TaskError};
    /// # async fn demo(queue: &Queue) -> Result<(), TaskError> {
    /// let handle = queue.submit(|| async { Ok::<_, TaskError>(2 + 2) });
    /// assert_eq!(handle.await?, 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn submit<T, F, Fut>(&self, work: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let (task, rx) = self.scheduler.enqueue(work);
        bind(task, rx)
    }

    /// Wraps a function so that each call is queued.
    ///
    /// The wrapped function captures its argument per call, submits a
    /// closure invoking `f` with it, and returns only the future portion of
    /// the handle (not the inspectable record). Pass several arguments as a
    /// tuple.
    ///
    /// # Example
    /// ```no_run
    /// # use taskgate::{Queue, QueueConfig, TaskError};
    /// # async fn demo(queue: &Queue) -> Result<(), TaskError> {
    /// let greet = queue.wrap(|name: &'static str| async move {
    ///     Ok::<_, TaskError>(format!("Hello {name}!"))
    /// });
    /// assert_eq!(greet("World").await?, "Hello World!");
    /// # Ok(())
    /// # }
    /// ```
    pub fn wrap<A, T, F, Fut>(&self, f: F) -> impl Fn(A) -> Outcome<T>
    where
        A: Send + 'static,
        T: Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let scheduler = Arc::clone(&self.scheduler);
        let f = Arc::new(f);
        move |arg: A| {
            let f = Arc::clone(&f);
            let (_task, rx) = scheduler.enqueue(move || f(arg));
            Outcome::new(rx)
        }
    }

    /// Cancels a task that has not started yet.
    ///
    /// On success the task is removed from the queue, marked `Canceled`, and
    /// its handle rejects with [`TaskError::Canceled`]. Returns `false` (a
    /// no-op) when the task is already running or settled: started work
    /// always runs to completion and keeps its concurrency slot.
    ///
    /// Equivalent to [`Task::cancel`] on the handle itself.
    pub fn cancel(&self, task: &Task) -> bool {
        self.scheduler.cancel(task.id())
    }

    /// Number of tasks still tracked (queued + running).
    pub fn len(&self) -> usize {
        self.scheduler.len()
    }

    /// Returns `true` when no task is queued or running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once the queue becomes empty.
    ///
    /// Resolves immediately when nothing is tracked; otherwise on the next
    /// transition-to-empty, whichever terminal state (completed, failed or
    /// canceled) the last task reaches. If the queue never drains, neither
    /// does this future.
    pub async fn done(&self) {
        if let Some(rx) = self.scheduler.drain_waiter() {
            // A dropped sender means the scheduler went away, which also
            // counts as drained.
            let _ = rx.await;
        }
    }

    /// Current concurrency limit (re-evaluates a dynamic policy).
    pub fn concurrency(&self) -> i64 {
        self.scheduler.concurrency()
    }

    /// Current cooldown delay (re-evaluates a dynamic policy).
    pub fn cooldown(&self) -> Duration {
        self.scheduler.cooldown()
    }

    /// Creates a receiver observing subsequent queue events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.scheduler.bus().subscribe()
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.as_ref().map_or(0, |set| set.len())
    }
}

/// Builder for constructing a [`Queue`] with optional subscribers.
pub struct QueueBuilder {
    config: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events (task lifecycle, cooldowns, drain)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the queue and, when subscribers are attached, spawns the
    /// listener forwarding bus events to them.
    ///
    /// Must be called within a Tokio runtime when subscribers are present.
    pub fn build(self) -> Queue {
        let has_subscribers = !self.subscribers.is_empty();
        let queue = self.build_without_listener();
        if has_subscribers {
            queue.spawn_subscriber_listener();
        }
        queue
    }

    fn build_without_listener(self) -> Queue {
        let bus = Bus::new(self.config.bus_capacity_clamped());
        let scheduler = Scheduler::new(self.config.concurrency, self.config.cooldown, bus.clone());
        let subscribers = if self.subscribers.is_empty() {
            None
        } else {
            Some(Arc::new(SubscriberSet::new(self.subscribers, bus)))
        };
        Queue {
            scheduler,
            subscribers,
        }
    }
}

impl Queue {
    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget). A lagged receiver skips the missed events and
    /// keeps going.
    fn spawn_subscriber_listener(&self) {
        let Some(set) = self.subscribers.clone() else {
            return;
        };
        let mut rx = self.scheduler.bus().subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::policies::{Concurrency, Cooldown};
    use crate::tasks::TaskState;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tokio::time::{advance, sleep};

    /// Lets spawned scheduler tasks run without advancing the clock
    /// (the analogue of draining microtasks in the original test suite).
    async fn yield_briefly() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn test_submit_resolves_result_and_frees_queue() {
        let queue = Queue::new(QueueConfig::default());
        let handle = queue.submit(|| async { Ok::<_, TaskError>("Hello") });
        assert_eq!(handle.await, Ok("Hello"));
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_submit_returns_inspectable_record() {
        let queue = Queue::new(QueueConfig::default());
        let handle = queue.submit(|| async {
            sleep(ms(10)).await;
            Ok::<_, TaskError>(())
        });
        // Started synchronously during submit: the slot was free.
        assert!(handle.is_running());
        assert_eq!(handle.state(), TaskState::Running);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_rejects_verbatim_and_frees_queue() {
        let queue = Queue::new(QueueConfig::default());
        let handle = queue.submit(|| async { Err::<(), _>(TaskError::fail("Oops!")) });
        let err = handle.await.unwrap_err();
        assert_eq!(err.to_string(), "Oops!");
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_settlement_and_queue_continues() {
        let queue = Queue::new(QueueConfig::default());
        let exploding = queue.submit::<(), _, _>(|| async { panic!("kaboom") });
        let after = queue.submit(|| async { Ok::<_, TaskError>(7) });

        let err = exploding.await.unwrap_err();
        assert_eq!(err, TaskError::Panicked { error: "kaboom".into() });

        // A failing task never halts the scheduler.
        assert_eq!(after.await, Ok(7));
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_under_sequential_concurrency() {
        let queue = Queue::new(QueueConfig::default());
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let order = Arc::clone(&order);
                queue.submit(move || async move {
                    sleep(ms(10)).await;
                    order.lock().unwrap().push(i);
                    Ok::<_, TaskError>(i)
                })
            })
            .collect();

        // Only the first task may run at any observation point.
        assert!(handles[0].is_running());
        for handle in &handles[1..] {
            assert!(handle.is_queued());
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(order.lock().unwrap().as_slice(), &[0, 1, 2, 3]);
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_parallelism_at_two() {
        let queue = Queue::new(QueueConfig::default().with_concurrency(2));
        let work = || async {
            sleep(ms(10)).await;
            Ok::<_, TaskError>(())
        };
        let h1 = queue.submit(work);
        let h2 = queue.submit(work);
        let h3 = queue.submit(work);

        // Immediately after submission: two running, third queued.
        assert!(h1.is_running());
        assert!(h2.is_running());
        assert!(h3.is_queued());
        assert_eq!(queue.len(), 3);

        let t3 = h3.record().clone();
        h1.await.unwrap();
        yield_briefly().await;
        // A slot freed with zero cooldown: the queued task started at once.
        assert!(!t3.is_queued());

        h2.await.unwrap();
        h3.await.unwrap();
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_delays_next_start() {
        let queue = Queue::new(QueueConfig::default().with_cooldown(ms(10)));
        let h1 = queue.submit(|| async {
            sleep(ms(10)).await;
            Ok::<_, TaskError>(())
        });
        let h2 = queue.submit(|| async { Ok::<_, TaskError>(()) });
        let t2 = h2.record().clone();

        assert!(h1.is_running());
        assert!(t2.is_queued());

        h1.await.unwrap();
        yield_briefly().await;

        // Settled, but the cooldown gate holds the next start.
        assert!(t2.is_queued());

        advance(ms(5)).await;
        yield_briefly().await;
        assert!(t2.is_queued(), "not started before the cooldown elapses");

        advance(ms(6)).await;
        yield_briefly().await;
        assert!(!t2.is_queued(), "started once the cooldown elapsed");
        h2.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_queued_task_rejects_and_shrinks_queue() {
        // A non-positive limit keeps every submission queued forever,
        // which guarantees the task has not started when cancel arrives.
        let queue = Queue::new(QueueConfig::default().with_concurrency(Concurrency::fixed(-1)));
        let handle = queue.submit(|| async { Ok::<_, TaskError>(42) });
        assert_eq!(queue.len(), 1);
        assert!(handle.is_queued());

        assert!(handle.cancel());
        assert_eq!(queue.len(), 0);
        assert_eq!(handle.state(), TaskState::Canceled);

        let err = handle.await.unwrap_err();
        assert_eq!(err, TaskError::Canceled);
        assert_eq!(err.to_string(), "Task canceled");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_on_terminal_tasks() {
        let queue = Queue::new(QueueConfig::default().with_concurrency(Concurrency::fixed(-1)));
        let handle = queue.submit(|| async { Ok::<_, TaskError>(()) });
        assert!(handle.cancel());
        assert!(!handle.cancel(), "second cancel finds nothing to remove");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_running_task_is_noop() {
        let queue = Queue::new(QueueConfig::default());
        let handle = queue.submit(|| async {
            sleep(ms(10)).await;
            Ok::<_, TaskError>("survived")
        });
        assert!(handle.is_running());

        // No preemption: the request is silently ignored.
        assert!(!queue.cancel(handle.record()));
        assert!(handle.is_running());

        assert_eq!(handle.await, Ok("survived"));
    }

    #[tokio::test]
    async fn test_done_resolves_immediately_when_empty() {
        let queue = Queue::new(QueueConfig::default());
        queue.done().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_resolves_when_all_tasks_settle() {
        let queue = Queue::new(QueueConfig::default().with_concurrency(2));
        let work = || async {
            sleep(ms(10)).await;
            Ok::<_, TaskError>(())
        };
        let _h1 = queue.submit(work);
        let _h2 = queue.submit(work);
        assert_eq!(queue.len(), 2);

        queue.done().await;
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_done_observes_cancellation_draining_the_queue() {
        let queue = Queue::new(QueueConfig::default().with_concurrency(Concurrency::fixed(-1)));
        let handle = queue.submit(|| async { Ok::<_, TaskError>(()) });

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.done().await })
        };
        yield_briefly().await;

        assert!(handle.cancel());
        waiter.await.unwrap();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_wrap_forwards_arguments_and_result() {
        let queue = Queue::new(QueueConfig::default());
        let add = queue.wrap(|(a, b): (i32, i32)| async move { Ok::<_, TaskError>(a + b) });
        assert_eq!(add((2, 3)).await, Ok(5));
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_wrapped_calls_are_queued_fifo() {
        let queue = Queue::new(QueueConfig::default());
        let order = Arc::new(Mutex::new(Vec::new()));
        let record = {
            let order = Arc::clone(&order);
            queue.wrap(move |i: u32| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(i);
                    Ok::<_, TaskError>(i)
                }
            })
        };

        let futures = vec![record(1), record(2), record(3)];
        for (i, fut) in futures.into_iter().enumerate() {
            assert_eq!(fut.await, Ok(i as u32 + 1));
        }
        assert_eq!(order.lock().unwrap().as_slice(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_dynamic_concurrency_is_reevaluated_per_decision() {
        let limit = Arc::new(AtomicI64::new(0));
        let reads = Arc::clone(&limit);
        let queue = Queue::new(
            QueueConfig::default()
                .with_concurrency(Concurrency::dynamic(move || reads.load(Ordering::SeqCst))),
        );

        let first = queue.submit(|| async { Ok::<_, TaskError>("first") });
        yield_briefly().await;
        assert!(first.is_queued(), "limit 0 stalls the queue");

        // Raising the limit takes effect at the next scheduling decision.
        limit.store(1, Ordering::SeqCst);
        let second = queue.submit(|| async { Ok::<_, TaskError>("second") });

        assert_eq!(first.await, Ok("first"));
        assert_eq!(second.await, Ok("second"));
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_cooldown_policy_getter() {
        let queue = Queue::new(
            QueueConfig::default().with_cooldown(Cooldown::dynamic(|| Duration::from_millis(25))),
        );
        assert_eq!(queue.cooldown(), Duration::from_millis(25));
        assert_eq!(queue.concurrency(), 1);
    }

    #[tokio::test]
    async fn test_events_follow_the_lifecycle() {
        let queue = Queue::new(QueueConfig::default());
        let mut rx = queue.events();

        let handle = queue.submit(|| async { Ok::<_, TaskError>(()) });
        let id = handle.id();
        handle.await.unwrap();

        let mut kinds = Vec::new();
        while kinds.len() < 4 {
            let ev = rx.recv().await.unwrap();
            if ev.task.is_none() || ev.task == Some(id) {
                kinds.push(ev.kind);
            }
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskQueued,
                EventKind::TaskStarting,
                EventKind::TaskCompleted,
                EventKind::QueueDrained,
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_is_local_to_its_task() {
        let queue = Queue::new(QueueConfig::default().with_concurrency(2));
        let bad = queue.submit(|| async { Err::<(), _>(TaskError::fail("local")) });
        let good = queue.submit(|| async { Ok::<_, TaskError>("fine") });

        assert!(bad.await.is_err());
        assert_eq!(good.await, Ok("fine"));
    }
}
