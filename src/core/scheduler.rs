//! # Scheduler: the FIFO state machine behind the queue.
//!
//! Owns the ordered set of pending entries, the running count, and the
//! concurrency/cooldown policies, and drives every task state transition.
//!
//! ## Scheduling flow
//! ```text
//! submit ──► enqueue(entry, FIFO) ──► schedule_next()
//!                                         │
//!                running >= concurrency() ─┴─► return (capped)
//!                otherwise: pop front ► Running ► tokio::spawn(work)
//!                                                      │
//!                                               work settles (ok/err/panic)
//!                                                      ▼
//!                                                 settle():
//!                                                   1. running -= 1, drop tracking
//!                                                   2. resolve/reject handle
//!                                                   3. publish event, fire drain waiters
//!                                                   4. cooldown == 0 → schedule_next()
//!                                                      cooldown  > 0 → sleep, then schedule_next()
//! ```
//!
//! ## Rules
//! - All bookkeeping (`queued`, `running`, drain waiters) lives behind one
//!   mutex, locked only for short sections and never across an `.await` —
//!   every scheduling decision is an indivisible step.
//! - Tasks start in strict submission order; the only gate is the
//!   concurrency limit, re-evaluated fresh at each decision.
//! - A settling task always re-arms the scheduler, success or failure: one
//!   task's error never halts the queue.
//! - Cancellation touches only still-queued entries; an entry popped for
//!   running is out of `cancel`'s reach, so started work always completes.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::{TaskError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{Concurrency, Cooldown};
use crate::tasks::{Task, TaskState};

/// Resolves or rejects a task's handle, exactly once.
type Deliver = Box<dyn FnOnce() + Send>;

/// Output of a settled work future: the outcome label (for events and state)
/// plus the delivery callback, which the scheduler invokes only after its own
/// bookkeeping.
type Settled = (Result<(), TaskError>, Deliver);

/// Type-erased work item: invoking it builds the settlement future.
type Work = Box<dyn FnOnce() -> BoxFuture<'static, Settled> + Send>;

/// Shared slot for a task's completion sender.
///
/// Both the run path and the cancel path hold a reference; whichever runs
/// takes the sender. Exactly one of them ever does.
type ReplySlot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, TaskError>>>>>;

/// One queued task: its record, its work, and its rejection path.
struct Entry {
    task: Task,
    work: Work,
    reject: Box<dyn FnOnce(TaskError) + Send>,
}

/// Mutable scheduler state. Single-mutex, never held across an `.await`.
#[derive(Default)]
struct State {
    /// Entries waiting for a slot, in submission order.
    queued: VecDeque<Entry>,
    /// Number of tasks currently `Running`.
    running: usize,
    /// Senders resolved on the next transition-to-empty.
    drain_waiters: Vec<oneshot::Sender<()>>,
}

impl State {
    fn is_empty(&self) -> bool {
        self.queued.is_empty() && self.running == 0
    }

    /// Takes the drain waiters when the tracked set just became empty.
    fn take_drain_waiters(&mut self) -> Vec<oneshot::Sender<()>> {
        if self.is_empty() {
            std::mem::take(&mut self.drain_waiters)
        } else {
            Vec::new()
        }
    }
}

/// FIFO scheduler with a concurrency cap and inter-task cooldown.
pub(crate) struct Scheduler {
    concurrency: Concurrency,
    cooldown: Cooldown,
    bus: Bus,
    state: Mutex<State>,
}

impl Scheduler {
    pub(crate) fn new(concurrency: Concurrency, cooldown: Cooldown, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            concurrency,
            cooldown,
            bus,
            state: Mutex::new(State::default()),
        })
    }

    /// Locks the state, recovering from poisoning (no invariant outlives a
    /// critical section here).
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Current concurrency limit (re-evaluates a dynamic policy).
    pub(crate) fn concurrency(&self) -> i64 {
        self.concurrency.current()
    }

    /// Current cooldown delay (re-evaluates a dynamic policy).
    pub(crate) fn cooldown(&self) -> std::time::Duration {
        self.cooldown.current()
    }

    /// Number of tasks still tracked: queued + running.
    pub(crate) fn len(&self) -> usize {
        let st = self.lock();
        st.queued.len() + st.running
    }

    /// Registers a drain waiter, or returns `None` when already empty.
    pub(crate) fn drain_waiter(&self) -> Option<oneshot::Receiver<()>> {
        let mut st = self.lock();
        if st.is_empty() {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        st.drain_waiters.push(tx);
        Some(rx)
    }

    /// Appends a new task in FIFO order and immediately attempts to start
    /// work. Never blocks; returns the record and its completion channel.
    ///
    /// Must be called within a Tokio runtime: started work runs on
    /// `tokio::spawn`.
    pub(crate) fn enqueue<T, F, Fut>(
        self: &Arc<Self>,
        work: F,
    ) -> (Task, oneshot::Receiver<Result<T, TaskError>>)
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let reply: ReplySlot<T> = Arc::new(Mutex::new(Some(tx)));
        let task = Task::new(Arc::downgrade(self));

        let reject_reply = Arc::clone(&reply);
        let entry = Entry {
            task: task.clone(),
            work: erase(work, reply),
            reject: Box::new(move |err| {
                if let Some(tx) = take_reply(&reject_reply) {
                    let _ = tx.send(Err(err));
                }
            }),
        };

        {
            let mut st = self.lock();
            st.queued.push_back(entry);
        }
        self.bus
            .publish(Event::now(EventKind::TaskQueued).with_task(task.id()));
        self.schedule_next();
        (task, rx)
    }

    /// Starts queued tasks while slots are available.
    ///
    /// Re-evaluates the concurrency policy before every start. Returns
    /// without effect when the cap is reached (or non-positive) or nothing
    /// is queued.
    pub(crate) fn schedule_next(self: &Arc<Self>) {
        loop {
            let entry = {
                let mut st = self.lock();
                if (st.running as i64) >= self.concurrency.current() {
                    return;
                }
                let Some(entry) = st.queued.pop_front() else {
                    return;
                };
                st.running += 1;
                entry
            };

            entry.task.set_state(TaskState::Running);
            self.bus
                .publish(Event::now(EventKind::TaskStarting).with_task(entry.task.id()));

            let settlement = (entry.work)();
            let scheduler = Arc::clone(self);
            let task = entry.task;
            tokio::spawn(async move {
                let (outcome, deliver) = settlement.await;
                scheduler.settle(&task, outcome, deliver);
            });
        }
    }

    /// Cancels a still-queued task. Returns `false` for running, settled or
    /// unknown tasks — there is no preemption of in-flight work.
    pub(crate) fn cancel(&self, id: u64) -> bool {
        let (entry, waiters) = {
            let mut st = self.lock();
            let Some(pos) = st.queued.iter().position(|e| e.task.id() == id) else {
                return false;
            };
            let Some(entry) = st.queued.remove(pos) else {
                return false;
            };
            (entry, st.take_drain_waiters())
        };

        entry.task.set_state(TaskState::Canceled);
        (entry.reject)(TaskError::Canceled);
        self.bus
            .publish(Event::now(EventKind::TaskCanceled).with_task(id));
        self.notify_drained(waiters);
        true
    }

    /// Settlement path: bookkeeping, handle delivery, events, cooldown gate.
    fn settle(self: &Arc<Self>, task: &Task, outcome: Result<(), TaskError>, deliver: Deliver) {
        task.set_state(match &outcome {
            Ok(()) => TaskState::Completed,
            Err(_) => TaskState::Failed,
        });

        let waiters = {
            let mut st = self.lock();
            st.running -= 1;
            st.take_drain_waiters()
        };

        // Handle resolution happens after the slot is freed, so an awaiting
        // caller observes the updated queue length.
        deliver();

        match &outcome {
            Ok(()) => self
                .bus
                .publish(Event::now(EventKind::TaskCompleted).with_task(task.id())),
            Err(err) => self.bus.publish(
                Event::now(EventKind::TaskFailed)
                    .with_task(task.id())
                    .with_error(err.to_string()),
            ),
        }
        self.notify_drained(waiters);

        let delay = self.cooldown.current();
        if delay.is_zero() {
            self.schedule_next();
        } else {
            self.bus
                .publish(Event::now(EventKind::CooldownScheduled).with_delay(delay));
            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                scheduler.schedule_next();
            });
        }
    }

    /// Fires drain waiters and publishes `QueueDrained` on transition to
    /// empty. `waiters` is non-empty only when that transition happened and
    /// someone was waiting; the event is cheap either way.
    fn notify_drained(&self, waiters: Vec<oneshot::Sender<()>>) {
        let drained = {
            let st = self.lock();
            st.is_empty()
        };
        if drained {
            self.bus.publish(Event::now(EventKind::QueueDrained));
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

/// Takes the completion sender from a reply slot, if still present.
fn take_reply<T>(slot: &ReplySlot<T>) -> Option<oneshot::Sender<Result<T, TaskError>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Erases a typed work item into the scheduler's internal shape.
///
/// The returned future catches panics at the point of invocation (a panic
/// becomes a `Failed` settlement) and defers handle delivery to the
/// scheduler via the [`Deliver`] callback.
fn erase<T, F, Fut>(work: F, reply: ReplySlot<T>) -> Work
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    Box::new(move || {
        async move {
            let settled = AssertUnwindSafe(async move { work().await })
                .catch_unwind()
                .await;
            let result: Result<T, TaskError> = match settled {
                Ok(result) => result,
                Err(payload) => Err(TaskError::Panicked {
                    error: panic_message(payload.as_ref()),
                }),
            };
            let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
            let deliver: Deliver = Box::new(move || {
                if let Some(tx) = take_reply(&reply) {
                    let _ = tx.send(result);
                }
            });
            (outcome, deliver)
        }
        .boxed()
    })
}
