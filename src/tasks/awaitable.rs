//! # Dual-mode wrapper: a plain record that is also a future.
//!
//! [`Awaitable`] pairs a synchronously inspectable record with a backing
//! future, without forcing the caller into one mode:
//!
//! - **Inspect without consuming**: the wrapper derefs to the record, so any
//!   field or method of the record behaves exactly as on the plain value.
//! - **Await to consume**: the wrapper implements [`Future`]; awaiting it
//!   resolves to the backing future's output.
//!
//! The backing future is either supplied eagerly ([`Awaitable::new`]) or
//! created lazily by a factory on first poll ([`Awaitable::lazy`]). The
//! factory runs exactly once; every subsequent poll observes the same,
//! memoized future.
//!
//! # Example
//! ```
//! use taskgate::Awaitable;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! struct Upload { bytes: usize }
//!
//! let wrapped = Awaitable::new(Upload { bytes: 512 }, async { "done" });
//!
//! // Sync view, no consumption:
//! assert_eq!(wrapped.bytes, 512);
//!
//! // Async view, consumes the wrapper:
//! assert_eq!(wrapped.await, "done");
//! # }
//! ```

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;

type Factory<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

/// Backing future, created up front or deferred behind a factory.
enum Backing<T> {
    Ready(BoxFuture<'static, T>),
    Lazy(Factory<T>),
}

impl<T: 'static> Backing<T> {
    /// Returns the backing future, invoking the factory on first use.
    ///
    /// The `Lazy` arm is replaced by `Ready` before the factory result is
    /// polled, so the factory can never run twice.
    fn force(&mut self) -> &mut BoxFuture<'static, T> {
        if let Backing::Lazy(_) = self {
            let Backing::Lazy(factory) = std::mem::replace(
                self,
                Backing::Ready(std::future::pending::<T>().boxed()),
            ) else {
                unreachable!("just matched Lazy");
            };
            *self = Backing::Ready(factory());
        }
        match self {
            Backing::Ready(future) => future,
            Backing::Lazy(_) => unreachable!("forced above"),
        }
    }

    fn into_future(self) -> BoxFuture<'static, T> {
        match self {
            Backing::Ready(future) => future,
            Backing::Lazy(factory) => factory(),
        }
    }
}

/// # A value usable as a plain record *and* as a future.
///
/// `S` is the record type exposed through [`Deref`]; `T` is the output of the
/// backing future. See the module docs for the contract.
pub struct Awaitable<S, T> {
    record: S,
    backing: Backing<T>,
}

impl<S, T: 'static> Awaitable<S, T> {
    /// Wraps `record` with an eagerly supplied backing future.
    pub fn new(record: S, future: impl Future<Output = T> + Send + 'static) -> Self {
        Self {
            record,
            backing: Backing::Ready(future.boxed()),
        }
    }

    /// Wraps `record` with a future created lazily on first poll.
    ///
    /// The factory is invoked exactly once; all later polls reuse the
    /// memoized future.
    pub fn lazy<F, Fut>(record: S, factory: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            record,
            backing: Backing::Lazy(Box::new(move || factory().boxed())),
        }
    }

    /// Returns the record view without consuming the wrapper.
    pub fn record(&self) -> &S {
        &self.record
    }

    /// Returns the record view mutably.
    pub fn record_mut(&mut self) -> &mut S {
        &mut self.record
    }

    /// Discards the future portion and keeps the record.
    pub fn into_record(self) -> S {
        self.record
    }

    /// Consumes the wrapper, returning only the future portion.
    ///
    /// Forces a lazy factory if the future was never polled.
    pub fn outcome(self) -> BoxFuture<'static, T> {
        self.backing.into_future()
    }
}

impl<S, T> Deref for Awaitable<S, T> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.record
    }
}

impl<S, T> DerefMut for Awaitable<S, T> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.record
    }
}

impl<S: Unpin, T: 'static> Future for Awaitable<S, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        this.backing.force().as_mut().poll(cx)
    }
}
