//! The `Retryer` abstraction driven by [`Backoff`](super::Backoff).

use crate::context::Context;
use crate::error::Error;
use async_trait::async_trait;
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one run: attempts made and how the run ended.
///
/// `attempts` counts the calls that did not stop the run. A run whose first
/// call resolves it reports `0`.
#[derive(Debug)]
#[must_use]
pub struct Outcome<E: StdError + 'static> {
    /// Number of attempts completed when the run ended.
    pub attempts: u32,
    /// `Ok(())` when the stop condition resolved without error.
    pub result: Result<(), Error<E>>,
}

impl<E: StdError + 'static> Outcome<E> {
    /// Whether the run ended without error.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The terminal error, if any.
    pub fn error(&self) -> Option<&Error<E>> {
        self.result.as_ref().err()
    }

    /// Convert into a `Result` carrying the attempt count on success.
    pub fn into_result(self) -> Result<u32, Error<E>> {
        let attempts = self.attempts;
        self.result.map(|()| attempts)
    }
}

/// A backoff strategy re-invoking an operation on a growing schedule.
///
/// Runs stop on three independent conditions: the operation's outcome, the
/// attempt ceiling, and the scope's deadline or cancellation.
///
/// Configuration is deliberately asymmetric. [`with_interval`](Self::with_interval)
/// and [`with_max_attempt`](Self::with_max_attempt) adjust the receiver and hand
/// it back; [`with_deadline`](Self::with_deadline) leaves the receiver alone and
/// returns a fresh retryer.
///
/// # Examples
///
/// ```rust
/// use fibretry::prelude::*;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backoff = Backoff::new(None)
///     .with_interval(Duration::from_millis(10))
///     .with_max_attempt(3);
///
/// let outcome = backoff
///     .retry(|_ctx| async { Err::<(), _>(std::io::Error::other("unavailable")) })
///     .await;
///
/// assert_eq!(outcome.attempts, 3);
/// assert!(outcome.error().unwrap().is_exhausted());
/// # }
/// ```
#[async_trait]
pub trait Retryer: Send + Sync {
    /// Current number of completed attempts.
    fn attempt(&self) -> u32;

    /// Zero the attempt counter and restart the Fibonacci sequence.
    ///
    /// Must not race an in-flight run on the same retryer.
    fn reset(&self);

    /// Call `operation` for as long as it succeeds.
    ///
    /// The run ends with the operation's own error as soon as one is returned.
    /// The operation is invoked at least once unless the scope is already done.
    async fn run<F, Fut, E>(&self, operation: F) -> Outcome<E>
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: StdError + Send + Sync + 'static;

    /// Call `operation` for as long as it fails.
    ///
    /// The run ends successfully as soon as the operation returns `Ok(())`.
    /// The operation is invoked at least once unless the scope is already done.
    async fn retry<F, Fut, E>(&self, operation: F) -> Outcome<E>
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: StdError + Send + Sync + 'static;

    /// A new retryer whose scope fires no later than `deadline`.
    ///
    /// Interval and ceiling are copied; attempt count and sequence start fresh.
    fn with_deadline(&self, deadline: Instant) -> Self
    where
        Self: Sized;

    /// Set the base interval. Ignored unless `interval` is non-zero.
    fn with_interval(self, interval: Duration) -> Self
    where
        Self: Sized;

    /// Set the attempt ceiling. `0` means unbounded.
    fn with_max_attempt(self, max_attempt: u32) -> Self
    where
        Self: Sized;
}
