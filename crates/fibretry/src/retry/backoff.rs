//! Fibonacci backoff engine.

use super::fibonacci::Fibonacci;
use super::strategy::{Outcome, Retryer};
use crate::config::BackoffConfig;
use crate::context::Context;
use crate::error::Error;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default base interval between two attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Which operation outcome ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopOn {
    /// `run`: keep going while the operation succeeds.
    Failure,
    /// `retry`: keep going while the operation fails.
    Success,
}

#[derive(Debug)]
struct State {
    attempt: u32,
    max_attempt: u32,
    interval: Duration,
    fib: Fibonacci,
}

impl State {
    fn new(interval: Duration, max_attempt: u32) -> Self {
        Self {
            attempt: 0,
            max_attempt,
            interval,
            fib: Fibonacci::new(),
        }
    }

    /// Count a finished attempt; `false` once the ceiling is reached.
    fn advance(&mut self) -> bool {
        self.attempt = self.attempt.saturating_add(1);
        self.max_attempt == 0 || self.attempt < self.max_attempt
    }

    fn next_delay(&mut self) -> Option<Duration> {
        self.fib.next_delay(self.interval)
    }
}

/// Retry engine sleeping `interval × F(n)` between attempts.
///
/// The first two sleeps last one interval, the third two, then three, five,
/// eight, and so on. Attempt count, interval, ceiling and sequence sit behind
/// a single lock, so [`attempt`](Retryer::attempt) can be read from any thread
/// while a run is in flight.
///
/// Each run spawns its loop on a separate task while the caller races the
/// loop's completion against the run scope. Cancelling the scope, or reaching
/// its deadline, ends the run promptly even mid-sleep.
///
/// # Examples
///
/// ```rust
/// use fibretry::prelude::*;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let calls = Arc::new(AtomicU32::new(0));
/// let counter = Arc::clone(&calls);
///
/// let backoff = Backoff::new(None).with_interval(Duration::from_millis(5));
/// let outcome = backoff
///     .retry(move |_ctx| {
///         let counter = Arc::clone(&counter);
///         async move {
///             if counter.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err(std::io::Error::other("not yet"))
///             } else {
///                 Ok(())
///             }
///         }
///     })
///     .await;
///
/// assert!(outcome.is_ok());
/// assert_eq!(outcome.attempts, 2);
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
#[derive(Debug)]
pub struct Backoff {
    ctx: Context,
    state: Arc<Mutex<State>>,
}

impl Backoff {
    /// Create an engine scoped to `ctx`, or to a scope that never fires when `None`.
    ///
    /// Uses [`DEFAULT_INTERVAL`] and no attempt ceiling.
    pub fn new(ctx: Option<&Context>) -> Self {
        let ctx = ctx.map_or_else(Context::background, Context::with_cancel);
        Self {
            ctx,
            state: Arc::new(Mutex::new(State::new(DEFAULT_INTERVAL, 0))),
        }
    }

    /// Create an engine configured from `config`.
    pub fn from_config(ctx: Option<&Context>, config: &BackoffConfig) -> Self {
        Self::new(ctx)
            .with_interval(config.interval)
            .with_max_attempt(config.max_attempt)
    }

    /// The engine's cancellation scope.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Current base interval.
    pub fn interval(&self) -> Duration {
        self.state.lock().interval
    }

    /// Current attempt ceiling, `0` when unbounded.
    pub fn max_attempt(&self) -> u32 {
        self.state.lock().max_attempt
    }

    /// Set the base interval in place. Ignored unless `interval` is non-zero.
    pub fn set_interval(&self, interval: Duration) {
        if !interval.is_zero() {
            self.state.lock().interval = interval;
        }
    }

    /// Set the attempt ceiling in place. `0` means unbounded.
    pub fn set_max_attempt(&self, max_attempt: u32) {
        self.state.lock().max_attempt = max_attempt;
    }

    async fn execute<F, Fut, E>(&self, operation: F, stop_on: StopOn) -> Outcome<E>
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        let scope = self.ctx.with_cancel();
        if scope.is_done() {
            tracing::debug!(?stop_on, "scope already done, operation not invoked");
            return Outcome {
                attempts: self.attempt(),
                result: Err(Error::DeadlineExceeded),
            };
        }

        tracing::trace!(?stop_on, "starting backoff run");
        let mut handle = tokio::spawn(drive(
            Arc::clone(&self.state),
            scope.clone(),
            operation,
            stop_on,
        ));

        let result = tokio::select! {
            joined = &mut handle => match joined {
                Ok(Some(result)) => result,
                Ok(None) => Err(Error::DeadlineExceeded),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => Err(Error::DeadlineExceeded),
            },
            () = scope.done() => Err(Error::DeadlineExceeded),
        };

        scope.cancel();
        handle.abort();

        let attempts = self.attempt();
        match &result {
            Ok(()) => tracing::debug!(attempts, "backoff run completed"),
            Err(err) => tracing::debug!(attempts, kind = ?err.kind(), "backoff run stopped"),
        }
        Outcome { attempts, result }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Loop body of a run. Returns `None` when the scope fired first.
async fn drive<F, Fut, E>(
    state: Arc<Mutex<State>>,
    scope: Context,
    mut operation: F,
    stop_on: StopOn,
) -> Option<Result<(), Error<E>>>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    loop {
        if scope.is_done() {
            return None;
        }

        let result = tokio::select! {
            biased;
            () = scope.done() => return None,
            result = operation(scope.clone()) => result,
        };

        let last = match (stop_on, result) {
            (StopOn::Failure, Err(err)) => return Some(Err(Error::Operation(err))),
            (StopOn::Success, Ok(())) => return Some(Ok(())),
            (_, result) => result.err(),
        };

        let (attempt, delay) = {
            let mut state = state.lock();
            if !state.advance() {
                tracing::debug!(attempt = state.attempt, "attempt ceiling reached");
                return Some(Err(Error::exhausted(last)));
            }
            (state.attempt, state.next_delay())
        };

        let Some(delay) = delay else {
            tracing::debug!(attempt, "backoff bound exceeded");
            return Some(Err(Error::exhausted(last)));
        };

        tracing::debug!(attempt, ?delay, "waiting before next attempt");
        tokio::select! {
            biased;
            () = scope.done() => return None,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

#[async_trait]
impl Retryer for Backoff {
    fn attempt(&self) -> u32 {
        self.state.lock().attempt
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.attempt = 0;
        state.fib = Fibonacci::new();
    }

    async fn run<F, Fut, E>(&self, operation: F) -> Outcome<E>
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        self.execute(operation, StopOn::Failure).await
    }

    async fn retry<F, Fut, E>(&self, operation: F) -> Outcome<E>
    where
        F: FnMut(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        self.execute(operation, StopOn::Success).await
    }

    fn with_deadline(&self, deadline: Instant) -> Self {
        let (interval, max_attempt) = {
            let state = self.state.lock();
            (state.interval, state.max_attempt)
        };
        Self {
            ctx: self.ctx.with_deadline(deadline),
            state: Arc::new(Mutex::new(State::new(interval, max_attempt))),
        }
    }

    fn with_interval(self, interval: Duration) -> Self {
        self.set_interval(interval);
        self
    }

    fn with_max_attempt(self, max_attempt: u32) -> Self {
        self.set_max_attempt(max_attempt);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let backoff = Backoff::new(None);

        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.interval(), DEFAULT_INTERVAL);
        assert_eq!(backoff.max_attempt(), 0);
        assert!(!backoff.context().is_done());
    }

    #[test]
    fn test_engine_scope_is_child_of_given_context() {
        let ctx = Context::background();
        let backoff = Backoff::new(Some(&ctx));

        ctx.cancel();
        assert!(backoff.context().is_done());
    }

    #[test]
    fn test_with_interval_ignores_zero() {
        let backoff = Backoff::new(None).with_interval(Duration::from_millis(10));
        assert_eq!(backoff.interval(), Duration::from_millis(10));

        let backoff = backoff.with_interval(Duration::ZERO);
        assert_eq!(backoff.interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_with_max_attempt_sets_ceiling() {
        let backoff = Backoff::new(None).with_max_attempt(3);
        assert_eq!(backoff.max_attempt(), 3);

        let backoff = backoff.with_max_attempt(0);
        assert_eq!(backoff.max_attempt(), 0);
    }

    #[test]
    fn test_advance_respects_ceiling() {
        let mut state = State::new(DEFAULT_INTERVAL, 3);

        assert!(state.advance());
        assert!(state.advance());
        assert!(!state.advance());
        assert_eq!(state.attempt, 3);
    }

    #[test]
    fn test_advance_unbounded() {
        let mut state = State::new(DEFAULT_INTERVAL, 0);
        assert!((0..1000).all(|_| state.advance()));
        assert_eq!(state.attempt, 1000);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let backoff = Backoff::new(None).with_interval(Duration::from_millis(1));
        {
            let mut state = backoff.state.lock();
            state.attempt = 7;
            for _ in 0..5 {
                state.next_delay();
            }
        }

        backoff.reset();

        let mut state = backoff.state.lock();
        assert_eq!(state.attempt, 0);
        assert_eq!(state.next_delay(), Some(Duration::from_millis(1)));
        assert_eq!(state.next_delay(), Some(Duration::from_millis(1)));
        assert_eq!(state.next_delay(), Some(Duration::from_millis(2)));
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let backoff = Backoff::new(None)
            .with_interval(Duration::from_millis(1))
            .with_max_attempt(4);

        backoff.reset();

        assert_eq!(backoff.interval(), Duration::from_millis(1));
        assert_eq!(backoff.max_attempt(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_deadline_copies_configuration_not_state() {
        let backoff = Backoff::new(None)
            .with_interval(Duration::from_millis(20))
            .with_max_attempt(5);
        backoff.state.lock().attempt = 2;

        let deadline = Instant::now() + Duration::from_secs(1);
        let derived = backoff.with_deadline(deadline);

        assert_eq!(derived.interval(), Duration::from_millis(20));
        assert_eq!(derived.max_attempt(), 5);
        assert_eq!(derived.attempt(), 0);
        assert_eq!(derived.context().deadline(), Some(deadline));
        assert!(!Arc::ptr_eq(&backoff.state, &derived.state));
        assert!(backoff.context().deadline().is_none());

        // Later configuration of the original does not leak into the copy.
        backoff.set_interval(Duration::from_millis(7));
        assert_eq!(derived.interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_from_config() {
        let config = BackoffConfig {
            interval: Duration::from_millis(250),
            max_attempt: 6,
        };
        let backoff = Backoff::from_config(None, &config);

        assert_eq!(backoff.interval(), Duration::from_millis(250));
        assert_eq!(backoff.max_attempt(), 6);
    }
}
