//! Shortcuts building a default [`Backoff`] and running it immediately.

use crate::context::Context;
use crate::retry::{Backoff, Outcome, Retryer};
use std::error::Error as StdError;
use std::future::Future;
use tokio::time::Instant;

/// Call `operation` on the default schedule for as long as it succeeds.
///
/// See [`Retryer::run`].
pub async fn run<F, Fut, E>(ctx: Option<&Context>, operation: F) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).run(operation).await
}

/// Same as [`run`], limited to `max_attempt` attempts.
pub async fn run_n<F, Fut, E>(ctx: Option<&Context>, max_attempt: u32, operation: F) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).with_max_attempt(max_attempt).run(operation).await
}

/// Same as [`run`], with the scope ending no later than `deadline`.
pub async fn run_until<F, Fut, E>(ctx: Option<&Context>, deadline: Instant, operation: F) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).with_deadline(deadline).run(operation).await
}

/// Call `operation` on the default schedule until it succeeds.
///
/// See [`Retryer::retry`].
pub async fn retry<F, Fut, E>(ctx: Option<&Context>, operation: F) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).retry(operation).await
}

/// Same as [`retry`], limited to `max_attempt` attempts.
pub async fn retry_n<F, Fut, E>(ctx: Option<&Context>, max_attempt: u32, operation: F) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).with_max_attempt(max_attempt).retry(operation).await
}

/// Same as [`retry`], with the scope ending no later than `deadline`.
pub async fn retry_until<F, Fut, E>(
    ctx: Option<&Context>,
    deadline: Instant,
    operation: F,
) -> Outcome<E>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    Backoff::new(ctx).with_deadline(deadline).retry(operation).await
}
