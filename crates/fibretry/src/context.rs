//! Cancellation scopes with optional deadlines.
//!
//! A [`Context`] pairs a [`CancellationToken`] with an optional deadline.
//! Scopes form a tree: cancelling a parent cancels every child derived from
//! it, and a child's deadline is never later than its parent's.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A cancellable execution scope, optionally bounded by a deadline.
///
/// Cloning a `Context` yields a handle to the same scope; use
/// [`with_cancel`](Self::with_cancel) or [`with_deadline`](Self::with_deadline)
/// to derive a child.
///
/// # Examples
///
/// ```rust
/// use fibretry::Context;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let parent = Context::background();
/// let child = parent.with_timeout(Duration::from_secs(5));
///
/// parent.cancel();
/// assert!(child.is_done());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A root scope that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Derive a child scope that can be cancelled on its own.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a child scope that fires no later than `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child scope that fires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The point in time at which this scope fires on its own, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the scope was cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the scope is cancelled or its deadline is reached.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }
}
