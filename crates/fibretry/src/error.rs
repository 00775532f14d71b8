//! Error signals reported by a backoff run.

use std::error::Error as StdError;
use std::fmt;

/// Terminal error of a [`Backoff`](crate::Backoff) run.
///
/// The engine never retries past [`Error::Exhausted`] or
/// [`Error::DeadlineExceeded`]: both are reported once. The operation's own
/// error is passed through untouched as [`Error::Operation`] when the run's
/// stop condition resolves on it.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error<E: StdError + 'static> {
    /// The attempt ceiling was reached or the backoff bound overflowed.
    ///
    /// Carries the operation's last error when there was one.
    #[error("backoff: maximum execution number exhausted{}", Cause(.last))]
    Exhausted {
        /// Error returned by the final attempt, if any.
        #[source]
        last: Option<E>,
    },

    /// The run's deadline elapsed or its scope was cancelled.
    #[error("backoff: context deadline exceeded")]
    DeadlineExceeded,

    /// The operation's own error, returned as-is.
    #[error(transparent)]
    Operation(E),
}

/// Kind of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Exhausted`].
    Exhausted,
    /// See [`Error::DeadlineExceeded`].
    DeadlineExceeded,
    /// See [`Error::Operation`].
    Operation,
}

impl<E: StdError + 'static> Error<E> {
    pub(crate) fn exhausted(last: Option<E>) -> Self {
        Self::Exhausted { last }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Exhausted { .. } => ErrorKind::Exhausted,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Operation(_) => ErrorKind::Operation,
        }
    }

    /// Whether the run stopped on its deadline or on cancellation.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }

    /// Whether the run stopped on its attempt ceiling or backoff bound.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Whether this is the operation's own error.
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// The operation error carried by this value, passed through or wrapped.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Exhausted { last } => last.as_ref(),
            Self::DeadlineExceeded => None,
        }
    }

    /// Consume the value and return the operation error it carries, if any.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Exhausted { last } => last,
            Self::DeadlineExceeded => None,
        }
    }
}

struct Cause<'a, E>(&'a Option<E>);

impl<E: fmt::Display> fmt::Display for Cause<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => write!(f, ": {err}"),
            None => Ok(()),
        }
    }
}
