#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Fibonacci backoff for fallible async operations.
//!
//! A [`Backoff`] re-invokes an operation, sleeping `interval × F(n)` between
//! attempts (`1, 1, 2, 3, 5, 8, …` intervals), until one of three independent
//! conditions ends the run:
//!
//! - the operation's outcome satisfies the run's stop condition
//! - the attempt ceiling is reached ([`Error::Exhausted`])
//! - the scope's deadline passes or it is cancelled ([`Error::DeadlineExceeded`])
//!
//! Two run modes are offered:
//!
//! - [`Retryer::run`] keeps calling while the operation succeeds and stops on
//!   its first error, which is returned as [`Error::Operation`]
//! - [`Retryer::retry`] keeps calling while the operation fails and stops on
//!   its first success
//!
//! # Examples
//!
//! ```rust
//! use fibretry::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let ctx = Context::background().with_timeout(Duration::from_secs(2));
//!
//! let outcome = Backoff::new(Some(&ctx))
//!     .with_interval(Duration::from_millis(10))
//!     .with_max_attempt(3)
//!     .retry(|_ctx| async { Err::<(), _>(std::io::Error::other("oops")) })
//!     .await;
//!
//! let err = outcome.error().unwrap();
//! assert!(err.is_exhausted());
//! assert_eq!(err.to_string(), "backoff: maximum execution number exhausted: oops");
//! # }
//! ```

pub mod config;
pub mod context;
pub mod entry;
pub mod error;
pub mod retry;

pub use config::{BackoffConfig, ConfigError};
pub use context::Context;
pub use entry::{retry, retry_n, retry_until, run, run_n, run_until};
pub use error::{Error, ErrorKind};
pub use retry::{Backoff, DEFAULT_INTERVAL, Fibonacci, Outcome, Retryer};

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use fibretry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::BackoffConfig;
    pub use crate::context::Context;
    pub use crate::error::{Error, ErrorKind};
    pub use crate::retry::{Backoff, Outcome, Retryer};
}
