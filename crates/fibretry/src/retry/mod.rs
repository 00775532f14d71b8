//! Fibonacci backoff and the retry engine.
//!
//! # Key Types
//!
//! - [`Retryer`] - Core trait for retry engines
//! - [`Backoff`] - Engine sleeping `interval × F(n)` between attempts
//! - [`Fibonacci`] - The multiplier sequence
//! - [`Outcome`] - Attempts made plus how the run ended
//!
//! # Examples
//!
//! ```rust
//! use fibretry::retry::{Backoff, Retryer};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backoff = Backoff::new(None).with_interval(Duration::from_millis(10));
//!
//! let outcome = backoff
//!     .retry(|_ctx| async { Ok::<_, std::io::Error>(()) })
//!     .await;
//!
//! assert!(outcome.is_ok());
//! assert_eq!(outcome.attempts, 0);
//! # }
//! ```

mod backoff;
mod fibonacci;
mod strategy;

pub use backoff::{Backoff, DEFAULT_INTERVAL};
pub use fibonacci::Fibonacci;
pub use strategy::{Outcome, Retryer};
