//! Example: Fibonacci backoff in its three stopping modes
//!
//! This example demonstrates:
//! 1. Retrying a flaky call until it succeeds
//! 2. Giving up after a fixed number of attempts
//! 3. Bounding a polling loop with a deadline
//!
//! Run with:
//! ```bash
//! cargo run -p fibretry --example retry_example
//! ```

use fibretry::prelude::*;
use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// A simulated service that fails the first few times
#[derive(Clone)]
struct FlakyService {
    calls: Arc<AtomicU32>,
    fail_count: u32,
}

impl FlakyService {
    fn new(fail_count: u32) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    fn call(&self) -> Result<(), std::io::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_count {
            println!("  Call {call}: FAILED (simulating transient error)");
            Err(std::io::Error::other(format!("transient error on call {call}")))
        } else {
            println!("  Call {call}: SUCCESS");
            Ok(())
        }
    }

    fn total_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Example 1: retry until the service answers
async fn example_retry_until_success() -> Result<(), Box<dyn StdError>> {
    println!("\n=== Example 1: Retry Until Success ===\n");

    let service = FlakyService::new(3);
    let backoff = Backoff::new(None).with_interval(Duration::from_millis(50));

    let start = Instant::now();
    let op = service.clone();
    let attempts = backoff
        .retry(move |_ctx| {
            let result = op.call();
            async move { result }
        })
        .await
        .into_result()?;

    println!("\nRetried {attempts} times over {} calls", service.total_calls());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected sleeps: 50ms + 50ms + 100ms = ~200ms");

    Ok(())
}

/// Example 2: stop after a fixed number of attempts
async fn example_attempt_ceiling() -> Result<(), Box<dyn StdError>> {
    println!("\n=== Example 2: Attempt Ceiling ===\n");

    let service = FlakyService::new(u32::MAX);
    let op = service.clone();
    let outcome = Backoff::new(None)
        .with_interval(Duration::from_millis(20))
        .with_max_attempt(4)
        .retry(move |_ctx| {
            let result = op.call();
            async move { result }
        })
        .await;

    match outcome.error() {
        Some(err) if err.is_exhausted() => println!("\nGave up: {err}"),
        other => println!("\nUnexpected outcome: {other:?}"),
    }
    println!("Attempts: {}", outcome.attempts);

    Ok(())
}

/// Example 3: poll a healthy service until a deadline
async fn example_deadline() -> Result<(), Box<dyn StdError>> {
    println!("\n=== Example 3: Polling With a Deadline ===\n");

    let ctx = Context::background();
    let backoff = Backoff::new(Some(&ctx))
        .with_interval(Duration::from_millis(30))
        .with_deadline(Instant::now() + Duration::from_millis(300));

    let service = FlakyService::new(0);
    let op = service.clone();
    let outcome = backoff
        .run(move |_ctx| {
            let result = op.call();
            async move { result }
        })
        .await;

    if let Some(err) = outcome.error() {
        println!("\nStopped: {err} (deadline: {})", err.is_deadline_exceeded());
    }
    println!("Successful polls: {}", outcome.attempts);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    println!("==============================================");
    println!("   fibretry: Fibonacci Backoff Examples");
    println!("==============================================");

    example_retry_until_success().await?;
    example_attempt_ceiling().await?;
    example_deadline().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
