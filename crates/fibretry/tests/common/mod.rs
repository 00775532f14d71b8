//! Shared fixtures for integration tests.

#![allow(dead_code)]

use fibretry::Context;
use std::future::{Ready, ready};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Error returned by the fixtures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("oops")]
pub struct Oops;

/// A job counting its calls and recording when each one happened.
#[derive(Debug, Clone)]
pub struct Task {
    calls: Arc<AtomicU32>,
    stamps: Arc<Mutex<Vec<Instant>>>,
    until: u32,
    start: Instant,
}

impl Task {
    /// `until` is the call number at which the job changes outcome.
    pub fn new(until: u32) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            stamps: Arc::new(Mutex::new(Vec::new())),
            until,
            start: Instant::now(),
        }
    }

    /// Fails before the `until`-th call, succeeds from then on.
    pub fn ko_until(&self) -> impl FnMut(Context) -> Ready<Result<(), Oops>> + Send + 'static + use<> {
        let task = self.clone();
        move |_ctx| {
            let called = task.record();
            ready(if called < task.until { Err(Oops) } else { Ok(()) })
        }
    }

    /// Succeeds for the first `until` calls, fails afterwards.
    pub fn ok_until(&self) -> impl FnMut(Context) -> Ready<Result<(), Oops>> + Send + 'static + use<> {
        let task = self.clone();
        move |_ctx| {
            let called = task.record();
            ready(if called > task.until { Err(Oops) } else { Ok(()) })
        }
    }

    /// Fails on every call.
    pub fn always_ko(&self) -> impl FnMut(Context) -> Ready<Result<(), Oops>> + Send + 'static + use<> {
        let task = self.clone();
        move |_ctx| {
            task.record();
            ready(Err(Oops))
        }
    }

    fn record(&self) -> u32 {
        self.stamps.lock().unwrap().push(Instant::now());
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Time between the task's creation and its last call.
    pub fn latest(&self) -> Duration {
        self.stamps
            .lock()
            .unwrap()
            .last()
            .map_or(Duration::ZERO, |last| *last - self.start)
    }

    /// Pauses observed between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let stamps = self.stamps.lock().unwrap();
        stamps.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Assert each observed gap matches the expected milliseconds, allowing for timer rounding.
pub fn assert_gaps(actual: &[Duration], expected_ms: &[u64]) {
    assert_eq!(
        actual.len(),
        expected_ms.len(),
        "gap count mismatch: {actual:?} vs {expected_ms:?}"
    );
    for (gap, ms) in actual.iter().zip(expected_ms) {
        let expected = Duration::from_millis(*ms);
        assert!(
            *gap >= expected && *gap <= expected + Duration::from_millis(2),
            "gap {gap:?} does not match expected {expected:?} (all gaps: {actual:?})"
        );
    }
}
