//! Fibonacci sequence used as the backoff multiplier.

use std::time::Duration;

/// Largest sleep the engine will schedule: the signed 64-bit nanosecond range.
pub(crate) const MAX_SLEEP: Duration = Duration::from_nanos(i64::MAX as u64);

/// Lazy Fibonacci sequence: `1, 1, 2, 3, 5, 8, …`.
///
/// Each call to [`Iterator::next`] advances the internal pair. The sequence
/// never rewinds on its own; build a new one to start over. Once the next
/// term would overflow `u64` the iterator returns `None` for good, which the
/// engine treats as a hard bound.
///
/// # Examples
///
/// ```rust
/// use fibretry::retry::Fibonacci;
///
/// let terms: Vec<u64> = Fibonacci::new().take(6).collect();
/// assert_eq!(terms, vec![1, 1, 2, 3, 5, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct Fibonacci {
    prev: u64,
    term: Option<u64>,
}

impl Fibonacci {
    /// Create a sequence positioned before its first term.
    pub fn new() -> Self {
        Self {
            prev: 0,
            term: Some(1),
        }
    }

    /// Advance the sequence and scale the term by `interval`.
    ///
    /// Returns `None` when the sequence is exhausted or the product leaves
    /// the representable sleep range.
    pub fn next_delay(&mut self, interval: Duration) -> Option<Duration> {
        let term = self.next()?;
        scale(interval, term)
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Fibonacci {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let term = self.term?;
        self.term = self.prev.checked_add(term);
        self.prev = term;
        Some(term)
    }
}

fn scale(interval: Duration, term: u64) -> Option<Duration> {
    let nanos = interval.as_nanos().checked_mul(u128::from(term))?;
    if nanos > MAX_SLEEP.as_nanos() {
        return None;
    }
    // Bounded by MAX_SLEEP above, so the cast is lossless.
    Some(Duration::from_nanos(nanos as u64))
}
