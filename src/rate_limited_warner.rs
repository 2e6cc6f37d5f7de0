//! Rate limiting for warnings about discarded pending buffers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default minimum spacing between successive drop warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs())
        .unwrap_or_default()
}

/// Accumulates drop counts and reports them at most once per interval.
///
/// The caller records discarded buffers via [`record_drop`](Self::record_drop).
/// The next call to [`warn_if_due`](Self::warn_if_due) invokes the callback
/// with the totals if the interval has elapsed. [`flush`](Self::flush)
/// reports immediately.
#[derive(Debug)]
pub struct RateLimitedWarner {
    interval_secs: u64,
    last_warn: AtomicU64,
    dropped: AtomicU64,
    dropped_bytes: AtomicU64,
}

impl RateLimitedWarner {
    /// Create a warner whose first warning can be emitted immediately.
    pub fn new(interval: Duration) -> Self {
        let interval_secs = interval.as_secs();
        Self {
            interval_secs,
            last_warn: AtomicU64::new(now_secs().saturating_sub(interval_secs)),
            dropped: AtomicU64::new(0),
            dropped_bytes: AtomicU64::new(0),
        }
    }

    /// Count one discarded buffer of `bytes` length.
    pub fn record_drop(&self, bytes: usize) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        self.dropped_bytes
            .fetch_add(u64::try_from(bytes).unwrap_or(u64::MAX), Ordering::Relaxed);
    }

    /// Call `warn(buffers, bytes)` if the interval has elapsed and drops
    /// were recorded since the last warning.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64, u64)) {
        let now = now_secs();
        let prev = self.last_warn.load(Ordering::Relaxed);
        if now.saturating_sub(prev) >= self.interval_secs {
            self.flush(warn);
        }
    }

    /// Immediately report any recorded drops.
    pub fn flush(&self, warn: impl FnOnce(u64, u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        let bytes = self.dropped_bytes.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count, bytes);
            self.last_warn.store(now_secs(), Ordering::Relaxed);
        }
    }
}
