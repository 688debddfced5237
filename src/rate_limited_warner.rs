use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default interval between failed-delivery warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

type TimeProvider = Box<dyn Fn() -> u64 + Send + Sync>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Throttles stderr reports about failed deliveries.
///
/// Bridges call [`record_drop`] for every failure and then [`warn_if_due`],
/// which hands the accumulated count to its callback at most once per
/// interval and resets it. [`flush`] reports whatever is still pending.
///
/// [`record_drop`]: Self::record_drop
/// [`warn_if_due`]: Self::warn_if_due
/// [`flush`]: Self::flush
pub struct RateLimitedWarner {
    interval_secs: u64,
    last_warn: AtomicU64,
    dropped: AtomicU64,
    clock: TimeProvider,
}

impl RateLimitedWarner {
    /// Create a warner whose first warning can be emitted immediately.
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Box::new(now_secs))
    }

    pub(crate) fn with_clock(interval: Duration, clock: TimeProvider) -> Self {
        let interval_secs = interval.as_secs();
        let now = clock();
        Self {
            interval_secs,
            last_warn: AtomicU64::new(now.saturating_sub(interval_secs)),
            dropped: AtomicU64::new(0),
            clock,
        }
    }

    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of drops not yet reported.
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, mut warn: impl FnMut(u64)) {
        let now = (self.clock)();
        let prev = self.last_warn.load(Ordering::Relaxed);
        if now.saturating_sub(prev) >= self.interval_secs {
            let count = self.dropped.swap(0, Ordering::Relaxed);
            if count > 0 {
                warn(count);
                self.last_warn.store(now, Ordering::Relaxed);
            }
        }
    }

    /// Immediately warn about any dropped entries.
    pub fn flush(&self, mut warn: impl FnMut(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn.store((self.clock)(), Ordering::Relaxed);
        }
    }
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}
