//! Latency-adaptive I/O block sizing.
//!
//! Spinning disks, removable media, and network mounts have wildly different
//! latency profiles. Instead of hand-tuning a chunk size per target, each
//! open stream carries an [`AdaptiveBlockSize`] that grows the chunk while
//! I/O stays fast and shrinks it when a single request stalls. The state is
//! private to one stream instance and never shared across calls.

use std::time::{Duration, Instant};

use tracing::trace;

/// Default I/O block size in bytes (also the lower clamp).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Upper clamp for the adaptive block size in bytes.
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// A single read/write taking at least this long marks a "delay".
const DELAY_THRESHOLD: Duration = Duration::from_millis(100);

/// A single read/write taking longer than this halves the block size.
const STALL_THRESHOLD: Duration = Duration::from_millis(500);

/// With no delay recorded for this long, the block size doubles.
const QUIET_PERIOD: Duration = Duration::from_secs(2);

/// Per-stream adaptive block size state.
///
/// Callers time each I/O request themselves and feed the result into
/// [`after_io`](Self::after_io); the current recommendation is read back via
/// [`recommended`](Self::recommended). Taking time as parameters keeps the
/// policy deterministic under test.
#[derive(Debug)]
pub struct AdaptiveBlockSize {
    default_size: usize,
    max_size: usize,
    current: usize,
    last_delay: Instant,
}

impl AdaptiveBlockSize {
    /// State clamped to `[DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE]`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE)
    }

    /// State clamped to `[default_size, max_size]`, starting at `default_size`.
    ///
    /// The quiet-period clock starts at creation: growth begins only after
    /// a full delay-free quiet period, never on the first fast request.
    #[must_use]
    pub fn with_bounds(default_size: usize, max_size: usize) -> Self {
        let max_size = max_size.max(default_size);
        Self {
            default_size,
            max_size,
            current: default_size,
            last_delay: Instant::now(),
        }
    }

    /// The block size to use for the next I/O request.
    #[must_use]
    pub fn recommended(&self) -> usize {
        self.current
    }

    /// Record one completed I/O request that took `elapsed`, finishing at `now`.
    pub fn after_io(&mut self, elapsed: Duration, now: Instant) {
        if elapsed >= DELAY_THRESHOLD {
            self.last_delay = now;
        }

        let old = self.current;
        if elapsed > STALL_THRESHOLD {
            self.current = (self.current / 2).max(self.default_size);
        } else if now.saturating_duration_since(self.last_delay) >= QUIET_PERIOD {
            self.current = self.current.saturating_mul(2).min(self.max_size);
            // Restart the quiet-period clock so growth is one doubling
            // per quiet interval, not one per read.
            self.last_delay = now;
        }

        if self.current != old {
            trace!(old, new = self.current, "adjusted adaptive block size");
        }
    }
}

impl Default for AdaptiveBlockSize {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(1);

    #[test]
    fn starts_at_default() {
        let sizing = AdaptiveBlockSize::new();
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn growth_waits_for_the_first_quiet_period() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();

        // Fast I/O right after creation: the quiet period has not elapsed
        // yet, so the size must not jump on the very first request.
        sizing.after_io(FAST, t0);
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE);

        sizing.after_io(FAST, t0 + Duration::from_secs(2));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 2);
    }

    #[test]
    fn fast_reads_double_once_per_quiet_period() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();

        sizing.after_io(FAST, t0 + Duration::from_secs(2));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 2);

        // Within the same quiet period: no further growth.
        sizing.after_io(FAST, t0 + Duration::from_millis(2500));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 2);

        // Next quiet period elapsed: doubles again.
        sizing.after_io(FAST, t0 + Duration::from_secs(5));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 4);
    }

    #[test]
    fn delay_blocks_growth_until_quiet() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();

        // 200ms read: records a delay, not slow enough to halve.
        sizing.after_io(Duration::from_millis(200), t0);
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE);

        // 1s later: still inside the quiet period, no growth.
        sizing.after_io(FAST, t0 + Duration::from_secs(1));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE);

        // 2s of quiet after the delay: growth resumes.
        sizing.after_io(FAST, t0 + Duration::from_secs(3));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 2);
    }

    #[test]
    fn stall_halves_block_size() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();

        sizing.after_io(FAST, t0 + Duration::from_secs(2));
        sizing.after_io(FAST, t0 + Duration::from_secs(4));
        sizing.after_io(FAST, t0 + Duration::from_secs(6));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 8);

        sizing.after_io(Duration::from_millis(600), t0 + Duration::from_secs(7));
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE * 4);
    }

    #[test]
    fn never_falls_below_default() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();
        for i in 0..20 {
            sizing.after_io(Duration::from_secs(1), t0 + Duration::from_secs(i));
        }
        assert_eq!(sizing.recommended(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn never_exceeds_ceiling() {
        let mut sizing = AdaptiveBlockSize::new();
        let t0 = Instant::now();
        for i in 0..64 {
            sizing.after_io(FAST, t0 + Duration::from_secs(2 * i));
        }
        assert_eq!(sizing.recommended(), MAX_BLOCK_SIZE);
    }

    #[test]
    fn custom_bounds_are_honored() {
        let mut sizing = AdaptiveBlockSize::with_bounds(512, 2048);
        let t0 = Instant::now();
        for i in 0..10 {
            sizing.after_io(FAST, t0 + Duration::from_secs(2 * i));
        }
        assert_eq!(sizing.recommended(), 2048);

        sizing.after_io(Duration::from_secs(1), t0 + Duration::from_secs(30));
        assert_eq!(sizing.recommended(), 1024);
    }
}
