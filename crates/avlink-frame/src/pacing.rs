use std::time::{Duration, Instant};

/// Default outbound budget for chat chunk sequences, in bytes per second.
pub const DEFAULT_BYTES_PER_SECOND: usize = 6000;

/// Paces consecutive chunk sends so effective throughput stays under a
/// configured bytes/second budget.
///
/// The only suspension source is the fixed, computed delay below — never the
/// network. Callers skip the call entirely after a message's final chunk.
#[derive(Debug, Clone)]
pub struct ChunkPacer {
    bytes_per_second: usize,
}

impl Default for ChunkPacer {
    fn default() -> Self {
        Self::new(DEFAULT_BYTES_PER_SECOND)
    }
}

impl ChunkPacer {
    /// Create a pacer with an explicit byte budget. A zero budget disables
    /// pacing rather than dividing by zero.
    pub fn new(bytes_per_second: usize) -> Self {
        Self { bytes_per_second }
    }

    /// Minimum wall-clock duration one send of `bytes` may occupy:
    /// `ceil(1000 * bytes / bytes_per_second)` milliseconds.
    pub fn minimum_send_duration(&self, bytes: usize) -> Duration {
        if self.bytes_per_second == 0 {
            return Duration::ZERO;
        }
        let millis = (bytes as u64 * 1000).div_ceil(self.bytes_per_second as u64);
        Duration::from_millis(millis)
    }

    /// Suspend the caller for whatever remains of the minimum send duration,
    /// measured from `started`. Returns immediately if the send already took
    /// long enough.
    pub fn pace(&self, bytes: usize, started: Instant) {
        let minimum = self.minimum_send_duration(bytes);
        let elapsed = started.elapsed();
        if elapsed < minimum {
            std::thread::sleep(minimum - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_duration_rounds_up() {
        let pacer = ChunkPacer::new(6000);
        assert_eq!(pacer.minimum_send_duration(6000), Duration::from_millis(1000));
        assert_eq!(pacer.minimum_send_duration(6001), Duration::from_millis(1001));
        assert_eq!(pacer.minimum_send_duration(1), Duration::from_millis(1));
        assert_eq!(pacer.minimum_send_duration(0), Duration::ZERO);
    }

    #[test]
    fn zero_budget_disables_pacing() {
        let pacer = ChunkPacer::new(0);
        assert_eq!(pacer.minimum_send_duration(999_999), Duration::ZERO);
        // Must not block.
        pacer.pace(999_999, Instant::now());
    }

    #[test]
    fn pace_returns_immediately_when_elapsed_exceeds_minimum() {
        let pacer = ChunkPacer::new(6000);
        let long_ago = Instant::now() - Duration::from_secs(5);

        let before = Instant::now();
        pacer.pace(600, long_ago);
        assert!(before.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn pace_sleeps_the_remaining_delta() {
        let pacer = ChunkPacer::new(6000);
        // 60 bytes at 6000 B/s -> 10 ms minimum.
        let started = Instant::now();
        pacer.pace(60, started);
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
