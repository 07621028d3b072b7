//! Drift-corrected submission pacing for self-paced output.
//!
//! Sleeping a fixed interval per chunk accumulates error, because the sleep
//! call itself has variable latency and the rest of the iteration takes time
//! too. [`PlaybackSchedule`] instead anchors every submission to an absolute
//! deadline on a monotonic clock: the deadline advances by exactly one chunk
//! interval per iteration no matter how long the previous iteration actually
//! took, so per-iteration error never compounds over a long-running stream.

/// Microseconds per second.
const MICROS_PER_SEC: u64 = 1_000_000;

/// Absolute-deadline pacing state for one output stream.
///
/// Feed it the current monotonic time each iteration; it returns how long to
/// sleep so the upcoming submission lands on schedule. The caller supplies
/// `now`, which keeps the schedule clock-agnostic and testable.
///
/// # Example
///
/// ```rust
/// use caudal_core::PlaybackSchedule;
///
/// let mut schedule = PlaybackSchedule::new(512, 44100);
/// assert_eq!(schedule.interval_micros(), 11610);
///
/// // First call anchors the schedule; submit immediately.
/// assert_eq!(schedule.advance(1_000), 0);
/// // Arriving early earns a sleep up to the next deadline...
/// assert_eq!(schedule.advance(2_000), 10_610);
/// // ...and arriving on the deadline proceeds without one.
/// assert_eq!(schedule.advance(24_220), 0);
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackSchedule {
    /// Monotonic deadline for the next submission; 0 until first use.
    next_deadline_micros: u64,
    /// Ideal spacing between consecutive submissions.
    interval_micros: u64,
}

impl PlaybackSchedule {
    /// Creates a schedule for chunks of `frames_per_chunk` frames played at
    /// `sample_rate` frames per second.
    ///
    /// The interval is rounded to the nearest microsecond; flooring would
    /// systematically under-sleep and let the submission rate creep ahead of
    /// the device.
    ///
    /// # Panics
    ///
    /// Panics if either argument is zero.
    pub fn new(frames_per_chunk: usize, sample_rate: u32) -> Self {
        assert!(frames_per_chunk > 0, "chunk must hold at least one frame");
        assert!(sample_rate > 0, "sample rate must be positive");

        let rate = u64::from(sample_rate);
        let interval = (frames_per_chunk as u64 * MICROS_PER_SEC + rate / 2) / rate;
        Self {
            next_deadline_micros: 0,
            interval_micros: interval,
        }
    }

    /// Ideal spacing between consecutive submissions, in microseconds.
    pub fn interval_micros(&self) -> u64 {
        self.interval_micros
    }

    /// Advances the schedule by one chunk and returns the microseconds the
    /// caller should sleep before submitting.
    ///
    /// The first call anchors the deadline at `now_micros` plus one interval
    /// and returns 0. Every later call moves the deadline forward by exactly
    /// one interval regardless of the sleep it returns: a late iteration gets
    /// a shorter (or zero) sleep instead of pushing all later deadlines back.
    /// When the loop is behind schedule the result is 0 and one chunk goes
    /// out immediately; there is no burst of catch-up submissions, the
    /// latency increase is taken once instead of overflowing the device
    /// queue.
    pub fn advance(&mut self, now_micros: u64) -> u64 {
        if self.next_deadline_micros == 0 {
            self.next_deadline_micros = now_micros + self.interval_micros;
            return 0;
        }

        let deadline = self.next_deadline_micros;
        self.next_deadline_micros = deadline + self.interval_micros;
        deadline.saturating_sub(now_micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rounds_to_nearest_microsecond() {
        // 512 frames at 44.1 kHz is 11609.97 us of audio.
        assert_eq!(PlaybackSchedule::new(512, 44100).interval_micros(), 11610);
        assert_eq!(PlaybackSchedule::new(480, 48000).interval_micros(), 10000);
        assert_eq!(PlaybackSchedule::new(64, 8000).interval_micros(), 8000);
    }

    #[test]
    fn first_call_anchors_without_sleeping() {
        let mut schedule = PlaybackSchedule::new(512, 44100);
        assert_eq!(schedule.advance(5_000), 0);
        // The very next call, at the same instant, sleeps a full interval.
        assert_eq!(schedule.advance(5_000), 11_610);
    }

    #[test]
    fn deadlines_step_by_one_interval() {
        // 10 frames at 1 MHz keeps the arithmetic readable: interval 10 us.
        let mut schedule = PlaybackSchedule::new(10, 1_000_000);
        assert_eq!(schedule.interval_micros(), 10);

        assert_eq!(schedule.advance(0), 0); // deadline 10
        assert_eq!(schedule.advance(4), 6); // deadline 20
        assert_eq!(schedule.advance(12), 8); // deadline 30
        assert_eq!(schedule.advance(30), 0); // deadline 40
        assert_eq!(schedule.advance(31), 9); // deadline 50
    }

    #[test]
    fn running_behind_never_bursts() {
        let mut schedule = PlaybackSchedule::new(10, 1_000_000);
        assert_eq!(schedule.advance(0), 0); // deadline 10

        // Fall three intervals behind: each call still hands out exactly one
        // zero-sleep submission while the deadline walks forward one interval
        // at a time.
        assert_eq!(schedule.advance(45), 0); // deadline 20
        assert_eq!(schedule.advance(45), 0); // deadline 30
        assert_eq!(schedule.advance(45), 0); // deadline 40
        assert_eq!(schedule.advance(45), 0); // deadline 50
        assert_eq!(schedule.advance(45), 5); // caught back up
    }

    #[test]
    fn perfect_sleeper_stays_locked_to_the_grid() {
        let mut schedule = PlaybackSchedule::new(512, 44100);
        let interval = schedule.interval_micros();

        let mut now = 777;
        let anchor = now;
        schedule.advance(now);
        for k in 1..1000u64 {
            now += schedule.advance(now);
            assert_eq!(now, anchor + k * interval, "drifted at iteration {k}");
        }
    }

    #[test]
    #[should_panic(expected = "sample rate must be positive")]
    fn zero_rate_panics() {
        let _ = PlaybackSchedule::new(512, 0);
    }
}
