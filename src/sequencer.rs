//! Monotonic clock and sequence state.

#[cfg(feature = "tracing")]
use tracing::trace;

/// The largest sequence value emitted for a single timestamp.
pub const MAX_SEQUENCE: u8 = u8::MAX;

/// Maps wall-clock readings to a non-decreasing `(timestamp, sequence)` pair.
///
/// The sequence disambiguates identifiers requested within the same microsecond or while the
/// system clock is behind the last emitted timestamp. When the sequence for a timestamp is used
/// up, the timestamp is advanced by one microsecond rather than letting the sequence overflow; the
/// emitted timestamp may therefore run slightly ahead of the real-time clock during bursts or
/// after a clock rollback.
///
/// The state is volatile: a new instance starts from `(0, 0)`, so the first reading after a restart
/// always counts as forward progress.
///
/// # Examples
///
/// ```rust
/// use tuid::sequencer::ClockSequence;
///
/// let mut s = ClockSequence::new();
/// assert_eq!(s.advance(1_000), (1_000, 0));
/// assert_eq!(s.advance(1_000), (1_000, 1));
/// assert_eq!(s.advance(900), (1_000, 2)); // clock went backwards
/// assert_eq!(s.advance(1_001), (1_001, 0));
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ClockSequence {
    last_time_us: u64,
    sequence: u8,
}

impl ClockSequence {
    /// Creates a sequence state starting at `(0, 0)`.
    pub const fn new() -> Self {
        Self {
            last_time_us: 0,
            sequence: 0,
        }
    }

    /// Advances the state with an observed clock reading and returns the pair to emit.
    ///
    /// The returned pair is greater than every pair previously returned by this instance, as long
    /// as the timestamp stays below `u64::MAX`. Once the state reaches `(u64::MAX, MAX_SEQUENCE)`
    /// it stays there, so the returned pairs never decrease.
    pub fn advance(&mut self, observed_time_us: u64) -> (u64, u8) {
        if observed_time_us > self.last_time_us {
            self.last_time_us = observed_time_us;
            self.sequence = 0;
        } else if self.sequence < MAX_SEQUENCE {
            #[cfg(feature = "tracing")]
            if observed_time_us < self.last_time_us {
                trace!(
                    observed_time_us,
                    last_time_us = self.last_time_us,
                    "clock behind last timestamp"
                );
            }
            self.sequence += 1;
        } else if self.last_time_us == u64::MAX {
            // no next microsecond to borrow; pin at the largest pair
            #[cfg(feature = "tracing")]
            trace!("sequence exhausted at the largest timestamp");
        } else {
            // sequence exhausted; borrow the next microsecond
            self.last_time_us += 1;
            self.sequence = 0;
            #[cfg(feature = "tracing")]
            trace!(
                last_time_us = self.last_time_us,
                "sequence exhausted, advanced timestamp"
            );
        }
        (self.last_time_us, self.sequence)
    }

    /// Returns the largest timestamp emitted so far.
    pub const fn last_time_us(&self) -> u64 {
        self.last_time_us
    }

    /// Returns the sequence emitted with [`last_time_us`](Self::last_time_us).
    pub const fn sequence(&self) -> u8 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockSequence, MAX_SEQUENCE};

    /// Emits increasing pairs for arbitrary readings
    #[test]
    fn emits_increasing_pairs_for_arbitrary_readings() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let mut s = ClockSequence::new();
        let mut prev = s.advance(1);
        let mut ts = 0x0005_d7e2_0000_0000u64;
        for _ in 0..200_000 {
            // mostly steady clock with occasional jumps in both directions
            ts = match rng.gen_range(0..100) {
                0 => ts - rng.gen_range(0..10_000),
                1 => ts + rng.gen_range(0..10_000),
                2..=49 => ts + 1,
                _ => ts,
            };
            let curr = s.advance(ts);
            assert!(prev < curr);
            assert!(curr.0 >= ts);
            prev = curr;
        }
    }

    /// Uses the stored timestamp while the clock is behind
    #[test]
    fn uses_the_stored_timestamp_while_the_clock_is_behind() {
        let mut s = ClockSequence::new();
        assert_eq!(s.advance(1_000), (1_000, 0));
        for i in 1..=5 {
            assert_eq!(s.advance(900 + i), (1_000, i as u8));
        }
        assert_eq!(s.advance(1_001), (1_001, 0));
        assert_eq!(s.last_time_us(), 1_001);
        assert_eq!(s.sequence(), 0);
    }

    /// Advances the timestamp once the sequence is exhausted
    #[test]
    fn advances_the_timestamp_once_the_sequence_is_exhausted() {
        let mut s = ClockSequence::new();
        let ts = 0x0123_4567_89ab_cdefu64;
        assert_eq!(s.advance(ts), (ts, 0));
        for i in 1..=MAX_SEQUENCE {
            assert_eq!(s.advance(ts), (ts, i));
        }
        assert_eq!(s.advance(ts), (ts + 1, 0));
        assert_eq!(s.advance(ts), (ts + 1, 1));

        // a reading equal to the synthetic timestamp does not count as progress
        assert_eq!(s.advance(ts + 1), (ts + 1, 2));
        assert_eq!(s.advance(ts + 2), (ts + 2, 0));
    }

    /// Never decreases at the largest timestamp
    #[test]
    fn never_decreases_at_the_largest_timestamp() {
        let mut s = ClockSequence::new();
        let mut prev = s.advance(u64::MAX);
        assert_eq!(prev, (u64::MAX, 0));
        for _ in 0..300 {
            let curr = s.advance(u64::MAX);
            assert!(prev <= curr, "decreased: {:?} -> {:?}", prev, curr);
            prev = curr;
        }
        assert_eq!(prev, (u64::MAX, MAX_SEQUENCE));
        assert_eq!(s.advance(0), (u64::MAX, MAX_SEQUENCE));

        let mut s = ClockSequence::new();
        s.advance(u64::MAX - 1);
        for _ in 0..MAX_SEQUENCE {
            s.advance(u64::MAX - 1);
        }
        assert_eq!(s.advance(u64::MAX - 1), (u64::MAX, 0));
    }

    /// Treats the first reading as forward progress
    #[test]
    fn treats_the_first_reading_as_forward_progress() {
        let mut s = ClockSequence::default();
        assert_eq!(s.advance(1), (1, 0));

        let mut s = ClockSequence::new();
        assert_eq!(s.advance(0), (0, 1));
    }
}
