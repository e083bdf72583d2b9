//! TUID generator and related types.

use crate::{id::RANDOM_BITS, isaac::Isaac64Engine, sequencer::ClockSequence};
use crate::{Error, Layout, LongTuid, NodeId, Tuid};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub mod with_rand08;


/// A trait that defines the minimum random number generator interface for [`Generator`].
pub trait RandSource {
    /// Returns the next random `u64`.
    fn next_u64(&mut self) -> u64;
}

impl RandSource for Isaac64Engine {
    fn next_u64(&mut self) -> u64 {
        self.next_word()
    }
}

/// A trait that defines the minimum system clock interface for [`Generator`].
pub trait TimeSource {
    /// Returns the current time in microseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRead`] if no reading is available. Implementations must not guess a
    /// timestamp.
    fn unix_ts_us(&mut self) -> Result<u64, Error>;
}

/// The default [`TimeSource`] that reads [`std::time::SystemTime`].
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

#[cfg(feature = "std")]
impl TimeSource for StdSystemTime {
    fn unix_ts_us(&mut self) -> Result<u64, Error> {
        use std::time;
        let elapsed = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_err(|_| Error::ClockRead("system clock is before the Unix epoch"))?;
        u64::try_from(elapsed.as_micros())
            .map_err(|_| Error::ClockRead("timestamp does not fit in 64 bits"))
    }
}

/// Represents a TUID generator that encapsulates the clock sequence, a random number generator,
/// and a system clock.
///
/// A single method call reads the clock, advances the sequence, and draws the random tail, so
/// guarding a generator with one lock makes each call a critical section in which the
/// `(timestamp, sequence)` pair is fixed before the random tail is drawn. The following example
/// guarantees the process-wide (cross-thread) monotonicity using Rust's standard synchronization
/// mechanism.
///
/// # Examples
///
/// ```rust
/// use std::{sync, thread};
/// use tuid::{isaac::Isaac64Engine, Generator, NodeId, StdSystemTime};
///
/// let engine = Isaac64Engine::new(&tuid::seed_material_from_entropy());
/// let g = Generator::with_rand_and_time_sources(engine, StdSystemTime);
/// let g = sync::Arc::new(sync::Mutex::new(g));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 let e = g.lock().unwrap().generate(NodeId::new(i)).unwrap();
///                 println!("{} by thread {}", e, i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// # Generator functions
///
/// | Method                 | Layout     | Timestamp | Touches sequence |
/// | ---------------------- | ---------- | --------- | ---------------- |
/// | [`generate`]           | `Standard` | Now       | Yes              |
/// | [`generate_core`]      | `Standard` | Argument  | Yes              |
/// | [`generate_long`]      | `Long`     | Now       | No               |
/// | [`generate_long_core`] | `Long`     | Argument  | No               |
/// | [`generate_into`]      | Either     | Now       | `Standard` only  |
///
/// [`generate`]: Generator::generate
/// [`generate_core`]: Generator::generate_core
/// [`generate_long`]: Generator::generate_long
/// [`generate_long_core`]: Generator::generate_long_core
/// [`generate_into`]: Generator::generate_into
#[derive(Clone, Debug)]
pub struct Generator<R, T> {
    sequence: ClockSequence,

    /// The random number generator used by the generator.
    rng: R,

    /// The system clock used by the generator.
    time_source: T,
}

impl<R: RandSource, T: TimeSource> Generator<R, T> {
    /// Creates a generator object with specified random number generator and system clock.
    pub const fn with_rand_and_time_sources(rng: R, time_source: T) -> Self {
        Self {
            sequence: ClockSequence::new(),
            rng,
            time_source,
        }
    }

    /// Generates a new standard TUID from the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRead`] if the time source fails; the sequence state is left untouched
    /// in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&mut self, node_id: NodeId) -> Result<Tuid, Error> {
        let unix_ts_us = self.time_source.unix_ts_us()?;
        Ok(self.generate_core(unix_ts_us, node_id))
    }

    /// Generates a new standard TUID from the `unix_ts_us` passed.
    ///
    /// The emitted timestamp is `unix_ts_us` or, if the clock has not moved past the last emitted
    /// timestamp, the last emitted timestamp with an incremented sequence.
    pub fn generate_core(&mut self, unix_ts_us: u64, node_id: NodeId) -> Tuid {
        let (timestamp, sequence) = self.sequence.advance(unix_ts_us);
        let random = self.rng.next_u64() >> (u64::BITS - RANDOM_BITS);
        Tuid::from_fields(timestamp, sequence, node_id.get(), random)
    }

    /// Generates a new long TUID from the current timestamp.
    ///
    /// The long layout has no sequence field, so this method neither reads nor updates the
    /// sequence state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRead`] if the time source fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_long(&mut self) -> Result<LongTuid, Error> {
        let unix_ts_us = self.time_source.unix_ts_us()?;
        Ok(self.generate_long_core(unix_ts_us))
    }

    /// Generates a new long TUID from the `unix_ts_us` passed.
    pub fn generate_long_core(&mut self, unix_ts_us: u64) -> LongTuid {
        let random = [
            self.rng.next_u64(),
            self.rng.next_u64(),
            self.rng.next_u64(),
        ];
        LongTuid::from_fields(unix_ts_us, random)
    }

    /// Writes a new identifier in `layout` to the front of `sink` and returns the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] before touching any state if `sink` is shorter than
    /// [`Layout::byte_len`], or [`Error::ClockRead`] if the time source fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, sink)))]
    pub fn generate_into(
        &mut self,
        layout: Layout,
        node_id: NodeId,
        sink: &mut [u8],
    ) -> Result<usize, Error> {
        let needed = layout.byte_len();
        let actual = sink.len();
        let Some(dst) = sink.get_mut(..needed) else {
            return Err(Error::BufferTooSmall { needed, actual });
        };
        match layout {
            Layout::Standard => dst.copy_from_slice(self.generate(node_id)?.as_bytes()),
            Layout::Long => dst.copy_from_slice(self.generate_long()?.as_bytes()),
        }
        Ok(needed)
    }

    /// Returns the clock sequence state.
    pub const fn sequence(&self) -> &ClockSequence {
        &self.sequence
    }

    /// Returns a mutable reference to the random number generator.
    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests_generate {
    use super::{with_rand08, Generator, TimeSource};
    use crate::{Error, Layout, NodeId, Tuid};
    use rand::rngs::mock::StepRng;

    /// Time source that always returns the same reading.
    struct FixedTime(u64);

    impl TimeSource for FixedTime {
        fn unix_ts_us(&mut self) -> Result<u64, Error> {
            Ok(self.0)
        }
    }

    /// Time source that never produces a reading.
    struct BrokenClock;

    impl TimeSource for BrokenClock {
        fn unix_ts_us(&mut self) -> Result<u64, Error> {
            Err(Error::ClockRead("unplugged"))
        }
    }

    type StepGen<T> = Generator<with_rand08::Adapter<StepRng>, T>;

    /// Generates increasing TUIDs even with decreasing or constant timestamp
    #[test]
    fn generates_increasing_tuids_even_with_decreasing_or_constant_timestamp() {
        let ts = 0x0005_d7e2_1c3a_b51cu64;
        let mut g = Generator::for_testing();
        let mut prev = g.generate_core(ts, NodeId::new(1));
        assert_eq!(prev.timestamp_us(), ts);
        for i in 0..100_000u64 {
            let curr = g.generate_core(ts - i.min(4_000), NodeId::new(1));
            assert!(prev < curr);
            prev = curr;
        }
        assert!(prev.timestamp_us() >= ts);
    }

    /// Packs the golden value from a zero random stream
    #[test]
    fn packs_the_golden_value_from_a_zero_random_stream() {
        let mut g = Generator::with_rand08(StepRng::new(0, 0), FixedTime(0));
        let e = g.generate_core(0x0102_0304_0506_0708, NodeId::new(0));
        assert_eq!(
            e.as_bytes(),
            &[
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x40, 0x70, 0xa0, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00,
            ]
        );
    }

    /// Fills the tail with the most significant bits of a random word
    #[test]
    fn fills_the_tail_with_the_most_significant_bits_of_a_random_word() {
        let word = 0xfedc_ba98_7654_3210u64;
        let mut g = Generator::with_rand08(StepRng::new(word, 0), FixedTime(0));
        let e = g.generate_core(1, NodeId::new(0));
        assert_eq!(e.random(), word >> 22);
    }

    /// Carries sequence and node id through to the identifier
    #[test]
    fn carries_sequence_and_node_id_through_to_the_identifier() {
        let ts = 0x0005_d7e2_1c3a_b51cu64;
        let mut g: StepGen<_> = Generator::with_rand08(StepRng::new(0, 1), FixedTime(ts));
        for i in 0..=255u8 {
            let e = g.generate(NodeId::new(i)).unwrap();
            assert_eq!(e.timestamp_us(), ts);
            assert_eq!(e.sequence(), i);
            assert_eq!(e.node_id(), i);
        }
        let e = g.generate(NodeId::new(9)).unwrap();
        assert_eq!((e.timestamp_us(), e.sequence()), (ts + 1, 0));
        assert_eq!(g.sequence().last_time_us(), ts + 1);
    }

    /// Generates long TUIDs without touching the sequence
    #[test]
    fn generates_long_tuids_without_touching_the_sequence() {
        let ts = 0x0005_d7e2_1c3a_b51cu64;
        let mut g = Generator::with_rand08(StepRng::new(1, 1), FixedTime(ts));
        g.generate_core(ts + 10, NodeId::new(3));
        g.generate_core(ts + 10, NodeId::new(3));
        let before = g.sequence().clone();

        let e = g.generate_long().unwrap();
        assert_eq!(e.timestamp_us(), ts);
        assert_eq!(e.random(), [3, 4, 5]);
        assert_eq!(g.sequence(), &before);

        let e = g.generate_core(ts + 10, NodeId::new(3));
        assert_eq!((e.timestamp_us(), e.sequence()), (ts + 10, 2));
    }

    /// Propagates clock failures without advancing the sequence
    #[test]
    fn propagates_clock_failures_without_advancing_the_sequence() {
        let mut g = Generator::with_rand08(StepRng::new(0, 1), BrokenClock);
        g.generate_core(1_000, NodeId::new(0));
        let before = g.sequence().clone();
        assert_eq!(
            g.generate(NodeId::new(0)),
            Err(Error::ClockRead("unplugged"))
        );
        assert_eq!(g.generate_long(), Err(Error::ClockRead("unplugged")));
        assert_eq!(g.sequence(), &before);
    }

    /// Writes either layout into a byte sink
    #[test]
    fn writes_either_layout_into_a_byte_sink() {
        let ts = 0x0102_0304_0506_0708u64;
        let mut g = Generator::with_rand08(StepRng::new(0, 0), FixedTime(ts));

        let mut sink = [0xaau8; 40];
        assert_eq!(
            g.generate_into(Layout::Standard, NodeId::new(0), &mut sink),
            Ok(16)
        );
        assert_eq!(sink[..16], *Tuid::from_fields(ts, 0, 0, 0).as_bytes());
        assert_eq!(sink[16..], [0xaa; 24]);

        assert_eq!(
            g.generate_into(Layout::Long, NodeId::new(0), &mut sink),
            Ok(32)
        );
        assert_eq!(sink[..8], ts.to_be_bytes());
        assert_eq!(sink[8..32], [0; 24]);
        assert_eq!(sink[32..], [0xaa; 8]);
    }

    /// Rejects a short sink before touching any state
    #[test]
    fn rejects_a_short_sink_before_touching_any_state() {
        let mut g = Generator::with_rand08(StepRng::new(0, 1), FixedTime(1_000));
        let mut sink = [0u8; 31];
        assert_eq!(
            g.generate_into(Layout::Long, NodeId::new(0), &mut sink),
            Err(Error::BufferTooSmall {
                needed: 32,
                actual: 31
            })
        );
        assert_eq!(
            g.generate_into(Layout::Standard, NodeId::new(0), &mut sink[..15]),
            Err(Error::BufferTooSmall {
                needed: 16,
                actual: 15
            })
        );
        assert_eq!(g.sequence().last_time_us(), 0);
        assert_eq!(sink, [0; 31]);
    }
}
