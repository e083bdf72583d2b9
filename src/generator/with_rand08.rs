//! Integration with `rand` (v0.8) crate.

use super::{Generator, RandSource, TimeSource};
use rand::RngCore;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
}

impl<T: RngCore, S: TimeSource> Generator<Adapter<T>, S> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.8) crate.
    ///
    /// Any `RngCore` works, which makes this the usual way to drive a generator from a
    /// deterministic source in tests. Production callers normally pass an
    /// [`Isaac64Engine`](crate::isaac::Isaac64Engine) to
    /// [`Generator::with_rand_and_time_sources`] instead.
    pub const fn with_rand08(rng: T, time_source: S) -> Self {
        Self::with_rand_and_time_sources(Adapter(rng), time_source)
    }
}
