//! Process-wide generator, node id setting, and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync::{self, atomic};

use crate::generator::{StdSystemTime, TimeSource};
use crate::isaac::{Isaac64Engine, SEED_WORDS};
use crate::{Error, LongTuid, NodeId, Tuid};
use inner::SharedGenInner;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument, warn};

/// A [`Generator`](crate::Generator) guarded by a single lock and seeded exactly once.
///
/// Every method call locks the generator for the whole request, so identifiers produced through
/// one `SharedGenerator` are totally ordered by `(timestamp, sequence)` in lock-acquisition order
/// and never share that prefix.
///
/// # Examples
///
/// ```rust
/// use tuid::{Error, NodeId, SharedGenerator};
///
/// static GEN: SharedGenerator = SharedGenerator::new();
///
/// assert_eq!(GEN.generate(NodeId::new(1)), Err(Error::UninitializedEngine));
/// GEN.seed_from_entropy()?;
/// assert_eq!(GEN.seed_from_entropy(), Err(Error::AlreadySeeded));
///
/// let e = GEN.generate(NodeId::new(1))?;
/// assert_eq!(e.node_id(), 1);
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug)]
pub struct SharedGenerator<T = StdSystemTime> {
    inner: sync::OnceLock<sync::Mutex<SharedGenInner<T>>>,
}

impl<T> SharedGenerator<T> {
    /// Creates an unseeded shared generator.
    pub const fn new() -> Self {
        Self {
            inner: sync::OnceLock::new(),
        }
    }

    /// Returns `true` once the generator has been seeded.
    pub fn is_seeded(&self) -> bool {
        self.inner.get().is_some()
    }
}

impl<T> Default for SharedGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource + Default> SharedGenerator<T> {
    /// Seeds the generator with `material`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySeeded`] if the generator has already been seeded; the existing
    /// state is kept.
    pub fn seed(&self, material: &[u64; SEED_WORDS]) -> Result<(), Error> {
        self.inner
            .set(sync::Mutex::new(SharedGenInner::new(Isaac64Engine::new(
                material,
            ))))
            .map_err(|_| Error::AlreadySeeded)?;
        #[cfg(feature = "tracing")]
        debug!("seeded shared generator");
        Ok(())
    }

    /// Seeds the generator with [`seed_material_from_entropy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySeeded`] if the generator has already been seeded.
    pub fn seed_from_entropy(&self) -> Result<(), Error> {
        self.seed(&seed_material_from_entropy())
    }

    /// Generates a standard TUID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UninitializedEngine`] before seeding, [`Error::LockPoisoned`] if another
    /// thread panicked while holding the lock, or [`Error::ClockRead`] if the clock fails.
    pub fn generate(&self, node_id: NodeId) -> Result<Tuid, Error> {
        self.lock()?.get_mut().generate(node_id)
    }

    /// Generates a long TUID.
    ///
    /// # Errors
    ///
    /// Same as [`SharedGenerator::generate`].
    pub fn generate_long(&self) -> Result<LongTuid, Error> {
        self.lock()?.get_mut().generate_long()
    }

    /// Returns the lock handle of the seeded generator.
    fn lock(&self) -> Result<sync::MutexGuard<'_, SharedGenInner<T>>, Error> {
        let mutex = self.inner.get().ok_or(Error::UninitializedEngine)?;
        Ok(mutex.lock()?)
    }

    /// Returns the lock handle, seeding the generator from entropy if nobody has yet.
    ///
    /// A poisoned lock is taken over as is; the clock sequence and the engine stay consistent
    /// between method calls.
    fn lock_or_seed(&self) -> sync::MutexGuard<'_, SharedGenInner<T>> {
        self.inner
            .get_or_init(|| {
                #[cfg(feature = "tracing")]
                debug!("seeding shared generator on first use");
                sync::Mutex::new(SharedGenInner::new(Isaac64Engine::new(
                    &seed_material_from_entropy(),
                )))
            })
            .lock()
            .unwrap_or_else(sync::PoisonError::into_inner)
    }
}

mod inner {
    use crate::generator::{Generator, TimeSource};
    use crate::isaac::Isaac64Engine;

    /// A thin wrapper to reseed the engine when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct SharedGenInner<T> {
        #[cfg(unix)]
        pid: u32,
        generator: Generator<Isaac64Engine, T>,
    }

    impl<T: TimeSource + Default> SharedGenInner<T> {
        pub fn new(engine: Isaac64Engine) -> Self {
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: Generator::with_rand_and_time_sources(engine, T::default()),
            }
        }

        /// Returns a mutable reference to the inner [`Generator`] instance, reseeding the engine
        /// on Unix if the process ID has changed. The clock sequence carries over.
        pub fn get_mut(&mut self) -> &mut Generator<Isaac64Engine, T> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    parent_pid = self.pid,
                    pid = std::process::id(),
                    "process id changed, reseeding engine"
                );
                *self.generator.rng_mut() =
                    Isaac64Engine::new(&super::seed_material_from_entropy());
                self.pid = std::process::id();
            }
            &mut self.generator
        }
    }
}

/// The process-wide generator behind the free functions of this module.
static GLOBAL: SharedGenerator = SharedGenerator::new();

/// The process-wide node id used by [`tuid`].
static NODE_ID: atomic::AtomicU8 = atomic::AtomicU8::new(0);

/// Returns the process-wide node id, `0` unless changed by [`set_node_id`].
pub fn node_id() -> NodeId {
    NodeId::new(NODE_ID.load(atomic::Ordering::Relaxed))
}

/// Changes the process-wide node id used by [`tuid`] without touching the generator state.
///
/// # Examples
///
/// ```rust
/// use tuid::NodeId;
///
/// if let Some(node_id) = NodeId::from_env()? {
///     tuid::set_node_id(node_id);
/// }
/// # Ok::<(), tuid::Error>(())
/// ```
pub fn set_node_id(node_id: NodeId) {
    let previous = NODE_ID.swap(node_id.get(), atomic::Ordering::Relaxed);
    #[cfg(feature = "tracing")]
    info!(previous, current = node_id.get(), "node id changed");
    #[cfg(not(feature = "tracing"))]
    let _ = previous;
}

/// Composes seed material for [`Isaac64Engine`].
///
/// Word 0 holds the current time in microseconds, word 1 the process ID, and the rest comes from
/// the operating system's random source. If that source fails the remaining words stay zero and a
/// warning is logged.
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn seed_material_from_entropy() -> [u64; SEED_WORDS] {
    let mut material = [0u64; SEED_WORDS];
    material[0] = StdSystemTime.unix_ts_us().unwrap_or_default();
    material[1] = u64::from(std::process::id());
    if let Err(err) = rand::Rng::try_fill(&mut rand::rngs::OsRng, &mut material[2..]) {
        #[cfg(feature = "tracing")]
        warn!(%err, "operating system random source failed, seeding from time and pid only");
        #[cfg(not(feature = "tracing"))]
        let _ = err;
    }
    material
}

/// Seeds the process-wide generator with `material`.
///
/// # Errors
///
/// Returns [`Error::AlreadySeeded`] if the process-wide generator has already been seeded,
/// including implicitly by [`tuid`] or [`tuid_long`].
pub fn seed(material: &[u64; SEED_WORDS]) -> Result<(), Error> {
    GLOBAL.seed(material)
}

/// Seeds the process-wide generator with [`seed_material_from_entropy`].
///
/// # Errors
///
/// Returns [`Error::AlreadySeeded`] if the process-wide generator has already been seeded.
pub fn seed_from_entropy() -> Result<(), Error> {
    GLOBAL.seed_from_entropy()
}

/// Generates a standard TUID with the process-wide generator.
///
/// # Errors
///
/// Returns [`Error::UninitializedEngine`] unless [`seed`] or [`seed_from_entropy`] has been called
/// (or [`tuid`] has seeded the generator implicitly).
///
/// # Examples
///
/// ```rust
/// use tuid::{Error, NodeId};
///
/// tuid::seed(&tuid::seed_material_from_entropy())?;
/// let e = tuid::generate_identifier(NodeId::new(3))?;
/// assert_eq!(e.node_id(), 3);
/// # Ok::<(), Error>(())
/// ```
pub fn generate_identifier(node_id: NodeId) -> Result<Tuid, Error> {
    GLOBAL.generate(node_id)
}

/// Generates a long TUID with the process-wide generator.
///
/// The long layout neither reads the node id nor updates the clock sequence.
///
/// # Errors
///
/// Same as [`generate_identifier`].
pub fn generate_long_identifier() -> Result<LongTuid, Error> {
    GLOBAL.generate_long()
}

/// Generates a standard TUID with the process-wide generator and node id.
///
/// The generator is seeded from entropy on first use. On Unix, the engine is reseeded when the
/// process ID changes (i.e., upon process forks) to prevent collisions across processes.
///
/// # Panics
///
/// Panics if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// let e = tuid::tuid();
/// println!("{}", e); // e.g., "0005d7e2-1c3a-4b51-8c00-9c1f2b3a4d5e"
/// println!("{:?}", e.as_bytes()); // as 16-byte big-endian array
///
/// let text: String = tuid::tuid().to_string();
/// ```
pub fn tuid() -> Tuid {
    GLOBAL
        .lock_or_seed()
        .get_mut()
        .generate(node_id())
        .expect("tuid: could not read system clock")
}

/// Generates a long TUID with the process-wide generator.
///
/// # Panics
///
/// Panics if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// let e = tuid::tuid_long();
/// println!("{}", e); // 64 hexadecimal digits
/// ```
pub fn tuid_long() -> LongTuid {
    GLOBAL
        .lock_or_seed()
        .get_mut()
        .generate_long()
        .expect("tuid: could not read system clock")
}
