//! Error types.

/// All errors that TUID generation and configuration can produce.
///
/// Packing and sequencing are total, so every variant originates at a boundary: an unseeded
/// generator, a bad configuration value, a failing collaborator, or a poisoned lock.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An identifier was requested from a shared generator before it was seeded.
    #[error("random engine has not been seeded")]
    UninitializedEngine,

    /// A shared generator was seeded more than once.
    #[error("random engine has already been seeded")]
    AlreadySeeded,

    /// A node id outside `0..=255` was supplied.
    #[error("node id {0} out of range 0..=255")]
    InvalidNodeId(i64),

    /// The time source could not produce a reading.
    #[error("could not read clock: {0}")]
    ClockRead(&'static str),

    /// A byte sink is too short to receive an identifier.
    #[error("buffer of {actual} bytes cannot hold a {needed}-byte identifier")]
    BufferTooSmall {
        /// Number of bytes the layout requires.
        needed: usize,
        /// Number of bytes the sink provides.
        actual: usize,
    },

    /// Another thread panicked while holding the shared generator.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(feature = "std")]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(feature = "std")]
#[cfg(test)]
mod tests {
    use super::Error;

    /// Formats human-readable messages
    #[test]
    fn formats_human_readable_messages() {
        assert_eq!(
            Error::InvalidNodeId(300).to_string(),
            "node id 300 out of range 0..=255"
        );
        assert_eq!(
            Error::BufferTooSmall {
                needed: 16,
                actual: 8
            }
            .to_string(),
            "buffer of 8 bytes cannot hold a 16-byte identifier"
        );
        assert_eq!(
            Error::ClockRead("system clock is before the Unix epoch").to_string(),
            "could not read clock: system clock is before the Unix epoch"
        );
    }
}
