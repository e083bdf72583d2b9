/// Enumerates the identifier layouts a generator can produce.
///
/// | Layout       | Bytes | Fields                                                 |
/// | ------------ | ----- | ------------------------------------------------------ |
/// | [`Standard`] | 16    | timestamp, version, variant, sequence, node id, random |
/// | [`Long`]     | 32    | timestamp, random                                      |
///
/// [`Standard`]: Layout::Standard
/// [`Long`]: Layout::Long
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Layout {
    /// The UUID-shaped layout of [`Tuid`](crate::Tuid).
    #[default]
    Standard,

    /// The time-prefixed layout of [`LongTuid`](crate::LongTuid).
    Long,
}

impl Layout {
    /// Returns the encoded length in bytes.
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Standard => 16,
            Self::Long => 32,
        }
    }

    /// Returns the number of random words drawn per identifier.
    pub const fn random_words(self) -> usize {
        match self {
            Self::Standard => 1,
            Self::Long => 3,
        }
    }
}
