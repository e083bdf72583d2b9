#[cfg(not(feature = "std"))]
use core as std;

use std::{fmt, str};

use crate::Error;

/// Identifies the generating host or process in the standard layout.
///
/// Two nodes generating in the same microsecond with the same sequence value still differ in this
/// field; uniqueness across nodes that share an id is not guaranteed.
///
/// Values outside `0..=255` are rejected when the id is configured, never at generation time.
///
/// ```rust
/// use tuid::{Error, NodeId};
///
/// assert_eq!(NodeId::try_from(42i64)?.get(), 42);
/// assert_eq!(NodeId::try_from(256i64), Err(Error::InvalidNodeId(256)));
/// assert_eq!("7".parse::<NodeId>()?, NodeId::new(7));
/// # Ok::<(), Error>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct NodeId(u8);

impl NodeId {
    /// The environment variable read by [`NodeId::from_env`].
    pub const ENV_VAR: &'static str = "TUID_NODE_ID";

    /// Creates a node id.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the node id as a `u8`.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Reads the node id from the `TUID_NODE_ID` environment variable.
    ///
    /// Returns `Ok(None)` if the variable is not set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if the variable is set but does not hold an integer in
    /// `0..=255`.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn from_env() -> Result<Option<Self>, Error> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse().map(Some),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(Error::InvalidNodeId(-1)),
        }
    }
}

impl From<u8> for NodeId {
    fn from(src: u8) -> Self {
        Self(src)
    }
}

impl From<NodeId> for u8 {
    fn from(src: NodeId) -> Self {
        src.0
    }
}

macro_rules! impl_try_from_int {
    ($($t:ty),*) => {$(
        impl TryFrom<$t> for NodeId {
            type Error = Error;

            fn try_from(src: $t) -> Result<Self, Self::Error> {
                u8::try_from(src)
                    .map(Self)
                    .map_err(|_| Error::InvalidNodeId(i64::try_from(src).unwrap_or(i64::MAX)))
            }
        }
    )*};
}

impl_try_from_int!(i16, i32, i64, u16, u32, u64);

impl str::FromStr for NodeId {
    type Err = Error;

    /// Parses a decimal integer in `0..=255`.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let value = src.trim().parse::<i64>().map_err(|_| Error::InvalidNodeId(-1))?;
        Self::try_from(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
