#[cfg(not(feature = "std"))]
use core as std;

use fstr::FStr;
use std::{fmt, str};

use crate::id::{hex_digits, parse_hex_byte, ParseError};

/// Represents a time-prefixed identifier in the 32-byte long layout.
///
/// The first eight bytes hold the microsecond timestamp in big-endian order and the remaining 24
/// bytes are random. There are no version, variant, sequence, or node id fields, so a `LongTuid`
/// sorts by time without being UUID-compatible.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct LongTuid([u8; 32]);

impl LongTuid {
    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Packs a timestamp and three random words into the long layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::LongTuid;
    ///
    /// let x = LongTuid::from_fields(0x0102_0304_0506_0708, [0, 0, 1]);
    /// assert_eq!(
    ///     &x.encode() as &str,
    ///     "0102030405060708000000000000000000000000000000000000000000000001"
    /// );
    /// ```
    pub const fn from_fields(timestamp_us: u64, random: [u64; 3]) -> Self {
        let mut bytes = [0u8; 32];
        let words = [timestamp_us, random[0], random[1], random[2]];
        let mut i = 0;
        while i < 32 {
            bytes[i] = (words[i / 8] >> (56 - 8 * (i % 8))) as u8;
            i += 1;
        }
        Self(bytes)
    }

    /// Returns the microsecond timestamp.
    pub const fn timestamp_us(&self) -> u64 {
        self.word(0)
    }

    /// Returns the three random words.
    pub const fn random(&self) -> [u64; 3] {
        [self.word(1), self.word(2), self.word(3)]
    }

    const fn word(&self, n: usize) -> u64 {
        let mut w = 0;
        let mut i = 0;
        while i < 8 {
            w = (w << 8) | self.0[n * 8 + i] as u64;
            i += 1;
        }
        w
    }

    /// Returns the 64-digit hexadecimal string representation stored in a stack-allocated string
    /// type.
    pub fn encode(&self) -> FStr<64> {
        let mut buffer = [0u8; 64];
        for (dst, e) in buffer.chunks_exact_mut(2).zip(self.0) {
            dst.copy_from_slice(&hex_digits(e));
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: every byte written above is an ASCII hex digit
        unsafe { FStr::from_bytes_unchecked(buffer) }
    }
}

impl fmt::Display for LongTuid {
    /// Returns the 64-digit hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for LongTuid {
    type Err = ParseError;

    /// Creates an object from the 64-digit hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let mut dst = [0u8; 32];
        let mut iter = src.chars();
        for e in dst.iter_mut() {
            *e = parse_hex_byte(&mut iter)?;
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ParseError {})
        }
    }
}

impl From<LongTuid> for [u8; 32] {
    fn from(src: LongTuid) -> Self {
        src.0
    }
}

impl From<[u8; 32]> for LongTuid {
    fn from(src: [u8; 32]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for LongTuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, LongTuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for LongTuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for LongTuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = LongTuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a long TUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 32]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
