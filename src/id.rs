#[cfg(not(feature = "std"))]
use core as std;

use fstr::FStr;
use std::{fmt, str};

/// The number of random bits at the tail of a [`Tuid`].
pub const RANDOM_BITS: u32 = 42;

const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;

/// Represents a time-ordered unique identifier in the 16-byte standard layout.
///
/// A `Tuid` is a UUID-shaped value (version `4`, variant `10`) whose leading bits carry a
/// microsecond timestamp, followed by a sequence number, a node id, and a random tail. Byte order,
/// and therefore the derived [`Ord`], follows `(timestamp, sequence, node id, random)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Tuid([u8; 16]);

impl Tuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Packs field values into the standard layout.
    ///
    /// `random` supplies the 42-bit random tail; pass the most significant bits of a random word.
    ///
    /// # Panics
    ///
    /// Panics if `random` is not a 42-bit integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = Tuid::from_fields(0x0102_0304_0506_0708, 0, 0, 0);
    /// assert_eq!(&x.encode() as &str, "01020304-0506-4070-a000-000000000000");
    /// ```
    pub const fn from_fields(timestamp_us: u64, sequence: u8, node_id: u8, random: u64) -> Self {
        if random >= 1 << RANDOM_BITS {
            panic!("invalid field value");
        }

        let ts = timestamp_us as u128;
        Self(
            ((ts >> 16) << 80
                | 0x4 << 76
                | ((ts >> 4) & 0xfff) << 64
                | 0b10 << 62
                | (ts & 0xf) << 58
                | (sequence as u128) << 50
                | (node_id as u128) << 42
                | random as u128)
                .to_be_bytes(),
        )
    }

    /// Returns the microsecond timestamp.
    pub const fn timestamp_us(&self) -> u64 {
        let v = u128::from_be_bytes(self.0);
        ((v >> 80) << 16 | ((v >> 64) & 0xfff) << 4 | (v >> 58) & 0xf) as u64
    }

    /// Returns the sequence number.
    pub const fn sequence(&self) -> u8 {
        (u128::from_be_bytes(self.0) >> 50) as u8
    }

    /// Returns the node id.
    pub const fn node_id(&self) -> u8 {
        (u128::from_be_bytes(self.0) >> 42) as u8
    }

    /// Returns the 42-bit random tail.
    pub const fn random(&self) -> u64 {
        (u128::from_be_bytes(self.0) & RANDOM_MASK) as u64
    }

    /// Reports the variant field value of the UUID.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 4 {
            0x0..=0x7 => Variant::Var0,
            0x8..=0xb => Variant::Var10,
            0xc..=0xd => Variant::Var110,
            _ => Variant::VarReserved,
        }
    }

    /// Returns the version field value of the UUID or `None` if `self` does not have the variant
    /// field value of `10`.
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = "0005d7e2-1c3a-4b51-9c08-0bd5e4f1a2c3".parse::<Tuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "0005d7e2-1c3a-4b51-9c08-0bd5e4f1a2c3");
    /// assert_eq!(format!("{}", y), "0005d7e2-1c3a-4b51-9c08-0bd5e4f1a2c3");
    /// # Ok::<(), tuid::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        let mut buffer = [0u8; 36];
        let mut j = 0;
        for i in 0..16 {
            let [hi, lo] = hex_digits(self.0[i]);
            buffer[j] = hi;
            buffer[j + 1] = lo;
            j += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[j] = b'-';
                j += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: every byte written above is an ASCII hex digit or hyphen
        unsafe { FStr::from_bytes_unchecked(buffer) }
    }
}

/// The variant field values of UUIDs.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Variant {
    /// The variant field value of `0` (NCS backward compatibility).
    Var0,

    /// The variant field value of `10`, which every [`Tuid`] carries.
    Var10,

    /// The variant field value of `110` (Microsoft backward compatibility).
    Var110,

    /// The reserved variant field value of `111`.
    VarReserved,
}

/// Returns the two lowercase hexadecimal digits of `e`.
pub(crate) const fn hex_digits(e: u8) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    [DIGITS[(e >> 4) as usize], DIGITS[(e & 15) as usize]]
}

/// Parses two hexadecimal digits into a byte.
pub(crate) fn parse_hex_byte(iter: &mut str::Chars<'_>) -> Result<u8, ParseError> {
    const ERR: ParseError = ParseError {};
    let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
    let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
    Ok((hi << 4) | lo)
}

impl fmt::Display for Tuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Tuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let mut dst = [0u8; 16];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            *e = parse_hex_byte(&mut iter)?;
            if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
                return Err(ERR);
            }
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl From<Tuid> for [u8; 16] {
    fn from(src: Tuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Tuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Tuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Tuid> for u128 {
    fn from(src: Tuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Tuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

/// Error parsing an invalid string representation of an identifier.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("invalid string representation")]
pub struct ParseError {}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
mod std_ext {
    use super::{ParseError, Tuid};

    impl From<Tuid> for String {
        fn from(src: Tuid) -> Self {
            src.to_string()
        }
    }

    impl TryFrom<String> for Tuid {
        type Error = ParseError;

        fn try_from(src: String) -> Result<Self, Self::Error> {
            src.parse()
        }
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Tuid;

    impl From<Tuid> for uuid::Uuid {
        fn from(src: Tuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Tuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Tuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Tuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Tuid {
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
        type Value = Tuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a TUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
