//! Time-ordered, UUID-shaped unique identifiers for database keys
//!
//! ```rust
//! let e = tuid::tuid();
//! println!("{}", e); // e.g. "0005d7e2-1c3a-4b51-8c00-9c1f2b3a4d5e"
//! println!("{:?}", e.as_bytes()); // as 16-byte big-endian array
//! ```
//!
//! Identifiers generated in one process sort by creation time both as bytes and as strings, and
//! fit into any column that stores a UUID.
//!
//! # Field and bit layout
//!
//! The standard 16-byte form has the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        unix_ts_us_hi                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         unix_ts_us_mid        |  ver  |     unix_ts_us_lo     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var| ts_4b |   sequence    |    node_id    |       rand        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 64-bit Unix timestamp in microseconds is split into `unix_ts_us_hi` (bits 63..32),
//!   `unix_ts_us_mid` (bits 31..16), `unix_ts_us_lo` (bits 15..4), and `ts_4b` (bits 3..0).
//! - The 4-bit `ver` field is set at `0100`.
//! - The 2-bit `var` field is set at `10`.
//! - The 8-bit `sequence` field orders identifiers generated within the same microsecond. It
//!   restarts at zero whenever the clock moves forward.
//! - The 8-bit `node_id` field distinguishes hosts or processes generating concurrently.
//! - The remaining 42 `rand` bits are the most significant bits of one ISAAC-64 output word.
//!
//! If the system clock moves backwards, the generator keeps the last timestamp and increments the
//! sequence. When the sequence would exceed 255 within one timestamp, the timestamp is advanced by
//! one microsecond instead; therefore, the embedded timestamp may run slightly ahead of the
//! real-time clock under heavy load.
//!
//! # Long form
//!
//! [`LongTuid`] is a 32-byte identifier made of the 8-byte big-endian timestamp followed by 24
//! random bytes. It carries no sequence, node id, version, or variant:
//!
//! ```rust
//! let e = tuid::tuid_long();
//! println!("{}", e); // 64 hexadecimal digits
//! ```
//!
//! # Crate features
//!
//! Default features:
//!
//! - `std` integrates the library with, among others, the system clock to draw current
//!   timestamps.
//! - `global_gen` (implies `std`) provides the process-wide generator behind [`tuid()`] and the
//!   other entry point functions.
//! - `tracing` (implies `std`) emits diagnostic events through the `tracing` crate.
//!
//! Optional features:
//!
//! - `serde` enables serialization/deserialization of [`Tuid`] and [`LongTuid`].
//! - `uuid` enables conversion from/to [`Uuid`](https://docs.rs/uuid).

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::Error;

mod id;
pub use id::{ParseError, Tuid, Variant};

mod long_id;
pub use long_id::LongTuid;

mod layout;
pub use layout::Layout;

mod node;
pub use node::NodeId;

pub mod isaac;
pub mod sequencer;

pub mod generator;
#[cfg(feature = "std")]
pub use generator::StdSystemTime;
pub use generator::{Generator, RandSource, TimeSource};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{
    generate_identifier, generate_long_identifier, node_id, seed, seed_from_entropy,
    seed_material_from_entropy, set_node_id, tuid, tuid_long, SharedGenerator,
};
