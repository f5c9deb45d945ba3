#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! bintag encoding and decoding primitives.
//!
//! This crate provides the interfaces and implementations for reading and
//! writing the individual tokens of the bintag grammar: type tags, compact
//! length prefixes, fixed-width scalars, and array shape descriptors.
//! The byte order of multi-byte payloads is a construction parameter,
//! resolved at run time through [`BasicEncoder`](encode::basic::BasicEncoder)
//! and [`BasicDecoder`](decode::basic::BasicDecoder).
//!
//! For the time being, all APIs are based on synchronous I/O.

pub mod decode;
pub mod encode;

pub use byteordered::Endianness;
pub use decode::{BasicDecode, Decode};
pub use encode::{BasicEncode, Encode};
