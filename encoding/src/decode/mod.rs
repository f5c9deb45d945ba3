//! This module contains all decoding logic for the individual tokens
//! of the bintag grammar.

use bintag_core::tag::{ElementKind, LengthTier, Tag};
use bintag_core::value::Value;
use byteordered::Endianness;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::convert::TryFrom;
use std::io::{self, Read};

pub mod basic;

pub use self::basic::BasicDecoder;

/// Module-level error type:
/// for errors which may occur while decoding bintag tokens.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read the tag byte.
    #[snafu(display("Failed to read the value tag: {}", source))]
    ReadTag {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// The tag byte is not part of the alphabet.
    #[snafu(display("Unknown type tag byte 0x{:02X}", byte))]
    UnknownTag { byte: u8, backtrace: Backtrace },

    /// Failed to read the compact length prefix.
    #[snafu(display("Failed to read the length prefix: {}", source))]
    ReadLength {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// The length tier discriminator byte is not one of `1`, `2`, `4`, `8`.
    #[snafu(display("Unknown length tier discriminator 0x{:02X}", byte))]
    InvalidLengthTier { byte: u8, backtrace: Backtrace },

    /// The length cannot be addressed on this platform.
    #[snafu(display("Length {} exceeds the platform address space", length))]
    LengthOverflow { length: u64, backtrace: Backtrace },

    /// Failed to read a fixed-width scalar payload.
    #[snafu(display("Failed to read the scalar payload: {}", source))]
    ReadScalar {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// A fixed-width scalar was requested at a non-scalar tag.
    #[snafu(display("Tag {} does not introduce a fixed-width scalar", tag))]
    NotScalar { tag: Tag, backtrace: Backtrace },

    /// The array element tag does not name a numeric kind.
    #[snafu(display("Tag {} does not name a numeric element kind", tag))]
    UnknownElementKind { tag: Tag, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

/** Type trait for reading and decoding basic data values from a data source.
 *
 * This trait aims to provide methods for reading binary numbers based on the
 * source's endianness. Unlike `Decode`, this trait is not object safe.
 * However, it doesn't have to because there are, and only will be, two
 * possible implementations (`LittleEndianBasicDecoder` and
 * `BigEndianBasicDecoder`).
 */
pub trait BasicDecode {
    /// Retrieve the source's endianness, as expected by this decoder.
    fn endianness(&self) -> Endianness;

    /// Decode an unsigned byte from the given source.
    fn decode_u8<S>(&self, source: S) -> io::Result<u8>
    where
        S: Read;

    /// Decode an unsigned 16-bit integer from the given source.
    fn decode_u16<S>(&self, source: S) -> io::Result<u16>
    where
        S: Read;

    /// Decode an unsigned 32-bit integer from the given source.
    fn decode_u32<S>(&self, source: S) -> io::Result<u32>
    where
        S: Read;

    /// Decode an unsigned 64-bit integer from the given source.
    fn decode_u64<S>(&self, source: S) -> io::Result<u64>
    where
        S: Read;

    /// Decode a signed byte from the given source.
    fn decode_i8<S>(&self, source: S) -> io::Result<i8>
    where
        S: Read;

    /// Decode a signed 16-bit integer from the given source.
    fn decode_i16<S>(&self, source: S) -> io::Result<i16>
    where
        S: Read;

    /// Decode a signed 32-bit integer from the given source.
    fn decode_i32<S>(&self, source: S) -> io::Result<i32>
    where
        S: Read;

    /// Decode a signed 64-bit integer from the given source.
    fn decode_i64<S>(&self, source: S) -> io::Result<i64>
    where
        S: Read;

    /// Decode a single precision float from the given source.
    fn decode_f32<S>(&self, source: S) -> io::Result<f32>
    where
        S: Read;

    /// Decode a double precision float from the given source.
    fn decode_f64<S>(&self, source: S) -> io::Result<f64>
    where
        S: Read;
}

/// Type trait for decoding the tokens of the bintag grammar:
/// type tags, compact length prefixes, fixed-width scalars,
/// and array element kinds.
///
/// The trait is implemented for every basic decoder,
/// which resolves the byte order of multi-byte tokens.
pub trait Decode {
    /// Decode a type tag from the given source.
    fn decode_tag<S>(&self, source: S) -> Result<Tag>
    where
        S: Read;

    /// Decode a compact length prefix from the given source.
    ///
    /// Returns the length together with the width tier it was encoded in,
    /// so that callers can account for the number of bytes consumed
    /// (one discriminator byte plus the tier width).
    fn decode_length<S>(&self, source: S) -> Result<(usize, LengthTier)>
    where
        S: Read;

    /// Decode the payload of a fixed-width scalar
    /// whose tag has already been consumed.
    fn decode_scalar<S>(&self, source: S, tag: Tag) -> Result<Value>
    where
        S: Read;

    /// Decode the element kind tag of an array prefix.
    fn decode_element_kind<S>(&self, source: S) -> Result<ElementKind>
    where
        S: Read;
}

impl<T> Decode for T
where
    T: BasicDecode,
{
    fn decode_tag<S>(&self, source: S) -> Result<Tag>
    where
        S: Read,
    {
        let byte = self.decode_u8(source).context(ReadTagSnafu)?;
        Tag::from_u8(byte).context(UnknownTagSnafu { byte })
    }

    fn decode_length<S>(&self, mut source: S) -> Result<(usize, LengthTier)>
    where
        S: Read,
    {
        let byte = self.decode_u8(&mut source).context(ReadLengthSnafu)?;
        let tier = LengthTier::from_u8(byte).context(InvalidLengthTierSnafu { byte })?;
        let length = match tier {
            LengthTier::U8 => u64::from(self.decode_u8(&mut source).context(ReadLengthSnafu)?),
            LengthTier::U16 => u64::from(self.decode_u16(&mut source).context(ReadLengthSnafu)?),
            LengthTier::U32 => u64::from(self.decode_u32(&mut source).context(ReadLengthSnafu)?),
            LengthTier::U64 => self.decode_u64(&mut source).context(ReadLengthSnafu)?,
        };
        let value = usize::try_from(length)
            .ok()
            .context(LengthOverflowSnafu { length })?;
        Ok((value, tier))
    }

    fn decode_scalar<S>(&self, mut source: S, tag: Tag) -> Result<Value>
    where
        S: Read,
    {
        let value = match tag {
            Tag::Null => Value::Null,
            Tag::True => Value::Bool(true),
            Tag::False => Value::Bool(false),
            Tag::I8 => Value::I8(self.decode_i8(&mut source).context(ReadScalarSnafu)?),
            Tag::I16 => Value::I16(self.decode_i16(&mut source).context(ReadScalarSnafu)?),
            Tag::I32 => Value::I32(self.decode_i32(&mut source).context(ReadScalarSnafu)?),
            Tag::I64 => Value::I64(self.decode_i64(&mut source).context(ReadScalarSnafu)?),
            Tag::U8 => Value::U8(self.decode_u8(&mut source).context(ReadScalarSnafu)?),
            Tag::U16 => Value::U16(self.decode_u16(&mut source).context(ReadScalarSnafu)?),
            Tag::U32 => Value::U32(self.decode_u32(&mut source).context(ReadScalarSnafu)?),
            Tag::U64 => Value::U64(self.decode_u64(&mut source).context(ReadScalarSnafu)?),
            Tag::F32 => Value::F32(self.decode_f32(&mut source).context(ReadScalarSnafu)?),
            Tag::F64 => Value::F64(self.decode_f64(&mut source).context(ReadScalarSnafu)?),
            _ => return NotScalarSnafu { tag }.fail(),
        };
        Ok(value)
    }

    fn decode_element_kind<S>(&self, source: S) -> Result<ElementKind>
    where
        S: Read,
    {
        let tag = self.decode_tag(source)?;
        ElementKind::from_tag(tag).context(UnknownElementKindSnafu { tag })
    }
}
