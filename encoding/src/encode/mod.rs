//! This module contains all encoding logic for the individual tokens
//! of the bintag grammar.

use bintag_core::tag::{ElementKind, LengthTier, Tag};
use bintag_core::value::{Value, ValueType};
use byteordered::Endianness;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{self, Write};

pub mod basic;

pub use self::basic::BasicEncoder;

/// Module-level error type:
/// for errors which may occur while encoding bintag tokens.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Failed to write the tag byte.
    #[snafu(display("Failed to write the value tag: {}", source))]
    WriteTag {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// Failed to write the compact length prefix.
    #[snafu(display("Failed to write the length prefix: {}", source))]
    WriteLength {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// Failed to write a fixed-width scalar payload.
    #[snafu(display("Failed to write the scalar payload: {}", source))]
    WriteScalar {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// Failed to write a blob payload.
    #[snafu(display("Failed to write the payload: {}", source))]
    WriteData {
        backtrace: Backtrace,
        source: io::Error,
    },

    /// A fixed-width scalar write was requested for a non-scalar value.
    #[snafu(display("A {} value is not a fixed-width scalar", value_type))]
    NotScalar {
        value_type: ValueType,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/** Type trait for encoding and writing basic data values to a data sink.
 *
 * This trait provides methods for writing binary numbers in the sink's
 * expected endianness. Unlike `Encode`, this trait is not object safe,
 * but it doesn't have to be: there are, and only will be, two possible
 * implementations (`LittleEndianBasicEncoder` and `BigEndianBasicEncoder`).
 */
pub trait BasicEncode {
    /// Retrieve the sink's endianness, as expected by this encoder.
    fn endianness(&self) -> Endianness;

    /// Encode an unsigned byte to the given sink.
    fn encode_u8<S>(&self, to: S, value: u8) -> io::Result<()>
    where
        S: Write;

    /// Encode an unsigned 16-bit integer to the given sink.
    fn encode_u16<S>(&self, to: S, value: u16) -> io::Result<()>
    where
        S: Write;

    /// Encode an unsigned 32-bit integer to the given sink.
    fn encode_u32<S>(&self, to: S, value: u32) -> io::Result<()>
    where
        S: Write;

    /// Encode an unsigned 64-bit integer to the given sink.
    fn encode_u64<S>(&self, to: S, value: u64) -> io::Result<()>
    where
        S: Write;

    /// Encode a signed byte to the given sink.
    fn encode_i8<S>(&self, to: S, value: i8) -> io::Result<()>
    where
        S: Write;

    /// Encode a signed 16-bit integer to the given sink.
    fn encode_i16<S>(&self, to: S, value: i16) -> io::Result<()>
    where
        S: Write;

    /// Encode a signed 32-bit integer to the given sink.
    fn encode_i32<S>(&self, to: S, value: i32) -> io::Result<()>
    where
        S: Write;

    /// Encode a signed 64-bit integer to the given sink.
    fn encode_i64<S>(&self, to: S, value: i64) -> io::Result<()>
    where
        S: Write;

    /// Encode a single precision float to the given sink.
    fn encode_f32<S>(&self, to: S, value: f32) -> io::Result<()>
    where
        S: Write;

    /// Encode a double precision float to the given sink.
    fn encode_f64<S>(&self, to: S, value: f64) -> io::Result<()>
    where
        S: Write;
}

/// Type trait for encoding the tokens of the bintag grammar.
///
/// Every method returns the number of bytes written,
/// so that stateful layers can keep track of the output position.
/// The trait is implemented for every basic encoder,
/// which resolves the byte order of multi-byte tokens.
pub trait Encode {
    /// Encode a single type tag.
    fn encode_tag<S>(&self, to: S, tag: Tag) -> Result<usize>
    where
        S: Write;

    /// Encode a compact length prefix,
    /// picking the smallest width tier which fits the length.
    fn encode_length<S>(&self, to: S, length: u64) -> Result<usize>
    where
        S: Write;

    /// Encode a fixed-width scalar value, tag included.
    ///
    /// Fails with [`Error::NotScalar`] if the value is a blob,
    /// a container, or an array.
    fn encode_scalar<S>(&self, to: S, value: &Value) -> Result<usize>
    where
        S: Write;

    /// Encode a complete string value: tag, length prefix, and payload.
    fn encode_str<S>(&self, to: S, text: &str) -> Result<usize>
    where
        S: Write;

    /// Encode a complete byte blob value: tag, length prefix, and payload.
    fn encode_bytes<S>(&self, to: S, data: &[u8]) -> Result<usize>
    where
        S: Write;

    /// Encode an array prefix: the array tag, the rank,
    /// the dimension sizes, and the element kind tag.
    ///
    /// The element payload is not written here.
    fn encode_array_header<S>(&self, to: S, kind: ElementKind, shape: &[usize]) -> Result<usize>
    where
        S: Write;
}

impl<T> Encode for T
where
    T: BasicEncode,
{
    fn encode_tag<S>(&self, to: S, tag: Tag) -> Result<usize>
    where
        S: Write,
    {
        self.encode_u8(to, tag.to_u8()).context(WriteTagSnafu)?;
        Ok(1)
    }

    fn encode_length<S>(&self, mut to: S, length: u64) -> Result<usize>
    where
        S: Write,
    {
        let tier = LengthTier::fitting(length);
        self.encode_u8(&mut to, tier as u8).context(WriteLengthSnafu)?;
        match tier {
            LengthTier::U8 => self
                .encode_u8(&mut to, length as u8)
                .context(WriteLengthSnafu)?,
            LengthTier::U16 => self
                .encode_u16(&mut to, length as u16)
                .context(WriteLengthSnafu)?,
            LengthTier::U32 => self
                .encode_u32(&mut to, length as u32)
                .context(WriteLengthSnafu)?,
            LengthTier::U64 => self.encode_u64(&mut to, length).context(WriteLengthSnafu)?,
        }
        Ok(1 + tier.width())
    }

    fn encode_scalar<S>(&self, mut to: S, value: &Value) -> Result<usize>
    where
        S: Write,
    {
        let written = match value {
            Value::Null => self.encode_tag(&mut to, Tag::Null)?,
            Value::Bool(true) => self.encode_tag(&mut to, Tag::True)?,
            Value::Bool(false) => self.encode_tag(&mut to, Tag::False)?,
            Value::I8(v) => {
                self.encode_tag(&mut to, Tag::I8)?;
                self.encode_i8(&mut to, *v).context(WriteScalarSnafu)?;
                2
            }
            Value::I16(v) => {
                self.encode_tag(&mut to, Tag::I16)?;
                self.encode_i16(&mut to, *v).context(WriteScalarSnafu)?;
                3
            }
            Value::I32(v) => {
                self.encode_tag(&mut to, Tag::I32)?;
                self.encode_i32(&mut to, *v).context(WriteScalarSnafu)?;
                5
            }
            Value::I64(v) => {
                self.encode_tag(&mut to, Tag::I64)?;
                self.encode_i64(&mut to, *v).context(WriteScalarSnafu)?;
                9
            }
            Value::U8(v) => {
                self.encode_tag(&mut to, Tag::U8)?;
                self.encode_u8(&mut to, *v).context(WriteScalarSnafu)?;
                2
            }
            Value::U16(v) => {
                self.encode_tag(&mut to, Tag::U16)?;
                self.encode_u16(&mut to, *v).context(WriteScalarSnafu)?;
                3
            }
            Value::U32(v) => {
                self.encode_tag(&mut to, Tag::U32)?;
                self.encode_u32(&mut to, *v).context(WriteScalarSnafu)?;
                5
            }
            Value::U64(v) => {
                self.encode_tag(&mut to, Tag::U64)?;
                self.encode_u64(&mut to, *v).context(WriteScalarSnafu)?;
                9
            }
            Value::F32(v) => {
                self.encode_tag(&mut to, Tag::F32)?;
                self.encode_f32(&mut to, *v).context(WriteScalarSnafu)?;
                5
            }
            Value::F64(v) => {
                self.encode_tag(&mut to, Tag::F64)?;
                self.encode_f64(&mut to, *v).context(WriteScalarSnafu)?;
                9
            }
            _ => {
                return NotScalarSnafu {
                    value_type: value.value_type(),
                }
                .fail()
            }
        };
        Ok(written)
    }

    fn encode_str<S>(&self, mut to: S, text: &str) -> Result<usize>
    where
        S: Write,
    {
        let mut written = self.encode_tag(&mut to, Tag::Str)?;
        written += self.encode_length(&mut to, text.len() as u64)?;
        to.write_all(text.as_bytes()).context(WriteDataSnafu)?;
        Ok(written + text.len())
    }

    fn encode_bytes<S>(&self, mut to: S, data: &[u8]) -> Result<usize>
    where
        S: Write,
    {
        let mut written = self.encode_tag(&mut to, Tag::Bytes)?;
        written += self.encode_length(&mut to, data.len() as u64)?;
        to.write_all(data).context(WriteDataSnafu)?;
        Ok(written + data.len())
    }

    fn encode_array_header<S>(&self, mut to: S, kind: ElementKind, shape: &[usize]) -> Result<usize>
    where
        S: Write,
    {
        let mut written = self.encode_tag(&mut to, Tag::ArrayOpen)?;
        written += self.encode_length(&mut to, shape.len() as u64)?;
        for &dim in shape {
            written += self.encode_length(&mut to, dim as u64)?;
        }
        written += self.encode_tag(&mut to, kind.tag())?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lengths_le() {
        let le = BasicEncoder::new(Endianness::Little);
        let mut out = vec![];
        assert_eq!(le.encode_length(&mut out, 0).unwrap(), 2);
        assert_eq!(le.encode_length(&mut out, 0xFF).unwrap(), 2);
        assert_eq!(le.encode_length(&mut out, 0x100).unwrap(), 3);
        assert_eq!(le.encode_length(&mut out, 0x1_0000).unwrap(), 5);
        assert_eq!(
            &*out,
            &[
                b'1', 0x00, // 0
                b'1', 0xFF, // 255
                b'2', 0x00, 0x01, // 256
                b'4', 0x00, 0x00, 0x01, 0x00, // 65536
            ][..]
        );
    }

    #[test]
    fn encode_lengths_be() {
        let be = BasicEncoder::new(Endianness::Big);
        let mut out = vec![];
        be.encode_length(&mut out, 0x100).unwrap();
        be.encode_length(&mut out, 0x1_0000_0000).unwrap();
        assert_eq!(
            &*out,
            &[
                b'2', 0x01, 0x00, // 256
                b'8', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // 2^32
            ][..]
        );
    }

    #[test]
    fn encode_scalars() {
        let le = BasicEncoder::new(Endianness::Little);
        let mut out = vec![];
        le.encode_scalar(&mut out, &Value::Null).unwrap();
        le.encode_scalar(&mut out, &Value::Bool(true)).unwrap();
        le.encode_scalar(&mut out, &Value::Bool(false)).unwrap();
        le.encode_scalar(&mut out, &Value::I8(42)).unwrap();
        le.encode_scalar(&mut out, &Value::U16(10_000)).unwrap();
        assert_eq!(
            &*out,
            &[b'n', b'T', b'F', b'i', 0x2A, b'J', 0x10, 0x27][..]
        );

        let be = BasicEncoder::new(Endianness::Big);
        let mut out = vec![];
        be.encode_scalar(&mut out, &Value::U16(10_000)).unwrap();
        assert_eq!(&*out, &[b'J', 0x27, 0x10][..]);

        assert!(matches!(
            le.encode_scalar(&mut vec![], &Value::Str("no".into())),
            Err(Error::NotScalar { .. })
        ));
    }

    #[test]
    fn encode_blobs() {
        let le = BasicEncoder::new(Endianness::Little);
        let mut out = vec![];
        assert_eq!(le.encode_str(&mut out, "five").unwrap(), 7);
        assert_eq!(&*out, &[b's', b'1', 4, b'f', b'i', b'v', b'e'][..]);

        let mut out = vec![];
        assert_eq!(le.encode_str(&mut out, "").unwrap(), 3);
        assert_eq!(&*out, &[b's', b'1', 0][..]);

        let mut out = vec![];
        assert_eq!(le.encode_bytes(&mut out, &[0xAB, 0xCD]).unwrap(), 5);
        assert_eq!(&*out, &[b'x', b'1', 2, 0xAB, 0xCD][..]);
    }

    #[test]
    fn encode_array_prefix() {
        let le = BasicEncoder::new(Endianness::Little);
        let mut out = vec![];
        let written = le
            .encode_array_header(&mut out, ElementKind::I32, &[1, 2, 3])
            .unwrap();
        assert_eq!(written, out.len());
        assert_eq!(
            &*out,
            &[b'@', b'1', 3, b'1', 1, b'1', 2, b'1', 3, b'k'][..]
        );
    }
}
