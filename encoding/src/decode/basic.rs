//! This module provides implementations for primitive decoders of data,
//! which may be in either Little Endian or Big Endian.

use super::BasicDecode;
use byteordered::{ByteOrdered, Endianness};
use std::io::Read;

type Result<T> = std::io::Result<T>;

/// A basic decoder of primitive values in little endian.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct LittleEndianBasicDecoder;

impl BasicDecode for LittleEndianBasicDecoder {
    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn decode_u8<S>(&self, mut source: S) -> Result<u8>
    where
        S: Read,
    {
        let mut buf = [0_u8; 1];
        source.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn decode_u16<S>(&self, source: S) -> Result<u16>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_u16().map_err(Into::into)
    }

    fn decode_u32<S>(&self, source: S) -> Result<u32>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_u32().map_err(Into::into)
    }

    fn decode_u64<S>(&self, source: S) -> Result<u64>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_u64().map_err(Into::into)
    }

    fn decode_i8<S>(&self, source: S) -> Result<i8>
    where
        S: Read,
    {
        self.decode_u8(source).map(|v| v as i8)
    }

    fn decode_i16<S>(&self, source: S) -> Result<i16>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_i16().map_err(Into::into)
    }

    fn decode_i32<S>(&self, source: S) -> Result<i32>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_i32().map_err(Into::into)
    }

    fn decode_i64<S>(&self, source: S) -> Result<i64>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_i64().map_err(Into::into)
    }

    fn decode_f32<S>(&self, source: S) -> Result<f32>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_f32().map_err(Into::into)
    }

    fn decode_f64<S>(&self, source: S) -> Result<f64>
    where
        S: Read,
    {
        ByteOrdered::le(source).read_f64().map_err(Into::into)
    }
}

/// A basic decoder of primitive values in big endian.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct BigEndianBasicDecoder;

impl BasicDecode for BigEndianBasicDecoder {
    fn endianness(&self) -> Endianness {
        Endianness::Big
    }

    fn decode_u8<S>(&self, mut source: S) -> Result<u8>
    where
        S: Read,
    {
        let mut buf = [0_u8; 1];
        source.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn decode_u16<S>(&self, source: S) -> Result<u16>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_u16().map_err(Into::into)
    }

    fn decode_u32<S>(&self, source: S) -> Result<u32>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_u32().map_err(Into::into)
    }

    fn decode_u64<S>(&self, source: S) -> Result<u64>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_u64().map_err(Into::into)
    }

    fn decode_i8<S>(&self, source: S) -> Result<i8>
    where
        S: Read,
    {
        self.decode_u8(source).map(|v| v as i8)
    }

    fn decode_i16<S>(&self, source: S) -> Result<i16>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_i16().map_err(Into::into)
    }

    fn decode_i32<S>(&self, source: S) -> Result<i32>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_i32().map_err(Into::into)
    }

    fn decode_i64<S>(&self, source: S) -> Result<i64>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_i64().map_err(Into::into)
    }

    fn decode_f32<S>(&self, source: S) -> Result<f32>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_f32().map_err(Into::into)
    }

    fn decode_f64<S>(&self, source: S) -> Result<f64>
    where
        S: Read,
    {
        ByteOrdered::be(source).read_f64().map_err(Into::into)
    }
}

/// A basic decoder with support for both Little Endian an Big Endian
/// encoding, decided at run-time. Since only two values are possible,
/// this enum may become more efficient than the use of a trait object.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum BasicDecoder {
    /// Decode in Little Endian
    LE(LittleEndianBasicDecoder),
    /// Decode in Big Endian
    BE(BigEndianBasicDecoder),
}

impl BasicDecoder {
    /// Create a basic decoder for the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Little => LE(LittleEndianBasicDecoder),
            Endianness::Big => BE(BigEndianBasicDecoder),
        }
    }
}

use self::BasicDecoder::{BE, LE};

impl From<Endianness> for BasicDecoder {
    fn from(endianness: Endianness) -> Self {
        BasicDecoder::new(endianness)
    }
}

macro_rules! for_both {
    ($s: expr, |$e: ident| $f: expr) => {
        match *$s {
            LE(ref $e) => $f,
            BE(ref $e) => $f,
        }
    };
}

impl BasicDecode for BasicDecoder {
    fn endianness(&self) -> Endianness {
        match *self {
            LE(_) => Endianness::Little,
            BE(_) => Endianness::Big,
        }
    }

    fn decode_u8<S>(&self, source: S) -> Result<u8>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_u8(source))
    }

    fn decode_u16<S>(&self, source: S) -> Result<u16>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_u16(source))
    }

    fn decode_u32<S>(&self, source: S) -> Result<u32>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_u32(source))
    }

    fn decode_u64<S>(&self, source: S) -> Result<u64>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_u64(source))
    }

    fn decode_i8<S>(&self, source: S) -> Result<i8>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_i8(source))
    }

    fn decode_i16<S>(&self, source: S) -> Result<i16>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_i16(source))
    }

    fn decode_i32<S>(&self, source: S) -> Result<i32>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_i32(source))
    }

    fn decode_i64<S>(&self, source: S) -> Result<i64>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_i64(source))
    }

    fn decode_f32<S>(&self, source: S) -> Result<f32>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_f32(source))
    }

    fn decode_f64<S>(&self, source: S) -> Result<f64>
    where
        S: Read,
    {
        for_both!(self, |e| e.decode_f64(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integers() {
        let data: &[u8] = &[0xC3, 0x3C, 0x33, 0xCC, 0x55, 0xAA, 0x55, 0xAA];

        let le = LittleEndianBasicDecoder;
        let be = BigEndianBasicDecoder;

        assert_eq!(le.decode_u8(data).unwrap(), 0xC3);
        assert_eq!(be.decode_u8(data).unwrap(), 0xC3);
        assert_eq!(le.decode_u16(data).unwrap(), 0x3CC3);
        assert_eq!(be.decode_u16(data).unwrap(), 0xC33C);
        assert_eq!(le.decode_u32(data).unwrap(), 0xCC333CC3);
        assert_eq!(be.decode_u32(data).unwrap(), 0xC33C33CC);
        assert_eq!(le.decode_u64(data).unwrap(), 0xAA55AA55_CC333CC3);
        assert_eq!(be.decode_u64(data).unwrap(), 0xC33C33CC_55AA55AA);

        let le = BasicDecoder::new(Endianness::Little);
        let be = BasicDecoder::new(Endianness::Big);

        assert_eq!(le.decode_u16(data).unwrap(), 0x3CC3);
        assert_eq!(be.decode_u16(data).unwrap(), 0xC33C);
        assert_eq!(le.decode_u32(data).unwrap(), 0xCC333CC3);
        assert_eq!(be.decode_u32(data).unwrap(), 0xC33C33CC);
        assert_eq!(le.decode_u64(data).unwrap(), 0xAA55AA55_CC333CC3);
        assert_eq!(be.decode_u64(data).unwrap(), 0xC33C33CC_55AA55AA);
    }

    #[test]
    fn test_read_floats() {
        let data: &[u8] = &[0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x00];
        let le = BasicDecoder::new(Endianness::Little);
        assert_eq!(le.decode_f32(data).unwrap(), 1.0);

        let data: &[u8] = &[0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let be = BasicDecoder::new(Endianness::Big);
        assert_eq!(be.decode_f64(data).unwrap(), 1.0);
    }

    #[test]
    fn test_read_truncated() {
        let data: &[u8] = &[0x01];
        let le = BasicDecoder::new(Endianness::Little);
        assert!(le.decode_u16(data).is_err());
    }
}
