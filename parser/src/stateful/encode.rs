//! Module holding a stateful bintag token encoding abstraction.
//!
//! Unlike the encoders of `bintag-encoding`,
//! the stateful encoder owns the data sink
//! and keeps track of how many bytes were written,
//! so that every error can report the output position.

use bintag_core::tag::{ElementKind, Tag};
use bintag_core::value::Value;
use bintag_encoding::encode::basic::BasicEncoder;
use bintag_encoding::encode::{BasicEncode, Encode};
use byteordered::Endianness;
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A grammar token failed to encode.
    #[snafu(display("Failed to encode a token at position {}", position))]
    EncodeToken {
        position: u64,
        #[snafu(backtrace)]
        source: bintag_encoding::encode::Error,
    },

    /// A raw payload write failed.
    #[snafu(display("Could not write value data at position {}", position))]
    WriteValueData {
        position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The array payload does not match the declared shape.
    #[snafu(display(
        "Array payload of {} bytes does not match the declared {} bytes at position {}",
        got,
        expected,
        position
    ))]
    ArrayPayloadLength {
        position: u64,
        expected: usize,
        got: usize,
        backtrace: Backtrace,
    },

    /// The sink failed to flush.
    #[snafu(display("Could not flush the sink at position {}", position))]
    FlushSink {
        position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A stateful abstraction for encoding bintag tokens into a data sink.
///
/// The encoder resolves the byte order of multi-byte tokens at run time
/// and records the number of bytes written so far.
#[derive(Debug)]
pub struct StatefulEncoder<W> {
    to: W,
    encoder: BasicEncoder,
    bytes_written: u64,
}

impl<W> StatefulEncoder<W> {
    /// Create a new stateful encoder for a sink at position zero.
    pub fn new(to: W, encoder: BasicEncoder) -> Self {
        StatefulEncoder {
            to,
            encoder,
            bytes_written: 0,
        }
    }

    /// Create a new stateful encoder for a sink whose head
    /// is already at the given position.
    pub fn new_with_position(to: W, encoder: BasicEncoder, position: u64) -> Self {
        StatefulEncoder {
            to,
            encoder,
            bytes_written: position,
        }
    }

    /// The byte order of this encoder.
    pub fn endianness(&self) -> Endianness {
        self.encoder.endianness()
    }

    /// Retrieve the number of bytes written so far by this encoder.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.to
    }
}

impl<W> StatefulEncoder<W>
where
    W: Write,
{
    /// Encode and write a single type tag.
    pub fn encode_tag(&mut self, tag: Tag) -> Result<()> {
        let bytes = self
            .encoder
            .encode_tag(&mut self.to, tag)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;
        Ok(())
    }

    /// Encode and write a compact length prefix.
    pub fn encode_length(&mut self, length: u64) -> Result<()> {
        let bytes = self
            .encoder
            .encode_length(&mut self.to, length)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;
        Ok(())
    }

    /// Encode and write a fixed-width scalar value, tag included.
    pub fn encode_scalar(&mut self, value: &Value) -> Result<()> {
        let bytes = self
            .encoder
            .encode_scalar(&mut self.to, value)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;
        Ok(())
    }

    /// Encode and write a complete string value.
    pub fn encode_str(&mut self, text: &str) -> Result<()> {
        let bytes = self
            .encoder
            .encode_str(&mut self.to, text)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;
        Ok(())
    }

    /// Encode and write a complete byte blob value.
    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<()> {
        let bytes = self
            .encoder
            .encode_bytes(&mut self.to, data)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;
        Ok(())
    }

    /// Encode and write a complete array value
    /// from a native-order element payload.
    ///
    /// The payload must hold exactly `product(shape)` elements;
    /// its bytes are reordered element-wise
    /// when the target byte order differs from the host's.
    pub fn encode_array(
        &mut self,
        kind: ElementKind,
        shape: &[usize],
        payload: &[u8],
    ) -> Result<()> {
        let expected = shape.iter().product::<usize>() * kind.width();
        ensure!(
            payload.len() == expected,
            ArrayPayloadLengthSnafu {
                position: self.bytes_written,
                expected,
                got: payload.len(),
            }
        );
        let bytes = self
            .encoder
            .encode_array_header(&mut self.to, kind, shape)
            .context(EncodeTokenSnafu {
                position: self.bytes_written,
            })?;
        self.bytes_written += bytes as u64;

        if self.endianness() == Endianness::native() || kind.width() == 1 {
            self.write_bytes(payload)
        } else {
            let mut swapped = payload.to_vec();
            kind.swap_bytes(&mut swapped);
            self.write_bytes(&swapped)
        }
    }

    /// Write all bytes directly to the inner sink.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.to.write_all(bytes).context(WriteValueDataSnafu {
            position: self.bytes_written,
        })?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush the inner sink.
    pub fn flush(&mut self) -> Result<()> {
        self.to.flush().context(FlushSinkSnafu {
            position: self.bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_position() {
        let mut sink = Vec::new();
        let mut enc = StatefulEncoder::new(&mut sink, BasicEncoder::new(Endianness::Little));
        enc.encode_tag(Tag::ListOpen).unwrap();
        assert_eq!(enc.bytes_written(), 1);
        enc.encode_scalar(&Value::I8(1)).unwrap();
        assert_eq!(enc.bytes_written(), 3);
        enc.encode_str("ab").unwrap();
        assert_eq!(enc.bytes_written(), 8);
        enc.encode_tag(Tag::ListClose).unwrap();
        assert_eq!(enc.bytes_written(), 9);
        assert_eq!(&*sink, &[b'[', b'i', 1, b's', b'1', 2, b'a', b'b', b']'][..]);
    }

    #[test]
    fn array_payload_le() {
        let mut sink = Vec::new();
        let mut enc = StatefulEncoder::new(&mut sink, BasicEncoder::new(Endianness::Little));
        let payload: Vec<u8> = vec![1_u16, 2, 3]
            .iter()
            .flat_map(|v| v.to_ne_bytes().to_vec())
            .collect();
        enc.encode_array(ElementKind::U16, &[3], &payload).unwrap();
        assert_eq!(
            &*sink,
            &[b'@', b'1', 1, b'1', 3, b'J', 1, 0, 2, 0, 3, 0][..]
        );
    }

    #[test]
    fn array_payload_be() {
        let mut sink = Vec::new();
        let mut enc = StatefulEncoder::new(&mut sink, BasicEncoder::new(Endianness::Big));
        let payload: Vec<u8> = vec![1_u16, 2, 3]
            .iter()
            .flat_map(|v| v.to_ne_bytes().to_vec())
            .collect();
        enc.encode_array(ElementKind::U16, &[3], &payload).unwrap();
        assert_eq!(
            &*sink,
            &[b'@', b'1', 1, b'1', 3, b'J', 0, 1, 0, 2, 0, 3][..]
        );
    }

    #[test]
    fn array_payload_mismatch() {
        let mut sink = Vec::new();
        let mut enc = StatefulEncoder::new(&mut sink, BasicEncoder::new(Endianness::Little));
        assert!(matches!(
            enc.encode_array(ElementKind::U16, &[3], &[0; 5]),
            Err(Error::ArrayPayloadLength {
                expected: 6,
                got: 5,
                ..
            })
        ));
    }
}
