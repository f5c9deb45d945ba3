//! Module holding a stateful bintag token decoding abstraction.
//!
//! The stateful decoder owns a seekable data source,
//! keeps track of the cursor position,
//! and knows how to materialize or skip exactly one encoded value.

use bintag_core::tag::{ElementKind, Tag};
use bintag_core::value::{Array, InvalidArrayError, Value, C};
use bintag_encoding::decode::basic::BasicDecoder;
use bintag_encoding::decode::{BasicDecode, Decode};
use byteordered::Endianness;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{Read, Seek, SeekFrom};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    /// A grammar token failed to decode.
    #[snafu(display("Could not decode a token at position {}", position))]
    DecodeToken {
        position: u64,
        #[snafu(backtrace)]
        source: bintag_encoding::decode::Error,
    },

    /// A raw payload read failed.
    #[snafu(display("Could not read value data at position {}", position))]
    ReadValueData {
        position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The source ended before a declared payload was complete.
    #[snafu(display(
        "Payload of {} bytes at position {} exceeds the remaining data",
        length,
        position
    ))]
    TruncatedPayload {
        position: u64,
        length: usize,
        backtrace: Backtrace,
    },

    /// The source cursor could not be moved.
    #[snafu(display(
        "Could not move source cursor from position {} to {}",
        position,
        new_position
    ))]
    SeekSource {
        position: u64,
        new_position: u64,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A string payload failed UTF-8 validation.
    #[snafu(display("String at position {} is not valid UTF-8", position))]
    InvalidUtf8 {
        position: u64,
        source: std::string::FromUtf8Error,
        backtrace: Backtrace,
    },

    /// A tag appeared where it is not admitted by the grammar.
    #[snafu(display("Unexpected tag {} at position {}", tag, position))]
    UnexpectedTag {
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
    },

    /// An array shape descriptor is inconsistent.
    #[snafu(display("Invalid array at position {}", position))]
    InvalidArray {
        position: u64,
        source: InvalidArrayError,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A stateful abstraction for decoding bintag content
/// from a seekable data source.
///
/// The decoder assumes exclusive ownership of the source cursor:
/// the tracked position is updated on every successful operation
/// and is only trustworthy as long as nothing else moves the cursor.
#[derive(Debug)]
pub struct StatefulDecoder<S> {
    from: S,
    decoder: BasicDecoder,
    /// the assumed position of the reader source
    position: u64,
}

impl<S> StatefulDecoder<S> {
    /// Create a new stateful decoder
    /// for a source positioned at its beginning.
    pub fn new(from: S, decoder: BasicDecoder) -> Self {
        StatefulDecoder {
            from,
            decoder,
            position: 0,
        }
    }

    /// The byte order of this decoder.
    pub fn endianness(&self) -> Endianness {
        self.decoder.endianness()
    }

    /// Retrieve the known position of the inner source.
    ///
    /// After a failed operation this remains the position
    /// of the token which produced the error.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Recover the source.
    pub fn into_inner(self) -> S {
        self.from
    }
}

impl<S> StatefulDecoder<S>
where
    S: Read + Seek,
{
    /// Reposition the source cursor.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.from
            .seek(SeekFrom::Start(position))
            .context(SeekSourceSnafu {
                position: self.position,
                new_position: position,
            })?;
        self.position = position;
        Ok(())
    }

    /// Move the cursor forward without reading.
    pub fn skip_bytes(&mut self, length: u64) -> Result<()> {
        let new_position = self.position + length;
        self.from
            .seek(SeekFrom::Start(new_position))
            .context(SeekSourceSnafu {
                position: self.position,
                new_position,
            })?;
        self.position = new_position;
        Ok(())
    }

    /// Decode the type tag at the cursor, advancing past it.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let tag = self
            .decoder
            .decode_tag(&mut self.from)
            .context(DecodeTokenSnafu {
                position: self.position,
            })?;
        self.position += 1;
        Ok(tag)
    }

    /// Decode the type tag at the cursor without advancing.
    pub fn peek_tag(&mut self) -> Result<Tag> {
        let position = self.position;
        let tag = self.read_tag()?;
        self.seek(position)?;
        Ok(tag)
    }

    /// Decode a compact length prefix at the cursor, advancing past it.
    pub fn read_length(&mut self) -> Result<usize> {
        let (length, tier) = self
            .decoder
            .decode_length(&mut self.from)
            .context(DecodeTokenSnafu {
                position: self.position,
            })?;
        self.position += 1 + tier.width() as u64;
        Ok(length)
    }

    /// Decode the fixed-width payload of a scalar
    /// whose tag has already been consumed.
    pub fn read_scalar(&mut self, tag: Tag) -> Result<Value> {
        let value = self
            .decoder
            .decode_scalar(&mut self.from, tag)
            .context(DecodeTokenSnafu {
                position: self.position,
            })?;
        self.position += tag.scalar_width().unwrap_or(0) as u64;
        Ok(value)
    }

    /// Read exactly `buf.len()` payload bytes at the cursor.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.from.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => TruncatedPayloadSnafu {
                position: self.position,
                length: buf.len(),
            }
            .fail(),
            Err(e) => Err(e).context(ReadValueDataSnafu {
                position: self.position,
            }),
        }
    }

    /// Read the length prefix and payload of a string
    /// whose tag has already been consumed.
    pub fn read_str_payload(&mut self) -> Result<String> {
        let position = self.position;
        let length = self.read_length()?;
        let mut buf = vec![0; length];
        self.read_exact(&mut buf)?;
        String::from_utf8(buf).context(InvalidUtf8Snafu { position })
    }

    /// Read the length prefix and payload of a byte blob
    /// whose tag has already been consumed.
    pub fn read_bytes_payload(&mut self) -> Result<Vec<u8>> {
        let length = self.read_length()?;
        let mut buf = vec![0; length];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a string value at the cursor, tag included.
    ///
    /// Used for dict keys, which are always complete string values.
    pub fn read_key(&mut self) -> Result<String> {
        let position = self.position;
        let tag = self.read_tag()?;
        if tag != Tag::Str {
            return UnexpectedTagSnafu { tag, position }.fail();
        }
        self.read_str_payload()
    }

    /// Read the shape descriptor of an array
    /// whose open tag has already been consumed:
    /// the rank, the dimension sizes, and the element kind.
    pub fn read_array_header(&mut self) -> Result<(ElementKind, C<usize>)> {
        let rank = self.read_length()?;
        let mut shape = C::with_capacity(rank);
        for _ in 0..rank {
            shape.push(self.read_length()?);
        }
        let kind = self
            .decoder
            .decode_element_kind(&mut self.from)
            .context(DecodeTokenSnafu {
                position: self.position,
            })?;
        self.position += 1;
        Ok((kind, shape))
    }

    /// Read `count` array elements at the cursor into a native-order buffer.
    pub fn read_array_payload(&mut self, kind: ElementKind, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; count * kind.width()];
        self.read_exact(&mut buf)?;
        if self.endianness() != Endianness::native() {
            kind.swap_bytes(&mut buf);
        }
        Ok(buf)
    }

    /// Eagerly materialize the value at the cursor,
    /// advancing past exactly one complete value.
    pub fn read_value(&mut self) -> Result<Value> {
        let position = self.position;
        let tag = self.read_tag()?;
        self.read_value_of(tag, position)
    }

    fn read_value_of(&mut self, tag: Tag, open_position: u64) -> Result<Value> {
        match tag {
            Tag::Str => Ok(Value::Str(self.read_str_payload()?)),
            Tag::Bytes => Ok(Value::Bytes(self.read_bytes_payload()?)),
            Tag::ListOpen => {
                let mut items = Vec::new();
                loop {
                    let position = self.position;
                    let tag = self.read_tag()?;
                    if tag == Tag::ListClose {
                        return Ok(Value::List(items));
                    }
                    items.push(self.read_value_of(tag, position)?);
                }
            }
            Tag::DictOpen => {
                let mut pairs: Vec<(String, Value)> = Vec::new();
                loop {
                    let position = self.position;
                    let tag = self.read_tag()?;
                    if tag == Tag::DictClose {
                        return Ok(Value::Dict(pairs));
                    }
                    if tag != Tag::Str {
                        return UnexpectedTagSnafu { tag, position }.fail();
                    }
                    let key = self.read_str_payload()?;
                    if pairs.iter().any(|(k, _)| *k == key) {
                        tracing::warn!(
                            key = key.as_str(),
                            position,
                            "duplicate dict key, the last occurrence takes precedence"
                        );
                    }
                    let value = self.read_value()?;
                    pairs.push((key, value));
                }
            }
            Tag::ArrayOpen => {
                let (kind, shape) = self.read_array_header()?;
                let count = shape.iter().product::<usize>();
                let data = self.read_array_payload(kind, count)?;
                let array = Array::new(kind, shape, data).context(InvalidArraySnafu {
                    position: open_position,
                })?;
                Ok(Value::Array(array))
            }
            Tag::ListClose | Tag::DictClose => UnexpectedTagSnafu {
                tag,
                position: open_position,
            }
            .fail(),
            scalar => self.read_scalar(scalar),
        }
    }

    /// Advance the cursor past exactly one complete value
    /// without materializing it.
    pub fn skip_value(&mut self) -> Result<()> {
        let position = self.position;
        let tag = self.read_tag()?;
        self.skip_value_of(tag, position)
    }

    /// Advance the cursor past the remainder of one value
    /// whose tag has already been consumed.
    pub fn skip_value_of(&mut self, tag: Tag, open_position: u64) -> Result<()> {
        if let Some(width) = tag.scalar_width() {
            return self.skip_bytes(width as u64);
        }
        match tag {
            Tag::Str | Tag::Bytes => {
                let length = self.read_length()?;
                self.skip_bytes(length as u64)
            }
            Tag::ListOpen | Tag::DictOpen => {
                let mut depth = 1_usize;
                while depth > 0 {
                    let tag = self.read_tag()?;
                    match tag {
                        Tag::ListOpen | Tag::DictOpen => depth += 1,
                        Tag::ListClose | Tag::DictClose => depth -= 1,
                        Tag::Str | Tag::Bytes => {
                            let length = self.read_length()?;
                            self.skip_bytes(length as u64)?;
                        }
                        Tag::ArrayOpen => self.skip_array_payload()?,
                        scalar => {
                            // all remaining tags are fixed-width scalars
                            let width = scalar.scalar_width().unwrap_or(0);
                            self.skip_bytes(width as u64)?;
                        }
                    }
                }
                Ok(())
            }
            Tag::ArrayOpen => self.skip_array_payload(),
            // ListClose and DictClose have no scalar width and are not open tags
            _ => UnexpectedTagSnafu {
                tag,
                position: open_position,
            }
            .fail(),
        }
    }

    fn skip_array_payload(&mut self) -> Result<()> {
        let (kind, shape) = self.read_array_header()?;
        let count = shape.iter().product::<usize>();
        self.skip_bytes((count * kind.width()) as u64)
    }
}
