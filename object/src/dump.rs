//! Structure dumping for debugging.
//!
//! This module walks an encoded value token by token
//! and produces a lazy sequence of human readable text chunks,
//! without materializing the value tree.
//! The exact text of each chunk is not part of the format contract.

use crate::file::{ByteOrder, OpenFileOptions, ReadError};
use bintag_core::tag::{ContainerKind, Tag};
use bintag_core::value::Value;
use bintag_encoding::decode::basic::BasicDecoder;
use bintag_parser::stateful::decode::{self, StatefulDecoder};
use byteordered::Endianness;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Options for dumping the structure of an encoded value.
#[derive(Debug, Copy, Clone)]
pub struct DumpOptions {
    /// the number of spaces per nesting level
    pub indent_size: usize,
    /// nesting levels beyond this keep the same indentation
    pub max_indent_level: usize,
    /// how many payload bytes of blobs and arrays to show
    pub max_binary_bytes: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            indent_size: 2,
            max_indent_level: 16,
            max_binary_bytes: 16,
        }
    }
}

impl DumpOptions {
    /// Start with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of spaces per nesting level.
    pub fn indent_size(&mut self, indent_size: usize) -> &mut Self {
        self.indent_size = indent_size;
        self
    }

    /// Cap the indentation at the given nesting level.
    pub fn max_indent_level(&mut self, max_indent_level: usize) -> &mut Self {
        self.max_indent_level = max_indent_level;
        self
    }

    /// Set how many payload bytes of blobs and arrays to show.
    pub fn max_binary_bytes(&mut self, max_binary_bytes: usize) -> &mut Self {
        self.max_binary_bytes = max_binary_bytes;
        self
    }
}

/// Bookkeeping for one open container during the dump walk.
#[derive(Debug)]
struct DumpFrame {
    kind: ContainerKind,
    next_is_key: bool,
}

/// A lazy iterator of text chunks describing an encoded value
/// token by token, one chunk per line of output.
#[derive(Debug)]
pub struct DumpTokens<S> {
    dec: StatefulDecoder<S>,
    options: DumpOptions,
    frames: Vec<DumpFrame>,
    finished: bool,
}

impl<S> DumpTokens<S>
where
    S: Read + Seek,
{
    /// Create a token dump over a source positioned at a value.
    pub fn new(source: S, endianness: Endianness, options: DumpOptions) -> Self {
        DumpTokens {
            dec: StatefulDecoder::new(source, BasicDecoder::new(endianness)),
            options,
            frames: Vec::new(),
            finished: false,
        }
    }

    fn indent(&self) -> String {
        let level = self.frames.len().min(self.options.max_indent_level);
        " ".repeat(self.options.indent_size * level)
    }

    /// Account for one completed value at the current nesting level.
    fn value_done(&mut self) {
        match self.frames.last_mut() {
            None => self.finished = true,
            Some(frame) => {
                if frame.kind == ContainerKind::Dict {
                    frame.next_is_key = true;
                }
            }
        }
    }

    fn hex_preview(&mut self, total: usize) -> Result<String, decode::Error> {
        let shown = total.min(self.options.max_binary_bytes);
        let mut buf = vec![0; shown];
        self.dec.read_exact(&mut buf)?;
        self.dec.skip_bytes((total - shown) as u64)?;
        let mut text = String::new();
        for (i, byte) in buf.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            let _ = write!(text, "{:02x}", byte);
        }
        if shown < total {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str("..");
        }
        Ok(text)
    }

    fn array_line(&mut self) -> Result<String, decode::Error> {
        let (kind, shape) = self.dec.read_array_header()?;
        let total = shape.iter().product::<usize>() * kind.width();
        let preview = self.hex_preview(total)?;
        let mut text = format!("array {} (", kind);
        for (i, dim) in shape.iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            let _ = write!(text, "{}", dim);
        }
        let _ = write!(text, ") [{}]", preview);
        Ok(text)
    }

    fn next_chunk(&mut self) -> Result<Option<String>, decode::Error> {
        if self.finished {
            return Ok(None);
        }
        let position = self.dec.position();
        let tag = self.dec.read_tag()?;

        // dict keys come interleaved with the values
        if let Some(frame) = self.frames.last_mut() {
            if frame.kind == ContainerKind::Dict && frame.next_is_key {
                match tag {
                    Tag::Str => {
                        frame.next_is_key = false;
                        let key = self.dec.read_str_payload()?;
                        return Ok(Some(format!("{}{:?}:", self.indent(), key)));
                    }
                    Tag::DictClose => {
                        self.frames.pop();
                        let line = format!("{}}}", self.indent());
                        self.value_done();
                        return Ok(Some(line));
                    }
                    tag => {
                        return decode::UnexpectedTagSnafu { tag, position }.fail();
                    }
                }
            }
        }

        let line = match tag {
            Tag::Null => {
                let line = format!("{}null", self.indent());
                self.value_done();
                line
            }
            Tag::True | Tag::False => {
                let line = format!("{}{}", self.indent(), tag == Tag::True);
                self.value_done();
                line
            }
            Tag::I8
            | Tag::I16
            | Tag::I32
            | Tag::I64
            | Tag::U8
            | Tag::U16
            | Tag::U32
            | Tag::U64
            | Tag::F32
            | Tag::F64 => {
                let value = self.dec.read_scalar(tag)?;
                let line = format!("{}{}", self.indent(), scalar_text(&value));
                self.value_done();
                line
            }
            Tag::Str => {
                let text = self.dec.read_str_payload()?;
                let line = format!("{}str {:?}", self.indent(), text);
                self.value_done();
                line
            }
            Tag::Bytes => {
                let length = self.dec.read_length()?;
                let preview = self.hex_preview(length)?;
                let line = format!("{}bytes {} [{}]", self.indent(), length, preview);
                self.value_done();
                line
            }
            Tag::ListOpen => {
                let line = format!("{}[", self.indent());
                self.frames.push(DumpFrame {
                    kind: ContainerKind::List,
                    next_is_key: false,
                });
                line
            }
            Tag::DictOpen => {
                let line = format!("{}{{", self.indent());
                self.frames.push(DumpFrame {
                    kind: ContainerKind::Dict,
                    next_is_key: true,
                });
                line
            }
            Tag::ListClose => match self.frames.last() {
                Some(frame) if frame.kind == ContainerKind::List => {
                    self.frames.pop();
                    let line = format!("{}]", self.indent());
                    self.value_done();
                    line
                }
                _ => return decode::UnexpectedTagSnafu { tag, position }.fail(),
            },
            Tag::DictClose => match self.frames.last() {
                Some(frame) if frame.kind == ContainerKind::Dict => {
                    self.frames.pop();
                    let line = format!("{}}}", self.indent());
                    self.value_done();
                    line
                }
                _ => return decode::UnexpectedTagSnafu { tag, position }.fail(),
            },
            Tag::ArrayOpen => {
                let line = format!("{}{}", self.indent(), self.array_line()?);
                self.value_done();
                line
            }
        };
        Ok(Some(line))
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::I8(v) => format!("i8 {}", v),
        Value::I16(v) => format!("i16 {}", v),
        Value::I32(v) => format!("i32 {}", v),
        Value::I64(v) => format!("i64 {}", v),
        Value::U8(v) => format!("u8 {}", v),
        Value::U16(v) => format!("u16 {}", v),
        Value::U32(v) => format!("u32 {}", v),
        Value::U64(v) => format!("u64 {}", v),
        Value::F32(v) => format!("f32 {}", v),
        Value::F64(v) => format!("f64 {}", v),
        _ => format!("{:?}", value),
    }
}

impl<S> Iterator for DumpTokens<S>
where
    S: Read + Seek,
{
    type Item = Result<String, decode::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Walk the structure of a bintag file token by token.
pub fn dump_file<P>(
    path: P,
    byte_order: ByteOrder,
    options: DumpOptions,
) -> Result<DumpTokens<BufReader<File>>, ReadError>
where
    P: AsRef<Path>,
{
    let navigator = OpenFileOptions::new().byte_order(byte_order).open(path)?;
    let endianness = navigator.endianness();
    Ok(DumpTokens::new(navigator.into_inner(), endianness, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::to_bytes;
    use bintag_core::value::Array;
    use std::io::Cursor;

    fn dump_lines(value: &Value, options: DumpOptions) -> Vec<String> {
        let data = to_bytes(value, ByteOrder::Little).unwrap();
        DumpTokens::new(Cursor::new(data), Endianness::Little, options)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn dump_scalar_root() {
        let lines = dump_lines(&Value::int(5), DumpOptions::new());
        assert_eq!(lines, vec!["i8 5".to_string()]);
    }

    #[test]
    fn dump_nested_structure() {
        let value = Value::dict(vec![
            ("ok", Value::Bool(true)),
            ("items", Value::list(vec![Value::Null, Value::Str("hi".into())])),
        ]);
        let lines = dump_lines(&value, DumpOptions::new());
        assert_eq!(
            lines,
            vec![
                "{".to_string(),
                "  \"ok\":".to_string(),
                "  true".to_string(),
                "  \"items\":".to_string(),
                "  [".to_string(),
                "    null".to_string(),
                "    str \"hi\"".to_string(),
                "  ]".to_string(),
                "}".to_string(),
            ]
        );
    }

    #[test]
    fn dump_truncates_binary_previews() {
        let value = Value::list(vec![
            Value::Bytes(vec![0xAB; 8]),
            Value::Array(Array::from_vec(vec![1_u8, 2, 3, 4])),
        ]);
        let mut options = DumpOptions::new();
        options.max_binary_bytes(2);
        let lines = dump_lines(&value, options);
        assert_eq!(lines[1], "  bytes 8 [ab ab ..]");
        assert_eq!(lines[2], "  array u8 (4) [01 02 ..]");
    }

    #[test]
    fn dump_caps_indentation() {
        let value = Value::list(vec![Value::list(vec![Value::list(vec![Value::Null])])]);
        let mut options = DumpOptions::new();
        options.indent_size(1).max_indent_level(2);
        let lines = dump_lines(&value, options);
        assert_eq!(
            lines,
            vec![
                "[".to_string(),
                " [".to_string(),
                "  [".to_string(),
                "  null".to_string(),
                "  ]".to_string(),
                " ]".to_string(),
                "]".to_string(),
            ]
        );
    }
}
