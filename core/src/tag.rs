//! This module contains the frozen tag alphabet of the bintag format:
//! the one-byte discriminators at the head of each encoded value,
//! the width tiers of the compact length prefix,
//! and the closed set of numeric array element kinds.

use std::fmt;

/// A type tag: the single-byte discriminator
/// which precedes every encoded value.
///
/// The byte assignment is a fixed part of the format
/// and is shared between writer and reader.
/// Scalar tags are followed by a fixed-width payload,
/// blob tags ([`Str`](Tag::Str), [`Bytes`](Tag::Bytes)) by a
/// [compact length prefix](LengthTier) and that many payload bytes,
/// container tags delimit their children up to the matching close tag,
/// and [`ArrayOpen`](Tag::ArrayOpen) introduces a rank,
/// the dimension sizes, an element kind tag, and the dense payload.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Tag {
    /// The null value. No payload.
    Null = b'n',
    /// The boolean `true`. No payload.
    True = b'T',
    /// The boolean `false`. No payload.
    False = b'F',
    /// Signed 8-bit integer.
    I8 = b'i',
    /// Signed 16-bit integer.
    I16 = b'j',
    /// Signed 32-bit integer.
    I32 = b'k',
    /// Signed 64-bit integer.
    I64 = b'l',
    /// Unsigned 8-bit integer.
    U8 = b'I',
    /// Unsigned 16-bit integer.
    U16 = b'J',
    /// Unsigned 32-bit integer.
    U32 = b'K',
    /// Unsigned 64-bit integer.
    U64 = b'L',
    /// IEEE-754 single precision float.
    F32 = b'f',
    /// IEEE-754 double precision float.
    F64 = b'd',
    /// UTF-8 string, length-prefixed.
    Str = b's',
    /// Opaque byte blob, length-prefixed.
    Bytes = b'x',
    /// Start of an ordered heterogeneous sequence.
    ListOpen = b'[',
    /// End of a sequence.
    ListClose = b']',
    /// Start of an ordered mapping of string keys to values.
    DictOpen = b'{',
    /// End of a mapping.
    DictClose = b'}',
    /// Start of an N-dimensional numeric array.
    /// Arrays have no close tag:
    /// their extent is fully determined by the shape descriptor.
    ArrayOpen = b'@',
}

impl Tag {
    /// Interpret a raw byte as a type tag.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        let tag = match byte {
            b'n' => Tag::Null,
            b'T' => Tag::True,
            b'F' => Tag::False,
            b'i' => Tag::I8,
            b'j' => Tag::I16,
            b'k' => Tag::I32,
            b'l' => Tag::I64,
            b'I' => Tag::U8,
            b'J' => Tag::U16,
            b'K' => Tag::U32,
            b'L' => Tag::U64,
            b'f' => Tag::F32,
            b'd' => Tag::F64,
            b's' => Tag::Str,
            b'x' => Tag::Bytes,
            b'[' => Tag::ListOpen,
            b']' => Tag::ListClose,
            b'{' => Tag::DictOpen,
            b'}' => Tag::DictClose,
            b'@' => Tag::ArrayOpen,
            _ => return None,
        };
        Some(tag)
    }

    /// Retrieve the byte value of this tag.
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// The fixed payload width in bytes which follows this tag,
    /// if the tag introduces a fixed-width scalar.
    ///
    /// Returns `None` for blobs, containers, and the array prefix.
    pub fn scalar_width(self) -> Option<usize> {
        let width = match self {
            Tag::Null | Tag::True | Tag::False => 0,
            Tag::I8 | Tag::U8 => 1,
            Tag::I16 | Tag::U16 => 2,
            Tag::I32 | Tag::U32 | Tag::F32 => 4,
            Tag::I64 | Tag::U64 | Tag::F64 => 8,
            _ => return None,
        };
        Some(width)
    }

    /// Whether this tag opens a delimited container (list or dict).
    pub fn is_container_open(self) -> bool {
        matches!(self, Tag::ListOpen | Tag::DictOpen)
    }

    /// The terminator tag matching a container open tag.
    pub fn matching_close(self) -> Option<Tag> {
        match self {
            Tag::ListOpen => Some(Tag::ListClose),
            Tag::DictOpen => Some(Tag::DictClose),
            _ => None,
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag as u8
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", char::from(self.to_u8()))
    }
}

/// The kind of a delimited container: a list or a dict.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ContainerKind {
    /// An ordered heterogeneous sequence.
    List,
    /// An ordered mapping of string keys to values.
    Dict,
}

impl ContainerKind {
    /// The tag which opens a container of this kind.
    pub fn open_tag(self) -> Tag {
        match self {
            ContainerKind::List => Tag::ListOpen,
            ContainerKind::Dict => Tag::DictOpen,
        }
    }

    /// The terminator tag of a container of this kind.
    pub fn close_tag(self) -> Tag {
        match self {
            ContainerKind::List => Tag::ListClose,
            ContainerKind::Dict => Tag::DictClose,
        }
    }

    /// The container kind opened by the given tag, if any.
    pub fn of_open_tag(tag: Tag) -> Option<ContainerKind> {
        match tag {
            Tag::ListOpen => Some(ContainerKind::List),
            Tag::DictOpen => Some(ContainerKind::Dict),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContainerKind::List => f.write_str("list"),
            ContainerKind::Dict => f.write_str("dict"),
        }
    }
}

/// A width tier of the compact length prefix.
///
/// Lengths of strings, byte blobs, array ranks and array dimensions
/// are encoded as one discriminator byte selecting the width tier,
/// followed by an unsigned integer of that width
/// in the file-wide byte order.
/// The writer always picks the smallest tier that fits
/// (a zero length uses [`U8`](LengthTier::U8)).
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum LengthTier {
    /// 8-bit length.
    U8 = b'1',
    /// 16-bit length.
    U16 = b'2',
    /// 32-bit length.
    U32 = b'4',
    /// 64-bit length.
    U64 = b'8',
}

impl LengthTier {
    /// Interpret a raw byte as a length tier discriminator.
    pub fn from_u8(byte: u8) -> Option<LengthTier> {
        match byte {
            b'1' => Some(LengthTier::U8),
            b'2' => Some(LengthTier::U16),
            b'4' => Some(LengthTier::U32),
            b'8' => Some(LengthTier::U64),
            _ => None,
        }
    }

    /// The number of length bytes which follow the discriminator.
    pub fn width(self) -> usize {
        match self {
            LengthTier::U8 => 1,
            LengthTier::U16 => 2,
            LengthTier::U32 => 4,
            LengthTier::U64 => 8,
        }
    }

    /// The smallest tier which can hold the given length.
    pub fn fitting(length: u64) -> LengthTier {
        if length <= u64::from(u8::MAX) {
            LengthTier::U8
        } else if length <= u64::from(u16::MAX) {
            LengthTier::U16
        } else if length <= u64::from(u32::MAX) {
            LengthTier::U32
        } else {
            LengthTier::U64
        }
    }
}

/// The element kind of a numeric array:
/// one of the fixed-width integer or float scalar kinds.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ElementKind {
    /// Signed 8-bit integer elements.
    I8,
    /// Signed 16-bit integer elements.
    I16,
    /// Signed 32-bit integer elements.
    I32,
    /// Signed 64-bit integer elements.
    I64,
    /// Unsigned 8-bit integer elements.
    U8,
    /// Unsigned 16-bit integer elements.
    U16,
    /// Unsigned 32-bit integer elements.
    U32,
    /// Unsigned 64-bit integer elements.
    U64,
    /// Single precision float elements.
    F32,
    /// Double precision float elements.
    F64,
}

impl ElementKind {
    /// The width of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 => 8,
        }
    }

    /// The scalar tag announcing this element kind in an array prefix.
    pub fn tag(self) -> Tag {
        match self {
            ElementKind::I8 => Tag::I8,
            ElementKind::I16 => Tag::I16,
            ElementKind::I32 => Tag::I32,
            ElementKind::I64 => Tag::I64,
            ElementKind::U8 => Tag::U8,
            ElementKind::U16 => Tag::U16,
            ElementKind::U32 => Tag::U32,
            ElementKind::U64 => Tag::U64,
            ElementKind::F32 => Tag::F32,
            ElementKind::F64 => Tag::F64,
        }
    }

    /// Interpret a scalar tag as an array element kind.
    ///
    /// Returns `None` if the tag does not name a numeric scalar.
    pub fn from_tag(tag: Tag) -> Option<ElementKind> {
        let kind = match tag {
            Tag::I8 => ElementKind::I8,
            Tag::I16 => ElementKind::I16,
            Tag::I32 => ElementKind::I32,
            Tag::I64 => ElementKind::I64,
            Tag::U8 => ElementKind::U8,
            Tag::U16 => ElementKind::U16,
            Tag::U32 => ElementKind::U32,
            Tag::U64 => ElementKind::U64,
            Tag::F32 => ElementKind::F32,
            Tag::F64 => ElementKind::F64,
            _ => return None,
        };
        Some(kind)
    }

    /// Reverse the byte order of every element in a contiguous payload.
    ///
    /// The buffer length must be a multiple of the element width.
    pub fn swap_bytes(self, payload: &mut [u8]) {
        let width = self.width();
        if width == 1 {
            return;
        }
        for element in payload.chunks_exact_mut(width) {
            element.reverse();
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::U8 => "u8",
            ElementKind::U16 => "u16",
            ElementKind::U32 => "u32",
            ElementKind::U64 => "u64",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes_round_trip() {
        let all = [
            Tag::Null,
            Tag::True,
            Tag::False,
            Tag::I8,
            Tag::I16,
            Tag::I32,
            Tag::I64,
            Tag::U8,
            Tag::U16,
            Tag::U32,
            Tag::U64,
            Tag::F32,
            Tag::F64,
            Tag::Str,
            Tag::Bytes,
            Tag::ListOpen,
            Tag::ListClose,
            Tag::DictOpen,
            Tag::DictClose,
            Tag::ArrayOpen,
        ];
        for &tag in all.iter() {
            assert_eq!(Tag::from_u8(tag.to_u8()), Some(tag));
        }
        assert_eq!(Tag::from_u8(b'?'), None);
        assert_eq!(Tag::from_u8(0), None);
    }

    #[test]
    fn scalar_widths() {
        assert_eq!(Tag::Null.scalar_width(), Some(0));
        assert_eq!(Tag::True.scalar_width(), Some(0));
        assert_eq!(Tag::I8.scalar_width(), Some(1));
        assert_eq!(Tag::U16.scalar_width(), Some(2));
        assert_eq!(Tag::F32.scalar_width(), Some(4));
        assert_eq!(Tag::I64.scalar_width(), Some(8));
        assert_eq!(Tag::Str.scalar_width(), None);
        assert_eq!(Tag::ListOpen.scalar_width(), None);
        assert_eq!(Tag::ArrayOpen.scalar_width(), None);
    }

    #[test]
    fn container_pairing() {
        assert_eq!(Tag::ListOpen.matching_close(), Some(Tag::ListClose));
        assert_eq!(Tag::DictOpen.matching_close(), Some(Tag::DictClose));
        assert_eq!(Tag::ArrayOpen.matching_close(), None);
        assert!(Tag::ListOpen.is_container_open());
        assert!(!Tag::ListClose.is_container_open());
    }

    #[test]
    fn length_tier_selection() {
        assert_eq!(LengthTier::fitting(0), LengthTier::U8);
        assert_eq!(LengthTier::fitting(0xFF), LengthTier::U8);
        assert_eq!(LengthTier::fitting(0x100), LengthTier::U16);
        assert_eq!(LengthTier::fitting(0xFFFF), LengthTier::U16);
        assert_eq!(LengthTier::fitting(0x1_0000), LengthTier::U32);
        assert_eq!(LengthTier::fitting(0xFFFF_FFFF), LengthTier::U32);
        assert_eq!(LengthTier::fitting(0x1_0000_0000), LengthTier::U64);
        assert_eq!(LengthTier::fitting(u64::MAX), LengthTier::U64);
    }

    #[test]
    fn element_kind_tags() {
        for &kind in &[
            ElementKind::I8,
            ElementKind::I16,
            ElementKind::I32,
            ElementKind::I64,
            ElementKind::U8,
            ElementKind::U16,
            ElementKind::U32,
            ElementKind::U64,
            ElementKind::F32,
            ElementKind::F64,
        ] {
            assert_eq!(ElementKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ElementKind::from_tag(Tag::Str), None);
        assert_eq!(ElementKind::from_tag(Tag::True), None);
    }

    #[test]
    fn element_swap() {
        let mut buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        ElementKind::U32.swap_bytes(&mut buf);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01, 0x08, 0x07, 0x06, 0x05]);

        let mut buf = [0x01, 0x02];
        ElementKind::U8.swap_bytes(&mut buf);
        assert_eq!(buf, [0x01, 0x02]);
    }
}
