//! Module for the random-access navigator:
//! a lazy cursor over a seekable byte source
//! which resolves navigation expressions against encoded data
//! without materializing intermediate parents.
//!
//! Containers are walked by skipping over siblings;
//! numeric arrays are the one place where the format admits
//! efficient random access, since their elements are fixed-width
//! and contiguous: any index tuple maps to a single seek and read.

use crate::stateful::decode::{self as decode, StatefulDecoder};
use bintag_core::selector::{
    output_shape, resolve_cells, resolve_index, CellSelector, ResolvedAxis, SelectError,
    SelectedIndices, Selector, SliceArg,
};
use bintag_core::tag::{ContainerKind, ElementKind, Tag};
use bintag_core::value::{array::element_value, Array, InvalidArrayError, Value, ValueType};
use bintag_encoding::decode::basic::BasicDecoder;
use byteordered::Endianness;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{Read, Seek};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The underlying decoder failed.
    #[snafu(display("Failed to read from the source"))]
    Read {
        #[snafu(backtrace)]
        source: decode::Error,
    },

    /// The navigation expression does not apply to the encoded data.
    #[snafu(display("Could not resolve the navigation expression: {}", source))]
    Select {
        source: SelectError,
        backtrace: Backtrace,
    },

    /// A tag appeared where the navigator expected a value.
    #[snafu(display("Unexpected tag {} at position {}", tag, position))]
    UnexpectedTag {
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
    },

    /// A gathered array turned out inconsistent.
    #[snafu(display("Invalid array gathered at position {}", position))]
    InvalidArray {
        position: u64,
        source: InvalidArrayError,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of value announced by a tag,
/// or `None` for container terminators.
fn tag_value_type(tag: Tag) -> Option<ValueType> {
    let vt = match tag {
        Tag::Null => ValueType::Null,
        Tag::True | Tag::False => ValueType::Bool,
        Tag::I8 => ValueType::I8,
        Tag::I16 => ValueType::I16,
        Tag::I32 => ValueType::I32,
        Tag::I64 => ValueType::I64,
        Tag::U8 => ValueType::U8,
        Tag::U16 => ValueType::U16,
        Tag::U32 => ValueType::U32,
        Tag::U64 => ValueType::U64,
        Tag::F32 => ValueType::F32,
        Tag::F64 => ValueType::F64,
        Tag::Str => ValueType::Str,
        Tag::Bytes => ValueType::Bytes,
        Tag::ListOpen => ValueType::List,
        Tag::DictOpen => ValueType::Dict,
        Tag::ArrayOpen => ValueType::Array,
        Tag::ListClose | Tag::DictClose => return None,
    };
    Some(vt)
}

/// Bookkeeping record for one entered ancestor container.
#[derive(Debug, Copy, Clone, PartialEq)]
struct FrameDesc {
    kind: ContainerKind,
    /// offset right after the container's open tag
    content_start: u64,
}

/// A lazy navigator over an encoded value in a seekable source.
///
/// The navigator holds a cursor position and a path stack
/// describing how that position was reached.
/// It can materialize the value at the cursor ([`read`](Navigator::read)),
/// skip it, descend into dict keys and list indices,
/// and resolve whole navigation expressions with slicing support
/// ([`fetch`](Navigator::fetch)).
///
/// Duplicate dict keys are tolerated:
/// keyed navigation stops at the **first** match,
/// whereas materializing a whole dict gives precedence
/// to the last occurrence on keyed access.
#[derive(Debug)]
pub struct Navigator<S> {
    dec: StatefulDecoder<S>,
    path: Vec<FrameDesc>,
}

impl<S> Navigator<S>
where
    S: Read + Seek,
{
    /// Create a navigator over a source positioned at its beginning.
    pub fn new(source: S, endianness: Endianness) -> Self {
        Navigator {
            dec: StatefulDecoder::new(source, BasicDecoder::new(endianness)),
            path: Vec::new(),
        }
    }

    /// The byte order of this navigator.
    pub fn endianness(&self) -> Endianness {
        self.dec.endianness()
    }

    /// The current cursor position in bytes.
    pub fn position(&self) -> u64 {
        self.dec.position()
    }

    /// The number of ancestors the cursor has descended into.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Recover the source.
    pub fn into_inner(self) -> S {
        self.dec.into_inner()
    }

    /// Move the cursor back to the root value
    /// and clear the path stack.
    pub fn rewind(&mut self) -> Result<()> {
        self.dec.seek(0).context(ReadSnafu)?;
        self.path.clear();
        Ok(())
    }

    /// Decode the tag at the cursor without advancing.
    pub fn peek_tag(&mut self) -> Result<Tag> {
        self.dec.peek_tag().context(ReadSnafu)
    }

    /// The kind of the value at the cursor, without advancing.
    pub fn value_type(&mut self) -> Result<ValueType> {
        let position = self.dec.position();
        let tag = self.peek_tag()?;
        tag_value_type(tag).ok_or_else(|| {
            UnexpectedTagSnafu { tag, position }
                .build()
        })
    }

    /// Materialize the value at the cursor,
    /// advancing past exactly one complete value.
    pub fn read(&mut self) -> Result<Value> {
        self.dec.read_value().context(ReadSnafu)
    }

    /// Advance the cursor past exactly one complete value.
    pub fn skip(&mut self) -> Result<()> {
        self.dec.skip_value().context(ReadSnafu)
    }

    /// The length of the container or array at the cursor:
    /// the child count of a list, the pair count of a dict,
    /// or the size of the first axis of an array.
    /// The cursor is left where it was.
    pub fn len(&mut self) -> Result<usize> {
        let start = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        let len = match tag {
            Tag::ListOpen => {
                let mut count = 0;
                loop {
                    let next = self.dec.peek_tag().context(ReadSnafu)?;
                    if next == Tag::ListClose {
                        break;
                    }
                    self.dec.skip_value().context(ReadSnafu)?;
                    count += 1;
                }
                count
            }
            Tag::DictOpen => {
                let mut count = 0;
                loop {
                    let next = self.dec.peek_tag().context(ReadSnafu)?;
                    if next == Tag::DictClose {
                        break;
                    }
                    // key, then value
                    self.dec.skip_value().context(ReadSnafu)?;
                    self.dec.skip_value().context(ReadSnafu)?;
                    count += 1;
                }
                count
            }
            Tag::ArrayOpen => {
                let (_, shape) = self.dec.read_array_header().context(ReadSnafu)?;
                shape[0]
            }
            tag => {
                return match tag_value_type(tag) {
                    Some(value_type) => Err(SelectError::TypeMismatch { value_type })
                        .context(SelectSnafu),
                    None => UnexpectedTagSnafu {
                        tag,
                        position: start,
                    }
                    .fail(),
                }
            }
        };
        self.dec.seek(start).context(ReadSnafu)?;
        Ok(len)
    }

    /// The keys of the dict at the cursor, in encounter order.
    /// The cursor is left where it was.
    pub fn keys(&mut self) -> Result<Vec<String>> {
        let start = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        if tag != Tag::DictOpen {
            return match tag_value_type(tag) {
                Some(value_type) => {
                    Err(SelectError::TypeMismatch { value_type }).context(SelectSnafu)
                }
                None => UnexpectedTagSnafu {
                    tag,
                    position: start,
                }
                .fail(),
            };
        }
        let mut keys = Vec::new();
        loop {
            let next = self.dec.peek_tag().context(ReadSnafu)?;
            if next == Tag::DictClose {
                break;
            }
            keys.push(self.dec.read_key().context(ReadSnafu)?);
            self.dec.skip_value().context(ReadSnafu)?;
        }
        self.dec.seek(start).context(ReadSnafu)?;
        Ok(keys)
    }

    /// Descend into the container at the cursor:
    /// push a path frame and advance past the open tag,
    /// leaving the cursor at the first child (or at the terminator).
    pub fn enter(&mut self) -> Result<ContainerKind> {
        let position = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        match ContainerKind::of_open_tag(tag) {
            Some(kind) => {
                self.path.push(FrameDesc {
                    kind,
                    content_start: self.dec.position(),
                });
                Ok(kind)
            }
            None => self.selector_mismatch(tag, position),
        }
    }

    /// Check for another child of the innermost entered container.
    ///
    /// Returns `true` with the cursor at the start of the next child
    /// (for dicts, at its key).
    /// At the terminator, consumes it, pops the path frame,
    /// and returns `false`; the cursor is then past the container.
    pub fn more_children(&mut self) -> Result<bool> {
        let close = match self.path.last() {
            Some(frame) => frame.kind.close_tag(),
            None => return Ok(false),
        };
        let tag = self.dec.peek_tag().context(ReadSnafu)?;
        if tag == close {
            self.dec.skip_bytes(1).context(ReadSnafu)?;
            self.path.pop();
            Ok(false)
        } else {
            Ok(true)
        }
    }

    /// Descend into the dict at the cursor,
    /// leaving the cursor at the value of the given key.
    ///
    /// Lookup is linear in the number of preceding keys;
    /// with duplicate keys, the first match wins.
    pub fn get_key(&mut self, key: &str) -> Result<()> {
        let position = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        if tag != Tag::DictOpen {
            return self.selector_mismatch(tag, position);
        }
        self.path.push(FrameDesc {
            kind: ContainerKind::Dict,
            content_start: self.dec.position(),
        });
        loop {
            let next_position = self.dec.position();
            let next = self.dec.read_tag().context(ReadSnafu)?;
            match next {
                Tag::DictClose => {
                    self.path.pop();
                    return Err(SelectError::KeyNotFound {
                        key: key.to_string(),
                    })
                    .context(SelectSnafu);
                }
                Tag::Str => {
                    let candidate = self.dec.read_str_payload().context(ReadSnafu)?;
                    if candidate == key {
                        return Ok(());
                    }
                    self.dec.skip_value().context(ReadSnafu)?;
                }
                tag => {
                    return UnexpectedTagSnafu {
                        tag,
                        position: next_position,
                    }
                    .fail()
                }
            }
        }
    }

    /// Descend into the list at the cursor,
    /// leaving the cursor at the child with the given index.
    ///
    /// Negative indices are resolved by first counting
    /// the children in a skip-only pass and then re-seeking.
    pub fn get_index(&mut self, index: i64) -> Result<()> {
        let position = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        if tag != Tag::ListOpen {
            return self.selector_mismatch(tag, position);
        }
        let content_start = self.dec.position();
        self.path.push(FrameDesc {
            kind: ContainerKind::List,
            content_start,
        });

        if index >= 0 {
            let mut passed = 0;
            loop {
                let next = self.dec.peek_tag().context(ReadSnafu)?;
                if next == Tag::ListClose {
                    return Err(SelectError::IndexOutOfRange { index, len: passed })
                        .context(SelectSnafu);
                }
                if passed as i64 == index {
                    return Ok(());
                }
                self.dec.skip_value().context(ReadSnafu)?;
                passed += 1;
            }
        }

        // negative index: count the children first
        let mut len = 0;
        loop {
            let next = self.dec.peek_tag().context(ReadSnafu)?;
            if next == Tag::ListClose {
                break;
            }
            self.dec.skip_value().context(ReadSnafu)?;
            len += 1;
        }
        let resolved = resolve_index(index, len).context(SelectSnafu)?;
        self.dec.seek(content_start).context(ReadSnafu)?;
        for _ in 0..resolved {
            self.dec.skip_value().context(ReadSnafu)?;
        }
        Ok(())
    }

    /// Resolve a navigation expression from the cursor
    /// and materialize the selected value.
    ///
    /// Key lookups and in-bounds integer indices into lists
    /// are pure cursor motion;
    /// slices gather a new value out of the selected children,
    /// and array selections read only the selected element bytes.
    /// Selectors after a slice apply to the gathered value in memory.
    pub fn fetch(&mut self, path: &[Selector]) -> Result<Value> {
        for (i, selector) in path.iter().enumerate() {
            let position = self.dec.position();
            let tag = self.dec.peek_tag().context(ReadSnafu)?;
            match (selector, tag) {
                (Selector::Key(key), Tag::DictOpen) => self.get_key(key)?,
                (Selector::Index(index), Tag::ListOpen) => self.get_index(*index)?,
                (Selector::Index(index), Tag::ArrayOpen) => {
                    let value = self.fetch_cells(&[CellSelector::Index(*index)])?;
                    return finish_in_memory(value, &path[i + 1..]);
                }
                (Selector::Slice(slice), Tag::ArrayOpen) => {
                    let value = self.fetch_cells(&[CellSelector::Slice(*slice)])?;
                    return finish_in_memory(value, &path[i + 1..]);
                }
                (Selector::Cells(cells), Tag::ArrayOpen) => {
                    let value = self.fetch_cells(cells)?;
                    return finish_in_memory(value, &path[i + 1..]);
                }
                (Selector::Slice(slice), Tag::ListOpen) => {
                    let value = self.fetch_list_slice(slice)?;
                    return finish_in_memory(value, &path[i + 1..]);
                }
                (_, tag) => return self.selector_mismatch(tag, position),
            }
        }
        self.read()
    }

    /// Gather a slice of the list at the cursor into a new list,
    /// leaving the cursor past the source list.
    fn fetch_list_slice(&mut self, slice: &SliceArg) -> Result<Value> {
        let position = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        if tag != Tag::ListOpen {
            return self.selector_mismatch(tag, position);
        }
        // one pass to record where each child starts
        let mut offsets = Vec::new();
        loop {
            let child_start = self.dec.position();
            let next = self.dec.peek_tag().context(ReadSnafu)?;
            if next == Tag::ListClose {
                self.dec.skip_bytes(1).context(ReadSnafu)?;
                break;
            }
            offsets.push(child_start);
            self.dec.skip_value().context(ReadSnafu)?;
        }
        let end = self.dec.position();

        let resolved = slice.resolve(offsets.len()).context(SelectSnafu)?;
        let mut items = Vec::with_capacity(resolved.count);
        for index in resolved.indices() {
            self.dec.seek(offsets[index]).context(ReadSnafu)?;
            items.push(self.dec.read_value().context(ReadSnafu)?);
        }
        self.dec.seek(end).context(ReadSnafu)?;
        Ok(Value::List(items))
    }

    /// Resolve a per-axis selection against the array at the cursor,
    /// reading only the selected element bytes,
    /// and leave the cursor past the source array.
    fn fetch_cells(&mut self, cells: &[CellSelector]) -> Result<Value> {
        let open_position = self.dec.position();
        let tag = self.dec.read_tag().context(ReadSnafu)?;
        if tag != Tag::ArrayOpen {
            return self.selector_mismatch(tag, open_position);
        }
        let (kind, shape) = self.dec.read_array_header().context(ReadSnafu)?;
        let width = kind.width();
        let payload_start = self.dec.position();
        let total = shape.iter().product::<usize>();
        let end = payload_start + (total * width) as u64;

        let plan = resolve_cells(&shape, cells).context(SelectSnafu)?;
        let all_indexed = plan
            .iter()
            .all(|axis| matches!(axis, ResolvedAxis::Index(_)));

        let value = if all_indexed {
            // a full index tuple maps to a single seek and read
            let element = SelectedIndices::new(&shape, &plan).next().unwrap_or(0);
            self.dec
                .seek(payload_start + (element * width) as u64)
                .context(ReadSnafu)?;
            let data = self.dec.read_array_payload(kind, 1).context(ReadSnafu)?;
            element_value(kind, &data)
        } else {
            let out_shape = output_shape(&plan);
            let out_count = out_shape.iter().product::<usize>();
            let mut data = Vec::with_capacity(out_count * width);
            // coalesce consecutive elements into single reads
            let mut run_start = None;
            let mut run_len = 0;
            for element in SelectedIndices::new(&shape, &plan) {
                match run_start {
                    Some(start) if start + run_len == element => run_len += 1,
                    Some(start) => {
                        self.read_run(payload_start, kind, start, run_len, &mut data)?;
                        run_start = Some(element);
                        run_len = 1;
                    }
                    None => {
                        run_start = Some(element);
                        run_len = 1;
                    }
                }
            }
            if let Some(start) = run_start {
                self.read_run(payload_start, kind, start, run_len, &mut data)?;
            }
            let array = Array::new(kind, out_shape, data).context(InvalidArraySnafu {
                position: open_position,
            })?;
            Value::Array(array)
        };
        self.dec.seek(end).context(ReadSnafu)?;
        Ok(value)
    }

    fn read_run(
        &mut self,
        payload_start: u64,
        kind: ElementKind,
        first_element: usize,
        count: usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        self.dec
            .seek(payload_start + (first_element * kind.width()) as u64)
            .context(ReadSnafu)?;
        let run = self.dec.read_array_payload(kind, count).context(ReadSnafu)?;
        out.extend_from_slice(&run);
        Ok(())
    }

    fn selector_mismatch<T>(&self, tag: Tag, position: u64) -> Result<T> {
        match tag_value_type(tag) {
            Some(value_type) => Err(SelectError::TypeMismatch { value_type }).context(SelectSnafu),
            None => UnexpectedTagSnafu { tag, position }.fail(),
        }
    }
}

/// Apply the selectors remaining after a gathering step
/// to the materialized intermediate value.
fn finish_in_memory(value: Value, rest: &[Selector]) -> Result<Value> {
    if rest.is_empty() {
        return Ok(value);
    }
    bintag_core::selector::apply(&value, rest).context(SelectSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Writer;
    use bintag_core::selector::apply;
    use std::io::Cursor;

    fn encoded(value: &Value) -> Vec<u8> {
        let mut writer = Writer::new(Vec::new(), Endianness::Little);
        writer.write_value(value).unwrap();
        writer.finish().unwrap()
    }

    fn navigator(data: &[u8]) -> Navigator<Cursor<&[u8]>> {
        Navigator::new(Cursor::new(data), Endianness::Little)
    }

    #[test]
    fn lookup_dict_key() {
        let value = Value::dict(vec![("n", Value::int(42))]);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        assert_eq!(nav.keys().unwrap(), vec!["n".to_string()]);
        assert_eq!(nav.len().unwrap(), 1);
        assert_eq!(nav.fetch(&["n".into()]).unwrap(), Value::I8(42));
    }

    #[test]
    fn lookup_list_index() {
        let value = Value::list(vec![Value::Bool(true), Value::Bool(false), Value::Null]);
        let data = encoded(&value);

        let mut nav = navigator(&data);
        assert_eq!(nav.len().unwrap(), 3);
        assert_eq!(nav.fetch(&[1.into()]).unwrap(), Value::Bool(false));

        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&[(-3).into()]).unwrap(), Value::Bool(true));

        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&[3.into()]).map_err(kind_of),
            Err("index out of range")
        );
        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&[(-4).into()]).map_err(kind_of),
            Err("index out of range")
        );
    }

    fn kind_of(e: Error) -> &'static str {
        match e {
            Error::Select { source, .. } => match source {
                SelectError::KeyNotFound { .. } => "key not found",
                SelectError::IndexOutOfRange { .. } => "index out of range",
                SelectError::TypeMismatch { .. } => "type mismatch",
                SelectError::ShapeMismatch { .. } => "shape mismatch",
                SelectError::InvalidSlice => "invalid slice",
            },
            Error::Read { .. } => "read",
            Error::UnexpectedTag { .. } => "unexpected tag",
            Error::InvalidArray { .. } => "invalid array",
        }
    }

    #[test]
    fn one_dimensional_array_access() {
        let value = Value::Array(Array::from_vec(vec![1_i32, 2, 3, 4]));
        let data = encoded(&value);

        let mut nav = navigator(&data);
        assert_eq!(nav.len().unwrap(), 4);
        assert_eq!(nav.fetch(&[0.into()]).unwrap(), Value::I32(1));

        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&[(-1).into()]).unwrap(), Value::I32(4));

        let mut nav = navigator(&data);
        let sliced = nav.fetch(&[SliceArg::range(1, 3).into()]).unwrap();
        let array = sliced.as_array().unwrap();
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array.to_vec::<i32>(), Some(vec![2, 3]));
    }

    #[test]
    fn multi_axis_array_access() {
        // shape (1, 2, 3), row-major contents 1..=6
        let array = Array::from_elements(vec![1, 2, 3], &[1_i32, 2, 3, 4, 5, 6]).unwrap();
        let value = Value::Array(array);
        let data = encoded(&value);

        let mut nav = navigator(&data);
        let got = nav
            .fetch(&[Selector::Cells(vec![
                CellSelector::Index(0),
                CellSelector::Index(1),
                CellSelector::Index(2),
            ])])
            .unwrap();
        assert_eq!(got, Value::I32(6));
        // the cursor ends up past the array either way
        assert_eq!(nav.position(), data.len() as u64);

        let mut nav = navigator(&data);
        let got = nav
            .fetch(&[Selector::Cells(vec![
                CellSelector::Index(0),
                CellSelector::Index(1),
                CellSelector::Slice(SliceArg::stepped(2)),
            ])])
            .unwrap();
        let array = got.as_array().unwrap();
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array.to_vec::<i32>(), Some(vec![4, 6]));

        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&[Selector::Cells(vec![CellSelector::Index(0); 4])])
                .map_err(kind_of),
            Err("shape mismatch")
        );
    }

    #[test]
    fn nested_navigation() {
        let value = Value::list(vec![
            Value::list(vec![
                Value::int(1),
                Value::int(4),
                Value::dict(vec![("five", Value::int(5)), ("six", Value::int(6))]),
            ]),
            Value::int(7),
        ]);
        let data = encoded(&value);

        let mut nav = navigator(&data);
        let path = [0.into(), 2.into(), "six".into()];
        assert_eq!(nav.fetch(&path).unwrap(), Value::I8(6));
        assert_eq!(nav.depth(), 3);

        // streamed resolution agrees with in-memory selection
        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&path).unwrap(), apply(&value, &path).unwrap());

        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&[1.into()]).unwrap(), Value::I8(7));

        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&[0.into(), 2.into(), "seven".into()])
                .map_err(kind_of),
            Err("key not found")
        );
    }

    #[test]
    fn list_slice_gathers_children() {
        let value = Value::list(vec![
            Value::int(10),
            Value::Str("mid".into()),
            Value::int(30),
            Value::Null,
        ]);
        let data = encoded(&value);

        let mut nav = navigator(&data);
        let got = nav.fetch(&[SliceArg::stepped(-1).into()]).unwrap();
        assert_eq!(got, apply(&value, &[SliceArg::stepped(-1).into()]).unwrap());
        // cursor is past the source list afterwards
        assert_eq!(nav.position(), data.len() as u64);

        let mut nav = navigator(&data);
        let got = nav.fetch(&[SliceArg::range(1, 3).into()]).unwrap();
        assert_eq!(
            got,
            Value::list(vec![Value::Str("mid".into()), Value::int(30)])
        );
    }

    #[test]
    fn slice_then_in_memory_selection() {
        let value = Value::list(vec![
            Value::list(vec![Value::int(1), Value::int(2)]),
            Value::list(vec![Value::int(3), Value::int(4)]),
        ]);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        let path = [SliceArg::full().into(), 1.into(), 0.into()];
        assert_eq!(nav.fetch(&path).unwrap(), Value::I8(3));
    }

    #[test]
    fn selector_type_mismatch() {
        let value = Value::list(vec![Value::int(1)]);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&["oops".into()]).map_err(kind_of),
            Err("type mismatch")
        );

        let value = Value::int(5);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&[0.into()]).map_err(kind_of), Err("type mismatch"));
    }

    #[test]
    fn zero_step_slice_rejected() {
        let value = Value::list(vec![Value::int(1)]);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        assert_eq!(
            nav.fetch(&[SliceArg::stepped(0).into()]).map_err(kind_of),
            Err("invalid slice")
        );
    }

    #[test]
    fn duplicate_keys_first_match() {
        let mut writer = Writer::new(Vec::new(), Endianness::Little);
        let dict = writer.open_dict().unwrap();
        writer.key("a").unwrap();
        writer.write_value(&Value::int(1)).unwrap();
        writer.key("a").unwrap();
        writer.write_value(&Value::int(2)).unwrap();
        writer.close(dict).unwrap();
        let data = writer.finish().unwrap();

        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&["a".into()]).unwrap(), Value::I8(1));

        // whole-value materialization keeps both pairs,
        // and keyed access on the result takes the last
        let mut nav = navigator(&data);
        let value = nav.read().unwrap();
        assert_eq!(value.get("a"), Some(&Value::I8(2)));
    }

    #[test]
    fn big_endian_navigation() {
        let value = Value::dict(vec![("v", Value::U32(0x0102_0304))]);
        let mut writer = Writer::new(Vec::new(), Endianness::Big);
        writer.write_value(&value).unwrap();
        let data = writer.finish().unwrap();

        let mut nav = Navigator::new(Cursor::new(&data[..]), Endianness::Big);
        assert_eq!(nav.fetch(&["v".into()]).unwrap(), Value::U32(0x0102_0304));
    }

    #[test]
    fn rewind_restores_the_root() {
        let value = Value::list(vec![Value::int(1), Value::int(2)]);
        let data = encoded(&value);
        let mut nav = navigator(&data);
        assert_eq!(nav.fetch(&[1.into()]).unwrap(), Value::I8(2));
        nav.rewind().unwrap();
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.read().unwrap(), value);
    }

    #[test]
    fn iterate_children() {
        let value = Value::list(vec![
            Value::int(1),
            Value::Str("two".into()),
            Value::list(vec![Value::int(3)]),
        ]);
        let data = encoded(&value);
        let mut nav = navigator(&data);

        assert_eq!(nav.enter().unwrap(), ContainerKind::List);
        let mut children = Vec::new();
        while nav.more_children().unwrap() {
            children.push(nav.read().unwrap());
        }
        assert_eq!(
            children,
            vec![
                Value::I8(1),
                Value::Str("two".into()),
                Value::list(vec![Value::int(3)]),
            ]
        );
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.position(), data.len() as u64);

        // entering a scalar is a mismatch
        let data = encoded(&Value::int(1));
        let mut nav = navigator(&data);
        assert_eq!(nav.enter().map_err(kind_of), Err("type mismatch"));
    }

    #[test]
    fn value_type_at_cursor() {
        let data = encoded(&Value::dict(vec![("k", Value::Null)]));
        let mut nav = navigator(&data);
        assert_eq!(nav.value_type().unwrap(), ValueType::Dict);
        nav.get_key("k").unwrap();
        assert_eq!(nav.value_type().unwrap(), ValueType::Null);
    }
}
