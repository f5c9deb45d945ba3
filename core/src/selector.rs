//! Navigation expressions over the value domain.
//!
//! A [`Selector`] is one step of a navigation expression:
//! a key lookup into a dict, an integer index into a list or array,
//! a slice over a list or an array axis,
//! or a per-axis tuple of index/slice components for arrays.
//!
//! This module also implements the selection semantics over
//! materialized [`Value`]s ([`apply`]);
//! the stream navigator resolves the same expressions
//! against encoded data without materializing intermediate parents.

use crate::value::array::element_value;
use crate::value::{Array, Value, ValueType, C};
use snafu::{ensure, OptionExt, Snafu};

/// An error raised when a navigation expression
/// cannot be resolved against a value.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum SelectError {
    /// The key is not present in the dict.
    #[snafu(display("key `{}` not found in dict", key))]
    KeyNotFound {
        /// The requested key.
        key: String,
    },

    /// The index does not fall within the container.
    #[snafu(display("index {} out of range for length {}", index, len))]
    IndexOutOfRange {
        /// The requested index, possibly negative.
        index: i64,
        /// The length of the container or axis.
        len: usize,
    },

    /// The selector is not applicable to the value kind at hand.
    #[snafu(display("selector not applicable to {} value", value_type))]
    TypeMismatch {
        /// The kind of the value at hand.
        value_type: ValueType,
    },

    /// More axes were selected than the array has.
    #[snafu(display("selection names {} axes, but the array has rank {}", given, rank))]
    ShapeMismatch {
        /// The number of axis components given.
        given: usize,
        /// The rank of the array.
        rank: usize,
    },

    /// A slice with step zero was given.
    #[snafu(display("slice step must not be zero"))]
    InvalidSlice,
}

/// Result alias for selection operations.
pub type Result<T, E = SelectError> = std::result::Result<T, E>;

/// A slice expression with the standard half-open semantics:
/// the element at `start` is included, `stop` is excluded,
/// and the sign of `step` determines the direction.
///
/// Any component may be left unspecified.
/// For a positive step the bounds default to `(0, len)`,
/// for a negative step to `(len - 1, one before 0)`.
/// Negative bounds count from the end of the axis.
/// A zero step is rejected at resolution time.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SliceArg {
    /// The first selected index.
    pub start: Option<i64>,
    /// The first excluded index.
    pub stop: Option<i64>,
    /// The distance between selected indices.
    pub step: Option<i64>,
}

impl SliceArg {
    /// A slice with all three components given.
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        SliceArg { start, stop, step }
    }

    /// The full-range slice.
    pub fn full() -> Self {
        SliceArg::default()
    }

    /// A contiguous `start..stop` slice.
    pub fn range(start: i64, stop: i64) -> Self {
        SliceArg {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// A slice selecting every `step`-th element of the full range.
    pub fn stepped(step: i64) -> Self {
        SliceArg {
            start: None,
            stop: None,
            step: Some(step),
        }
    }

    /// Resolve this slice against an axis of the given length,
    /// producing concrete start/step values and the selection count.
    pub fn resolve(&self, len: usize) -> Result<ResolvedSlice> {
        let len = len as i64;
        let step = self.step.unwrap_or(1);
        ensure!(step != 0, InvalidSliceSnafu);

        let (lo, hi, def_start, def_stop) = if step > 0 {
            (0, len, 0, len)
        } else {
            (-1, len - 1, len - 1, -1)
        };
        let clamp = |given: Option<i64>, default: i64| match given {
            None => default,
            Some(i) => {
                let i = if i < 0 { i + len } else { i };
                i.max(lo).min(hi)
            }
        };
        let start = clamp(self.start, def_start);
        let stop = clamp(self.stop, def_stop);

        let count = if step > 0 {
            if stop > start {
                ((stop - start - 1) / step + 1) as usize
            } else {
                0
            }
        } else if stop < start {
            ((start - stop - 1) / (-step) + 1) as usize
        } else {
            0
        };
        Ok(ResolvedSlice { start, step, count })
    }
}

/// A slice resolved against a concrete axis length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolvedSlice {
    /// The first selected index.
    pub start: i64,
    /// The signed distance between selected indices.
    pub step: i64,
    /// The number of selected indices.
    pub count: usize,
}

impl ResolvedSlice {
    /// The source index of the `i`-th selected element.
    /// `i` must be below `count`.
    pub fn index(&self, i: usize) -> usize {
        (self.start + i as i64 * self.step) as usize
    }

    /// Iterate over the selected source indices in selection order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |i| self.index(i))
    }
}

/// One component of a per-axis array selection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CellSelector {
    /// Select a single index along the axis, dropping it from the result.
    Index(i64),
    /// Select a slice of the axis, keeping it with a possibly reduced size.
    Slice(SliceArg),
}

/// One step of a navigation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Look up a key in a dict.
    Key(String),
    /// Index into a list or into the first axis of an array.
    /// Negative values count from the end.
    Index(i64),
    /// Slice a list or the first axis of an array.
    Slice(SliceArg),
    /// Select along multiple array axes at once;
    /// trailing axes default to full-range slices.
    Cells(Vec<CellSelector>),
}

impl From<&str> for Selector {
    fn from(key: &str) -> Self {
        Selector::Key(key.to_string())
    }
}

impl From<i64> for Selector {
    fn from(index: i64) -> Self {
        Selector::Index(index)
    }
}

impl From<SliceArg> for Selector {
    fn from(slice: SliceArg) -> Self {
        Selector::Slice(slice)
    }
}

/// Resolve a possibly negative index against a container length.
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        index + len as i64
    } else {
        index
    };
    ensure!(
        resolved >= 0 && (resolved as usize) < len,
        IndexOutOfRangeSnafu { index, len }
    );
    Ok(resolved as usize)
}

/// An axis selection resolved against a concrete array shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ResolvedAxis {
    /// A single in-bounds index; the axis is dropped from the result.
    Index(usize),
    /// A resolved slice; the axis is kept.
    Slice(ResolvedSlice),
}

/// Resolve a per-axis selection against an array shape,
/// filling the missing trailing axes with full-range slices.
pub fn resolve_cells(shape: &[usize], cells: &[CellSelector]) -> Result<C<ResolvedAxis>> {
    ensure!(
        cells.len() <= shape.len(),
        ShapeMismatchSnafu {
            given: cells.len(),
            rank: shape.len(),
        }
    );
    let mut plan = C::with_capacity(shape.len());
    for (axis, &dim) in shape.iter().enumerate() {
        let resolved = match cells.get(axis) {
            Some(CellSelector::Index(i)) => ResolvedAxis::Index(resolve_index(*i, dim)?),
            Some(CellSelector::Slice(s)) => ResolvedAxis::Slice(s.resolve(dim)?),
            None => ResolvedAxis::Slice(SliceArg::full().resolve(dim)?),
        };
        plan.push(resolved);
    }
    Ok(plan)
}

/// The shape of the selection result:
/// the counts of the slice axes, in axis order.
pub fn output_shape(plan: &[ResolvedAxis]) -> C<usize> {
    plan.iter()
        .filter_map(|axis| match axis {
            ResolvedAxis::Slice(slice) => Some(slice.count),
            ResolvedAxis::Index(_) => None,
        })
        .collect()
}

/// An iterator over the source element indices selected by an axis plan,
/// in row-major order of the output shape.
#[derive(Debug)]
pub struct SelectedIndices {
    base: usize,
    // (stride of the axis, resolved slice), slice axes only
    slices: C<(usize, ResolvedSlice)>,
    counters: C<usize>,
    remaining: usize,
}

impl SelectedIndices {
    /// Enumerate the selected element indices of an array
    /// with the given shape under the given resolved axis plan.
    pub fn new(shape: &[usize], plan: &[ResolvedAxis]) -> Self {
        // row-major element strides of the source shape
        let mut strides: C<usize> = C::from_elem(1, shape.len());
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        let mut base = 0;
        let mut slices = C::new();
        for (axis, resolved) in plan.iter().enumerate() {
            match resolved {
                ResolvedAxis::Index(i) => base += i * strides[axis],
                ResolvedAxis::Slice(slice) => slices.push((strides[axis], *slice)),
            }
        }
        let remaining = slices.iter().map(|(_, s)| s.count).product();
        let counters = C::from_elem(0, slices.len());
        SelectedIndices {
            base,
            slices,
            counters,
            remaining,
        }
    }
}

impl Iterator for SelectedIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let mut element = self.base;
        for (counter, (stride, slice)) in self.counters.iter().zip(self.slices.iter()) {
            element += slice.index(*counter) * stride;
        }
        // advance the odometer, rightmost axis fastest
        for axis in (0..self.counters.len()).rev() {
            self.counters[axis] += 1;
            if self.counters[axis] < self.slices[axis].1.count {
                break;
            }
            self.counters[axis] = 0;
        }
        self.remaining -= 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Apply a per-axis selection to a materialized array:
/// a scalar if every axis is indexed,
/// or a gathered array of the reduced shape otherwise.
pub fn select_cells(array: &Array, cells: &[CellSelector]) -> Result<Value> {
    let plan = resolve_cells(array.shape(), cells)?;
    let width = array.kind().width();
    let data = array.data();

    let all_indexed = plan
        .iter()
        .all(|axis| matches!(axis, ResolvedAxis::Index(_)));
    if all_indexed {
        let mut indices = SelectedIndices::new(array.shape(), &plan);
        // exactly one element is selected
        let element = indices.next().map(|e| e * width).unwrap_or(0);
        return Ok(element_value(array.kind(), &data[element..element + width]));
    }

    let shape = output_shape(&plan);
    let mut out = Vec::with_capacity(shape.iter().product::<usize>() * width);
    for element in SelectedIndices::new(array.shape(), &plan) {
        let offset = element * width;
        out.extend_from_slice(&data[offset..offset + width]);
    }
    Ok(Value::Array(Array::from_raw_parts(
        array.kind(),
        shape,
        out,
    )))
}

/// Apply one selector to a materialized value.
///
/// Key lookup follows navigation semantics:
/// the **first** occurrence of a duplicate key wins here.
pub fn select(value: &Value, selector: &Selector) -> Result<Value> {
    match selector {
        Selector::Key(key) => {
            let pairs = value.as_dict().context(TypeMismatchSnafu {
                value_type: value.value_type(),
            })?;
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .context(KeyNotFoundSnafu { key: key.clone() })
        }
        Selector::Index(index) => match value {
            Value::List(items) => {
                let i = resolve_index(*index, items.len())?;
                Ok(items[i].clone())
            }
            Value::Array(array) => select_cells(array, &[CellSelector::Index(*index)]),
            _ => TypeMismatchSnafu {
                value_type: value.value_type(),
            }
            .fail(),
        },
        Selector::Slice(slice) => match value {
            Value::List(items) => {
                let resolved = slice.resolve(items.len())?;
                Ok(Value::List(
                    resolved.indices().map(|i| items[i].clone()).collect(),
                ))
            }
            Value::Array(array) => select_cells(array, &[CellSelector::Slice(*slice)]),
            _ => TypeMismatchSnafu {
                value_type: value.value_type(),
            }
            .fail(),
        },
        Selector::Cells(cells) => match value {
            Value::Array(array) => select_cells(array, cells),
            _ => TypeMismatchSnafu {
                value_type: value.value_type(),
            }
            .fail(),
        },
    }
}

/// Apply a full navigation expression to a materialized value.
pub fn apply(value: &Value, path: &[Selector]) -> Result<Value> {
    let mut current = value.clone();
    for selector in path {
        current = select(&current, selector)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::ElementKind;

    #[test]
    fn resolve_positive_step() {
        let r = SliceArg::full().resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (0, 1, 5));

        let r = SliceArg::range(1, 3).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (1, 1, 2));

        let r = SliceArg::new(None, None, Some(2)).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (0, 2, 3));

        // clamped past the end
        let r = SliceArg::range(2, 100).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (2, 1, 3));

        // negative bounds count from the end
        let r = SliceArg::range(-3, -1).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (2, 1, 2));

        // empty
        let r = SliceArg::range(3, 3).resolve(5).unwrap();
        assert_eq!(r.count, 0);
    }

    #[test]
    fn resolve_negative_step() {
        let r = SliceArg::stepped(-1).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (4, -1, 5));
        assert_eq!(r.indices().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);

        let r = SliceArg::new(Some(4), Some(1), Some(-2)).resolve(5).unwrap();
        assert_eq!((r.start, r.step, r.count), (4, -2, 2));
        assert_eq!(r.indices().collect::<Vec<_>>(), vec![4, 2]);
    }

    #[test]
    fn zero_step_rejected() {
        assert_eq!(
            SliceArg::stepped(0).resolve(5),
            Err(SelectError::InvalidSlice)
        );
    }

    #[test]
    fn empty_axis() {
        let r = SliceArg::full().resolve(0).unwrap();
        assert_eq!(r.count, 0);
        let r = SliceArg::stepped(-1).resolve(0).unwrap();
        assert_eq!(r.count, 0);
    }

    #[test]
    fn index_resolution() {
        assert_eq!(resolve_index(0, 3).unwrap(), 0);
        assert_eq!(resolve_index(2, 3).unwrap(), 2);
        assert_eq!(resolve_index(-1, 3).unwrap(), 2);
        assert_eq!(resolve_index(-3, 3).unwrap(), 0);
        assert!(resolve_index(3, 3).is_err());
        assert!(resolve_index(-4, 3).is_err());
    }

    #[test]
    fn select_list_and_dict() {
        let value = Value::dict(vec![(
            "items",
            Value::list(vec![Value::int(10), Value::int(20), Value::int(30)]),
        )]);
        let got = apply(&value, &["items".into(), Selector::Index(-1)]).unwrap();
        assert_eq!(got, Value::I8(30));

        let got = apply(&value, &["items".into(), SliceArg::stepped(-1).into()]).unwrap();
        assert_eq!(
            got,
            Value::list(vec![Value::int(30), Value::int(20), Value::int(10)])
        );

        assert_eq!(
            apply(&value, &["nope".into()]),
            Err(SelectError::KeyNotFound {
                key: "nope".to_string()
            })
        );
        assert!(matches!(
            apply(&value, &[Selector::Index(0)]),
            Err(SelectError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn select_array_cells() {
        // shape (1, 2, 3), row-major contents 1..=6
        let array = Array::from_elements(vec![1, 2, 3], &[1_i32, 2, 3, 4, 5, 6]).unwrap();
        let value = Value::Array(array);

        let got = apply(
            &value,
            &[Selector::Cells(vec![
                CellSelector::Index(0),
                CellSelector::Index(1),
                CellSelector::Index(2),
            ])],
        )
        .unwrap();
        assert_eq!(got, Value::I32(6));

        // [0, 1, ::2] -> 1-D array [4, 6]
        let got = apply(
            &value,
            &[Selector::Cells(vec![
                CellSelector::Index(0),
                CellSelector::Index(1),
                CellSelector::Slice(SliceArg::stepped(2)),
            ])],
        )
        .unwrap();
        let arr = got.as_array().unwrap();
        assert_eq!(arr.shape(), &[2]);
        assert_eq!(arr.kind(), ElementKind::I32);
        assert_eq!(arr.to_vec::<i32>(), Some(vec![4, 6]));

        // too many axes
        assert_eq!(
            apply(&value, &[Selector::Cells(vec![CellSelector::Index(0); 4])]),
            Err(SelectError::ShapeMismatch { given: 4, rank: 3 })
        );
    }

    #[test]
    fn select_array_first_axis() {
        let array = Array::from_elements(vec![2, 2], &[1_u8, 2, 3, 4]).unwrap();
        let value = Value::Array(array);
        let got = apply(&value, &[Selector::Index(1)]).unwrap();
        let arr = got.as_array().unwrap();
        assert_eq!(arr.shape(), &[2]);
        assert_eq!(arr.to_vec::<u8>(), Some(vec![3, 4]));
    }

    #[test]
    fn duplicate_key_first_match_on_selection() {
        let value = Value::dict(vec![("a", Value::int(1)), ("a", Value::int(2))]);
        assert_eq!(apply(&value, &["a".into()]).unwrap(), Value::I8(1));
    }
}
