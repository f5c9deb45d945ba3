//! Declaration and implementation of the N-dimensional numeric array value.
//!
//! An [`Array`] owns a dense, row-major payload of one numeric element kind.
//! The payload is kept in native byte order;
//! conversion to and from the file byte order
//! is the responsibility of the codec layers.

use crate::tag::ElementKind;
use crate::value::{Value, C};
use snafu::{ensure, Snafu};

/// An error raised when the parts of an array are inconsistent.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum InvalidArrayError {
    /// Arrays must have at least one dimension.
    #[snafu(display("array shape must have at least one dimension"))]
    EmptyShape,

    /// The payload does not hold exactly `product(shape)` elements.
    #[snafu(display(
        "array payload of {} bytes does not match {} elements of {} bytes",
        got,
        elements,
        width
    ))]
    DataLength {
        /// The number of elements implied by the shape.
        elements: usize,
        /// The width of one element in bytes.
        width: usize,
        /// The actual payload length in bytes.
        got: usize,
    },
}

/// An N-dimensional dense array of one numeric element kind.
///
/// The element payload is stored in row-major order
/// (rightmost axis varies fastest)
/// and in the byte order of the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    kind: ElementKind,
    shape: C<usize>,
    data: Vec<u8>,
}

impl Array {
    /// Create an array from its raw parts.
    ///
    /// The payload is interpreted as native-order elements
    /// and must hold exactly `product(shape)` of them.
    pub fn new<S>(kind: ElementKind, shape: S, data: Vec<u8>) -> Result<Self, InvalidArrayError>
    where
        S: Into<C<usize>>,
    {
        let shape = shape.into();
        ensure!(!shape.is_empty(), EmptyShapeSnafu);
        let elements = shape.iter().product::<usize>();
        let width = kind.width();
        ensure!(
            data.len() == elements * width,
            DataLengthSnafu {
                elements,
                width,
                got: data.len(),
            }
        );
        Ok(Array { kind, shape, data })
    }

    /// Create an array by copying a slice of typed elements.
    pub fn from_elements<T, S>(shape: S, elements: &[T]) -> Result<Self, InvalidArrayError>
    where
        T: ArrayElement,
        S: Into<C<usize>>,
    {
        let mut data = Vec::with_capacity(elements.len() * T::KIND.width());
        for element in elements {
            element.extend_ne_bytes(&mut data);
        }
        Array::new(T::KIND, shape, data)
    }

    /// Create a one-dimensional array from a vector of typed elements.
    pub fn from_vec<T>(elements: Vec<T>) -> Self
    where
        T: ArrayElement,
    {
        let shape: C<usize> = C::from_slice(&[elements.len()]);
        let mut data = Vec::with_capacity(elements.len() * T::KIND.width());
        for element in &elements {
            element.extend_ne_bytes(&mut data);
        }
        Array {
            kind: T::KIND,
            shape,
            data,
        }
    }

    /// Assemble an array from parts already known to be consistent.
    pub(crate) fn from_raw_parts(kind: ElementKind, shape: C<usize>, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>() * kind.width());
        Array { kind, shape, data }
    }

    /// The element kind of this array.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The dimension sizes, outermost axis first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The total number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// The native-order element payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the array, yielding the native-order element payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The row-major strides of this array, in elements per axis.
    pub fn strides(&self) -> C<usize> {
        let mut strides: C<usize> = C::from_elem(1, self.rank());
        for axis in (0..self.rank().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }
        strides
    }

    /// The byte offset of the element at the given full-rank index,
    /// or `None` if the index has the wrong rank or is out of bounds.
    pub fn element_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.rank() {
            return None;
        }
        let mut element = 0;
        let strides = self.strides();
        for (axis, &i) in index.iter().enumerate() {
            if i >= self.shape[axis] {
                return None;
            }
            element += i * strides[axis];
        }
        Some(element * self.kind.width())
    }

    /// Read the element at the given full-rank index as a scalar value.
    pub fn element(&self, index: &[usize]) -> Option<Value> {
        let offset = self.element_offset(index)?;
        let width = self.kind.width();
        Some(element_value(self.kind, &self.data[offset..offset + width]))
    }

    /// Copy the elements out into a typed vector,
    /// if `T` matches the element kind.
    pub fn to_vec<T>(&self) -> Option<Vec<T>>
    where
        T: ArrayElement,
    {
        if T::KIND != self.kind {
            return None;
        }
        let width = self.kind.width();
        Some(
            self.data
                .chunks_exact(width)
                .map(T::from_ne_slice)
                .collect(),
        )
    }
}

/// Interpret `bytes` (exactly one element wide, native order)
/// as a scalar value of the given element kind.
pub fn element_value(kind: ElementKind, bytes: &[u8]) -> Value {
    match kind {
        ElementKind::I8 => Value::I8(i8::from_ne_slice(bytes)),
        ElementKind::I16 => Value::I16(i16::from_ne_slice(bytes)),
        ElementKind::I32 => Value::I32(i32::from_ne_slice(bytes)),
        ElementKind::I64 => Value::I64(i64::from_ne_slice(bytes)),
        ElementKind::U8 => Value::U8(u8::from_ne_slice(bytes)),
        ElementKind::U16 => Value::U16(u16::from_ne_slice(bytes)),
        ElementKind::U32 => Value::U32(u32::from_ne_slice(bytes)),
        ElementKind::U64 => Value::U64(u64::from_ne_slice(bytes)),
        ElementKind::F32 => Value::F32(f32::from_ne_slice(bytes)),
        ElementKind::F64 => Value::F64(f64::from_ne_slice(bytes)),
    }
}

/// A numeric type which can be the element of an [`Array`].
///
/// Implemented exactly for the ten scalar kinds of the data model.
pub trait ArrayElement: Copy {
    /// The element kind corresponding to this type.
    const KIND: ElementKind;

    /// Decode one element from a native-order byte slice
    /// of exactly [`ElementKind::width`] bytes.
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Append this element's native-order bytes to a buffer.
    fn extend_ne_bytes(&self, out: &mut Vec<u8>);

    /// Wrap this element in the matching scalar value variant.
    fn into_value(self) -> Value;
}

macro_rules! impl_array_element {
    ($typ: ty, $kind: ident, $width: expr) => {
        impl ArrayElement for $typ {
            const KIND: ElementKind = ElementKind::$kind;

            fn from_ne_slice(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; $width];
                raw.copy_from_slice(bytes);
                <$typ>::from_ne_bytes(raw)
            }

            fn extend_ne_bytes(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn into_value(self) -> Value {
                Value::$kind(self)
            }
        }
    };
}

impl_array_element!(i8, I8, 1);
impl_array_element!(i16, I16, 2);
impl_array_element!(i32, I32, 4);
impl_array_element!(i64, I64, 8);
impl_array_element!(u8, U8, 1);
impl_array_element!(u16, U16, 2);
impl_array_element!(u32, U32, 4);
impl_array_element!(u64, U64, 8);
impl_array_element!(f32, F32, 4);
impl_array_element!(f64, F64, 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_and_access() {
        let arr = Array::from_vec(vec![1_i32, 2, 3, 4]);
        assert_eq!(arr.kind(), ElementKind::I32);
        assert_eq!(arr.shape(), &[4]);
        assert_eq!(arr.num_elements(), 4);
        assert_eq!(arr.element(&[0]), Some(Value::I32(1)));
        assert_eq!(arr.element(&[3]), Some(Value::I32(4)));
        assert_eq!(arr.element(&[4]), None);
        assert_eq!(arr.to_vec::<i32>(), Some(vec![1, 2, 3, 4]));
        assert_eq!(arr.to_vec::<u32>(), None);
    }

    #[test]
    fn strides_row_major() {
        let arr = Array::from_elements(vec![1, 2, 3], &[1_i32, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(&arr.strides()[..], &[6, 3, 1]);
        // rightmost axis varies fastest
        assert_eq!(arr.element(&[0, 1, 2]), Some(Value::I32(6)));
        assert_eq!(arr.element(&[0, 0, 1]), Some(Value::I32(2)));
        assert_eq!(arr.element(&[0, 2, 0]), None);
    }

    #[test]
    fn invalid_parts() {
        assert_eq!(
            Array::new(ElementKind::U8, C::new(), vec![]),
            Err(InvalidArrayError::EmptyShape)
        );
        assert!(matches!(
            Array::new(ElementKind::I16, vec![3], vec![0; 5]),
            Err(InvalidArrayError::DataLength { .. })
        ));
    }

    #[test]
    fn single_element_dimensions() {
        let arr = Array::from_elements(vec![1, 1, 1], &[7_u16]).unwrap();
        assert_eq!(arr.rank(), 3);
        assert_eq!(arr.element(&[0, 0, 0]), Some(Value::U16(7)));
    }
}
