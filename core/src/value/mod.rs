//! This module includes a high level abstraction over
//! the values of the bintag data model.
//!
//! See [`Value`].

use num_traits::NumCast;
use smallvec::SmallVec;
use snafu::Snafu;
use std::fmt;

pub mod array;

pub use self::array::{element_value, Array, ArrayElement, InvalidArrayError};

/// An aggregation of a small number of elements,
/// such as the dimensions of an array shape.
pub type C<T> = SmallVec<[T; 2]>;

/// An enum listing the kinds of the value domain without their payloads.
/// Mainly used in error reporting and dispatch tables.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ValueType {
    /// The null value.
    Null,
    /// A boolean.
    Bool,
    /// A signed 8-bit integer.
    I8,
    /// A signed 16-bit integer.
    I16,
    /// A signed 32-bit integer.
    I32,
    /// A signed 64-bit integer.
    I64,
    /// An unsigned 8-bit integer.
    U8,
    /// An unsigned 16-bit integer.
    U16,
    /// An unsigned 32-bit integer.
    U32,
    /// An unsigned 64-bit integer.
    U64,
    /// A single precision float.
    F32,
    /// A double precision float.
    F64,
    /// A UTF-8 string.
    Str,
    /// An opaque byte blob.
    Bytes,
    /// An ordered heterogeneous sequence.
    List,
    /// An ordered mapping of string keys to values.
    Dict,
    /// An N-dimensional numeric array.
    Array,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::Str => "string",
            ValueType::Bytes => "bytes",
            ValueType::List => "list",
            ValueType::Dict => "dict",
            ValueType::Array => "array",
        };
        f.write_str(name)
    }
}

/// An error raised when a value cannot be converted
/// into the requested data type.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("could not convert {} value into {}", original, requested))]
pub struct ConvertValueError {
    /// The requested target type.
    pub requested: &'static str,
    /// The kind of the value at hand.
    pub original: ValueType,
}

/// A representation of a full bintag value:
/// a tagged sum with one variant per kind of the data model.
///
/// `From` conversions exist for the Rust primitive types,
/// strings, byte vectors, value vectors, and arrays.
/// For picking the narrowest integer encoding automatically,
/// see [`Value::int`] and [`Value::uint`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 8-bit integer.
    I8(i8),
    /// A signed 16-bit integer.
    I16(i16),
    /// A signed 32-bit integer.
    I32(i32),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 8-bit integer.
    U8(u8),
    /// An unsigned 16-bit integer.
    U16(u16),
    /// An unsigned 32-bit integer.
    U32(u32),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A single precision float.
    F32(f32),
    /// A double precision float.
    F64(f64),
    /// A UTF-8 string.
    Str(String),
    /// An opaque byte blob.
    Bytes(Vec<u8>),
    /// An ordered heterogeneous sequence of values.
    List(Vec<Value>),
    /// An ordered sequence of key-value pairs.
    ///
    /// Key uniqueness is the writer's obligation;
    /// a materialized dict may carry duplicates,
    /// in which case keyed access returns the last occurrence.
    Dict(Vec<(String, Value)>),
    /// An N-dimensional numeric array.
    Array(Array),
}

impl Value {
    /// Retrieve the kind of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::U8(_) => ValueType::U8,
            Value::U16(_) => ValueType::U16,
            Value::U32(_) => ValueType::U32,
            Value::U64(_) => ValueType::U64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::Str(_) => ValueType::Str,
            Value::Bytes(_) => ValueType::Bytes,
            Value::List(_) => ValueType::List,
            Value::Dict(_) => ValueType::Dict,
            Value::Array(_) => ValueType::Array,
        }
    }

    /// Construct a signed integer value in the narrowest width that fits.
    pub fn int(value: i64) -> Value {
        if value >= <i64 as From<i8>>::from(i8::MIN) && value <= <i64 as From<i8>>::from(i8::MAX) {
            Value::I8(value as i8)
        } else if value >= <i64 as From<i16>>::from(i16::MIN) && value <= <i64 as From<i16>>::from(i16::MAX) {
            Value::I16(value as i16)
        } else if value >= <i64 as From<i32>>::from(i32::MIN) && value <= <i64 as From<i32>>::from(i32::MAX) {
            Value::I32(value as i32)
        } else {
            Value::I64(value)
        }
    }

    /// Construct an unsigned integer value in the narrowest width that fits.
    pub fn uint(value: u64) -> Value {
        if value <= <u64 as From<u8>>::from(u8::MAX) {
            Value::U8(value as u8)
        } else if value <= <u64 as From<u16>>::from(u16::MAX) {
            Value::U16(value as u16)
        } else if value <= <u64 as From<u32>>::from(u32::MAX) {
            Value::U32(value as u32)
        } else {
            Value::U64(value)
        }
    }

    /// Build a list value from an iterator of values.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::List(items.into_iter().collect())
    }

    /// Build a dict value from an iterator of key-value pairs.
    pub fn dict<I, K>(pairs: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Dict(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this value is atomic from the tree-structure perspective:
    /// anything but a list or a dict.
    /// Note that arrays are atomic, despite being aggregations.
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Dict(_))
    }

    /// Retrieve the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Retrieve the value as a byte slice, if it is a byte blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Retrieve the value as a slice of child values, if it is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Retrieve the value as a slice of key-value pairs, if it is a dict.
    pub fn as_dict(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Dict(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Retrieve the value as an array, if it is one.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Retrieve the boolean payload, if the value is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a key in a dict value.
    ///
    /// When the dict carries duplicate keys,
    /// the **last** occurrence wins,
    /// mirroring the effect of interpreting the pairs
    /// as successive insertions into a mapping.
    /// Returns `None` if the key is absent or the value is not a dict.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(pairs) => pairs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a child of a list value by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            _ => None,
        }
    }

    /// Convert the value into an integer of the requested type,
    /// if it holds an integer which fits.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: NumCast,
    {
        let converted = match self {
            Value::I8(v) => T::from(*v),
            Value::I16(v) => T::from(*v),
            Value::I32(v) => T::from(*v),
            Value::I64(v) => T::from(*v),
            Value::U8(v) => T::from(*v),
            Value::U16(v) => T::from(*v),
            Value::U32(v) => T::from(*v),
            Value::U64(v) => T::from(*v),
            _ => None,
        };
        converted.ok_or(ConvertValueError {
            requested: "integer",
            original: self.value_type(),
        })
    }

    /// Convert the value into a single precision float,
    /// if it holds a number.
    pub fn to_float32(&self) -> Result<f32, ConvertValueError> {
        match self {
            Value::F32(v) => Some(*v),
            Value::F64(v) => Some(*v as f32),
            _ => self.to_int::<i64>().ok().and_then(|v| NumCast::from(v)),
        }
        .ok_or(ConvertValueError {
            requested: "f32",
            original: self.value_type(),
        })
    }

    /// Convert the value into a double precision float,
    /// if it holds a number.
    pub fn to_float64(&self) -> Result<f64, ConvertValueError> {
        match self {
            Value::F32(v) => Some(<f64 as From<f32>>::from(*v)),
            Value::F64(v) => Some(*v),
            _ => self.to_int::<i64>().ok().and_then(|v| NumCast::from(v)),
        }
        .ok_or(ConvertValueError {
            requested: "f64",
            original: self.value_type(),
        })
    }
}

/// A utility macro for implementing the conversion from a primitive type
/// into a value with the matching variant.
macro_rules! impl_from_for_value {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for Value {
            fn from(value: $typ) -> Self {
                Value::$variant(value)
            }
        }
    };
}

impl_from_for_value!(bool, Bool);
impl_from_for_value!(i8, I8);
impl_from_for_value!(i16, I16);
impl_from_for_value!(i32, I32);
impl_from_for_value!(i64, I64);
impl_from_for_value!(u8, U8);
impl_from_for_value!(u16, U16);
impl_from_for_value!(u32, U32);
impl_from_for_value!(u64, U64);
impl_from_for_value!(f32, F32);
impl_from_for_value!(f64, F64);
impl_from_for_value!(String, Str);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<(String, Value)>> for Value {
    fn from(value: Vec<(String, Value)>) -> Self {
        Value::Dict(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
