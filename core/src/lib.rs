#![crate_type = "lib"]
#![deny(trivial_casts, trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core bintag library, containing the concepts and data
//! structures specific to the bintag binary container format:
//! the frozen tag alphabet, the value domain,
//! and the navigation expressions interpreted by the higher layers.
//!

pub mod selector;
pub mod tag;
pub mod value;

pub use selector::{CellSelector, SelectError, Selector, SliceArg};
pub use tag::{ContainerKind, ElementKind, LengthTier, Tag};
pub use value::{Array, ArrayElement, ConvertValueError, Value, ValueType};
