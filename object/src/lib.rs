#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! This crate contains the high-level abstractions
//! for reading and writing bintag container files.
//! The end user should prefer this API
//! when dealing with whole files.
//!
//! ## Overview
//!
//! - Loading a file is done with ease via [`open_file`],
//!   which yields a lazy [`FileNavigator`] over its content.
//!   For additional options, use [`OpenFileOptions`].
//! - New files are created with [`create_file`] (or [`CreateFileOptions`]),
//!   which yields a [`FileWriter`]:
//!   either write a whole value at once,
//!   or build the root container incrementally
//!   through the writer's container handles.
//! - An existing file whose root is a list or dict
//!   can be re-opened with [`append_file`]
//!   to add further children in place.
//! - [`read_file`] and [`write_file`] cover the common
//!   whole-value cases in one call,
//!   and [`from_bytes`]/[`to_bytes`] do the same over in-memory buffers.
//! - The [`dump`] module walks a file token by token
//!   and yields human readable text chunks for debugging.
//!
//! # Byte order
//!
//! The byte order is a file-level attribute chosen at creation time
//! and applied uniformly to every multi-byte scalar in the payload.
//! It is not recorded in the file;
//! reader and writer agree on it out of band.
//! The default, [`ByteOrder::Auto`], resolves to the host byte order.
//!
//! # Examples
//!
//! Write a file and look an element up without
//! materializing the whole content:
//!
//! ```no_run
//! use bintag_core::Value;
//! use bintag_object::{open_file, write_file};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! write_file(
//!     "measurements.btg",
//!     &Value::dict(vec![("count", Value::int(4))]),
//! )?;
//!
//! let mut nav = open_file("measurements.btg")?;
//! let count = nav.fetch(&["count".into()])?;
//! # Ok(())
//! # }
//! ```

pub mod dump;
pub mod file;

pub use crate::dump::{dump_file, DumpOptions, DumpTokens};
pub use crate::file::{
    append_file, create_file, from_bytes, open_file, read_file, to_bytes, write_file, AppendError,
    ByteOrder, CreateFileOptions, FileNavigator, FileWriter, OpenFileOptions, ReadError,
    WriteError,
};
pub use bintag_core::{
    Array, CellSelector, ContainerKind, ElementKind, SelectError, Selector, SliceArg, Value,
    ValueType,
};
pub use bintag_parser::{Handle, Navigator, Writer};
