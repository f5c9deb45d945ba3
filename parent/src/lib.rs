//! # bintag library
//!
//! This crate serves as a parent for the library crates
//! of the bintag project:
//! a compact, self-describing binary container format
//! for rich, heterogeneous data values,
//! with whole-value serialization and random-access navigation.
//! These modules are also available as crates
//! which can be fetched independently;
//! they carry the `bintag-` prefix
//! (for instance, the module [`object`] lives in `bintag-object`).
//!
//! - For an idiomatic API to reading and writing bintag data
//!   from files or byte buffers, see the [`object`] module.
//! - The [`core`] module contains the data types
//!   that the other crates rely on:
//!   the [`Value`](bintag_core::Value) domain,
//!   the tag alphabet, and navigation [selectors](bintag_core::Selector).
//! - [`parser`] holds the mid-level abstractions:
//!   the [`Writer`](parser::Writer) state machine
//!   with sequential-construction handles,
//!   and the lazy [`Navigator`](parser::Navigator).
//! - [`encoding`] provides the token-level codecs
//!   for both byte orders.
//!
//! ## Example
//!
//! ```no_run
//! use bintag::core::Value;
//! use bintag::object::{open_file, write_file};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! write_file(
//!     "series.btg",
//!     &Value::dict(vec![("samples", Value::list(vec![Value::int(1)]))]),
//! )?;
//!
//! let mut nav = open_file("series.btg")?;
//! let first = nav.fetch(&["samples".into(), 0.into()])?;
//! assert_eq!(first, Value::I8(1));
//! # Ok(())
//! # }
//! ```

pub use bintag_core as core;
pub use bintag_encoding as encoding;
pub use bintag_object as object;
pub use bintag_parser as parser;

pub use bintag_core::{Selector, SliceArg, Value};
pub use bintag_object::{append_file, create_file, open_file, read_file, write_file, ByteOrder};
