#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! This crate works on top of `bintag-core` and `bintag-encoding`
//! to provide the mid-level abstractions for writing and reading
//! bintag containers:
//!
//! - the [`Writer`] encoder state machine,
//!   which supports whole-value writes as well as
//!   sequential, incremental construction via container [`Handle`]s;
//! - the [`Navigator`], a lazy cursor over a seekable byte source
//!   which can materialize, skip, and descend into encoded values,
//!   and resolve navigation expressions with slicing support
//!   without materializing intermediate parents;
//! - the stateful encoder and decoder underneath them,
//!   which keep track of the byte position for error reporting.
//!
//! For the time being, all APIs are based on synchronous I/O.

pub mod navigator;
pub mod stateful;
pub mod writer;

pub use navigator::Navigator;
pub use writer::{Handle, Writer};
