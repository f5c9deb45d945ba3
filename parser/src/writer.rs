//! Module for the encoder state machine:
//! a cursor over an append-only byte sink
//! which tracks the stack of open containers
//! and supports both whole-value writes and
//! sequential construction through container handles.

use crate::stateful::encode::{self, StatefulEncoder};
use bintag_core::tag::{ContainerKind, Tag};
use bintag_core::value::Value;
use bintag_core::ElementKind;
use bintag_encoding::encode::basic::BasicEncoder;
use byteordered::Endianness;
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::collections::BTreeSet;
use std::io::Write;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A token failed to encode into the sink.
    #[snafu(display("Failed to write encoded data"))]
    Encode {
        #[snafu(backtrace)]
        source: encode::Error,
    },

    /// The handle's container has already been closed.
    #[snafu(display("The handle no longer refers to an open container"))]
    HandleClosed { backtrace: Backtrace },

    /// A value write was attempted on a dict with no pending key.
    #[snafu(display("A dict value requires a key to be written first"))]
    KeyExpected { backtrace: Backtrace },

    /// A key write was attempted where no key is admitted.
    #[snafu(display("A key is only admitted in a dict with no pending key"))]
    KeyNotExpected { backtrace: Backtrace },

    /// A dict cannot be closed between a key and its value.
    #[snafu(display("Cannot close a dict while its last key has no value"))]
    PendingKey { backtrace: Backtrace },

    /// The same key was written twice into one dict (strict mode).
    #[snafu(display("Duplicate key `{}` in dict", key))]
    DuplicateKey { key: String, backtrace: Backtrace },

    /// The file already holds a complete root value.
    #[snafu(display("The root value has already been written"))]
    RootComplete { backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A reference to an open container frame of a [`Writer`].
///
/// A handle stays usable while its container is open,
/// even after siblings or descendants were added in the meantime;
/// writing through it first seals every deeper open container.
/// Once the container itself has been closed,
/// any use of the handle fails with [`Error::HandleClosed`],
/// detected in constant time through a generation check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Handle {
    depth: usize,
    generation: u64,
}

impl Handle {
    /// The nesting depth of the container this handle refers to
    /// (zero for the root container).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Bookkeeping record for one open container.
#[derive(Debug)]
struct Frame {
    kind: ContainerKind,
    generation: u64,
    /// offset of the container's open tag
    start: u64,
    /// dict only: a key was written and its value is still missing
    awaiting_value: bool,
    /// dict only: keys written so far
    seen_keys: BTreeSet<String>,
}

/// The encoder state machine over an append-mode byte sink.
///
/// A writer emits exactly one root value:
/// either through a whole-value [`write_value`](Writer::write_value),
/// or sequentially by opening a root container
/// and adding children through the returned [`Handle`]s.
/// Dropping the writer seals every still-open container,
/// but errors are only reported by [`finish`](Writer::finish).
#[derive(Debug)]
pub struct Writer<W: Write> {
    enc: Option<StatefulEncoder<W>>,
    frames: Vec<Frame>,
    next_generation: u64,
    root_done: bool,
    strict_keys: bool,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Create a writer over an empty sink with the given byte order.
    pub fn new(to: W, endianness: Endianness) -> Self {
        Writer {
            enc: Some(StatefulEncoder::new(to, BasicEncoder::new(endianness))),
            frames: Vec::new(),
            next_generation: 0,
            root_done: false,
            strict_keys: false,
        }
    }

    /// Create a writer which continues an existing root container.
    ///
    /// The sink must be positioned where the container's
    /// trailing terminator used to be (`position` bytes in);
    /// the corresponding root frame is re-opened
    /// without emitting an open tag.
    /// Keys already present in a resumed dict are unknown to the writer
    /// and are not considered by duplicate key checks.
    pub fn resume(to: W, endianness: Endianness, kind: ContainerKind, position: u64) -> Self {
        let mut writer = Writer {
            enc: Some(StatefulEncoder::new_with_position(
                to,
                BasicEncoder::new(endianness),
                position,
            )),
            frames: Vec::new(),
            next_generation: 0,
            root_done: false,
            strict_keys: false,
        };
        writer.push_frame(kind, 0);
        writer
    }

    /// Enable or disable the rejection of duplicate dict keys.
    ///
    /// Duplicate keys are allowed by default
    /// (uniqueness is the caller's obligation);
    /// when this mode is enabled, writing one fails with
    /// [`Error::DuplicateKey`] instead.
    pub fn strict_keys(&mut self, strict: bool) {
        self.strict_keys = strict;
    }

    /// The byte order of this writer.
    pub fn endianness(&self) -> Endianness {
        self.enc().endianness()
    }

    /// The number of bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.enc().bytes_written()
    }

    /// The number of currently open containers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the handle still refers to an open container.
    pub fn is_open(&self, handle: Handle) -> bool {
        self.frames
            .get(handle.depth)
            .map_or(false, |frame| frame.generation == handle.generation)
    }

    /// The handle of the innermost open container, if any.
    pub fn last(&self) -> Option<Handle> {
        self.frames.last().map(|frame| Handle {
            depth: self.frames.len() - 1,
            generation: frame.generation,
        })
    }

    /// Write one whole value at the current insertion point.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        self.expect_value()?;
        self.emit_value(value)?;
        self.value_written();
        Ok(())
    }

    /// Write a whole numeric array at the current insertion point
    /// from a native-order contiguous payload.
    pub fn write_array(&mut self, kind: ElementKind, shape: &[usize], payload: &[u8]) -> Result<()> {
        self.expect_value()?;
        self.enc_mut()
            .encode_array(kind, shape, payload)
            .context(EncodeSnafu)?;
        self.value_written();
        Ok(())
    }

    /// Write a dict key at the current insertion point.
    pub fn key(&mut self, key: &str) -> Result<()> {
        match self.frames.last() {
            Some(frame) if frame.kind == ContainerKind::Dict && !frame.awaiting_value => {}
            _ => return KeyNotExpectedSnafu.fail(),
        }
        self.check_duplicate_key(key)?;
        self.enc_mut().encode_str(key).context(EncodeSnafu)?;
        if let Some(frame) = self.frames.last_mut() {
            frame.seen_keys.insert(key.to_string());
            frame.awaiting_value = true;
        }
        Ok(())
    }

    /// Open a list at the current insertion point,
    /// returning a handle to the new frame.
    pub fn open_list(&mut self) -> Result<Handle> {
        self.open(ContainerKind::List)
    }

    /// Open a dict at the current insertion point,
    /// returning a handle to the new frame.
    pub fn open_dict(&mut self) -> Result<Handle> {
        self.open(ContainerKind::Dict)
    }

    /// Make the given container the current insertion point,
    /// sealing every container opened inside it.
    pub fn select(&mut self, handle: Handle) -> Result<()> {
        ensure!(self.is_open(handle), HandleClosedSnafu);
        while self.frames.len() > handle.depth + 1 {
            self.close_top()?;
        }
        Ok(())
    }

    /// Close the given container,
    /// sealing every container opened inside it first.
    pub fn close(&mut self, handle: Handle) -> Result<()> {
        self.select(handle)?;
        self.close_top()
    }

    /// Close every open container in LIFO order,
    /// flush the sink, and recover it.
    pub fn finish(mut self) -> Result<W> {
        self.seal()?;
        // the encoder is only vacated here, right before dropping
        let mut enc = self.enc.take().expect("encoder present until finish");
        enc.flush().context(EncodeSnafu)?;
        Ok(enc.into_inner())
    }

    fn seal(&mut self) -> Result<()> {
        while !self.frames.is_empty() {
            self.close_top()?;
        }
        Ok(())
    }

    fn enc(&self) -> &StatefulEncoder<W> {
        self.enc.as_ref().expect("encoder present until finish")
    }

    fn enc_mut(&mut self) -> &mut StatefulEncoder<W> {
        self.enc.as_mut().expect("encoder present until finish")
    }

    fn push_frame(&mut self, kind: ContainerKind, start: u64) -> Handle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.frames.push(Frame {
            kind,
            generation,
            start,
            awaiting_value: false,
            seen_keys: BTreeSet::new(),
        });
        Handle {
            depth: self.frames.len() - 1,
            generation,
        }
    }

    fn open(&mut self, kind: ContainerKind) -> Result<Handle> {
        self.expect_value()?;
        let start = self.enc().bytes_written();
        self.enc_mut()
            .encode_tag(kind.open_tag())
            .context(EncodeSnafu)?;
        Ok(self.push_frame(kind, start))
    }

    fn close_top(&mut self) -> Result<()> {
        let (kind, start) = match self.frames.last() {
            Some(frame) => {
                ensure!(!frame.awaiting_value, PendingKeySnafu);
                (frame.kind, frame.start)
            }
            None => return RootCompleteSnafu.fail(),
        };
        self.enc_mut()
            .encode_tag(kind.close_tag())
            .context(EncodeSnafu)?;
        self.frames.pop();
        tracing::trace!(%kind, start, "container sealed");
        self.value_written();
        Ok(())
    }

    /// Check that the current insertion point admits a value.
    fn expect_value(&self) -> Result<()> {
        match self.frames.last() {
            None => {
                ensure!(!self.root_done, RootCompleteSnafu);
            }
            Some(frame) => {
                ensure!(
                    frame.kind == ContainerKind::List || frame.awaiting_value,
                    KeyExpectedSnafu
                );
            }
        }
        Ok(())
    }

    /// Account for one complete value at the current insertion point.
    fn value_written(&mut self) {
        match self.frames.last_mut() {
            None => self.root_done = true,
            Some(frame) => frame.awaiting_value = false,
        }
    }

    fn check_duplicate_key(&self, key: &str) -> Result<()> {
        let frame = match self.frames.last() {
            Some(frame) => frame,
            None => return Ok(()),
        };
        if frame.seen_keys.contains(key) {
            ensure!(
                !self.strict_keys,
                DuplicateKeySnafu {
                    key: key.to_string()
                }
            );
            tracing::warn!(key, "duplicate key written into dict");
        }
        Ok(())
    }

    /// Emit one whole value recursively,
    /// without going through the frame stack.
    fn emit_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Str(text) => self.enc_mut().encode_str(text).context(EncodeSnafu),
            Value::Bytes(data) => self.enc_mut().encode_bytes(data).context(EncodeSnafu),
            Value::List(items) => {
                self.enc_mut()
                    .encode_tag(Tag::ListOpen)
                    .context(EncodeSnafu)?;
                for item in items {
                    self.emit_value(item)?;
                }
                self.enc_mut()
                    .encode_tag(Tag::ListClose)
                    .context(EncodeSnafu)
            }
            Value::Dict(pairs) => {
                self.enc_mut()
                    .encode_tag(Tag::DictOpen)
                    .context(EncodeSnafu)?;
                let mut seen: BTreeSet<&str> = BTreeSet::new();
                for (key, item) in pairs {
                    if !seen.insert(key) {
                        ensure!(
                            !self.strict_keys,
                            DuplicateKeySnafu { key: key.clone() }
                        );
                        tracing::warn!(key = key.as_str(), "duplicate key written into dict");
                    }
                    self.enc_mut().encode_str(key).context(EncodeSnafu)?;
                    self.emit_value(item)?;
                }
                self.enc_mut()
                    .encode_tag(Tag::DictClose)
                    .context(EncodeSnafu)
            }
            Value::Array(array) => self
                .enc_mut()
                .encode_array(array.kind(), array.shape(), array.data())
                .context(EncodeSnafu),
            scalar => self.enc_mut().encode_scalar(scalar).context(EncodeSnafu),
        }
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.enc.is_some() {
            let _ = self.seal();
            if let Some(enc) = self.enc.as_mut() {
                let _ = enc.flush();
            }
        }
    }
}
