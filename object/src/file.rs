//! File-level entry points for bintag containers:
//! opening a navigator over an existing file,
//! creating a writer for a new file,
//! and re-opening an existing root container for further writes.

use bintag_core::tag::{ContainerKind, Tag};
use bintag_core::value::Value;
use bintag_parser::{navigator, writer, Navigator, Writer};
use byteordered::Endianness;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// The default implementation of a navigator over a bintag file.
pub type FileNavigator = Navigator<BufReader<File>>;

/// The default implementation of a writer over a bintag file.
pub type FileWriter = Writer<BufWriter<File>>;

/// The byte order of every multi-byte scalar in a file.
///
/// The byte order is a file-level attribute chosen at creation time
/// and is not recorded in the payload;
/// reader and writer agree on it out of band.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
    /// The byte order of the host.
    Auto,
}

impl ByteOrder {
    /// Resolve this option into a concrete endianness.
    pub fn endianness(self) -> Endianness {
        match self {
            ByteOrder::Little => Endianness::Little,
            ByteOrder::Big => Endianness::Big,
            ByteOrder::Auto => Endianness::native(),
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Auto
    }
}

impl From<Endianness> for ByteOrder {
    fn from(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Little => ByteOrder::Little,
            Endianness::Big => ByteOrder::Big,
        }
    }
}

/// An error which may occur when opening or reading a bintag file.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    /// The file could not be opened for reading.
    #[snafu(display("Could not open file {}", path.display()))]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The encoded content could not be read.
    #[snafu(display("Could not read the encoded value"))]
    ReadValue {
        #[snafu(backtrace)]
        source: navigator::Error,
    },
}

/// An error which may occur when creating or writing a bintag file.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    /// The file could not be created.
    #[snafu(display("Could not create file {}", path.display()))]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The value could not be written out.
    #[snafu(display("Could not write the value"))]
    WriteValue {
        #[snafu(backtrace)]
        source: writer::Error,
    },
}

/// An error which may occur when re-opening a bintag file for append.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum AppendError {
    /// The file could not be opened for reading and writing.
    #[snafu(display("Could not open file {} for appending", path.display()))]
    OpenForAppend {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The file head or trailer could not be inspected.
    #[snafu(display("Could not inspect file {}", path.display()))]
    InspectFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The root value is not a container that can take more children.
    #[snafu(display("The root value is not an extensible container"))]
    RootNotExtensible { backtrace: Backtrace },

    /// The file does not end with the root container's terminator.
    #[snafu(display(
        "File does not end with the expected {} terminator (found byte 0x{:02X})",
        expected,
        got
    ))]
    MalformedTrailer {
        expected: Tag,
        got: u8,
        backtrace: Backtrace,
    },

    /// The trailing terminator byte could not be truncated.
    #[snafu(display("Could not truncate the trailing terminator of {}", path.display()))]
    TruncateFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

/// Options for opening a file with a navigator.
#[derive(Debug, Clone, Default)]
pub struct OpenFileOptions {
    byte_order: ByteOrder,
}

impl OpenFileOptions {
    /// Start with the default options:
    /// host byte order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte order to read multi-byte scalars in.
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Open the file at the given path for navigation.
    pub fn open<P>(self, path: P) -> Result<FileNavigator, ReadError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).context(OpenFileSnafu { path })?;
        Ok(Navigator::new(
            BufReader::new(file),
            self.byte_order.endianness(),
        ))
    }
}

/// Options for creating or re-opening a file with a writer.
#[derive(Debug, Clone, Default)]
pub struct CreateFileOptions {
    byte_order: ByteOrder,
    strict_keys: bool,
}

impl CreateFileOptions {
    /// Start with the default options:
    /// host byte order, duplicate keys tolerated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte order to write multi-byte scalars in.
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Reject duplicate dict keys at write time.
    pub fn strict_keys(mut self, strict: bool) -> Self {
        self.strict_keys = strict;
        self
    }

    /// Create (or truncate) the file at the given path
    /// and return a writer positioned at its beginning.
    pub fn create<P>(self, path: P) -> Result<FileWriter, WriteError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).context(CreateFileSnafu { path })?;
        let mut writer = Writer::new(BufWriter::new(file), self.byte_order.endianness());
        writer.strict_keys(self.strict_keys);
        Ok(writer)
    }

    /// Re-open the file at the given path
    /// and continue adding children to its root container.
    ///
    /// The file must hold a complete list or dict root;
    /// its trailing terminator byte is truncated
    /// and the corresponding frame re-opened,
    /// so that the writer appends after the existing children.
    /// A scalar or array root fails with
    /// [`AppendError::RootNotExtensible`].
    pub fn append<P>(self, path: P) -> Result<FileWriter, AppendError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .context(OpenForAppendSnafu { path })?;

        let mut first = [0_u8; 1];
        file.read_exact(&mut first)
            .context(InspectFileSnafu { path })?;
        let kind = Tag::from_u8(first[0])
            .and_then(ContainerKind::of_open_tag)
            .context(RootNotExtensibleSnafu)?;

        let trailer_at = file
            .seek(SeekFrom::End(-1))
            .context(InspectFileSnafu { path })?;
        let mut last = [0_u8; 1];
        file.read_exact(&mut last)
            .context(InspectFileSnafu { path })?;
        let expected = kind.close_tag();
        ensure!(
            last[0] == expected.to_u8(),
            MalformedTrailerSnafu {
                expected,
                got: last[0],
            }
        );

        // reuse the terminator slot: drop the close tag and keep writing
        file.set_len(trailer_at).context(TruncateFileSnafu { path })?;
        file.seek(SeekFrom::Start(trailer_at))
            .context(TruncateFileSnafu { path })?;
        tracing::debug!(%kind, position = trailer_at, "resuming root container for append");

        let mut writer = Writer::resume(
            BufWriter::new(file),
            self.byte_order.endianness(),
            kind,
            trailer_at,
        );
        writer.strict_keys(self.strict_keys);
        Ok(writer)
    }
}

/// Open the file at the given path for navigation,
/// assuming the host byte order.
pub fn open_file<P>(path: P) -> Result<FileNavigator, ReadError>
where
    P: AsRef<Path>,
{
    OpenFileOptions::new().open(path)
}

/// Create (or truncate) a bintag file in the host byte order.
pub fn create_file<P>(path: P) -> Result<FileWriter, WriteError>
where
    P: AsRef<Path>,
{
    CreateFileOptions::new().create(path)
}

/// Re-open an existing bintag file in the host byte order
/// and continue adding children to its root container.
pub fn append_file<P>(path: P) -> Result<FileWriter, AppendError>
where
    P: AsRef<Path>,
{
    CreateFileOptions::new().append(path)
}

/// Write one whole value as a bintag file in the host byte order.
pub fn write_file<P>(path: P, value: &Value) -> Result<(), WriteError>
where
    P: AsRef<Path>,
{
    let mut writer = create_file(path)?;
    writer.write_value(value).context(WriteValueSnafu)?;
    writer.finish().context(WriteValueSnafu)?;
    Ok(())
}

/// Materialize the root value of a bintag file in the host byte order.
pub fn read_file<P>(path: P) -> Result<Value, ReadError>
where
    P: AsRef<Path>,
{
    open_file(path)?.read().context(ReadValueSnafu)
}

/// Encode one whole value into an in-memory buffer.
pub fn to_bytes(value: &Value, byte_order: ByteOrder) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new(Vec::new(), byte_order.endianness());
    writer.write_value(value).context(WriteValueSnafu)?;
    writer.finish().context(WriteValueSnafu)
}

/// Materialize one whole value from an in-memory buffer.
pub fn from_bytes(data: &[u8], byte_order: ByteOrder) -> Result<Value, ReadError> {
    Navigator::new(Cursor::new(data), byte_order.endianness())
        .read()
        .context(ReadValueSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_resolution() {
        assert_eq!(ByteOrder::Little.endianness(), Endianness::Little);
        assert_eq!(ByteOrder::Big.endianness(), Endianness::Big);
        assert_eq!(ByteOrder::Auto.endianness(), Endianness::native());
        assert_eq!(ByteOrder::default(), ByteOrder::Auto);
    }

    #[test]
    fn in_memory_round_trip() {
        let value = Value::dict(vec![
            ("flag", Value::Bool(true)),
            ("text", Value::Str("résumé".into())),
            ("blob", Value::Bytes(vec![0, 1, 2])),
        ]);
        for byte_order in [ByteOrder::Little, ByteOrder::Big, ByteOrder::Auto].iter() {
            let data = to_bytes(&value, *byte_order).unwrap();
            assert_eq!(from_bytes(&data, *byte_order).unwrap(), value);
        }
    }
}
