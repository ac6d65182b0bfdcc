use std::fmt;

use thiserror::Error;

/// I/O errors raised by a byte source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// The backing file could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Errors that can occur when decoding the TIFF structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TiffError {
    /// A read or seek would leave the source
    #[error("Out of bounds: {requested} bytes at offset {offset}, source is {size} bytes")]
    OutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// First two bytes are neither "II" nor "MM"
    #[error("Unrecognized byte order marker: 0x{0:04X}")]
    UnrecognizedByteOrder(u16),

    /// Magic number is not 42
    #[error("Not a TIFF container: expected magic 42, got {0}")]
    NotATiffContainer(u16),

    /// Header points at no directory although data follows it
    #[error("First IFD offset is 0 in a {0}-byte file")]
    MissingFirstIfd(u64),

    /// Integer read of a width other than 1, 2, 4 or 8 bytes
    #[error("Unsupported integer width: {0} bytes")]
    UnsupportedWidth(usize),

    /// IFD offset is not on a word boundary
    #[error("IFD offset {0} is not word-aligned")]
    MisalignedOffset(u32),

    /// Known field type with a zero value count
    #[error("Invalid value count {count} for tag {tag}")]
    InvalidValueCount { tag: u16, count: u32 },

    /// Out-of-line value offset is not on a word boundary
    #[error("Value offset {offset} of tag {tag} is not word-aligned")]
    MisalignedValueOffset { tag: u16, offset: u32 },

    /// Directory declares zero entries
    #[error("Directory at offset {0} has no entries")]
    EmptyDirectory(u32),

    /// Next-IFD pointer revisits a directory
    #[error("Cyclic IFD chain: directory at {from} points back to {to}")]
    CyclicIfdChain { from: u32, to: u32 },

    /// Offset or size arithmetic left the 32-bit offset space
    #[error("Offset arithmetic overflow: {base} + {length}")]
    OffsetArithmeticOverflow { base: u64, length: u64 },

    /// Chain is longer than the configured limit
    #[error("IFD chain exceeds the limit of {0} directories")]
    DirectoryLimitExceeded(usize),

    /// Error from the byte source
    #[error("I/O error: {0}")]
    Io(IoError),
}

impl From<IoError> for TiffError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::RangeOutOfBounds {
                offset,
                requested,
                size,
            } => TiffError::OutOfBounds {
                offset,
                requested,
                size,
            },
            other => TiffError::Io(other),
        }
    }
}

/// Where in the file a decode failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeLocation {
    /// While reading the 8-byte header
    Header,

    /// While reading a directory's count or next pointer
    Directory { offset: u32 },

    /// While decoding or resolving one entry
    Entry {
        directory_offset: u32,
        index: usize,
        tag: Option<u16>,
    },
}

impl fmt::Display for DecodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeLocation::Header => write!(f, "in header"),
            DecodeLocation::Directory { offset } => write!(f, "in directory at offset {offset}"),
            DecodeLocation::Entry {
                directory_offset,
                index,
                tag: Some(tag),
            } => write!(
                f,
                "in entry {index} (tag {tag}) of directory at offset {directory_offset}"
            ),
            DecodeLocation::Entry {
                directory_offset,
                index,
                tag: None,
            } => write!(f, "in entry {index} of directory at offset {directory_offset}"),
        }
    }
}

/// A decode failure together with the region of the file it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} ({location})")]
pub struct DecodeError {
    pub location: DecodeLocation,
    #[source]
    pub kind: TiffError,
}

impl DecodeError {
    pub fn new(location: DecodeLocation, kind: TiffError) -> Self {
        Self { location, kind }
    }

    pub fn in_header(kind: TiffError) -> Self {
        Self::new(DecodeLocation::Header, kind)
    }
}

/// Errors raised while opening and classifying an input file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Structural decode failed
    #[error("TIFF error: {0}")]
    Decode(#[from] DecodeError),

    /// File is not one this tool accepts
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Decoded structure could not be rendered
    #[error("Failed to render output: {0}")]
    Output(String),
}
