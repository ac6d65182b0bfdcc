//! # dng-ifd
//!
//! Structural decoder for TIFF-family containers, including DNG raw photos.
//!
//! This library reads the file header, walks the chain of Image File
//! Directories, and resolves each entry's value bytes according to TIFF's
//! inline-vs-offset rule. It does not decode pixel data or interpret tags;
//! every entry is returned as tag, type, count and raw bytes.
//!
//! ## Features
//!
//! - **Both byte orders**: The order declared by the header is bound to the
//!   decode session's cursor and applied to every number read after it
//! - **Validated pointers**: Every offset is checked for alignment, bounds and
//!   32-bit overflow before it is followed
//! - **Cycle-safe walking**: IFD chains that loop back fail cleanly, and an
//!   optional cap bounds chain length
//! - **Tolerant of unknown types**: Entries with unrecognized type codes are
//!   kept without a value instead of failing the file
//!
//! ## Architecture
//!
//! - [`io`] - Byte sources and the endian-aware cursor
//! - [`mod@format`] - Header, entry, value and IFD chain decoding, plus format detection
//! - [`config`] - CLI configuration for the `dng-inspect` binary
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use dng_ifd::{decode, MemorySource, TiffTag};
//!
//! let source = MemorySource::from_path("photo.dng").unwrap();
//! let result = decode(&source).unwrap();
//!
//! for ifd in &result.directories {
//!     if let Some(width) = ifd.get_entry_by_tag(TiffTag::ImageWidth) {
//!         println!("width: {:?}", width.as_u32(result.byte_order()));
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use error::{DecodeError, DecodeLocation, FormatError, IoError, TiffError};
pub use format::tiff::{
    decode, decode_with_options, tag_name, ByteOrder, DecodeOptions, DecodeResult, EntryType,
    FieldType, Ifd, IfdChainWalker, IfdEntry, TiffHeader, TiffTag, TypedValue, ValueResolver,
    DEFAULT_MAX_DIRECTORIES, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE,
};
pub use format::{
    check_extension, check_signature, detect_format, is_tiff_header, ContainerFormat,
};
pub use io::{ByteCursor, ByteSource, MemorySource};
