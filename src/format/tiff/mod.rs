//! Structural TIFF decoding.
//!
//! This module decodes the container layer shared by TIFF and DNG files: the
//! header, the chain of Image File Directories, and each entry's value bytes.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **IFD (Image File Directory)**: A list of tagged entries plus a pointer to the
//!   next directory. DNG files use the first IFD for a preview and reach the raw
//!   image through SubIFDs.
//!
//! - **Inline vs offset values**: Values of at most 4 bytes are stored inline in the
//!   IFD entry, larger values are stored at an offset pointed to by the entry.
//!
//! Tags are not interpreted here. Every entry is kept as tag, type, count and raw
//! bytes; [`TypedValue`] and the [`IfdEntry`] accessors are conveniences on top.

mod entry;
mod ifd;
mod parser;
mod tags;
mod values;
mod walker;

pub use entry::{IfdEntry, IFD_ENTRY_SIZE};
pub use ifd::Ifd;
pub use parser::{ByteOrder, TiffHeader, TIFF_HEADER_SIZE, TIFF_MAGIC};
pub use tags::{tag_name, EntryType, FieldType, TiffTag};
pub use values::{TypedValue, ValueResolver};
pub use walker::{
    decode, decode_with_options, DecodeOptions, DecodeResult, IfdChainWalker,
    DEFAULT_MAX_DIRECTORIES,
};
