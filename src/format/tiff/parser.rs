//! TIFF header parsing.
//!
//! The header is the only part of the file read without a known byte order:
//! its first two bytes declare the order for everything that follows.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order ("II" = little-endian, "MM" = big-endian)
//! Bytes 2-3: Magic (42)
//! Bytes 4-7: Offset to first IFD (word-aligned)
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::TiffError;
use crate::io::{ByteCursor, ByteSource};

// =============================================================================
// Constants
// =============================================================================

/// Marker for little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: [u8; 2] = *b"II";

/// Marker for big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: [u8; 2] = *b"MM";

/// Magic number identifying a classic TIFF container
pub const TIFF_MAGIC: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Classify a two-byte marker.
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match marker {
            BYTE_ORDER_LITTLE_ENDIAN => Some(ByteOrder::LittleEndian),
            BYTE_ORDER_BIG_ENDIAN => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// The two-byte marker written at the start of a file.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => BYTE_ORDER_LITTLE_ENDIAN,
            ByteOrder::BigEndian => BYTE_ORDER_BIG_ENDIAN,
        }
    }

    /// Interpret up to 8 bytes as an unsigned integer.
    ///
    /// Little-endian: byte `i` is worth `bytes[i] << 8*i`.
    /// Big-endian: byte `i` is worth `bytes[i] << 8*(n-1-i)`.
    #[inline]
    pub fn read_uint(self, bytes: &[u8]) -> u64 {
        debug_assert!(bytes.len() <= 8);
        let n = bytes.len();
        bytes.iter().enumerate().fold(0u64, |acc, (i, &b)| {
            let shift = match self {
                ByteOrder::LittleEndian => 8 * i,
                ByteOrder::BigEndian => 8 * (n - 1 - i),
            };
            acc | (u64::from(b) << shift)
        })
    }

    /// Interpret 1 to 8 bytes as a two's complement signed integer.
    #[inline]
    pub fn read_int(self, bytes: &[u8]) -> i64 {
        let bits = 8 * bytes.len() as u32;
        let raw = self.read_uint(bytes);
        if bits == 0 || bits >= 64 {
            return raw as i64;
        }
        // Shift the sign bit to the top, then arithmetic-shift back down.
        ((raw << (64 - bits)) as i64) >> (64 - bits)
    }

    /// Read a u16 from the first 2 bytes of a slice.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 2 bytes.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        self.read_uint(&bytes[..2]) as u16
    }

    /// Read a u32 from the first 4 bytes of a slice.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 4 bytes.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        self.read_uint(&bytes[..4]) as u32
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset to the first IFD; 0 only in a header-only file
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Decode the header at the start of `source`.
    ///
    /// Returns the header together with a cursor positioned just after it and
    /// bound to the declared byte order.
    ///
    /// # Errors
    /// - `UnrecognizedByteOrder` if the first two bytes are not II or MM; only
    ///   those two bytes have been read at that point
    /// - `NotATiffContainer` if the magic is not 42
    /// - `MisalignedOffset` if the first IFD offset is odd
    /// - `MissingFirstIfd` if the first IFD offset is 0 but bytes follow the
    ///   header
    /// - `OutOfBounds` if the source is shorter than the header
    pub fn decode<S: ByteSource>(source: S) -> Result<(Self, ByteCursor<S>), TiffError> {
        let marker = source.read_exact_at(0, 2)?;
        let marker = [marker[0], marker[1]];
        let byte_order = ByteOrder::from_marker(marker)
            .ok_or_else(|| TiffError::UnrecognizedByteOrder(u16::from_be_bytes(marker)))?;

        let mut cursor = ByteCursor::new(source, byte_order);
        cursor.seek(2)?;

        let magic = cursor.read_u16()?;
        if magic != TIFF_MAGIC {
            return Err(TiffError::NotATiffContainer(magic));
        }

        let first_ifd_offset = cursor.read_u32()?;
        if first_ifd_offset % 2 != 0 {
            return Err(TiffError::MisalignedOffset(first_ifd_offset));
        }
        if first_ifd_offset == 0 && cursor.len() > TIFF_HEADER_SIZE as u64 {
            return Err(TiffError::MissingFirstIfd(cursor.len()));
        }

        debug!(
            source = cursor.source().identifier(),
            ?byte_order,
            first_ifd_offset,
            "decoded TIFF header"
        );

        Ok((
            TiffHeader {
                byte_order,
                first_ifd_offset,
            },
            cursor,
        ))
    }

    /// Encode this header into its 8-byte wire form.
    pub fn to_bytes(&self) -> [u8; TIFF_HEADER_SIZE] {
        let mut out = [0u8; TIFF_HEADER_SIZE];
        out[..2].copy_from_slice(&self.byte_order.marker());
        match self.byte_order {
            ByteOrder::LittleEndian => {
                out[2..4].copy_from_slice(&TIFF_MAGIC.to_le_bytes());
                out[4..].copy_from_slice(&self.first_ifd_offset.to_le_bytes());
            }
            ByteOrder::BigEndian => {
                out[2..4].copy_from_slice(&TIFF_MAGIC.to_be_bytes());
                out[4..].copy_from_slice(&self.first_ifd_offset.to_be_bytes());
            }
        }
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
