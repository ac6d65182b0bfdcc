//! IFD entry decoding.
//!
//! Each entry is a fixed 12-byte record:
//!
//! ```text
//! Bytes 0-1:  Tag ID
//! Bytes 2-3:  Field type code
//! Bytes 4-7:  Value count
//! Bytes 8-11: Value, or offset to the value
//! ```
//!
//! Decoding an entry only reads those 12 bytes. Whether the last four bytes are
//! the value itself or a pointer is decided later by the value resolver.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::error::TiffError;
use crate::io::{ByteCursor, ByteSource};

use super::parser::ByteOrder;
use super::tags::{EntryType, FieldType};

/// Size of one IFD entry in bytes.
pub const IFD_ENTRY_SIZE: u32 = 12;

/// A single IFD entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfdEntry {
    /// Tag ID
    pub tag: u16,

    /// Declared field type
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Number of values (not bytes)
    pub count: u32,

    /// Raw value-or-offset field, in file order
    #[serde(serialize_with = "serialize_hex")]
    pub value_offset_bytes: [u8; 4],

    /// Resolved value bytes; `None` for unknown field types or before resolution
    #[serde(serialize_with = "serialize_opt_hex")]
    pub value: Option<Bytes>,
}

impl IfdEntry {
    /// Decode one entry at the cursor, advancing it by 12 bytes.
    ///
    /// # Errors
    /// - `InvalidValueCount` if a known field type declares zero values
    /// - `OutOfBounds` if fewer than 12 bytes remain
    pub fn decode<S: ByteSource>(cursor: &mut ByteCursor<S>) -> Result<Self, TiffError> {
        let tag = cursor.read_u16()?;
        let entry_type = EntryType::from_u16(cursor.read_u16()?);
        let count = cursor.read_u32()?;
        let raw = cursor.read_bytes(4)?;
        let value_offset_bytes = [raw[0], raw[1], raw[2], raw[3]];

        if entry_type.field_type().is_some() && count == 0 {
            return Err(TiffError::InvalidValueCount { tag, count });
        }

        trace!(tag, field_type = entry_type.as_u16(), count, "decoded IFD entry");

        Ok(Self {
            tag,
            entry_type,
            count,
            value_offset_bytes,
            value: None,
        })
    }

    /// The field type, if recognized.
    #[inline]
    pub fn field_type(&self) -> Option<FieldType> {
        self.entry_type.field_type()
    }

    /// Total value size in bytes, or `None` for unknown types or on overflow.
    pub fn value_byte_size(&self) -> Option<u32> {
        self.field_type()?.value_byte_size(self.count)
    }

    /// Whether the value is stored in the entry itself.
    pub fn is_inline(&self) -> bool {
        self.field_type()
            .map_or(false, |field_type| field_type.fits_inline(self.count))
    }

    /// Interpret the value field as an offset.
    ///
    /// Only meaningful when the value is not inline.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn serialize_opt_hex<S: Serializer>(
    bytes: &Option<Bytes>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

// =============================================================================
// Tests
// =============================================================================
