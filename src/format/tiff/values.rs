//! TIFF field value resolution.
//!
//! An entry's value is stored either inline in its 4-byte value field (when
//! `count * width <= 4`) or elsewhere in the file at the offset held by that
//! field. [`ValueResolver`] materializes the value bytes in both cases;
//! [`TypedValue`] interprets them according to the field type.
//!
//! Inline values occupy the first bytes of the value field in file order. Their
//! numeric interpretation, like every other number, follows the file's byte
//! order.

use std::fmt;

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::{ByteCursor, ByteSource};

use super::entry::IfdEntry;
use super::parser::ByteOrder;
use super::tags::FieldType;

/// Number of values shown by the [`TypedValue`] display impl before eliding.
const PREVIEW_LIMIT: usize = 8;

// =============================================================================
// ValueResolver
// =============================================================================

/// Resolves entry values against the file they were decoded from.
///
/// Borrows the session cursor; out-of-line reads leave its position unchanged
/// so that directory decoding can continue with the next entry.
pub struct ValueResolver<'a, S: ByteSource> {
    cursor: &'a mut ByteCursor<S>,
}

impl<'a, S: ByteSource> ValueResolver<'a, S> {
    /// Create a resolver over the session cursor.
    pub fn new(cursor: &'a mut ByteCursor<S>) -> Self {
        Self { cursor }
    }

    /// Byte order of the session.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.cursor.byte_order()
    }

    /// Read the raw value bytes for an entry.
    ///
    /// Returns `Ok(None)` for entries of unknown field type.
    ///
    /// # Errors
    /// - `OffsetArithmeticOverflow` if `count * width`, or the end of the
    ///   out-of-line range, does not fit in 32 bits
    /// - `MisalignedValueOffset` if an out-of-line offset is odd
    /// - `OutOfBounds` if the out-of-line range leaves the source
    pub fn resolve(&mut self, entry: &IfdEntry) -> Result<Option<Bytes>, TiffError> {
        let Some(field_type) = entry.field_type() else {
            return Ok(None);
        };

        let byte_order = self.byte_order();
        let offset = entry.value_offset(byte_order);
        let total = field_type.value_byte_size(entry.count).ok_or(
            TiffError::OffsetArithmeticOverflow {
                base: u64::from(offset),
                length: u64::from(entry.count) * field_type.size_in_bytes() as u64,
            },
        )?;

        if total as usize <= FieldType::INLINE_THRESHOLD {
            return Ok(Some(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..total as usize],
            )));
        }

        if offset % 2 != 0 {
            return Err(TiffError::MisalignedValueOffset {
                tag: entry.tag,
                offset,
            });
        }

        offset
            .checked_add(total)
            .ok_or(TiffError::OffsetArithmeticOverflow {
                base: u64::from(offset),
                length: u64::from(total),
            })?;

        let bytes = self.cursor.with_saved_position(|cursor| {
            cursor.seek(offset)?;
            cursor.read_bytes(total as usize)
        })?;
        Ok(Some(bytes))
    }

    /// Resolve an entry's value and store it on the entry.
    pub fn resolve_into(&mut self, entry: &mut IfdEntry) -> Result<(), TiffError> {
        entry.value = self.resolve(entry)?;
        Ok(())
    }
}

// =============================================================================
// TypedValue
// =============================================================================

/// Resolved value bytes interpreted according to their field type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Byte(Vec<u8>),
    /// NUL-separated strings; the trailing NUL is not kept
    Ascii(Vec<String>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    /// `(numerator, denominator)` pairs
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Bytes),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl TypedValue {
    /// Interpret value bytes as `field_type` values in `byte_order`.
    ///
    /// Trailing bytes that do not form a whole value are ignored.
    pub fn decode(field_type: FieldType, bytes: &Bytes, byte_order: ByteOrder) -> Self {
        let width = field_type.size_in_bytes();
        let units = unsigned_units(bytes, width, byte_order);
        let signed = signed_units(bytes, width, byte_order);

        match field_type {
            FieldType::Byte => TypedValue::Byte(bytes.to_vec()),
            FieldType::Ascii => TypedValue::Ascii(split_ascii(bytes)),
            FieldType::Short => TypedValue::Short(units.map(|v| v as u16).collect()),
            FieldType::Long => TypedValue::Long(units.map(|v| v as u32).collect()),
            FieldType::Rational => TypedValue::Rational(
                bytes
                    .chunks_exact(width)
                    .map(|c| (byte_order.read_u32(&c[..4]), byte_order.read_u32(&c[4..])))
                    .collect(),
            ),
            FieldType::SByte => TypedValue::SByte(signed.map(|v| v as i8).collect()),
            FieldType::Undefined => TypedValue::Undefined(bytes.clone()),
            FieldType::SShort => TypedValue::SShort(signed.map(|v| v as i16).collect()),
            FieldType::SLong => TypedValue::SLong(signed.map(|v| v as i32).collect()),
            FieldType::SRational => TypedValue::SRational(
                bytes
                    .chunks_exact(width)
                    .map(|c| {
                        (
                            byte_order.read_int(&c[..4]) as i32,
                            byte_order.read_int(&c[4..]) as i32,
                        )
                    })
                    .collect(),
            ),
            FieldType::Float => {
                TypedValue::Float(units.map(|v| f32::from_bits(v as u32)).collect())
            }
            FieldType::Double => TypedValue::Double(units.map(f64::from_bits).collect()),
        }
    }

    /// Number of values (strings for ASCII, bytes for UNDEFINED).
    pub fn len(&self) -> usize {
        match self {
            TypedValue::Byte(v) => v.len(),
            TypedValue::Ascii(v) => v.len(),
            TypedValue::Short(v) => v.len(),
            TypedValue::Long(v) => v.len(),
            TypedValue::Rational(v) => v.len(),
            TypedValue::SByte(v) => v.len(),
            TypedValue::Undefined(v) => v.len(),
            TypedValue::SShort(v) => v.len(),
            TypedValue::SLong(v) => v.len(),
            TypedValue::SRational(v) => v.len(),
            TypedValue::Float(v) => v.len(),
            TypedValue::Double(v) => v.len(),
        }
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unsigned_units(
    bytes: &[u8],
    width: usize,
    byte_order: ByteOrder,
) -> impl Iterator<Item = u64> + '_ {
    bytes
        .chunks_exact(width)
        .map(move |chunk| byte_order.read_uint(chunk))
}

fn signed_units(
    bytes: &[u8],
    width: usize,
    byte_order: ByteOrder,
) -> impl Iterator<Item = i64> + '_ {
    bytes
        .chunks_exact(width)
        .map(move |chunk| byte_order.read_int(chunk))
}

fn split_ascii(bytes: &[u8]) -> Vec<String> {
    let bytes = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .split(|&b| b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in items.iter().take(PREVIEW_LIMIT).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        item(f, value)?;
    }
    if items.len() > PREVIEW_LIMIT {
        write!(f, ", ... ({} total)", items.len())?;
    }
    write!(f, "]")
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Byte(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::Ascii(v) => write_list(f, v, |f, x| write!(f, "{x:?}")),
            TypedValue::Short(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::Long(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::Rational(v) => write_list(f, v, |f, (n, d)| write!(f, "{n}/{d}")),
            TypedValue::SByte(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::Undefined(v) => {
                let shown = &v[..v.len().min(PREVIEW_LIMIT)];
                write!(f, "0x{}", hex::encode(shown))?;
                if v.len() > PREVIEW_LIMIT {
                    write!(f, "... ({} bytes)", v.len())?;
                }
                Ok(())
            }
            TypedValue::SShort(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::SLong(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::SRational(v) => write_list(f, v, |f, (n, d)| write!(f, "{n}/{d}")),
            TypedValue::Float(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TypedValue::Double(v) => write_list(f, v, |f, x| write!(f, "{x}")),
        }
    }
}

// =============================================================================
// IfdEntry accessors
// =============================================================================

impl IfdEntry {
    /// Interpret the resolved value, if any.
    pub fn typed_value(&self, byte_order: ByteOrder) -> Option<TypedValue> {
        let field_type = self.field_type()?;
        let bytes = self.value.as_ref()?;
        Some(TypedValue::decode(field_type, bytes, byte_order))
    }

    /// Single unsigned value of a BYTE, SHORT or LONG entry.
    ///
    /// Returns `None` if the entry is unresolved, has another type, or holds
    /// more than one value.
    pub fn as_u32(&self, byte_order: ByteOrder) -> Option<u32> {
        if self.count != 1 {
            return None;
        }
        self.as_u32_vec(byte_order)?.first().copied()
    }

    /// All values of a BYTE, SHORT or LONG entry, widened to u32.
    pub fn as_u32_vec(&self, byte_order: ByteOrder) -> Option<Vec<u32>> {
        match self.typed_value(byte_order)? {
            TypedValue::Byte(v) => Some(v.into_iter().map(u32::from).collect()),
            TypedValue::Short(v) => Some(v.into_iter().map(u32::from).collect()),
            TypedValue::Long(v) => Some(v),
            _ => None,
        }
    }

    /// First string of an ASCII entry.
    pub fn as_ascii(&self) -> Option<String> {
        if self.field_type()? != FieldType::Ascii {
            return None;
        }
        let bytes = self.value.as_ref()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

// =============================================================================
// Tests
// =============================================================================
