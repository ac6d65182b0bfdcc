//! Test utilities for integration tests.
//!
//! This module provides a read-tracking byte source and a builder for test TIFF
//! files with arbitrary directory chains.

use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dng_ifd::error::IoError;
use dng_ifd::io::ByteSource;

// =============================================================================
// Byte Source with Read Tracking
// =============================================================================

/// A byte source that records every read request.
///
/// Used to check how far into a file the decoder got before failing.
pub struct TrackingSource {
    data: Bytes,
    identifier: String,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(u64, usize)>>>,
}

impl TrackingSource {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> Vec<(u64, usize)> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest byte offset any request reached (exclusive).
    pub fn high_water_mark(&self) -> u64 {
        self.get_requests()
            .iter()
            .map(|&(offset, len)| offset + len as u64)
            .max()
            .unwrap_or(0)
    }
}

impl ByteSource for TrackingSource {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((offset, len));

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// TIFF Builder
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// Builds classic TIFF files.
///
/// Layout: 8-byte header, then each IFD followed by its out-of-line values,
/// every block starting on an even offset. The first IFD is always at 8.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    first_ifd_offset: Option<u32>,
    ifds: Vec<IfdBuilder>,
}

/// Where an IFD's next pointer goes.
#[derive(Clone, Copy, Debug)]
enum NextLink {
    /// Following IFD in the builder, or 0 for the last one
    Auto,
    /// IFD at this builder index
    Index(usize),
    /// Literal offset
    Offset(u32),
}

/// The output of [`TiffBuilder::build_with_layout`].
pub struct BuiltTiff {
    pub data: Vec<u8>,
    pub ifd_offsets: Vec<u32>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            first_ifd_offset: None,
            ifds: Vec::new(),
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    /// Write this value as the first IFD offset instead of 8.
    pub fn with_first_ifd_offset(mut self, offset: u32) -> Self {
        self.first_ifd_offset = Some(offset);
        self
    }

    pub fn add_ifd(mut self, ifd: IfdBuilder) -> Self {
        self.ifds.push(ifd);
        self
    }

    /// Build the TIFF file data.
    pub fn build(self) -> Vec<u8> {
        self.build_with_layout().data
    }

    /// Build the file and report where each IFD was placed.
    pub fn build_with_layout(self) -> BuiltTiff {
        let order = self.byte_order;

        // First pass: encode values and place every IFD.
        let mut ifd_offsets = Vec::with_capacity(self.ifds.len());
        let mut encoded: Vec<Vec<EncodedEntry>> = Vec::with_capacity(self.ifds.len());
        let mut cursor = 8usize;
        for ifd in &self.ifds {
            ifd_offsets.push(cursor as u32);
            let entries: Vec<EncodedEntry> = ifd.entries.iter().map(|e| e.encode(order)).collect();
            cursor += 2 + 12 * entries.len() + 4;
            cursor = align(cursor);
            for entry in &entries {
                if let Field::External(bytes) = &entry.field {
                    cursor = align(cursor + bytes.len());
                }
            }
            encoded.push(entries);
        }

        // Second pass: write.
        let mut data = Vec::with_capacity(cursor);
        data.extend_from_slice(match order {
            ByteOrderType::LittleEndian => b"II",
            ByteOrderType::BigEndian => b"MM",
        });
        write_uint(&mut data, order, 42, 2);
        let first = self
            .first_ifd_offset
            .unwrap_or_else(|| ifd_offsets.first().copied().unwrap_or(0));
        write_uint(&mut data, order, first as u64, 4);

        for (idx, (ifd, entries)) in self.ifds.iter().zip(&encoded).enumerate() {
            debug_assert_eq!(data.len(), ifd_offsets[idx] as usize);

            let table_end = align(data.len() + 2 + 12 * entries.len() + 4);
            let mut external_offset = table_end;
            let mut external = Vec::new();

            write_uint(&mut data, order, entries.len() as u64, 2);
            for entry in entries {
                write_uint(&mut data, order, entry.tag as u64, 2);
                write_uint(&mut data, order, entry.field_type as u64, 2);
                write_uint(&mut data, order, entry.count as u64, 4);
                match &entry.field {
                    Field::Inline(field) => data.extend_from_slice(field),
                    Field::External(bytes) => {
                        write_uint(&mut data, order, external_offset as u64, 4);
                        external.extend_from_slice(bytes);
                        if external.len() % 2 != 0 {
                            external.push(0);
                        }
                        external_offset = table_end + external.len();
                    }
                }
            }

            let next = match ifd.next {
                NextLink::Auto => ifd_offsets.get(idx + 1).copied().unwrap_or(0),
                NextLink::Index(target) => ifd_offsets[target],
                NextLink::Offset(offset) => offset,
            };
            write_uint(&mut data, order, next as u64, 4);

            while data.len() < table_end {
                data.push(0);
            }
            data.extend_from_slice(&external);
        }

        BuiltTiff { data, ifd_offsets }
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one IFD.
pub struct IfdBuilder {
    entries: Vec<PendingEntry>,
    next: NextLink,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: NextLink::Auto,
        }
    }

    /// SHORT values.
    pub fn short(mut self, tag: u16, values: &[u16]) -> Self {
        let values = values.iter().map(|&v| v as u64).collect();
        self.entries.push(PendingEntry::numbers(tag, 3, 2, values));
        self
    }

    /// LONG values.
    pub fn long(mut self, tag: u16, values: &[u32]) -> Self {
        let values = values.iter().map(|&v| v as u64).collect();
        self.entries.push(PendingEntry::numbers(tag, 4, 4, values));
        self
    }

    /// RATIONAL values as `(numerator, denominator)`.
    pub fn rational(mut self, tag: u16, values: &[(u32, u32)]) -> Self {
        let values = values
            .iter()
            .flat_map(|&(n, d)| [n as u64, d as u64])
            .collect::<Vec<_>>();
        let count = (values.len() / 2) as u32;
        self.entries.push(PendingEntry {
            tag,
            field_type: 5,
            count,
            payload: Payload::Numbers { width: 4, values },
        });
        self
    }

    /// NUL-terminated ASCII string.
    pub fn ascii(mut self, tag: u16, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.entries.push(PendingEntry {
            tag,
            field_type: 2,
            count: bytes.len() as u32,
            payload: Payload::Bytes(bytes),
        });
        self
    }

    /// Value bytes already laid out in file order.
    pub fn bytes(mut self, tag: u16, field_type: u16, count: u32, bytes: Vec<u8>) -> Self {
        self.entries.push(PendingEntry {
            tag,
            field_type,
            count,
            payload: Payload::Bytes(bytes),
        });
        self
    }

    /// Entry with a literal 4-byte value field and nothing written elsewhere.
    pub fn raw(mut self, tag: u16, field_type: u16, count: u32, field: [u8; 4]) -> Self {
        self.entries.push(PendingEntry {
            tag,
            field_type,
            count,
            payload: Payload::Field(field),
        });
        self
    }

    /// Point this IFD's next pointer at the IFD with the given builder index.
    pub fn next_ifd(mut self, index: usize) -> Self {
        self.next = NextLink::Index(index);
        self
    }

    /// Write a literal next-IFD offset.
    pub fn next_offset(mut self, offset: u32) -> Self {
        self.next = NextLink::Offset(offset);
        self
    }
}

impl Default for IfdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct PendingEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    payload: Payload,
}

enum Payload {
    Numbers { width: usize, values: Vec<u64> },
    Bytes(Vec<u8>),
    Field([u8; 4]),
}

struct EncodedEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    field: Field,
}

enum Field {
    Inline([u8; 4]),
    External(Vec<u8>),
}

impl PendingEntry {
    fn numbers(tag: u16, field_type: u16, width: usize, values: Vec<u64>) -> Self {
        Self {
            tag,
            field_type,
            count: values.len() as u32,
            payload: Payload::Numbers { width, values },
        }
    }

    fn encode(&self, order: ByteOrderType) -> EncodedEntry {
        let bytes = match &self.payload {
            Payload::Numbers { width, values } => {
                let mut out = Vec::new();
                for &value in values {
                    write_uint(&mut out, order, value, *width);
                }
                out
            }
            Payload::Bytes(bytes) => bytes.clone(),
            Payload::Field(field) => {
                return EncodedEntry {
                    tag: self.tag,
                    field_type: self.field_type,
                    count: self.count,
                    field: Field::Inline(*field),
                }
            }
        };

        let field = if bytes.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            Field::Inline(inline)
        } else {
            Field::External(bytes)
        };

        EncodedEntry {
            tag: self.tag,
            field_type: self.field_type,
            count: self.count,
            field,
        }
    }
}

fn align(offset: usize) -> usize {
    offset + (offset % 2)
}

pub fn write_uint(data: &mut Vec<u8>, byte_order: ByteOrderType, value: u64, size: usize) {
    match byte_order {
        ByteOrderType::LittleEndian => data.extend_from_slice(&value.to_le_bytes()[..size]),
        ByteOrderType::BigEndian => data.extend_from_slice(&value.to_be_bytes()[8 - size..]),
    }
}

/// Width of each of the 12 standard field types, by code.
pub fn field_type_width(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 6 | 7 => 1,
        3 | 8 => 2,
        4 | 9 | 11 => 4,
        5 | 10 | 12 => 8,
        _ => panic!("not a standard field type: {field_type}"),
    }
}

/// Check if data starts with a classic TIFF signature.
pub fn is_tiff_magic(data: &[u8]) -> bool {
    data.len() >= 4 && (data.starts_with(b"II*\0") || data.starts_with(b"MM\0*"))
}
