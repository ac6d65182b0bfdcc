//! Image File Directory decoding.
//!
//! ```text
//! Bytes 0-1:           Entry count N (N >= 1)
//! Bytes 2..2+12N:      N entries, 12 bytes each
//! Bytes 2+12N..6+12N:  Offset of the next IFD (0 = last)
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DecodeError, DecodeLocation, TiffError};
use crate::io::{ByteCursor, ByteSource};

use super::entry::IfdEntry;
use super::tags::{EntryType, TiffTag};
use super::values::ValueResolver;

/// A decoded Image File Directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ifd {
    /// Absolute offset this directory was read from
    pub offset: u32,

    /// Entries in file order
    pub entries: Vec<IfdEntry>,

    /// Offset of the next directory; 0 marks the last one
    pub next_ifd_offset: u32,
}

impl Ifd {
    /// Decode the directory at `offset`, resolving every entry's value.
    ///
    /// The cursor is left just after the next-IFD pointer.
    pub fn decode<S: ByteSource>(
        cursor: &mut ByteCursor<S>,
        offset: u32,
    ) -> Result<Self, DecodeError> {
        let in_directory = |kind| DecodeError::new(DecodeLocation::Directory { offset }, kind);

        cursor.seek(offset).map_err(in_directory)?;
        let count = cursor.read_u16().map_err(in_directory)?;
        if count == 0 {
            return Err(in_directory(TiffError::EmptyDirectory(offset)));
        }

        let mut entries = Vec::with_capacity(usize::from(count));
        let mut sorted = true;

        for index in 0..usize::from(count) {
            let mut entry = IfdEntry::decode(cursor).map_err(|kind| {
                let tag = match kind {
                    TiffError::InvalidValueCount { tag, .. } => Some(tag),
                    _ => None,
                };
                DecodeError::new(
                    DecodeLocation::Entry {
                        directory_offset: offset,
                        index,
                        tag,
                    },
                    kind,
                )
            })?;

            if let EntryType::Unknown(code) = entry.entry_type {
                warn!(
                    directory = offset,
                    tag = entry.tag,
                    field_type = code,
                    "skipping value of entry with unknown field type"
                );
            }

            ValueResolver::new(cursor)
                .resolve_into(&mut entry)
                .map_err(|kind| {
                    DecodeError::new(
                        DecodeLocation::Entry {
                            directory_offset: offset,
                            index,
                            tag: Some(entry.tag),
                        },
                        kind,
                    )
                })?;

            if let Some(previous) = entries.last().map(|e: &IfdEntry| e.tag) {
                sorted &= previous < entry.tag;
            }
            entries.push(entry);
        }

        if !sorted {
            warn!(directory = offset, "IFD entries are not in ascending tag order");
        }

        let next_ifd_offset = cursor.read_u32().map_err(in_directory)?;

        debug!(
            offset,
            entries = entries.len(),
            next_ifd_offset,
            "decoded IFD"
        );

        Ok(Self {
            offset,
            entries,
            next_ifd_offset,
        })
    }

    /// Find the first entry with the given tag ID.
    pub fn get_entry(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Find an entry by named tag.
    pub fn get_entry_by_tag(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.get_entry(tag.as_u16())
    }

    /// Whether this is the last directory in its chain.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next_ifd_offset == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
