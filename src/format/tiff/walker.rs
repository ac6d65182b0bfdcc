//! IFD chain traversal.
//!
//! Directories form a singly linked list through their next-IFD pointers. The
//! walker follows that list one directory per step, so a caller can stop
//! between directories. It refuses to revisit a directory and can cap the
//! number of directories it will decode.

use std::collections::HashSet;
use std::iter::FusedIterator;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DecodeError, DecodeLocation, TiffError};
use crate::io::{ByteCursor, ByteSource};

use super::ifd::Ifd;
use super::parser::{ByteOrder, TiffHeader};

/// Default cap on the number of directories in one chain.
pub const DEFAULT_MAX_DIRECTORIES: usize = 1024;

/// Options controlling a decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of directories to decode before failing
    pub max_directories: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_directories: DEFAULT_MAX_DIRECTORIES,
        }
    }
}

/// Complete structural decode of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeResult {
    pub header: TiffHeader,

    /// Directories in chain order
    pub directories: Vec<Ifd>,
}

impl DecodeResult {
    /// Byte order every value in this result was read with.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// Total number of entries across all directories.
    pub fn entry_count(&self) -> usize {
        self.directories.iter().map(|ifd| ifd.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Positioned(u32),
    Done,
    Failed,
}

/// Iterator over the directories of one file.
///
/// Yields each directory as it is decoded. After the first error it yields
/// nothing more.
pub struct IfdChainWalker<S: ByteSource> {
    header: TiffHeader,
    cursor: ByteCursor<S>,
    state: WalkState,
    visited: HashSet<u32>,
    options: DecodeOptions,
}

impl<S: ByteSource> IfdChainWalker<S> {
    /// Decode the header of `source` and position the walker at the first IFD.
    pub fn new(source: S) -> Result<Self, DecodeError> {
        Self::with_options(source, DecodeOptions::default())
    }

    /// Like [`IfdChainWalker::new`] with explicit options.
    pub fn with_options(source: S, options: DecodeOptions) -> Result<Self, DecodeError> {
        let (header, cursor) = TiffHeader::decode(source).map_err(DecodeError::in_header)?;

        let state = if header.first_ifd_offset == 0 {
            warn!(
                source = cursor.source().identifier(),
                "header-only file; no directories to decode"
            );
            WalkState::Done
        } else {
            WalkState::Positioned(header.first_ifd_offset)
        };

        Ok(Self {
            header,
            cursor,
            state,
            visited: HashSet::new(),
            options,
        })
    }

    /// The decoded file header.
    pub fn header(&self) -> &TiffHeader {
        &self.header
    }

    /// Number of directories decoded so far.
    pub fn directories_decoded(&self) -> usize {
        self.visited.len()
    }

    /// Decode a single directory at an arbitrary offset.
    ///
    /// Used to follow pointers the chain does not cover, such as SubIFDs. The
    /// directory's own next pointer is returned but not followed, and the walk
    /// state is unaffected.
    pub fn read_directory_at(&mut self, offset: u32) -> Result<Ifd, DecodeError> {
        if offset % 2 != 0 {
            return Err(DecodeError::new(
                DecodeLocation::Directory { offset },
                TiffError::MisalignedOffset(offset),
            ));
        }
        Ifd::decode(&mut self.cursor, offset)
    }

    /// Drain the remaining chain into a [`DecodeResult`].
    pub fn finish(mut self) -> Result<DecodeResult, DecodeError> {
        let mut directories = Vec::new();
        for ifd in self.by_ref() {
            directories.push(ifd?);
        }

        debug!(
            source = self.cursor.source().identifier(),
            directories = directories.len(),
            "decoded IFD chain"
        );

        Ok(DecodeResult {
            header: self.header,
            directories,
        })
    }

    fn step(&mut self, offset: u32) -> Result<(Ifd, WalkState), DecodeError> {
        let in_directory = |kind| DecodeError::new(DecodeLocation::Directory { offset }, kind);

        if self.visited.len() >= self.options.max_directories {
            return Err(in_directory(TiffError::DirectoryLimitExceeded(
                self.options.max_directories,
            )));
        }

        let ifd = Ifd::decode(&mut self.cursor, offset)?;
        self.visited.insert(offset);

        let next = ifd.next_ifd_offset;
        let state = if next == 0 {
            WalkState::Done
        } else if self.visited.contains(&next) {
            return Err(in_directory(TiffError::CyclicIfdChain {
                from: offset,
                to: next,
            }));
        } else if next % 2 != 0 {
            return Err(in_directory(TiffError::MisalignedOffset(next)));
        } else {
            WalkState::Positioned(next)
        };

        Ok((ifd, state))
    }
}

impl<S: ByteSource> Iterator for IfdChainWalker<S> {
    type Item = Result<Ifd, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let WalkState::Positioned(offset) = self.state else {
            return None;
        };

        match self.step(offset) {
            Ok((ifd, state)) => {
                self.state = state;
                Some(Ok(ifd))
            }
            Err(err) => {
                self.state = WalkState::Failed;
                Some(Err(err))
            }
        }
    }
}

impl<S: ByteSource> FusedIterator for IfdChainWalker<S> {}

/// Decode the header and full IFD chain of `source`.
pub fn decode<S: ByteSource>(source: S) -> Result<DecodeResult, DecodeError> {
    decode_with_options(source, DecodeOptions::default())
}

/// Decode with explicit options.
pub fn decode_with_options<S: ByteSource>(
    source: S,
    options: DecodeOptions,
) -> Result<DecodeResult, DecodeError> {
    IfdChainWalker::with_options(source, options)?.finish()
}

// =============================================================================
// Tests
// =============================================================================
