use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a finite, randomly addressable resource.
///
/// The decoder only ever asks for exact ranges; it never streams. Implementations
/// must be thread-safe so that independent decode sessions can run in parallel
/// over their own sources.
pub trait ByteSource: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    fn identifier(&self) -> &str;
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        (**self).read_exact_at(offset, len)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

/// In-memory byte source.
///
/// Reads are zero-copy slices of the underlying buffer, so resolved field values
/// share storage with the source.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    identifier: String,
}

impl MemorySource {
    /// Wrap a buffer.
    pub fn new(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }

    /// Load a whole file into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| IoError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::new(data, display))
    }

    /// Borrow the underlying bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let out_of_bounds = || IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size: self.data.len() as u64,
        };

        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        if end > self.data.len() {
            return Err(out_of_bounds());
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
