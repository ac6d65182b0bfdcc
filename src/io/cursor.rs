//! Endian-aware cursor over a [`ByteSource`].
//!
//! The cursor is the only component that tracks a read position. Its byte order
//! is fixed at construction, which happens right after the header's byte-order
//! marker has been read, so every decode session carries its own order and no
//! state is shared between sessions.
//!
//! Positions live in the 32-bit offset space of classic TIFF. Any position
//! arithmetic that would leave that space is reported as
//! [`TiffError::OffsetArithmeticOverflow`] rather than wrapped.

use bytes::Bytes;

use crate::error::TiffError;
use crate::format::tiff::ByteOrder;

use super::source::ByteSource;

macro_rules! read_fn {
    ($name:ident, $type:ty, $via:ident) => {
        #[doc = concat!("Read a `", stringify!($type), "` in the session byte order.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$type, TiffError> {
            Ok(self.$via(std::mem::size_of::<$type>())? as $type)
        }
    };
}

/// Position-tracking reader with a fixed byte order.
#[derive(Debug)]
pub struct ByteCursor<S: ByteSource> {
    source: S,
    byte_order: ByteOrder,
    position: u32,
}

impl<S: ByteSource> ByteCursor<S> {
    /// Create a cursor at position 0.
    pub fn new(source: S, byte_order: ByteOrder) -> Self {
        Self {
            source,
            byte_order,
            position: 0,
        }
    }

    /// Byte order used for every multi-byte read.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Current absolute offset.
    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Total length of the underlying source.
    #[inline]
    pub fn len(&self) -> u64 {
        self.source.size()
    }

    /// Whether the underlying source is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Move to an absolute position without reading.
    ///
    /// Seeking to exactly the end of the source is allowed; nothing can be
    /// read from there.
    pub fn seek(&mut self, position: u32) -> Result<(), TiffError> {
        let size = self.source.size();
        if u64::from(position) > size {
            return Err(TiffError::OutOfBounds {
                offset: u64::from(position),
                requested: 0,
                size,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Read exactly `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, TiffError> {
        let end = self.checked_end(len)?;
        let bytes = self.source.read_exact_at(u64::from(self.position), len)?;
        self.position = end;
        Ok(bytes)
    }

    /// Read an unsigned integer of `width` bytes (1, 2, 4 or 8).
    ///
    /// Any other width fails with `UnsupportedWidth` before reading.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, TiffError> {
        check_width(width)?;
        let bytes = self.read_bytes(width)?;
        Ok(self.byte_order.read_uint(&bytes))
    }

    /// Read a signed integer of `width` bytes (1, 2, 4 or 8), sign-extended.
    pub fn read_int(&mut self, width: usize) -> Result<i64, TiffError> {
        check_width(width)?;
        let bytes = self.read_bytes(width)?;
        Ok(self.byte_order.read_int(&bytes))
    }

    read_fn!(read_u8, u8, read_uint);
    read_fn!(read_u16, u16, read_uint);
    read_fn!(read_u32, u32, read_uint);
    read_fn!(read_u64, u64, read_uint);
    read_fn!(read_i8, i8, read_int);
    read_fn!(read_i16, i16, read_int);
    read_fn!(read_i32, i32, read_int);
    read_fn!(read_i64, i64, read_int);

    /// Run `f` and put the cursor back where it was, whether `f` succeeded or not.
    pub fn with_saved_position<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TiffError>,
    ) -> Result<T, TiffError> {
        let saved = self.position;
        let result = f(self);
        self.position = saved;
        result
    }

    fn checked_end(&self, len: usize) -> Result<u32, TiffError> {
        let overflow = TiffError::OffsetArithmeticOverflow {
            base: u64::from(self.position),
            length: len as u64,
        };
        let len = u32::try_from(len).map_err(|_| overflow.clone())?;
        self.position.checked_add(len).ok_or(overflow)
    }
}

fn check_width(width: usize) -> Result<(), TiffError> {
    match width {
        1 | 2 | 4 | 8 => Ok(()),
        _ => Err(TiffError::UnsupportedWidth(width)),
    }
}
