//! Format detection for TIFF-family files.
//!
//! Detection happens at two levels:
//!
//! - **Before decoding**: the file extension and the 4-byte signature tell
//!   whether a file is worth decoding at all.
//! - **After decoding**: a DNG is a TIFF whose first IFD carries a DNGVersion
//!   entry. Anything else is reported as plain TIFF.

use std::path::Path;

use crate::error::FormatError;
use crate::io::ByteSource;

use super::tiff::{ByteOrder, DecodeResult, FieldType, TiffTag, TIFF_MAGIC};

// =============================================================================
// ContainerFormat
// =============================================================================

/// Detected container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Digital Negative, with its four-part version number
    Dng { version: [u8; 4] },

    /// TIFF without DNG identification
    Tiff,
}

impl ContainerFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            ContainerFormat::Dng { .. } => "DNG",
            ContainerFormat::Tiff => "TIFF",
        }
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// File extensions accepted by [`check_extension`], lowercase.
const SUPPORTED_EXTENSIONS: &[&str] = &["dng", "tif", "tiff"];

/// Classify a decoded file.
///
/// A DNGVersion entry in the first IFD marks the file as DNG. The entry must
/// be four BYTEs; a malformed one is ignored.
pub fn detect_format(result: &DecodeResult) -> ContainerFormat {
    let version = result
        .directories
        .first()
        .and_then(|ifd| ifd.get_entry_by_tag(TiffTag::DNGVersion))
        .filter(|entry| entry.field_type() == Some(FieldType::Byte) && entry.count == 4)
        .and_then(|entry| entry.value.as_deref())
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok());

    match version {
        Some(version) => ContainerFormat::Dng { version },
        None => ContainerFormat::Tiff,
    }
}

/// Whether the path has a `.dng`, `.tif` or `.tiff` extension, ignoring case.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Reject paths without a supported extension.
pub fn check_extension(path: &Path) -> Result<(), FormatError> {
    if has_supported_extension(path) {
        Ok(())
    } else {
        Err(FormatError::UnsupportedFormat {
            reason: format!(
                "{} does not have a .dng, .tif or .tiff extension",
                path.display()
            ),
        })
    }
}

/// Check if bytes start with a classic TIFF signature.
///
/// This is a quick check that can be used before attempting full decoding.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }

    let byte_order = match ByteOrder::from_marker([bytes[0], bytes[1]]) {
        Some(order) => order,
        None => return false,
    };

    byte_order.read_u16(&bytes[2..4]) == TIFF_MAGIC
}

/// Reject sources that do not start with a classic TIFF signature.
///
/// Reads at most the first 4 bytes.
pub fn check_signature<S: ByteSource>(source: &S) -> Result<(), FormatError> {
    let len = source.size().min(4) as usize;
    let head = source.read_exact_at(0, len)?;
    if is_tiff_header(&head) {
        Ok(())
    } else {
        Err(FormatError::UnsupportedFormat {
            reason: format!("{} does not start with a TIFF signature", source.identifier()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
