//! Container formats.
//!
//! [`tiff`] holds the structural decoder. [`detect`] holds the checks used
//! around it: signature sniffing, the file extension filter, and telling DNG
//! apart from plain TIFF once a file is decoded.

pub mod detect;
pub mod tiff;

pub use detect::{
    check_extension, check_signature, detect_format, has_supported_extension, is_tiff_header,
    ContainerFormat,
};
