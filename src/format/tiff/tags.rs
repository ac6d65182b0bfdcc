//! TIFF field type and tag definitions.
//!
//! This module defines the vocabulary for structural decoding:
//! - Field types, which fix the byte width of every value unit
//! - Tag IDs, used only to label entries for display
//!
//! The decoder never interprets a tag. What a tag's bytes mean is up to the
//! caller; [`TiffTag`] exists so that tools can print a readable name.

use serde::Serialize;

// =============================================================================
// TIFF Field Types
// =============================================================================

/// The 12 standard TIFF field types.
///
/// Each field type has a fixed size in bytes, which decides:
/// - Whether an entry's value fits inline in its 4-byte value field
/// - How many bytes an out-of-line value occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte = 1,
    /// 8-bit character, NUL terminated
    Ascii = 2,
    /// Unsigned 16-bit integer
    Short = 3,
    /// Unsigned 32-bit integer
    Long = 4,
    /// Two Longs: numerator, denominator
    Rational = 5,
    /// Signed 8-bit integer
    SByte = 6,
    /// Opaque byte
    Undefined = 7,
    /// Signed 16-bit integer
    SShort = 8,
    /// Signed 32-bit integer
    SLong = 9,
    /// Two SLongs: numerator, denominator
    SRational = 10,
    /// IEEE single precision
    Float = 11,
    /// IEEE double precision
    Double = 12,
}

/// Wire codes are 1-based; slot `i` describes code `i + 1`.
const FIELD_TYPE_TABLE: [(FieldType, usize); 12] = [
    (FieldType::Byte, 1),
    (FieldType::Ascii, 1),
    (FieldType::Short, 2),
    (FieldType::Long, 4),
    (FieldType::Rational, 8),
    (FieldType::SByte, 1),
    (FieldType::Undefined, 1),
    (FieldType::SShort, 2),
    (FieldType::SLong, 4),
    (FieldType::SRational, 8),
    (FieldType::Float, 4),
    (FieldType::Double, 8),
];

impl FieldType {
    /// Maximum number of bytes stored directly in an entry's value field.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Look up a wire type code.
    ///
    /// Returns `None` for codes outside `1..=12`.
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::lookup(code).map(|(field_type, _)| field_type)
    }

    /// Look up a wire type code together with its unit width.
    pub fn lookup(code: u16) -> Option<(Self, usize)> {
        let index = usize::from(code).checked_sub(1)?;
        FIELD_TYPE_TABLE.get(index).copied()
    }

    /// Wire type code.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        FIELD_TYPE_TABLE[self as usize - 1].1
    }

    /// Total size of `count` values, or `None` if it leaves the 32-bit offset space.
    #[inline]
    pub fn value_byte_size(self, count: u32) -> Option<u32> {
        (self.size_in_bytes() as u32).checked_mul(count)
    }

    /// Whether `count` values of this type are stored inline.
    ///
    /// A count whose total size overflows never fits.
    #[inline]
    pub fn fits_inline(self, count: u32) -> bool {
        self.value_byte_size(count)
            .map_or(false, |size| size as usize <= Self::INLINE_THRESHOLD)
    }

    /// Short display name, as used in the TIFF specification.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
        }
    }
}

/// Declared type of a directory entry.
///
/// Codes outside the standard table are kept as `Unknown` so that files using
/// newer type codes still decode; such entries are skipped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntryType {
    Known(FieldType),
    Unknown(u16),
}

impl EntryType {
    /// Classify a wire type code.
    pub fn from_u16(code: u16) -> Self {
        match FieldType::from_u16(code) {
            Some(field_type) => EntryType::Known(field_type),
            None => EntryType::Unknown(code),
        }
    }

    /// The field type, if recognized.
    #[inline]
    pub fn field_type(self) -> Option<FieldType> {
        match self {
            EntryType::Known(field_type) => Some(field_type),
            EntryType::Unknown(_) => None,
        }
    }

    /// Wire type code.
    #[inline]
    pub fn as_u16(self) -> u16 {
        match self {
            EntryType::Known(field_type) => field_type.as_u16(),
            EntryType::Unknown(code) => code,
        }
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

macro_rules! tiff_tags {
    ($($(#[$attr:meta])* $tag:ident = $val:literal,)*) => {
        /// Tag IDs with a known name.
        ///
        /// Covers baseline TIFF and the DNG identification tags. Used for
        /// labelling output; anything not listed is still decoded.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum TiffTag {
            $($(#[$attr])* $tag = $val,)*
        }

        impl TiffTag {
            /// Create a TiffTag from its numeric value.
            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $($val => Some(TiffTag::$tag),)*
                    _ => None,
                }
            }

            /// Tag name as written in the TIFF and DNG specifications.
            pub const fn name(self) -> &'static str {
                match self {
                    $(TiffTag::$tag => stringify!($tag),)*
                }
            }
        }
    };
}

tiff_tags! {
    NewSubfileType = 254,
    SubfileType = 255,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    Thresholding = 263,
    CellWidth = 264,
    CellLength = 265,
    FillOrder = 266,
    ImageDescription = 270,
    Make = 271,
    Model = 272,
    StripOffsets = 273,
    Orientation = 274,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    MinSampleValue = 280,
    MaxSampleValue = 281,
    XResolution = 282,
    YResolution = 283,
    PlanarConfiguration = 284,
    FreeOffsets = 288,
    FreeByteCounts = 289,
    GrayResponseUnit = 290,
    GrayResponseCurve = 291,
    ResolutionUnit = 296,
    Software = 305,
    DateTime = 306,
    Artist = 315,
    HostComputer = 316,
    ColorMap = 320,
    /// Offsets of child IFDs; DNG stores the raw image here
    SubIFDs = 330,
    ExtraSamples = 338,
    Copyright = 33432,
    /// Offset of the Exif IFD
    ExifIFD = 34665,
    DNGVersion = 50706,
    DNGBackwardVersion = 50707,
    UniqueCameraModel = 50708,
}

impl TiffTag {
    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Name of a tag ID, if known.
pub fn tag_name(tag: u16) -> Option<&'static str> {
    TiffTag::from_u16(tag).map(TiffTag::name)
}

// =============================================================================
// Tests
// =============================================================================
