//! Configuration for the `dng-inspect` binary.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks:
//!
//! - `DNG_FORMAT` - Output format, `text` or `json` (default: text)
//! - `DNG_MAX_DIRECTORIES` - Maximum IFDs to decode (default: 1024)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use dng_ifd::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! let result = dng_ifd::decode_with_options(&source, config.decode_options())?;
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::format::tiff::{DecodeOptions, DEFAULT_MAX_DIRECTORIES};

// =============================================================================
// CLI Arguments
// =============================================================================

/// How decoded structure is printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per directory and per entry
    #[default]
    Text,

    /// Pretty-printed JSON of the whole decode
    Json,
}

/// dng-inspect - Print the IFD structure of a DNG or TIFF file.
#[derive(Parser, Debug, Clone)]
#[command(name = "dng-inspect")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// File to inspect.
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "DNG_FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of IFDs to follow before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_DIRECTORIES, env = "DNG_MAX_DIRECTORIES")]
    pub max_directories: usize,

    /// Decode files regardless of their extension.
    #[arg(long, default_value_t = false)]
    pub skip_extension_check: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_directories == 0 {
            return Err("max_directories must be greater than 0".to_string());
        }

        if self.path.as_os_str().is_empty() {
            return Err("A file path is required".to_string());
        }

        Ok(())
    }

    /// Decoder options derived from this configuration.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_directories: self.max_directories,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
