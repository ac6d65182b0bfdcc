//! dng-inspect - Print the IFD structure of a DNG or TIFF file.
//!
//! Loads the file, decodes its header and IFD chain, and prints every entry.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dng_ifd::{
    check_extension, check_signature, decode_with_options, detect_format, tag_name, Config,
    ContainerFormat, DecodeResult, FormatError, Ifd, IfdEntry, MemorySource, OutputFormat,
};

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}: {}", config.path.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), FormatError> {
    if !config.skip_extension_check {
        check_extension(&config.path)?;
    }

    let source = MemorySource::from_path(&config.path)?;
    info!(
        path = %config.path.display(),
        bytes = source.as_bytes().len(),
        "loaded file"
    );

    check_signature(&source)?;

    let result = decode_with_options(&source, config.decode_options())?;

    match config.format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    }

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_text(result: &DecodeResult) {
    let format = detect_format(result);
    match format {
        ContainerFormat::Dng { version } => println!(
            "{} {}.{}.{}.{} ({:?})",
            format.name(),
            version[0],
            version[1],
            version[2],
            version[3],
            result.byte_order()
        ),
        ContainerFormat::Tiff => println!("{} ({:?})", format.name(), result.byte_order()),
    }

    for (index, ifd) in result.directories.iter().enumerate() {
        print_directory(index, ifd, result);
    }
}

fn print_directory(index: usize, ifd: &Ifd, result: &DecodeResult) {
    println!(
        "IFD {} at offset {}: {} entries, next {}",
        index,
        ifd.offset,
        ifd.entries.len(),
        ifd.next_ifd_offset
    );
    for entry in &ifd.entries {
        println!("  {}", describe_entry(entry, result));
    }
}

fn describe_entry(entry: &IfdEntry, result: &DecodeResult) -> String {
    let name = tag_name(entry.tag).unwrap_or("?");
    let type_name = match entry.field_type() {
        Some(field_type) => field_type.name().to_string(),
        None => format!("type {}", entry.entry_type.as_u16()),
    };
    let value = match entry.typed_value(result.byte_order()) {
        Some(value) => value.to_string(),
        None => "(skipped)".to_string(),
    };
    format!(
        "{:5} {:<26} {:<9} x{:<6} {}",
        entry.tag, name, type_name, entry.count, value
    )
}

fn print_json(result: &DecodeResult) -> Result<(), FormatError> {
    let json =
        serde_json::to_string_pretty(result).map_err(|e| FormatError::Output(e.to_string()))?;
    println!("{json}");
    Ok(())
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dng_ifd=debug,dng_inspect=debug"
    } else {
        "dng_ifd=warn,dng_inspect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
