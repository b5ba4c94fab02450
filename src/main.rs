//! Main entry point for the unbundle installer.
//!
//! Loads the archive from the chosen source and either lists it or extracts
//! it into the destination directory.

use anyhow::{Context, Result};
use clap::Parser;

use unbundle::{Cli, ZipArchive, ZipExtractor, logging, source};

/// Application entry point.
///
/// Configures logging, loads the archive bytes and dispatches to listing or
/// extraction.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_config())?;

    tracing::info!("unbundle {}", env!("CARGO_PKG_VERSION"));
    for arg in std::env::args() {
        tracing::info!("Argument: {}", arg);
    }

    let source = source::from_arg(cli.source.as_deref());
    let archive = source.load().await?;
    tracing::info!(
        "loaded {} from {}",
        format_size(archive.len() as u64),
        source.describe()
    );

    if cli.is_list_mode() {
        return list_files(&archive, cli.verbose);
    }

    let destination = cli.extract_dir.clone();
    let options = cli.extract_options();
    tokio::task::spawn_blocking(move || {
        ZipExtractor::new()
            .options(options)
            .extract(&archive, &destination)
    })
    .await
    .context("extraction task panicked")??;

    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(archive: &[u8], verbose: bool) -> Result<()> {
    let archive = ZipArchive::new(archive).context("failed to open archive")?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for (index, entry) in archive.entries().enumerate() {
        let entry = entry.with_context(|| format!("failed to read entry {index}"))?;

        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        // Directories do not count towards the totals
        if !entry.is_directory {
            total_uncompressed = total_uncompressed.saturating_add(entry.uncompressed_size);
            total_compressed = total_compressed.saturating_add(entry.compressed_size);
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }

    Ok(())
}

/// Compression ratio as percentage saved.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 {
        let kept = i128::from(compressed) * 100 / i128::from(uncompressed);
        format!("{:>4}%", 100 - kept)
    } else {
        "  0%".to_string()
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
