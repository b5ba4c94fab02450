//! # unbundle
//!
//! Core of a self-extracting installer: unpack a ZIP image held in memory
//! into a destination directory.
//!
//! The archive bytes can come from anywhere: a local file, an HTTP(S) URL,
//! or the payload appended to the installer executable itself. Extraction
//! is synchronous, recreates the archive's directory tree on demand, and
//! stops at the first failure with a typed [`ExtractError`].
//!
//! ## Features
//!
//! - Extract ZIP images from memory, including ones preceded by a stub
//! - Support for ZIP64 format (archives larger than 4GB)
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - CRC-32 verification of every extracted file
//! - Optional rejection of entries that would escape the destination
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use unbundle::{ExtractOptions, ZipExtractor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let archive = std::fs::read("payload.zip")?;
//!
//!     // One-shot extraction with default options
//!     unbundle::extract(&archive, "out")?;
//!
//!     // Or with path containment enabled
//!     let options = ExtractOptions {
//!         reject_unsafe_paths: true,
//!         ..ExtractOptions::default()
//!     };
//!     ZipExtractor::new()
//!         .options(options)
//!         .extract(&archive, Path::new("out"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod logging;
pub mod source;
pub mod zip;

pub use cli::Cli;
pub use error::{EntryFailure, ExtractError};
pub use logging::{LogConfig, Reporter, TracingReporter};
pub use source::{ArchiveSource, EmbeddedSource, HttpSource, LocalFileSource};
pub use self::zip::{ExtractOptions, ZipArchive, ZipExtractor, ZipFileEntry, extract};
