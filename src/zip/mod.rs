//! ZIP archive parsing and extraction.
//!
//! This module reads ZIP images held in memory and materializes them on
//! disk, supporting both the standard format and ZIP64 extensions.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Parsing of ZIP structures from a borrowed buffer
//! - [`extractor`]: Tree reconstruction under a destination directory
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Sizes and checksums are always taken from the Central Directory, so
//! entries written with trailing data descriptors need no special handling.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) and DEFLATE methods, CRC-32 verified
//! - Archives preceded by arbitrary data (self-extracting stubs)
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod error;
mod extractor;
mod parser;
mod structures;

pub use error::FormatError;
pub use extractor::{ExtractOptions, ZipExtractor, extract};
pub use parser::{Entries, ZipArchive};
pub use structures::*;
