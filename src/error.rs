//! Error types for archive extraction.
//!
//! Every variant is fatal to the [`extract`](crate::extract) call that
//! produced it. Nothing is retried and nothing already written is rolled
//! back; the caller decides how to report the failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::zip::FormatError;

/// Errors that stop an extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The destination root, an archived directory, or the parent of an
    /// archived file could not be created and did not already exist as a
    /// directory.
    #[error("failed to create directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The buffer is not a parsable archive.
    #[error("failed to open archive: {0}")]
    ArchiveOpen(#[source] FormatError),

    /// The archive opened but the central directory record at `index` is
    /// unreadable.
    #[error("failed to read metadata of entry {index}: {source}")]
    EntryStat {
        index: usize,
        #[source]
        source: FormatError,
    },

    /// The entry's metadata was readable but its contents could not be
    /// decoded or written.
    #[error("failed to extract entry {index} to {path:?}: {source}")]
    EntryExtract {
        index: usize,
        path: PathBuf,
        #[source]
        source: EntryFailure,
    },

    /// The entry name would escape the destination root. Only raised when
    /// path containment is enabled in [`ExtractOptions`](crate::ExtractOptions).
    #[error("entry {index} has an unsafe path: {name}")]
    UnsafePath { index: usize, name: String },
}

impl ExtractError {
    /// Operating system error code behind the failure, when there is one.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            ExtractError::DirectoryCreation { source, .. } => source.raw_os_error(),
            ExtractError::EntryExtract {
                source: EntryFailure::Io(source),
                ..
            } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Index of the entry being processed, if the failure is tied to one.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            ExtractError::EntryStat { index, .. }
            | ExtractError::EntryExtract { index, .. }
            | ExtractError::UnsafePath { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Why a single entry could not be materialized.
#[derive(Debug, Error)]
pub enum EntryFailure {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}
