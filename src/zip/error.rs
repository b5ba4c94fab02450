use std::io;

use thiserror::Error;

/// Errors raised while decoding the ZIP container itself.
///
/// These never involve the destination filesystem; the extractor wraps them
/// into [`ExtractError`](crate::ExtractError) together with the entry index.
#[derive(Debug, Error)]
pub enum FormatError {
    /// No End of Central Directory record was found. Empty buffers and
    /// arbitrary non-ZIP data end up here.
    #[error("not a valid ZIP archive: no end of central directory record")]
    MissingEndOfCentralDirectory,

    /// A record did not start with its expected signature.
    #[error("invalid {0} signature")]
    BadSignature(&'static str),

    /// A record or data range points outside the buffer.
    #[error("{0} extends past the end of the archive")]
    Truncated(&'static str),

    /// A fixed-size record ended before all of its fields were read.
    #[error("truncated record")]
    ShortRead(#[from] io::Error),

    #[error("multi-disk archives are not supported")]
    MultiDisk,

    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u16),

    #[error("encrypted entries are not supported")]
    Encrypted,

    #[error("corrupt deflate stream: {0}")]
    Inflate(#[source] io::Error),

    #[error("size mismatch: expected {expected} bytes, decoded {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("crc32 mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}
