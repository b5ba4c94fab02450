//! Providers of the raw archive bytes handed to the extractor.

mod embedded;
mod http;
mod local;

pub use embedded::EmbeddedSource;
pub use http::HttpSource;
pub use local::LocalFileSource;

use anyhow::Result;
use async_trait::async_trait;

/// Something that can produce a complete archive image in memory.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Load the whole archive image.
    async fn load(&self) -> Result<Vec<u8>>;

    /// Human-readable origin, used in log messages.
    fn describe(&self) -> String;
}

/// Pick a source for a command-line argument: HTTP(S) URLs are downloaded,
/// anything else is a local path, and no argument means the payload appended
/// to the running executable.
pub fn from_arg(arg: Option<&str>) -> Box<dyn ArchiveSource> {
    match arg {
        Some(url) if is_http_url(url) => Box::new(HttpSource::new(url.to_string())),
        Some(path) => Box::new(LocalFileSource::new(path)),
        None => Box::new(EmbeddedSource),
    }
}

pub fn is_http_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}
