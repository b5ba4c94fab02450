use super::ArchiveSource;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Payload appended to the running executable.
///
/// An installer is produced by concatenating the binary and a ZIP file
/// (`cat unbundle payload.zip > setup`). The whole executable image is
/// returned; the archive reader skips the executable in front of the
/// archive on its own.
pub struct EmbeddedSource;

#[async_trait]
impl ArchiveSource for EmbeddedSource {
    async fn load(&self) -> Result<Vec<u8>> {
        let exe = std::env::current_exe().context("failed to locate the running executable")?;
        tokio::fs::read(&exe)
            .await
            .with_context(|| format!("failed to read {}", exe.display()))
    }

    fn describe(&self) -> String {
        "embedded payload".to_string()
    }
}
