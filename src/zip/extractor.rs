use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{EntryFailure, ExtractError};
use crate::logging::{Reporter, TracingReporter};

use super::parser::ZipArchive;
use super::structures::ZipFileEntry;

/// Knobs for [`ZipExtractor`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Fail with [`ExtractError::UnsafePath`] on entries that would escape
    /// the destination (`..` segments, absolute names, drive prefixes).
    pub reject_unsafe_paths: bool,
    /// Apply Unix permission bits recorded in the archive (Unix only).
    pub preserve_permissions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            reject_unsafe_paths: false,
            preserve_permissions: true,
        }
    }
}

/// Unpacks an in-memory ZIP image under a destination directory.
///
/// Extraction is linear and stops at the first failure. Entries written
/// before the failure are left on disk.
pub struct ZipExtractor<R: Reporter = TracingReporter> {
    reporter: R,
    options: ExtractOptions,
}

impl ZipExtractor {
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }
}

impl Default for ZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reporter> ZipExtractor<R> {
    pub fn with_reporter(reporter: R) -> Self {
        Self {
            reporter,
            options: ExtractOptions::default(),
        }
    }

    pub fn options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Reconstruct the archive's tree under `destination`.
    ///
    /// The destination is created first; parents of every entry are created
    /// on demand, whatever order the archive lists them in. Existing files
    /// are truncated and overwritten, unrelated files are left alone.
    ///
    /// # Errors
    ///
    /// See [`ExtractError`]. The archive is not touched at all if the
    /// destination cannot be created.
    pub fn extract(&self, archive: &[u8], destination: &Path) -> Result<(), ExtractError> {
        self.reporter
            .info(&format!("extracting archive to {}", destination.display()));

        create_dir(destination).map_err(|e| self.fail(e))?;

        let archive = ZipArchive::new(archive).map_err(|e| self.fail(ExtractError::ArchiveOpen(e)))?;
        self.reporter
            .debug(&format!("archive contains {} entries", archive.len()));

        for (index, entry) in archive.entries().enumerate() {
            let entry = entry.map_err(|source| self.fail(ExtractError::EntryStat { index, source }))?;
            self.reporter.debug(&format!(
                "\"{}\" {}B => {}B",
                entry.file_name, entry.compressed_size, entry.uncompressed_size
            ));

            if self.options.reject_unsafe_paths && entry.has_unsafe_path() {
                return Err(self.fail(ExtractError::UnsafePath {
                    index,
                    name: entry.file_name,
                }));
            }

            let path = destination_path(destination, &entry);
            if entry.is_directory {
                create_dir(&path).map_err(|e| self.fail(e))?;
            } else {
                self.extract_file(&archive, index, &entry, &path)
                    .map_err(|e| self.fail(e))?;
            }
        }

        Ok(())
    }

    fn extract_file(
        &self,
        archive: &ZipArchive<'_>,
        index: usize,
        entry: &ZipFileEntry,
        path: &Path,
    ) -> Result<(), ExtractError> {
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }

        let failed = |source: EntryFailure| ExtractError::EntryExtract {
            index,
            path: path.to_path_buf(),
            source,
        };

        // Decode and verify fully before touching the file, so a corrupt
        // entry never leaves a partial file behind.
        let contents = archive.read(entry).map_err(|e| failed(e.into()))?;
        remove_stale(path).map_err(|e| failed(e.into()))?;
        fs::write(path, &contents).map_err(|e| failed(e.into()))?;

        if self.options.preserve_permissions {
            apply_mode(path, entry).map_err(|e| failed(e.into()))?;
        }

        Ok(())
    }

    /// Log a failure before handing it back; io errors already carry the
    /// OS error code in their message.
    fn fail(&self, error: ExtractError) -> ExtractError {
        self.reporter.error(&error.to_string());
        error
    }
}

/// Extract `archive` under `destination` with the default reporter and
/// options.
pub fn extract(archive: &[u8], destination: impl AsRef<Path>) -> Result<(), ExtractError> {
    ZipExtractor::new().extract(archive, destination.as_ref())
}

/// Join the entry's segments onto `root` with the platform separator.
/// `..` is deliberately not resolved here; see `reject_unsafe_paths`.
fn destination_path(root: &Path, entry: &ZipFileEntry) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(entry.path_segments());
    path
}

/// `create_dir_all` succeeds when the directory already exists and fails
/// when something else occupies the path.
fn create_dir(path: &Path) -> Result<(), ExtractError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| ExtractError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// A previous run may have left a read-only file (or a link) at `path`.
/// Unlink it so the write creates a fresh file; directories are left for
/// `fs::write` to reject.
fn remove_stale(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => fs::remove_file(path),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, entry: &ZipFileEntry) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match entry.unix_mode() {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _entry: &ZipFileEntry) -> io::Result<()> {
    Ok(())
}
