//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures from an
//! in-memory image borrowed from the caller.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the buffer's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Walk the Central Directory lazily, one header per entry
//! 4. For extraction, read each entry's Local File Header and data
//!
//! The central directory is located relative to the end record rather than
//! trusted blindly, so an archive appended to another file (an installer
//! stub) opens without first being cut out of the buffer.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};

use super::error::FormatError;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// ZIP64 extended information extra field id.
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Upper bound on the up-front allocation for an inflated entry; larger
/// entries grow the buffer as data actually arrives.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Borrow `len` bytes at `offset`, or report which record ran off the end.
fn slice_at<'a>(
    data: &'a [u8],
    offset: u64,
    len: u64,
    what: &'static str,
) -> Result<&'a [u8], FormatError> {
    let start = usize::try_from(offset).map_err(|_| FormatError::Truncated(what))?;
    let len = usize::try_from(len).map_err(|_| FormatError::Truncated(what))?;
    let end = start.checked_add(len).ok_or(FormatError::Truncated(what))?;
    data.get(start..end).ok_or(FormatError::Truncated(what))
}

/// Find and parse the End of Central Directory record.
///
/// Handles both the simple case (no comment) and archives with comments by
/// searching backwards for a signature whose comment length reaches exactly
/// to the end of the buffer.
fn find_eocd(data: &[u8]) -> Result<(EndOfCentralDirectory, u64), FormatError> {
    let size = EndOfCentralDirectory::SIZE;
    if data.len() < size {
        return Err(FormatError::MissingEndOfCentralDirectory);
    }

    // Common case: no comment, record sits flush with the end.
    let tail = data.len() - size;
    if &data[tail..tail + 4] == EndOfCentralDirectory::SIGNATURE && data[tail + 20..] == [0u8, 0] {
        let eocd = EndOfCentralDirectory::from_bytes(&data[tail..])?;
        return Ok((eocd, tail as u64));
    }

    let search_start = data.len().saturating_sub(MAX_COMMENT_SIZE + size);
    for i in (search_start..tail).rev() {
        if &data[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }
        let comment_len = u16::from_le_bytes([data[i + 20], data[i + 21]]) as usize;
        if comment_len == data.len() - i - size {
            let eocd = EndOfCentralDirectory::from_bytes(&data[i..i + size])?;
            return Ok((eocd, i as u64));
        }
    }

    Err(FormatError::MissingEndOfCentralDirectory)
}

/// Read the ZIP64 End of Central Directory record.
///
/// The locator sits immediately before the regular EOCD. Its offset is
/// relative to the start of the archive, which differs from the buffer start
/// when a stub precedes the archive; in that case the record is expected
/// directly in front of the locator.
///
/// Returns the record together with its actual position in the buffer.
fn read_zip64_eocd(data: &[u8], eocd_offset: u64) -> Result<(Zip64EOCD, u64), FormatError> {
    let locator_offset = eocd_offset
        .checked_sub(Zip64EOCDLocator::SIZE as u64)
        .ok_or(FormatError::Truncated("zip64 end of central directory locator"))?;
    let locator = Zip64EOCDLocator::from_bytes(slice_at(
        data,
        locator_offset,
        Zip64EOCDLocator::SIZE as u64,
        "zip64 end of central directory locator",
    )?)?;
    if locator.total_disks > 1 {
        return Err(FormatError::MultiDisk);
    }

    let candidates = [
        Some(locator.eocd64_offset),
        locator_offset.checked_sub(Zip64EOCD::MIN_SIZE as u64),
    ];
    for offset in candidates.into_iter().flatten() {
        let Ok(bytes) = slice_at(data, offset, Zip64EOCD::MIN_SIZE as u64, "zip64 record") else {
            continue;
        };
        if bytes.starts_with(Zip64EOCD::SIGNATURE) {
            return Ok((Zip64EOCD::from_bytes(bytes)?, offset));
        }
    }

    Err(FormatError::BadSignature("zip64 end of central directory"))
}

/// Read-only view of a ZIP image.
///
/// Borrows the caller's buffer; nothing is copied until an entry is read.
/// Dropping the archive releases everything it holds.
#[derive(Clone, Copy)]
pub struct ZipArchive<'a> {
    data: &'a [u8],
    /// Bytes in front of the archive proper (e.g. an executable stub).
    base_offset: u64,
    cd_start: u64,
    cd_size: u64,
    entry_count: u64,
}

impl<'a> ZipArchive<'a> {
    /// Open an archive image.
    ///
    /// # Errors
    ///
    /// Returns an error if no end record is found, the archive spans
    /// several disks, or the central directory does not fit in the buffer.
    pub fn new(data: &'a [u8]) -> Result<Self, FormatError> {
        let (eocd, eocd_offset) = find_eocd(data)?;
        if eocd.spans_disks() {
            return Err(FormatError::MultiDisk);
        }

        // Get Central Directory info, using ZIP64 if needed. The directory
        // ends where the (ZIP64) end record begins.
        let (cd_offset, cd_size, entry_count, cd_end) = if eocd.is_zip64() {
            let (eocd64, eocd64_offset) = read_zip64_eocd(data, eocd_offset)?;
            if eocd64.disk_number != 0 || eocd64.disk_with_cd != 0 {
                return Err(FormatError::MultiDisk);
            }
            (
                eocd64.cd_offset,
                eocd64.cd_size,
                eocd64.total_entries,
                eocd64_offset,
            )
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
                eocd_offset,
            )
        };

        let cd_start = cd_end
            .checked_sub(cd_size)
            .ok_or(FormatError::Truncated("central directory"))?;
        let base_offset = cd_start
            .checked_sub(cd_offset)
            .ok_or(FormatError::Truncated("central directory"))?;

        // Every header is at least 46 bytes; reject counts the directory
        // cannot possibly hold before anything is allocated for them.
        if entry_count.saturating_mul(CDFH_MIN_SIZE as u64) > cd_size {
            return Err(FormatError::Truncated("central directory"));
        }

        Ok(Self {
            data,
            base_offset,
            cd_start,
            cd_size,
            entry_count,
        })
    }

    /// Number of entries declared by the end record.
    pub fn len(&self) -> u64 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Size of the data preceding the archive in the buffer.
    pub fn prefix_len(&self) -> u64 {
        self.base_offset
    }

    /// Iterate over the central directory in storage order.
    ///
    /// The iterator yields one result per declared entry and stops after the
    /// first malformed header.
    pub fn entries(&self) -> Entries<'a> {
        // Bounds were checked in `new`.
        let data = self.data;
        let start = self.cd_start as usize;
        let directory = &data[start..start + self.cd_size as usize];
        Entries {
            cursor: Cursor::new(directory),
            base_offset: self.base_offset,
            remaining: self.entry_count,
            failed: false,
        }
    }

    /// Decode an entry's contents and verify size and CRC-32.
    ///
    /// # Errors
    ///
    /// Returns an error for encrypted entries, unsupported methods, a
    /// missing or out-of-bounds local header, corrupt deflate data, or a
    /// size/checksum mismatch.
    pub fn read(&self, entry: &ZipFileEntry) -> Result<Vec<u8>, FormatError> {
        if entry.is_encrypted() {
            return Err(FormatError::Encrypted);
        }
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            return Err(FormatError::UnsupportedMethod(method));
        }

        let data_offset = self.data_offset(entry)?;
        let compressed = slice_at(self.data, data_offset, entry.compressed_size, "entry data")?;

        let contents = match entry.compression_method {
            CompressionMethod::Deflate => inflate(compressed, entry.uncompressed_size)?,
            _ => compressed.to_vec(),
        };

        if contents.len() as u64 != entry.uncompressed_size {
            return Err(FormatError::SizeMismatch {
                expected: entry.uncompressed_size,
                actual: contents.len() as u64,
            });
        }
        let crc = crc32fast::hash(&contents);
        if crc != entry.crc32 {
            return Err(FormatError::ChecksumMismatch {
                expected: entry.crc32,
                actual: crc,
            });
        }

        Ok(contents)
    }

    /// Get the actual data offset for a file entry.
    ///
    /// The Local File Header has variable-length fields (filename, extra
    /// field) that may differ from the Central Directory entry, so it is
    /// read to find where the data begins.
    fn data_offset(&self, entry: &ZipFileEntry) -> Result<u64, FormatError> {
        let header = slice_at(self.data, entry.lfh_offset, LFH_SIZE as u64, "local file header")?;
        if &header[0..4] != LFH_SIGNATURE {
            return Err(FormatError::BadSignature("local file header"));
        }

        let mut cursor = Cursor::new(header);
        cursor.set_position(26); // Offset to filename length field

        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }
}

/// Inflate a raw deflate stream, reading at most one byte past the
/// declared size so oversized streams are caught without unbounded output.
fn inflate(compressed: &[u8], expected: u64) -> Result<Vec<u8>, FormatError> {
    let mut contents = Vec::with_capacity(expected.min(MAX_PREALLOC) as usize);
    DeflateDecoder::new(compressed)
        .take(expected.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(FormatError::Inflate)?;
    Ok(contents)
}

/// Lazy iterator over central directory headers.
pub struct Entries<'a> {
    cursor: Cursor<&'a [u8]>,
    base_offset: u64,
    remaining: u64,
    failed: bool,
}

impl Iterator for Entries<'_> {
    type Item = Result<ZipFileEntry, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let entry = parse_cdfh(&mut self.cursor, self.base_offset);
        self.failed = entry.is_err();
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, usize::try_from(self.remaining).ok())
    }
}

/// Parse a Central Directory File Header from a cursor.
///
/// The CDFH contains metadata about a file in the archive, including its
/// name, sizes, and the location of its local header.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>, base_offset: u64) -> Result<ZipFileEntry, FormatError> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(FormatError::BadSignature("central directory file header"));
    }

    let version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let file_name = String::from_utf8_lossy(&file_name_bytes).into_owned();

    let extra_field_end = cursor.position() + extra_field_length as u64;
    if extra_field_end + file_comment_length as u64 > cursor.get_ref().len() as u64 {
        return Err(FormatError::Truncated("central directory file header"));
    }

    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        let field_end = (cursor.position() + field_size as u64).min(extra_field_end);

        if header_id == ZIP64_EXTRA_ID {
            // Values are present only for header fields saturated to 0xFFFFFFFF,
            // in this fixed order.
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }

    cursor.set_position(extra_field_end + file_comment_length as u64);

    let lfh_offset = lfh_offset
        .checked_add(base_offset)
        .ok_or(FormatError::Truncated("local file header"))?;

    Ok(ZipFileEntry {
        is_directory: ZipFileEntry::detect_directory(&file_name, external_attrs),
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        flags,
        version_made_by,
        external_attrs,
        last_mod_time,
        last_mod_date,
    })
}
