use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::FormatError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::SIZE {
            return Err(FormatError::Truncated("end of central directory"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(FormatError::BadSignature("end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Any saturated field means the real values live in the ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }

    pub fn spans_disks(&self) -> bool {
        !self.is_zip64() && (self.disk_number != 0 || self.disk_with_cd != 0)
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
#[derive(Debug)]
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::SIZE {
            return Err(FormatError::Truncated("zip64 end of central directory locator"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(FormatError::BadSignature(
                "zip64 end of central directory locator",
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>()?,
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
#[derive(Debug)]
pub struct Zip64EOCD {
    pub eocd64_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub disk_with_cd: u32,
    pub disk_entries: u64,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::MIN_SIZE {
            return Err(FormatError::Truncated("zip64 end of central directory"));
        }
        if &data[0..4] != Self::SIGNATURE {
            return Err(FormatError::BadSignature("zip64 end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            eocd64_size: cursor.read_u64::<LittleEndian>()?,
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            disk_number: cursor.read_u32::<LittleEndian>()?,
            disk_with_cd: cursor.read_u32::<LittleEndian>()?,
            disk_entries: cursor.read_u64::<LittleEndian>()?,
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag bit 0: entry data is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;
/// General purpose flag bit 3: CRC and sizes follow the data; the central
/// header carries the real values.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Host system value (upper byte of "version made by") for Unix producers.
const HOST_UNIX: u16 = 3;
/// File-type mask and regular-file type in a Unix `st_mode`.
const S_IFMT: u32 = 0o170000;
const S_IFREG: u32 = 0o100000;
/// MS-DOS directory attribute in the low byte of the external attributes.
const DOS_DIRECTORY: u32 = 0x10;

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    /// Absolute offset of the local file header within the buffer, already
    /// shifted past any stub prefix.
    pub lfh_offset: u64,
    pub flags: u16,
    pub version_made_by: u16,
    pub external_attrs: u32,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Directory entries end with a separator; DOS producers may instead
    /// only set the directory attribute.
    pub(crate) fn detect_directory(file_name: &str, external_attrs: u32) -> bool {
        file_name.ends_with('/')
            || file_name.ends_with('\\')
            || external_attrs & DOS_DIRECTORY != 0
    }

    /// Path segments of the entry name with `/` and `\` both treated as
    /// separators. Empty and `.` segments are dropped; `..` is kept.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.file_name
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
    }

    /// True when the raw name would escape the directory it is joined onto.
    pub fn has_unsafe_path(&self) -> bool {
        let name = self.file_name.as_str();
        let absolute = name.starts_with('/') || name.starts_with('\\');
        let drive = name
            .split(['/', '\\'])
            .next()
            .is_some_and(|first| first.contains(':'));
        absolute || drive || self.path_segments().any(|segment| segment == "..")
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Permission bits recorded by a Unix producer, if any. Only plain
    /// files carry them over; links and other special types are extracted
    /// as ordinary files with default permissions.
    pub fn unix_mode(&self) -> Option<u32> {
        if self.version_made_by >> 8 != HOST_UNIX {
            return None;
        }
        let attrs = self.external_attrs >> 16;
        let file_type = attrs & S_IFMT;
        if file_type != 0 && file_type != S_IFREG {
            return None;
        }
        let mode = attrs & 0o777;
        (mode != 0).then_some(mode)
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
