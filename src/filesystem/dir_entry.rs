//! FAT directory entry structure and parsing.
//!
//! This module implements the short (8.3) directory entry which contains metadata
//! about files and directories stored in the filesystem. Each directory entry is 32 bytes
//! and contains information such as filename, attributes, timestamps, and cluster allocation.
//! The decoded form of an entry, optionally paired with its long name, is a [`DirectoryRecord`].

use binread::{BinRead, BinReaderExt};
use getset::{CopyGetters, Getters};
use std::fmt;
use std::io;

use super::fat_error::FATError;
use super::lfn::short_name_checksum;

/// Size in bytes of a directory entry.
pub const DIR_ENTRY_SIZE: usize = 32;

/// First name byte of a deleted entry.
pub const DELETED_MARKER: u8 = 0xE5;
/// First name byte of the entry ending a directory.
pub const END_MARKER: u8 = 0x00;
/// First name byte standing for a real 0xE5 character.
pub const KANJI_E5_MARKER: u8 = 0x05;
/// Attribute byte of a long filename fragment.
pub const ATTR_LONG_NAME: u8 = 0x0F;

/// Raw 32-byte short directory entry.
///
/// # Fields
/// - `name`: 8.3 format filename (8 characters for name, 3 for extension)
/// - `attr`: File attributes (read-only, hidden, system, volume label, directory, archive)
/// - `fst_clus_hi`: High 16 bits of the first cluster number
/// - `fst_clus_lo`: Low 16 bits of the first cluster number
/// - `file_size`: Size of the file in bytes (0 for directories)
#[derive(BinRead, Debug, Clone)]
#[br(little)]
pub struct DirEntry {
    /// Filename in 8.3 format (8 characters name + 3 characters extension)
    name: [u8; 11],
    /// File attributes byte
    attr: u8,
    /// NT reserved (unused)
    _n_t_res: u8,
    /// Creation time in 10ms units
    crt_time_tenth: u8,
    /// Creation time
    crt_time: u16,
    /// Creation date
    crt_date: u16,
    /// Last access date
    lst_acc_date: u16,
    /// High 16 bits of first cluster number
    fst_clus_hi: u16,
    /// Last write time
    wrt_time: u16,
    /// Last write date
    wrt_date: u16,
    /// Low 16 bits of first cluster number
    fst_clus_lo: u16,
    /// File size in bytes (0 for directories)
    file_size: u32,
}

impl DirEntry {
    /// Creates a directory entry from a byte slice.
    ///
    /// # Parameters
    /// - `buf`: A byte slice starting with the 32 bytes of the entry
    ///
    /// # Errors
    /// - `FATError::BinReadError` if the slice is shorter than 32 bytes
    pub fn from_slice(buf: &[u8]) -> Result<Self, FATError> {
        let mut reader = io::Cursor::new(buf);
        reader.read_le().map_err(FATError::from)
    }

    /// Returns the 11 raw name bytes, with the 0x05 escape replaced by 0xE5.
    pub fn raw_name(&self) -> [u8; 11] {
        let mut name = self.name;
        if name[0] == KANJI_E5_MARKER {
            name[0] = DELETED_MARKER;
        }
        name
    }

    /// Returns the checksum of the stored name, as repeated in long name fragments.
    pub fn checksum(&self) -> u8 {
        short_name_checksum(&self.name)
    }

    /// Decodes the 8.3 name as `BASE.EXT`, or `BASE` if the extension is blank.
    ///
    /// Bytes are mapped one to one to characters (Latin-1).
    pub fn short_name(&self) -> String {
        let name = self.raw_name();
        let base = decode_padded(&name[0..8]);
        let ext = decode_padded(&name[8..11]);

        if ext.is_empty() {
            base
        } else {
            format!("{base}.{ext}")
        }
    }

    /// Returns the first cluster number.
    ///
    /// # Parameters
    /// - `high_word`: Whether to include the high 16 bits stored in `fst_clus_hi`
    pub fn cluster_number(&self, high_word: bool) -> u32 {
        if high_word {
            ((self.fst_clus_hi as u32) << 16) | self.fst_clus_lo as u32
        } else {
            self.fst_clus_lo as u32
        }
    }

    /// Converts the entry into a record, pairing it with its long name if any.
    pub fn into_record(self, long_name: Option<String>, high_word: bool) -> DirectoryRecord {
        DirectoryRecord {
            name: self.short_name(),
            long_name,
            attributes: FileAttributes::from_byte(self.attr),
            creation_time: (self.crt_time as u32) << 8 | self.crt_time_tenth as u32,
            creation_date: self.crt_date,
            last_access_date: self.lst_acc_date,
            last_modified_time: self.wrt_time,
            last_modified_date: self.wrt_date,
            first_cluster: self.cluster_number(high_word),
            file_size: self.file_size,
        }
    }
}

fn decode_padded(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim_end_matches(' ')
        .to_string()
}

/// Attribute flags of a directory entry.
///
/// Bit 0 is read-only, then hidden, system, volume label, directory and archive. The
/// two top bits are unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileAttributes {
    pub read_only: bool,
    pub hidden: bool,
    pub system: bool,
    pub volume_label: bool,
    pub directory: bool,
    pub archive: bool,
}

impl FileAttributes {
    /// Decodes the attribute byte.
    pub fn from_byte(b: u8) -> Self {
        Self {
            read_only: b & 0x01 != 0,
            hidden: b & 0x02 != 0,
            system: b & 0x04 != 0,
            volume_label: b & 0x08 != 0,
            directory: b & 0x10 != 0,
            archive: b & 0x20 != 0,
        }
    }

    /// Returns the flags in canonical order.
    pub fn flags(&self) -> [bool; 6] {
        [
            self.read_only,
            self.hidden,
            self.system,
            self.volume_label,
            self.directory,
            self.archive,
        ]
    }
}

impl fmt::Display for FileAttributes {
    /// Formats the flags as `RHSVDA`, a dash standing for a cleared flag.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, letter) in self.flags().iter().zip("RHSVDA".chars()) {
            write!(f, "{}", if *set { letter } else { '-' })?;
        }
        Ok(())
    }
}

/// A decoded file or directory.
///
/// Timestamps are the raw packed FAT date and time words.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct DirectoryRecord {
    /// Decoded short name
    #[getset(get = "pub")]
    name: String,
    long_name: Option<String>,
    #[getset(get_copy = "pub")]
    attributes: FileAttributes,
    /// Creation time word, shifted left by 8, plus the 10 ms count
    #[getset(get_copy = "pub")]
    creation_time: u32,
    #[getset(get_copy = "pub")]
    creation_date: u16,
    #[getset(get_copy = "pub")]
    last_access_date: u16,
    #[getset(get_copy = "pub")]
    last_modified_time: u16,
    #[getset(get_copy = "pub")]
    last_modified_date: u16,
    #[getset(get_copy = "pub")]
    first_cluster: u32,
    #[getset(get_copy = "pub")]
    file_size: u32,
}

impl DirectoryRecord {
    /// Returns the long name, if the entry had one.
    pub fn full_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// Returns the long name if present, the short name otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name().unwrap_or(&self.name)
    }

    /// Checks if this record represents a directory.
    pub fn is_directory(&self) -> bool {
        self.attributes.directory
    }

    /// Checks if this record is the `.` or `..` alias of a directory.
    pub fn is_dot(&self) -> bool {
        self.name == "." || self.name == ".."
    }

    /// Checks if a name matches exactly the short or the long name of this record.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.full_name() == Some(name)
    }
}

impl fmt::Display for DirectoryRecord {
    /// Formats the record as its name, attributes and size.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.full_name() {
            Some(long_name) => write!(f, "\"{}\" ({})", long_name, self.name)?,
            None => write!(f, "\"{}\"", self.name)?,
        }
        write!(f, " {} {}B", self.attributes, self.file_size)
    }
}
