//! Long filename (VFAT) fragments.
//!
//! A long name is split over 32-byte fragments of 13 UTF-16 code units each, stored
//! right before the short entry they describe. The fragments appear on disk in reverse
//! order: the first one read holds the end of the name and carries the 0x40 flag in its
//! sequence byte.

use binread::{BinRead, BinReaderExt};
use std::io;

use super::fat_error::FATError;

/// Count of UTF-16 code units held by a fragment.
pub const UNITS_PER_FRAGMENT: usize = 13;

const LAST_LOGICAL_FLAG: u8 = 0x40;
const ORDINAL_MASK: u8 = 0x3F;

/// Raw 32-byte long filename fragment.
#[derive(BinRead, Debug, Clone)]
#[br(little)]
pub struct LfnEntry {
    /// Sequence byte: ordinal in the low 6 bits, 0x40 on the last logical fragment
    ord: u8,
    /// Code units 1 to 5
    name1: [u16; 5],
    /// Always 0x0F
    _attr: u8,
    /// Always 0
    _entry_type: u8,
    /// Checksum of the associated short name
    checksum: u8,
    /// Code units 6 to 11
    name2: [u16; 6],
    /// Always 0
    _fst_clus_lo: u16,
    /// Code units 12 and 13
    name3: [u16; 2],
}

impl LfnEntry {
    /// Creates a fragment from a byte slice.
    ///
    /// # Errors
    /// - `FATError::BinReadError` if the slice is shorter than 32 bytes
    pub fn from_slice(buf: &[u8]) -> Result<Self, FATError> {
        let mut reader = io::Cursor::new(buf);
        reader.read_le().map_err(FATError::from)
    }

    /// Returns the position of this fragment in the name, starting at 1.
    pub fn ordinal(&self) -> u8 {
        self.ord & ORDINAL_MASK
    }

    /// Returns `true` on the fragment holding the end of the name.
    pub fn is_last_logical(&self) -> bool {
        self.ord & LAST_LOGICAL_FLAG != 0
    }

    /// Returns the checksum of the short name this fragment belongs to.
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Returns the 13 code units of the fragment, padding included.
    pub fn units(&self) -> impl Iterator<Item = u16> + '_ {
        self.name1
            .iter()
            .chain(self.name2.iter())
            .chain(self.name3.iter())
            .copied()
    }
}

/// Computes the checksum of an 11-byte short name as stored in long name fragments.
pub fn short_name_checksum(name: &[u8; 11]) -> u8 {
    name.iter()
        .fold(0u8, |sum, &b| sum.rotate_right(1).wrapping_add(b))
}

/// Rebuilds a long name from its fragments.
///
/// # Parameters
/// - `fragments`: The fragments in on-disk order, i.e. the end of the name first
///
/// # Errors
/// - `FATError::NameDecodeError` if the code units are not valid UTF-16
pub fn assemble(fragments: &[LfnEntry]) -> Result<String, FATError> {
    let mut units: Vec<u16> = fragments
        .iter()
        .rev()
        .flat_map(|fragment| fragment.units())
        .collect();

    if let Some(end) = units.iter().position(|&u| u == 0x0000) {
        units.truncate(end);
    }
    while units.last() == Some(&0xFFFF) {
        units.pop();
    }

    String::from_utf16(&units).map_err(|err| FATError::NameDecodeError(err.to_string()))
}
