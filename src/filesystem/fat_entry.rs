//! Classification of raw FAT32 entries.
//!
//! A FAT32 entry is a 32-bit little-endian value whose low 28 bits describe the state
//! of a cluster: free, allocated (pointing to the next cluster of the chain), bad,
//! reserved or end of chain. The top 4 bits are reserved and ignored here.

use std::fmt;

/// Mask selecting the 28 meaningful bits of a FAT32 entry.
pub const FAT32_ENTRY_MASK: u32 = 0x0FFF_FFFF;

const MAX_STRICT_RESERVED: u32 = 0x0FFF_FFF6;
const BAD_CLUSTER: u32 = 0x0FFF_FFF7;
const MIN_RESERVED: u32 = 0x0FFF_FFF8;
const END_OF_CHAIN: u32 = 0x0FFF_FFFF;

/// Semantic status of a FAT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FatEntryStatus {
    /// The cluster is not in use.
    Free,
    /// The cluster is in use; the value is the next cluster of the chain.
    Allocated,
    /// The value lies beyond the last cluster of the volume.
    StrictReserved,
    /// The cluster is marked as bad.
    Bad,
    /// Reserved value, treated as an end of chain.
    Reserved,
    /// End of the cluster chain.
    Eof,
}

impl FatEntryStatus {
    /// Classifies a raw FAT entry against the highest valid cluster number of the volume.
    ///
    /// # Parameters
    /// - `raw`: The FAT entry, its top 4 bits are ignored
    /// - `max_valid_cluster`: The highest cluster number of the data region
    ///
    /// # Returns
    /// - Exactly one status; the bands cover every 28-bit value.
    pub fn classify(raw: u32, max_valid_cluster: u32) -> Self {
        let entry = raw & FAT32_ENTRY_MASK;
        let max_valid_cluster = max_valid_cluster.min(MAX_STRICT_RESERVED);

        match entry {
            0 => FatEntryStatus::Free,
            BAD_CLUSTER => FatEntryStatus::Bad,
            MIN_RESERVED..=0x0FFF_FFFE => FatEntryStatus::Reserved,
            END_OF_CHAIN => FatEntryStatus::Eof,
            n if (2..=max_valid_cluster).contains(&n) => FatEntryStatus::Allocated,
            // 1 and everything between the last cluster and the bad marker
            _ => FatEntryStatus::StrictReserved,
        }
    }

    /// Returns `true` when a chain ends on this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FatEntryStatus::Reserved | FatEntryStatus::Eof)
    }
}

impl fmt::Display for FatEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FatEntryStatus::Free => "free",
            FatEntryStatus::Allocated => "allocated",
            FatEntryStatus::StrictReserved => "reserved (out of volume)",
            FatEntryStatus::Bad => "bad",
            FatEntryStatus::Reserved => "reserved",
            FatEntryStatus::Eof => "end of chain",
        };
        write!(f, "{s}")
    }
}
