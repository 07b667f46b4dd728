//! Error types for FAT32 volume decoding.
//!
//! Every failure raised while parsing the boot sector, resolving cluster chains or
//! decoding directory entries is reported through [`FATError`]. The variants fall
//! into four families, exposed through [`FATError::kind`]:
//! - I/O errors on the underlying stream
//! - format errors in the boot sector geometry
//! - chain errors while following the File Allocation Table
//! - name decoding errors in long filename sequences

use std::io;
use thiserror::Error;

use super::fat_entry::FatEntryStatus;

/// Broad category of a [`FATError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stream could not be seeked or read.
    Io,
    /// The boot sector geometry is zero or implausible.
    Format,
    /// A cluster chain is dangling, looping or too short.
    Chain,
    /// A long filename sequence is inconsistent.
    NameDecode,
}

/// Errors that can occur while decoding a FAT32 volume.
#[derive(Error, Debug)]
pub enum FATError {
    /// Underlying I/O errors: truncated reads, out-of-bounds seeks.
    #[error("IO Error: `{0}`")]
    IOError(io::Error),

    /// Parsing error occured during structure initialization
    #[error("BinRead Error: `{0}`")]
    BinReadError(binread::Error),

    /// The boot sector cannot describe a usable volume.
    #[error("Invalid boot sector: {0}")]
    FormatError(String),

    /// The first three bytes of a FAT volume must contain a valid x86 jump instruction.
    #[error("Invalid jump instruction `{0}`")]
    InvalidJmp(String),

    /// Bytes per sector must be 512, 1024, 2048 or 4096.
    #[error("Invalid count of bytes per sector: `{0}`. Legal values: 512, 1024, 2048 or 4096")]
    InvalidBytesPerSec(u16),

    /// Sectors per cluster must be a power of 2 between 1 and 128.
    #[error(
        "Invalid number of sector per cluster: `{0}`. Legal values: 1, 2, 4, 8, 16, 32, 64, 128"
    )]
    InvalidSecPerClus(u8),

    /// Total cluster size (bytes per sector × sectors per cluster) must not exceed 32 KiB.
    #[error("Invalid cluster size: `{0}`. Any value greater than 32K is invalid.")]
    InvalidClusSz(u32),

    /// The count of reserved sectors must be greater than 0.
    #[error("Invalid count of reserved sectors: `{0}`. Any value greater than 0 is valid.")]
    InvalidRsvdSecCnt(u16),

    /// At least one File Allocation Table is required.
    #[error("Invalid number of FATs on this volume: `{0}`.")]
    InvalidNumFat(u8),

    /// For FAT32 volumes the root directory is a cluster chain, so this count must be 0.
    #[error(
        "Invalid count of directory entries in the root directory: `{0}`. It should be 0 for a FAT32 volume."
    )]
    InvalidRootEntCnt(u16),

    /// The total sector count must be valid for the volume size.
    #[error("Invalid total count of sectors on the volume: `{0}`")]
    InvalidTotSec(String),

    /// The FAT size in sectors must be valid and consistent with the volume layout.
    #[error("Invalid FAT size: `{0}`")]
    InvalidFatSz(String),

    /// Clusters 0 and 1 are reserved, the root directory starts at cluster 2 or above.
    #[error(
        "Invalid cluster number of the first cluster of the root directory: `{0}`. This value should be at least 2."
    )]
    InvalidRootClus(u32),

    /// The boot sector signature must be 0x55AA.
    #[error("Invalid BPB signature: `{0}`. Expected signature: 0x55AA")]
    InvalidSignature(String),

    /// The detected FAT type is not supported (only FAT32 is supported).
    #[error("Unsupported FAT type: `{0}`")]
    UnsupportedFATType(String),

    /// A cluster of a chain has no entry in the FAT.
    #[error("Dangling cluster reference: cluster {0} has no FAT entry")]
    DanglingCluster(u32),

    /// A chain links to a free, bad or reserved cluster value.
    #[error("Invalid chain link: value 0x{value:08X} is {status:?}")]
    InvalidChainLink { value: u32, status: FatEntryStatus },

    /// A chain links back to a cluster already part of it.
    #[error("Cluster chain loops back on cluster {0}")]
    ClusterLoop(u32),

    /// A directory points back to one of its ancestors.
    #[error("Directory at cluster {0} is one of its own ancestors")]
    DirectoryCycle(u32),

    /// The chain of a file holds fewer bytes than its declared size.
    #[error("Cluster chain holds {available} bytes, {declared} declared")]
    ChainTooShort { declared: u32, available: usize },

    /// A long filename sequence is inconsistent or undecodable.
    #[error("Long name decoding failed: {0}")]
    NameDecodeError(String),
}

impl FATError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FATError::IOError(_) => ErrorKind::Io,
            FATError::DanglingCluster(_)
            | FATError::InvalidChainLink { .. }
            | FATError::ClusterLoop(_)
            | FATError::DirectoryCycle(_)
            | FATError::ChainTooShort { .. } => ErrorKind::Chain,
            FATError::NameDecodeError(_) => ErrorKind::NameDecode,
            _ => ErrorKind::Format,
        }
    }
}

/// Converts standard I/O errors into FATError.
impl From<io::Error> for FATError {
    fn from(err: io::Error) -> Self {
        FATError::IOError(err)
    }
}

/// Converts BinRead errors into FATError.
impl From<binread::Error> for FATError {
    fn from(err: binread::Error) -> Self {
        FATError::BinReadError(err)
    }
}
