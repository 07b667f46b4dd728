//!
//! fat_explorer: A library and CLI for browsing FAT32 volumes from their raw bytes.
//!
//! This crate provides tools for:
//! - Parsing the boot sector and the File Allocation Table of a FAT32 volume
//! - Resolving cluster chains and decoding directories, long filenames included
//! - Building the directory tree of a volume and extracting file contents
//! - Navigating the tree from an interactive shell
//!
//! # Re-exports
//! - [`FatVolume`]: FAT32 volume opened on a seekable stream
//! - [`DirectoryTree`]: Decoded directory hierarchy
//! - [`DirectoryRecord`]: A decoded file or directory
//! - [`DecodeOptions`]: Decoding knobs
//! - [`FATError`]: Decoding errors

pub mod commands;
pub mod filesystem;
pub mod shell;
pub mod traits;
pub mod utils;

use std::io::{Read, Seek};

/// A decoded file or directory (see [`filesystem::dir_entry::DirectoryRecord`]).
pub use crate::filesystem::dir_entry::DirectoryRecord;
/// FAT32 volume (see [`filesystem::fat::FatVolume`]).
pub use crate::filesystem::fat::FatVolume;
/// Decoding errors (see [`filesystem::fat_error::FATError`]).
pub use crate::filesystem::fat_error::FATError;
/// Decoding knobs (see [`filesystem::options::DecodeOptions`]).
pub use crate::filesystem::options::DecodeOptions;
/// Directory hierarchy (see [`filesystem::tree::DirectoryTree`]).
pub use crate::filesystem::tree::{DirectoryTree, NodeId};

/// Decodes a FAT32 volume with the default options.
///
/// # Returns
/// - The opened volume, needed afterwards to extract files, and its directory tree.
///
/// # Errors
/// - Any [`FATError`] raised while reading the boot sector, the FAT or a directory
pub fn decode<R: Read + Seek>(reader: R) -> Result<(FatVolume<R>, DirectoryTree), FATError> {
    decode_with(reader, DecodeOptions::default())
}

/// Decodes a FAT32 volume with explicit options.
pub fn decode_with<R: Read + Seek>(
    reader: R,
    options: DecodeOptions,
) -> Result<(FatVolume<R>, DirectoryTree), FATError> {
    let mut volume = FatVolume::open(reader, options)?;
    let tree = volume.decode_tree()?;
    Ok((volume, tree))
}
