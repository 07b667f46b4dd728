//! FAT32 filesystem decoding.
//!
//! The submodules follow the decoding pipeline: boot sector, FAT entries and table,
//! directory entries and long names, and finally the volume which builds the tree and
//! extracts files.

pub mod bpb;
pub mod dir_entry;
pub mod directory;
pub mod fat;
pub mod fat_entry;
pub mod fat_error;
pub mod fat_table;
pub mod lfn;
pub mod options;
pub mod tree;
