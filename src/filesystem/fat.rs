//! FAT32 volume structure and operations.
//!
//! This module ties the decoding stages together:
//! - Reading the boot sector and the first FAT
//! - Reading cluster chains
//! - Building the directory tree from the root cluster
//! - Extracting file contents
//! - Displaying the volume layout

use log::{debug, info};
use std::fmt::Write as FmtWrite;
use std::io::{self, Read, Seek};

use super::bpb::Bpb;
use super::dir_entry::DirectoryRecord;
use super::directory::scan_directory;
use super::fat_entry::FatEntryStatus;
use super::fat_error::FATError;
use super::fat_table::FatTable;
use super::options::DecodeOptions;
use super::tree::{DirectoryTree, NodeId};
use crate::traits::LayoutDisplay;
use crate::utils::read_at;

/// A FAT32 volume opened on a seekable stream.
///
/// The boot sector and the FAT are decoded once when the volume is opened; they are
/// immutable afterwards. The stream is only used to read directory and file clusters.
#[derive(Debug)]
pub struct FatVolume<R> {
    reader: R,
    bpb: Bpb,
    fat: FatTable,
    options: DecodeOptions,
}

impl<R: Read + Seek> FatVolume<R> {
    /// Reads the boot sector and the first FAT of a volume.
    ///
    /// # Parameters
    /// - `reader`: The stream holding the volume, the boot sector at offset 0
    /// - `options`: The decoding options
    ///
    /// # Errors
    /// - `FATError::FormatError` (or a validation variant) if the boot sector is unusable
    /// - `FATError::IOError` if the FAT cannot be read
    pub fn open(mut reader: R, options: DecodeOptions) -> Result<Self, FATError> {
        let bpb = Bpb::from(&mut reader, options.validate_bpb)?;
        let fat = FatTable::from(&mut reader, &bpb, options.mask_fat_entries)?;

        Ok(FatVolume {
            reader,
            bpb,
            fat,
            options,
        })
    }

    /// Returns the boot sector of the volume.
    pub fn bpb(&self) -> &Bpb {
        &self.bpb
    }

    /// Returns the first FAT of the volume.
    pub fn fat(&self) -> &FatTable {
        &self.fat
    }

    /// Returns the options the volume was opened with.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Gives the stream back.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Resolves the cluster chain starting at `cluster`.
    pub fn chain_for(&self, cluster: u32) -> Result<Vec<u32>, FATError> {
        self.fat.chain_for(cluster, self.bpb.max_valid_cluster())
    }

    /// Reads the content of the clusters of a chain, in chain order.
    pub fn read_chain(&mut self, chain: &[u32]) -> Result<Vec<u8>, FATError> {
        read_chain_bytes(&mut self.reader, &self.bpb, chain)
    }

    /// Decodes the records of the directory starting at `first_cluster`.
    ///
    /// # Errors
    /// - Chain errors while resolving the directory's clusters
    /// - `FATError::IOError` if a cluster cannot be read
    /// - `FATError::NameDecodeError` if a long name is inconsistent
    pub fn list_dir(&mut self, first_cluster: u32) -> Result<Vec<DirectoryRecord>, FATError> {
        let chain = self.chain_for(first_cluster)?;
        let bytes = self.read_chain(&chain)?;

        debug!(
            "Directory at cluster {first_cluster}: {} cluster(s)",
            chain.len()
        );
        scan_directory(&bytes, &self.options)
    }

    /// Decodes the whole directory hierarchy starting at the root cluster.
    ///
    /// The root of the returned tree has no record; its children are the entries of
    /// the root directory. Every directory other than `.` and `..` is expanded.
    ///
    /// # Errors
    /// - `FATError::DirectoryCycle` if a directory points back to one of its ancestors
    /// - Any error of [`FatVolume::list_dir`]
    pub fn decode_tree(&mut self) -> Result<DirectoryTree, FATError> {
        let mut tree = DirectoryTree::new();
        let root = tree.root();
        let mut ancestors = vec![];

        self.decode_dir_rec(&mut tree, root, self.bpb.root_clus(), &mut ancestors)?;

        info!("Decoded {} entries", tree.len() - 1);
        Ok(tree)
    }

    fn decode_dir_rec(
        &mut self,
        tree: &mut DirectoryTree,
        parent: NodeId,
        cluster: u32,
        ancestors: &mut Vec<u32>,
    ) -> Result<(), FATError> {
        if ancestors.contains(&cluster) {
            return Err(FATError::DirectoryCycle(cluster));
        }
        ancestors.push(cluster);

        for record in self.list_dir(cluster)? {
            let expand = record.is_directory() && !record.is_dot();
            let first_cluster = record.first_cluster();
            let child = tree.add_child(parent, record);

            if expand {
                self.decode_dir_rec(tree, child, first_cluster, ancestors)?;
            }
        }

        ancestors.pop();
        Ok(())
    }

    /// Reads the content of a file.
    ///
    /// # Returns
    /// - Exactly `file_size` bytes; an empty file without clusters yields no byte.
    ///
    /// # Errors
    /// - `FATError::ChainTooShort` if the chain holds fewer bytes than the declared size
    /// - Chain errors while resolving the file's clusters
    /// - `FATError::IOError` if a cluster cannot be read
    pub fn extract(&mut self, record: &DirectoryRecord) -> Result<Vec<u8>, FATError> {
        if record.first_cluster() == 0 && record.file_size() == 0 {
            return Ok(vec![]);
        }

        let chain = self.chain_for(record.first_cluster())?;
        let mut bytes = self.read_chain(&chain)?;

        let declared = record.file_size();
        if bytes.len() < declared as usize {
            return Err(FATError::ChainTooShort {
                declared,
                available: bytes.len(),
            });
        }
        bytes.truncate(declared as usize);

        Ok(bytes)
    }
}

/// Reads the clusters of a chain and concatenates them.
///
/// # Parameters
/// - `reader`: The stream holding the volume
/// - `bpb`: The boot sector of the volume
/// - `chain`: The clusters to read, in order
///
/// # Errors
/// - `FATError::IOError` if a cluster lies beyond the end of the stream
/// - `FATError::InvalidChainLink` if the chain holds cluster 0 or 1
pub fn read_chain_bytes<T: Read + Seek>(
    reader: &mut T,
    bpb: &Bpb,
    chain: &[u32],
) -> Result<Vec<u8>, FATError> {
    let cluster_size = bpb.cluster_size();
    let mut bytes = vec![];

    for &cluster in chain {
        let offset = bpb
            .cluster_offset(cluster)
            .ok_or_else(|| FATError::InvalidChainLink {
                value: cluster,
                status: FatEntryStatus::classify(cluster, bpb.max_valid_cluster()),
            })?;
        let buf = read_at(reader, offset, cluster_size).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Failed to read cluster {cluster}: {err}"),
            )
        })?;
        bytes.extend_from_slice(&buf);
    }

    Ok(bytes)
}

/// Prints the regions of the volume, in sectors.
impl<R> LayoutDisplay for FatVolume<R> {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let indent = " ".repeat(indent.into());
        let fat_sz = self.bpb.fat_sz_32() as u64;
        let data_end = self.bpb.data_region_start()
            + self.bpb.cluster_count() as u64 * self.bpb.sec_per_clus() as u64;

        writeln!(out, "{}┌{:─^55}┐", indent, " FAT32 Volume Layout ")?;
        writeln!(
            out,
            "{}├{:^12}┬{:^12}┬{:^12}┬{:^16}┤",
            indent, "Region", "Start", "End", "Description"
        )?;
        writeln!(
            out,
            "{}├{:─<12}┼{:─<12}┼{:─<12}┼{:─<16}┤",
            indent, "", "", "", ""
        )?;
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent,
            "Reserved",
            0,
            self.bpb.fat_start(),
            "Boot + Reserved"
        )?;
        for i in 0..self.bpb.num_fat() as u64 {
            let start = self.bpb.fat_start() + i * fat_sz;
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                format!("FAT #{i}"),
                start,
                start + fat_sz,
                if i == 0 { "Decoded" } else { "Mirror" }
            )?;
        }
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent,
            "Data",
            self.bpb.data_region_start(),
            data_end,
            format!("{} clusters", self.bpb.cluster_count())
        )?;
        if data_end < self.bpb.total_sectors() as u64 {
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                "",
                data_end,
                self.bpb.total_sectors(),
                "Volume Slack"
            )?;
        }
        writeln!(
            out,
            "{}└{:─<12}┴{:─<12}┴{:─<12}┴{:─<16}┘",
            indent, "", "", "", ""
        )?;
        writeln!(
            out,
            "{}{} of {} clusters in use",
            indent,
            self.fat.len(),
            self.bpb.cluster_count()
        )?;

        Ok(out)
    }
}
