//! File Allocation Table decoding and cluster chain resolution.
//!
//! The first FAT of the volume is loaded once into a sparse map from cluster index to
//! successor value. Chains are then resolved against that map without touching the
//! stream again.

use log::{debug, trace};
use std::collections::{BTreeMap, HashSet};
use std::io;

use super::bpb::Bpb;
use super::fat_entry::{FAT32_ENTRY_MASK, FatEntryStatus};
use super::fat_error::FATError;
use crate::utils::{read_at, u32_at};

/// Sparse copy of the first File Allocation Table.
///
/// Only nonzero entries of clusters 2 and above are stored: a missing key means the
/// cluster is free or was never resolved, never "end of chain".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FatTable {
    entries: BTreeMap<u32, u32>,
}

impl FatTable {
    /// Reads the first FAT of the volume.
    ///
    /// # Parameters
    /// - `reader`: The stream containing the volume
    /// - `bpb`: The boot sector of the volume
    /// - `mask_entries`: Whether to clear the 4 reserved top bits of every entry
    ///
    /// # Errors
    /// - `FATError::IOError` if the FAT region cannot be read
    pub fn from<T: io::Read + io::Seek>(
        reader: &mut T,
        bpb: &Bpb,
        mask_entries: bool,
    ) -> Result<FatTable, FATError> {
        let fat_len = bpb.fat_sz_32() as usize * bpb.bytes_per_sec() as usize;
        let offset = bpb.fat_start() * bpb.bytes_per_sec() as u64;
        let buf = read_at(reader, offset, fat_len - fat_len % 4)?;

        let table = Self::from_bytes(&buf, mask_entries);
        debug!(
            "FAT: {} entries read, {} in use",
            buf.len() / 4,
            table.len()
        );

        Ok(table)
    }

    /// Builds the table from the raw bytes of a FAT.
    pub fn from_bytes(buf: &[u8], mask_entries: bool) -> FatTable {
        let mut entries = BTreeMap::new();

        for (cluster, off) in (0..buf.len() / 4).map(|i| (i as u32, i * 4)).skip(2) {
            let mut value = u32_at(buf, off);
            if mask_entries {
                value &= FAT32_ENTRY_MASK;
            }
            if value != 0 {
                entries.insert(cluster, value);
            }
        }

        FatTable { entries }
    }

    /// Builds a table from `(cluster, successor)` pairs. Zero values and clusters 0
    /// and 1 are dropped.
    pub fn from_entries<I: IntoIterator<Item = (u32, u32)>>(entries: I) -> FatTable {
        FatTable {
            entries: entries
                .into_iter()
                .filter(|&(cluster, value)| cluster >= 2 && value != 0)
                .collect(),
        }
    }

    /// Returns the raw successor value stored for a cluster.
    pub fn successor(&self, cluster: u32) -> Option<u32> {
        self.entries.get(&cluster).copied()
    }

    /// Returns the count of nonzero entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no allocated cluster.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the cluster chain starting at `start`.
    ///
    /// Every value of the chain is classified: allocated values are appended and
    /// followed, a reserved or end-of-chain value stops the walk and is not part of
    /// the result.
    ///
    /// # Parameters
    /// - `start`: The first cluster of the chain
    /// - `max_valid_cluster`: The highest cluster number of the volume
    ///
    /// # Errors
    /// - `FATError::DanglingCluster` if a cluster of the chain has no FAT entry
    /// - `FATError::InvalidChainLink` if the chain reaches a free, bad or out-of-volume value
    /// - `FATError::ClusterLoop` if the chain visits a cluster twice
    pub fn chain_for(&self, start: u32, max_valid_cluster: u32) -> Result<Vec<u32>, FATError> {
        let mut chain = vec![];
        let mut visited = HashSet::new();
        let mut cluster = start;

        loop {
            match FatEntryStatus::classify(cluster, max_valid_cluster) {
                FatEntryStatus::Allocated => {}
                status if status.is_terminal() => break,
                status => {
                    return Err(FATError::InvalidChainLink {
                        value: cluster,
                        status,
                    });
                }
            }

            if !visited.insert(cluster) {
                return Err(FATError::ClusterLoop(cluster));
            }
            chain.push(cluster);

            cluster = self
                .successor(cluster)
                .ok_or(FATError::DanglingCluster(cluster))?;
        }

        trace!("Chain from cluster {start}: {chain:?}");
        Ok(chain)
    }
}
