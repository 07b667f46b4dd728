//! In-memory FAT32 image builder shared by the integration tests.
//!
//! Geometry: 512 bytes per sector, 1 sector per cluster, 32 reserved sectors, 2 FATs of
//! 1 sector (128 entries) and 64 data clusters. Cluster 2 is the root directory.

#![allow(dead_code)]

use fat_explorer::filesystem::lfn::short_name_checksum;
use std::collections::BTreeMap;

pub const BYTES_PER_SEC: usize = 512;
pub const RSVD_SEC_CNT: usize = 32;
pub const NUM_FAT: usize = 2;
pub const FAT_SZ: usize = 1;
pub const DATA_START: usize = RSVD_SEC_CNT + NUM_FAT * FAT_SZ;
pub const CLUSTER_CNT: usize = 64;
pub const TOTAL_SECTORS: usize = DATA_START + CLUSTER_CNT;
pub const ROOT_CLUSTER: u32 = 2;
pub const EOC: u32 = 0x0FFF_FFFF;

pub struct ImageBuilder {
    fat: Vec<u32>,
    clusters: BTreeMap<u32, Vec<u8>>,
}

impl ImageBuilder {
    /// Creates an image whose root directory is the single cluster 2, left empty.
    pub fn new() -> Self {
        let mut fat = vec![0u32; FAT_SZ * BYTES_PER_SEC / 4];
        fat[0] = 0x0FFF_FFF8;
        fat[1] = EOC;
        fat[ROOT_CLUSTER as usize] = EOC;

        ImageBuilder {
            fat,
            clusters: BTreeMap::new(),
        }
    }

    /// Sets a raw FAT entry.
    pub fn set_fat(&mut self, cluster: u32, value: u32) -> &mut Self {
        self.fat[cluster as usize] = value;
        self
    }

    /// Links clusters in order, the last one ending the chain.
    pub fn link(&mut self, chain: &[u32]) -> &mut Self {
        for pair in chain.windows(2) {
            self.fat[pair[0] as usize] = pair[1];
        }
        if let Some(&last) = chain.last() {
            self.fat[last as usize] = EOC;
        }
        self
    }

    /// Spreads `bytes` over the clusters of `chain` and links them.
    pub fn write_chain(&mut self, chain: &[u32], bytes: &[u8]) -> &mut Self {
        assert!(bytes.len() <= chain.len() * BYTES_PER_SEC, "chain too short");
        for (i, &cluster) in chain.iter().enumerate() {
            let start = (i * BYTES_PER_SEC).min(bytes.len());
            let end = ((i + 1) * BYTES_PER_SEC).min(bytes.len());
            self.clusters.insert(cluster, bytes[start..end].to_vec());
        }
        self.link(chain)
    }

    /// Serializes the image.
    pub fn build(&self) -> Vec<u8> {
        let mut img = vec![0u8; TOTAL_SECTORS * BYTES_PER_SEC];

        img[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        img[3..11].copy_from_slice(b"MSWIN4.1");
        img[11..13].copy_from_slice(&(BYTES_PER_SEC as u16).to_le_bytes());
        img[13] = 1;
        img[14..16].copy_from_slice(&(RSVD_SEC_CNT as u16).to_le_bytes());
        img[16] = NUM_FAT as u8;
        img[21] = 0xF8;
        img[32..36].copy_from_slice(&(TOTAL_SECTORS as u32).to_le_bytes());
        img[36..40].copy_from_slice(&(FAT_SZ as u32).to_le_bytes());
        img[44..48].copy_from_slice(&ROOT_CLUSTER.to_le_bytes());
        img[66] = 0x29;
        img[71..82].copy_from_slice(b"TESTIMAGE  ");
        img[82..90].copy_from_slice(b"FAT32   ");
        img[510] = 0x55;
        img[511] = 0xAA;

        for copy in 0..NUM_FAT {
            let fat_off = (RSVD_SEC_CNT + copy * FAT_SZ) * BYTES_PER_SEC;
            for (i, value) in self.fat.iter().enumerate() {
                img[fat_off + i * 4..fat_off + i * 4 + 4].copy_from_slice(&value.to_le_bytes());
            }
        }

        for (&cluster, bytes) in &self.clusters {
            let off = (DATA_START + cluster as usize - 2) * BYTES_PER_SEC;
            img[off..off + bytes.len()].copy_from_slice(bytes);
        }

        img
    }
}

/// Encodes a short directory entry.
pub fn short_entry(name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 32];
    buf[0..11].copy_from_slice(name);
    buf[11] = attr;
    buf[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    buf[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
    buf[28..32].copy_from_slice(&size.to_le_bytes());
    buf
}

/// Encodes a file entry.
pub fn file_entry(name: &[u8; 11], cluster: u32, size: u32) -> Vec<u8> {
    short_entry(name, 0x20, cluster, size)
}

/// Encodes a directory entry.
pub fn dir_entry(name: &[u8; 11], cluster: u32) -> Vec<u8> {
    short_entry(name, 0x10, cluster, 0)
}

/// Encodes the `.` and `..` entries of a directory.
pub fn dot_entries(own: u32, parent: u32) -> Vec<u8> {
    let mut buf = dir_entry(b".          ", own);
    buf.extend(dir_entry(b"..         ", parent));
    buf
}

/// Encodes the long name fragments of `long_name`, in on-disk order, followed by the
/// short entry they describe.
pub fn long_name_entries(long_name: &str, short: Vec<u8>) -> Vec<u8> {
    let short_name: [u8; 11] = short[0..11].try_into().unwrap();
    let checksum = short_name_checksum(&short_name);
    let units: Vec<u16> = long_name.encode_utf16().collect();
    let chunks: Vec<&[u16]> = units.chunks(13).collect();
    let offsets = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

    let mut buf = vec![];
    for (i, chunk) in chunks.iter().enumerate().rev() {
        let mut padded = chunk.to_vec();
        if padded.len() < 13 {
            padded.push(0);
        }
        padded.resize(13, 0xFFFF);

        let mut fragment = vec![0u8; 32];
        fragment[0] = i as u8 + 1;
        if i == chunks.len() - 1 {
            fragment[0] |= 0x40;
        }
        fragment[11] = 0x0F;
        fragment[13] = checksum;
        for (unit, off) in padded.iter().zip(offsets) {
            fragment[off..off + 2].copy_from_slice(&unit.to_le_bytes());
        }
        buf.extend(fragment);
    }
    buf.extend(short);
    buf
}

/// Concatenates directory entries.
pub fn directory(entries: &[Vec<u8>]) -> Vec<u8> {
    entries.concat()
}

/// Root with `SUB/` holding `A.TXT` ("hello").
pub fn sub_image() -> ImageBuilder {
    let mut img = ImageBuilder::new();
    img.write_chain(&[2], &directory(&[dir_entry(b"SUB        ", 3)]));
    img.write_chain(
        &[3],
        &directory(&[dot_entries(3, 0), file_entry(b"A       TXT", 4, 5)]),
    );
    img.write_chain(&[4], b"hello");
    img
}
