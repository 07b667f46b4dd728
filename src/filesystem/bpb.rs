//! FAT32 boot sector.
//!
//! This module implements:
//! - BIOS Parameter Block (Bpb) parsing
//! - Geometry derived from the Bpb (data region, cluster to sector mapping, cluster count)
//! - Optional validation according to Microsoft's FAT32 specification

use binread::{BinRead, BinReaderExt};
use getset::CopyGetters;
use log::debug;
use std::fmt;
use std::io;

use super::fat_error::FATError;
use crate::utils;

/// Size in bytes of the boot sector read from the start of the volume.
pub const BOOT_SECTOR_SIZE: usize = 512;

/// BIOS Parameter Block structure of a FAT32 volume.
///
/// The Bpb describes the geometry of the volume. Every derived value (data region,
/// cluster count...) is recomputed from these fields on each call.
#[derive(BinRead, Debug, Clone, CopyGetters)]
#[br(little)]
pub struct Bpb {
    /// Jump instruction to boot code (must be 0xEB ?? 0x90 or 0xE9 ?? ??)
    jmp: [u8; 3],
    /// OEM identifier (e.g., "MSWIN4.1")
    oem_name: [u8; 8],
    /// Number of bytes per sector
    #[getset(get_copy = "pub")]
    bytes_per_sec: u16,
    /// Number of sectors per cluster
    #[getset(get_copy = "pub")]
    sec_per_clus: u8,
    /// Number of reserved sectors from start of volume, boot sector included
    #[getset(get_copy = "pub")]
    rsvd_sec_cnt: u16,
    /// Number of FAT copies
    #[getset(get_copy = "pub")]
    num_fat: u8,
    /// Maximum number of root directory entries (0 for FAT32)
    root_ent_cnt: u16,
    /// Total sectors for small volumes (0 for FAT32)
    tot_sec_16: u16,
    /// Media descriptor (0xF8 for fixed disk)
    media: u8,
    /// Sectors per FAT for FAT12/FAT16 (0 for FAT32)
    fat_sz_16: u16,
    /// Sectors per track
    sec_per_trk: u16,
    /// Number of heads
    num_heads: u16,
    /// Number of hidden sectors preceding the volume
    hidd_sec: u32,
    /// Total sectors of the volume
    tot_sec_32: u32,
    /// Sectors per FAT
    #[getset(get_copy = "pub")]
    fat_sz_32: u32,
    /// FAT flags (mirroring, active FAT)
    ext_flags: u16,
    /// Filesystem version (should be 0:0)
    fs_ver: u16,
    /// First cluster of the root directory
    #[getset(get_copy = "pub")]
    root_clus: u32,
    /// Sector number of FSINFO structure
    fs_info: u16,
    /// Sector number of backup boot sector
    bk_boot_sec: u16,
    reserved: [u8; 12],
    /// Drive number (0x80 for hard disk)
    drv_num: u8,
    reserved_1: u8,
    /// Extended boot signature (0x29)
    boot_sig: u8,
    /// Volume serial number
    #[getset(get_copy = "pub")]
    vol_id: u32,
    /// Volume label
    vol_lab: [u8; 11],
    /// Filesystem type label ("FAT32   ")
    fil_sys_type: [u8; 8],
    #[br(count = 420)]
    boot_code: Vec<u8>,
    /// Boot sector signature (0x55 0xAA)
    sig: [u8; 2],
}

impl Bpb {
    /// Reads the Bpb from the first sector of a stream.
    ///
    /// # Parameters
    /// - `reader`: The stream containing the volume
    /// - `validate`: Whether to apply the full FAT32 validation
    ///
    /// # Errors
    /// - `FATError::FormatError` if the stream is shorter than the boot sector or than the
    ///   declared sector size, or if the
    ///   geometry is unusable (zero sector size, zero cluster size, data region past
    ///   the end of the volume)
    /// - Various validation variants if `validate` is true
    pub fn from<T: io::Read + io::Seek>(reader: &mut T, validate: bool) -> Result<Bpb, FATError> {
        let buf = match utils::read_at(reader, 0, BOOT_SECTOR_SIZE) {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(FATError::FormatError(format!(
                    "stream is shorter than one sector ({BOOT_SECTOR_SIZE} bytes)"
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let bpb: Bpb = io::Cursor::new(buf).read_le()?;
        let bpb = bpb.check_geometry()?;

        let len = utils::stream_len(reader)?;
        if len < bpb.bytes_per_sec as u64 {
            return Err(FATError::FormatError(format!(
                "stream of {len} bytes is shorter than one sector ({} bytes)",
                bpb.bytes_per_sec
            )));
        }

        debug!(
            "Boot sector: {} bytes/sector, {} sectors/cluster, {} reserved, {} FAT(s) of {} sectors, root cluster {}",
            bpb.bytes_per_sec,
            bpb.sec_per_clus,
            bpb.rsvd_sec_cnt,
            bpb.num_fat,
            bpb.fat_sz_32,
            bpb.root_clus
        );

        if validate { bpb.validate() } else { Ok(bpb) }
    }

    /// Returns the total count of sectors of the volume.
    pub fn total_sectors(&self) -> u32 {
        if self.tot_sec_32 != 0 {
            self.tot_sec_32
        } else {
            self.tot_sec_16.into()
        }
    }

    /// Returns the size in bytes of a cluster.
    pub fn cluster_size(&self) -> usize {
        self.bytes_per_sec as usize * self.sec_per_clus as usize
    }

    /// Returns the first sector of the first FAT.
    pub fn fat_start(&self) -> u64 {
        self.rsvd_sec_cnt.into()
    }

    /// Returns the first sector of the data region.
    pub fn data_region_start(&self) -> u64 {
        self.fat_start() + self.num_fat as u64 * self.fat_sz_32 as u64
    }

    /// Converts a cluster number to its first sector.
    ///
    /// Cluster 2 is the first cluster of the data region.
    ///
    /// # Returns
    /// - `None` for clusters 0 and 1, which hold no data.
    pub fn first_sector_of_cluster(&self, cluster: u32) -> Option<u64> {
        let index = cluster.checked_sub(2)?;
        Some(index as u64 * self.sec_per_clus as u64 + self.data_region_start())
    }

    /// Returns the byte offset of a cluster in the stream, `None` for clusters 0 and 1.
    pub fn cluster_offset(&self, cluster: u32) -> Option<u64> {
        self.first_sector_of_cluster(cluster)
            .map(|sector| sector * self.bytes_per_sec as u64)
    }

    /// Determines the number of clusters in the data region.
    pub fn cluster_count(&self) -> u32 {
        let data_sec = (self.total_sectors() as u64).saturating_sub(self.data_region_start());
        (data_sec / self.sec_per_clus as u64) as u32
    }

    /// Returns the highest cluster number addressing the data region.
    pub fn max_valid_cluster(&self) -> u32 {
        self.cluster_count().saturating_add(1)
    }

    /// Returns the volume label, trimmed.
    pub fn volume_label(&self) -> String {
        String::from_utf8_lossy(&self.vol_lab).trim_end().to_string()
    }

    fn check_geometry(self) -> Result<Self, FATError> {
        if self.bytes_per_sec == 0 {
            return Err(FATError::FormatError(String::from("bytes per sector is 0")));
        }
        if self.sec_per_clus == 0 {
            return Err(FATError::FormatError(String::from("sectors per cluster is 0")));
        }
        if (self.total_sectors() as u64) < self.data_region_start() {
            return Err(FATError::FormatError(format!(
                "data region starts at sector {} beyond the {} sectors of the volume",
                self.data_region_start(),
                self.total_sectors()
            )));
        }

        Ok(self)
    }

    /// Validates the Bpb according to the FAT32 specification.
    ///
    /// # Errors
    /// - `FATError::InvalidJmp`: If the jump instruction is invalid
    /// - `FATError::InvalidBytesPerSec`: If bytes per sector is not a valid value
    /// - `FATError::InvalidSecPerClus`: If sectors per cluster is not a valid value
    /// - `FATError::InvalidClusSz`: If cluster size exceeds 32 KiB
    /// - `FATError::InvalidSignature`: If boot sector signature is not 0x55AA
    /// - `FATError::UnsupportedFATType`: If the cluster count is too small for FAT32
    fn validate(self) -> Result<Self, FATError> {
        if !((self.jmp[0] == 0xEB && self.jmp[2] == 0x90) || self.jmp[0] == 0xE9) {
            return Err(FATError::InvalidJmp(format!(
                "0x{:02X}{:02X}{:02X}",
                self.jmp[0], self.jmp[1], self.jmp[2],
            )));
        }

        const VALID_BYTES_PER_SEC: [u16; 4] = [512, 1024, 2048, 4096];
        if !VALID_BYTES_PER_SEC.contains(&self.bytes_per_sec) {
            return Err(FATError::InvalidBytesPerSec(self.bytes_per_sec));
        }

        if !self.sec_per_clus.is_power_of_two() {
            return Err(FATError::InvalidSecPerClus(self.sec_per_clus));
        }

        if self.cluster_size() > 32 * 1024 {
            return Err(FATError::InvalidClusSz(self.cluster_size() as u32));
        }

        const SIG: [u8; 2] = [0x55, 0xAA];
        if self.sig != SIG {
            return Err(FATError::InvalidSignature(format!(
                "0x{:02X}{:02X}",
                self.sig[0], self.sig[1]
            )));
        }

        match self.cluster_count() {
            n if n < 4085 => Err(FATError::UnsupportedFATType(String::from("FAT12"))),
            n if n < 65525 => Err(FATError::UnsupportedFATType(String::from("FAT16"))),
            _ => self.validate_fat32(),
        }
    }

    fn validate_fat32(self) -> Result<Self, FATError> {
        if self.rsvd_sec_cnt == 0 {
            return Err(FATError::InvalidRsvdSecCnt(self.rsvd_sec_cnt));
        }

        if self.num_fat == 0 {
            return Err(FATError::InvalidNumFat(self.num_fat));
        }

        if self.root_ent_cnt != 0 {
            return Err(FATError::InvalidRootEntCnt(self.root_ent_cnt));
        }

        if self.tot_sec_16 != 0 {
            return Err(FATError::InvalidTotSec(String::from(
                "BPB_TotSec16 should be 0 for a FAT32 volume.",
            )));
        }
        if self.tot_sec_32 == 0 {
            return Err(FATError::InvalidTotSec(String::from(
                "BPB_TotSec32 should be greater than 0 for a FAT32 volume.",
            )));
        }

        if self.fat_sz_16 != 0 {
            return Err(FATError::InvalidFatSz(String::from(
                "BPB_FATSz16 should be 0 for a FAT32 volume.",
            )));
        }
        if self.fat_sz_32 == 0 {
            return Err(FATError::InvalidFatSz(String::from(
                "BPB_FATSz32 should be greater than 0 for a FAT32 volume.",
            )));
        }

        if self.root_clus < 2 {
            return Err(FATError::InvalidRootClus(self.root_clus));
        }

        Ok(self)
    }
}

/// Prints the boot sector fields followed by the derived geometry.
impl fmt::Display for Bpb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! field {
            ($name:expr, $val:expr) => {
                writeln!(f, "  {:<22} {}", $name, $val)?
            };
        }

        writeln!(f, "Boot sector:")?;
        field!("jump", format!("{:02X?}", self.jmp));
        field!("oem name", String::from_utf8_lossy(&self.oem_name));
        field!("bytes per sector", self.bytes_per_sec);
        field!("sectors per cluster", self.sec_per_clus);
        field!("reserved sectors", self.rsvd_sec_cnt);
        field!("FAT copies", self.num_fat);
        field!("media", format!("0x{:02X}", self.media));
        field!("sectors per track", self.sec_per_trk);
        field!("heads", self.num_heads);
        field!("hidden sectors", self.hidd_sec);
        field!("total sectors", self.total_sectors());
        field!("sectors per FAT", self.fat_sz_32);
        field!("ext flags", format!("0x{:04X}", self.ext_flags));
        field!("fs version", format!("{}.{}", self.fs_ver >> 8, self.fs_ver & 0xFF));
        field!("root cluster", self.root_clus);
        field!("fs info sector", self.fs_info);
        field!("backup boot sector", self.bk_boot_sec);
        field!("drive number", format!("0x{:02X}", self.drv_num));
        field!("boot signature", format!("0x{:02X}", self.boot_sig));
        field!("volume id", format!("0x{:08X}", self.vol_id));
        field!("volume label", self.volume_label());
        field!("fs type", String::from_utf8_lossy(&self.fil_sys_type).trim_end());
        field!("signature", format!("{:02X?}", self.sig));

        writeln!(f, "Geometry:")?;
        field!("data region start", self.data_region_start());
        field!("cluster size", self.cluster_size());
        field!("cluster count", self.cluster_count());
        field!("max valid cluster", self.max_valid_cluster());

        Ok(())
    }
}
