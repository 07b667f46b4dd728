//! Decoding options.

/// Knobs controlling how strictly a volume is decoded.
///
/// The defaults apply the FAT32 rules for cluster numbers and FAT entries. Use
/// [`DecodeOptions::compat`] to read first clusters from their low word only and to
/// follow FAT entries without clearing their reserved top bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Apply the full FAT32 validation to the boot sector.
    pub validate_bpb: bool,
    /// Clear the 4 reserved top bits of FAT entries before following them.
    pub mask_fat_entries: bool,
    /// Build first cluster numbers from both the high and the low words.
    pub high_cluster_word: bool,
    /// Reject long names whose checksum does not match their short entry.
    pub strict_lfn_checksum: bool,
}

impl DecodeOptions {
    /// Options reproducing the behaviour of decoders that only read the low word
    /// of first clusters and follow raw FAT entries.
    pub fn compat() -> Self {
        DecodeOptions {
            mask_fat_entries: false,
            high_cluster_word: false,
            ..Default::default()
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            validate_bpb: false,
            mask_fat_entries: true,
            high_cluster_word: true,
            strict_lfn_checksum: false,
        }
    }
}
