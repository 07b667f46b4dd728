//! Directory scanning.
//!
//! The bytes of a directory's cluster chain are a sequence of 32-byte entries. Deleted
//! entries are skipped, the first end marker stops the scan, and long filename fragments
//! are gathered and paired with the short entry that follows them.

use log::{debug, warn};

use super::dir_entry::{
    ATTR_LONG_NAME, DELETED_MARKER, DIR_ENTRY_SIZE, DirEntry, DirectoryRecord, END_MARKER,
};
use super::fat_error::FATError;
use super::lfn::{self, LfnEntry};
use super::options::DecodeOptions;

/// Decodes the records of a directory, in on-disk order.
///
/// # Parameters
/// - `bytes`: The content of the directory's cluster chain
/// - `options`: The decoding options (cluster addressing, checksum policy)
///
/// # Errors
/// - `FATError::NameDecodeError` if a long name sequence is inconsistent
pub fn scan_directory(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Vec<DirectoryRecord>, FATError> {
    let mut records = vec![];
    let mut entries = bytes.chunks_exact(DIR_ENTRY_SIZE);

    while let Some(raw) = entries.next() {
        match raw[0] {
            DELETED_MARKER => continue,
            END_MARKER => break,
            _ => {}
        }

        let record = if raw[11] == ATTR_LONG_NAME {
            decode_long_name_entry(raw, &mut entries, options)?
        } else {
            DirEntry::from_slice(raw)?.into_record(None, options.high_cluster_word)
        };
        records.push(record);
    }

    debug!(
        "Scanned {} entries: {} records",
        bytes.len() / DIR_ENTRY_SIZE,
        records.len()
    );
    Ok(records)
}

/// Returns `true` if a raw entry is a live long filename fragment.
fn is_fragment(raw: &[u8]) -> bool {
    raw[11] == ATTR_LONG_NAME && raw[0] != DELETED_MARKER && raw[0] != END_MARKER
}

/// Decodes a long filename sequence starting at `first` and the short entry after it.
fn decode_long_name_entry<'a, I: Iterator<Item = &'a [u8]>>(
    first: &[u8],
    entries: &mut I,
    options: &DecodeOptions,
) -> Result<DirectoryRecord, FATError> {
    let first = LfnEntry::from_slice(first)?;
    let seq_size = first.ordinal();
    if seq_size == 0 {
        return Err(FATError::NameDecodeError(String::from(
            "long name fragment with ordinal 0",
        )));
    }
    if !first.is_last_logical() {
        debug!("Long name sequence of {seq_size} fragments starts without the last-fragment flag");
    }

    let mut fragments = vec![first];
    for expected in (1..seq_size).rev() {
        let raw = match entries.next() {
            Some(raw) if is_fragment(raw) => raw,
            _ => {
                return Err(FATError::NameDecodeError(format!(
                    "fragment {expected} of a {seq_size}-fragment long name is missing"
                )));
            }
        };

        let fragment = LfnEntry::from_slice(raw)?;
        if fragment.ordinal() != expected {
            return Err(FATError::NameDecodeError(format!(
                "fragment {} found where fragment {expected} was expected",
                fragment.ordinal()
            )));
        }
        fragments.push(fragment);
    }

    let entry = match entries.next() {
        Some(raw) if raw[0] != DELETED_MARKER && raw[0] != END_MARKER && !is_fragment(raw) => {
            DirEntry::from_slice(raw)?
        }
        _ => {
            return Err(FATError::NameDecodeError(String::from(
                "long name is not followed by its short entry",
            )));
        }
    };

    let long_name = lfn::assemble(&fragments)?;

    let checksum = entry.checksum();
    if fragments.iter().any(|fragment| fragment.checksum() != checksum) {
        let msg = format!(
            "checksum of long name {long_name:?} does not match short entry {:?} (0x{checksum:02X})",
            entry.short_name()
        );
        if options.strict_lfn_checksum {
            return Err(FATError::NameDecodeError(msg));
        }
        warn!("{msg}");
    }

    Ok(entry.into_record(Some(long_name), options.high_cluster_word))
}
