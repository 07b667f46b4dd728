use std::io::{self, Read, Seek, SeekFrom};

/// Reads `len` bytes from a reader starting at a byte offset.
///
/// The read owns the cursor for its duration: it seeks to `offset`, reads exactly
/// `len` bytes and returns them. The range is checked against the length of the
/// stream before any buffer is allocated.
///
/// # Arguments
///
/// - `reader`: The stream to read from.
/// - `offset`: The absolute offset in bytes of the first byte to read.
/// - `len`: The number of bytes to read.
///
/// # Errors
///
/// Returns an `io::Error` if the seek fails or fewer than `len` bytes are available,
/// of kind `UnexpectedEof` when the range ends past the stream.
pub fn read_at<T: Read + Seek>(reader: &mut T, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    let end = stream_len(reader)?;
    if offset.saturating_add(len as u64) > end {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Failed to read {len} bytes at offset {offset}: the stream ends at byte {end}"),
        ));
    }

    let mut buffer = vec![0; len];

    reader.seek(SeekFrom::Start(offset))?;

    reader.read_exact(&mut buffer).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Failed to read {len} bytes at offset {offset}: {err}"),
        )
    })?;

    Ok(buffer)
}

/// Returns the length in bytes of a stream.
///
/// The cursor is left at the end of the stream.
pub fn stream_len<T: Seek>(reader: &mut T) -> io::Result<u64> {
    reader.seek(SeekFrom::End(0))
}

/// Extracts a 32-bit unsigned integer from a buffer at a given offset.
///
/// # Arguments
///
/// - `buffer`: A slice of bytes from which the value will be extracted.
/// - `offset`: The offset within the buffer where the 32-bit value starts.
///
/// # Panics
///
/// Panics if the slice does not contain enough bytes starting from the offset.
pub fn u32_at(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(
        buffer[offset..offset + 4]
            .try_into()
            .expect("invalid slice"),
    )
}
