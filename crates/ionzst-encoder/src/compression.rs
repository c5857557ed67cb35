use std::io::Cursor;

use crate::error::EncodeError;

/// Default zstd level for envelope chunks.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compress `data` as one self-contained zstd frame.
///
/// Frames produced here can be concatenated and still decode as a single
/// zstd stream, which is what the envelope relies on.
///
/// # Errors
///
/// Returns [`EncodeError::Compress`] if zstd rejects the level or fails.
pub fn compress_frame(data: &[u8], level: i32) -> Result<Vec<u8>, EncodeError> {
    zstd::encode_all(Cursor::new(data), level).map_err(EncodeError::Compress)
}
