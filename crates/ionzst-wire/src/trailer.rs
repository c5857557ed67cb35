use crate::error::WireError;

// Layout of an `ion.zst` object:
//
// ┌─────────────────────────┬────────────────────┬──────────────┐
// │ payload (Ion blobs)     │ trailer            │ offset (u32) │
// └─────────────────────────┴────────────────────┴──────────────┘
//                            ◀──── offset ──────▶ ◀── 4 bytes ─▶
//
// The offset stored in the last 4 bytes (little-endian) is the distance
// from the start of the trailer to the start of the offset field.

/// Width of the trailer offset field at the end of every object.
pub const TRAILER_OFFSET_SIZE: u64 = 4;

/// Decode the little-endian trailer offset from the object's last 4 bytes.
///
/// # Errors
///
/// Returns [`WireError::UnexpectedEof`] if `tail` is shorter than 4 bytes.
pub fn decode_trailer_offset(tail: &[u8]) -> Result<u32, WireError> {
    let bytes: [u8; 4] = tail
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(WireError::UnexpectedEof { offset: tail.len() })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Length of the payload region: `total_size - offset - 4`.
///
/// # Errors
///
/// - [`WireError::ObjectTooSmall`] if the object cannot hold the offset.
/// - [`WireError::TrailerOffsetOutOfRange`] if the result would be negative.
pub fn payload_length(total_size: u64, offset: u32) -> Result<u64, WireError> {
    let before_offset = total_size
        .checked_sub(TRAILER_OFFSET_SIZE)
        .ok_or(WireError::ObjectTooSmall { size: total_size })?;
    before_offset
        .checked_sub(u64::from(offset))
        .ok_or(WireError::TrailerOffsetOutOfRange {
            offset,
            size: total_size,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_little_endian() {
        assert_eq!(decode_trailer_offset(&[0x10, 0x00, 0x00, 0x00]).unwrap(), 16);
        assert_eq!(decode_trailer_offset(&[0x00, 0x01, 0x00, 0x00]).unwrap(), 256);
    }

    #[test]
    fn short_tail_is_rejected() {
        assert!(matches!(
            decode_trailer_offset(&[1, 2, 3]),
            Err(WireError::UnexpectedEof { offset: 3 })
        ));
    }

    #[test]
    fn payload_length_subtracts_trailer_and_offset() {
        assert_eq!(payload_length(100, 16).unwrap(), 80);
        assert_eq!(payload_length(4, 0).unwrap(), 0);
        assert_eq!(payload_length(20, 16).unwrap(), 0);
    }

    #[test]
    fn payload_length_never_clamps() {
        assert!(matches!(
            payload_length(20, 17),
            Err(WireError::TrailerOffsetOutOfRange { offset: 17, size: 20 })
        ));
        assert!(matches!(
            payload_length(10, u32::MAX),
            Err(WireError::TrailerOffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn tiny_object_is_its_own_error() {
        assert!(matches!(
            payload_length(3, 0),
            Err(WireError::ObjectTooSmall { size: 3 })
        ));
    }
}
