use crate::error::WireError;

// Ion binary has four integer primitives. The variable-length ones carry
// their own terminator (high bit of the last byte); the fixed-length ones
// take their width from the enclosing value's length.
//
//   VarUInt  7 data bits per byte, big-endian, end flag 0x80 on last byte
//   VarInt   like VarUInt, but bit 0x40 of the first byte is the sign
//   UInt     plain big-endian magnitude
//   Int      big-endian magnitude, sign in the MSB of the first byte

/// Maximum bytes a `VarUInt` holding a `u64` can occupy: ceil(64 / 7).
pub const MAX_VAR_UINT_BYTES: usize = 10;

/// Encode `value` as a `VarUInt`, appending to `buf`.
///
/// # Wire format examples
///
/// | Value | Encoded bytes        |
/// |-------|----------------------|
/// | 0     | `[0x80]`             |
/// | 10    | `[0x8A]`             |
/// | 127   | `[0xFF]`             |
/// | 128   | `[0x01, 0x80]`       |
/// | 16384 | `[0x01, 0x00, 0x80]` |
pub fn encode_var_uint(value: u64, buf: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_VAR_UINT_BYTES];
    let mut n = 0;
    let mut rest = value;
    loop {
        groups[n] = (rest & 0x7F) as u8;
        n += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    // groups[0] is the least significant group; it goes out last
    groups[0] |= 0x80;
    for i in (0..n).rev() {
        buf.push(groups[i]);
    }
}

/// Encode `value` as a `VarInt`, appending to `buf`.
///
/// The first byte holds the sign and 6 magnitude bits; each following byte
/// holds 7. Use [`NEGATIVE_ZERO_VAR_INT`] for the `-0` encoding, which
/// cannot be expressed as an `i64`.
pub fn encode_var_int(value: i64, buf: &mut Vec<u8>) {
    let sign = if value < 0 { 0x40 } else { 0x00 };
    let magnitude = value.unsigned_abs();

    // bytes needed: 6 bits in the first, 7 in each of the rest
    let mut len = 1;
    while len < MAX_VAR_UINT_BYTES && magnitude >> (6 + 7 * (len - 1)) != 0 {
        len += 1;
    }

    for i in 0..len {
        let shift = 7 * (len - 1 - i);
        let mut byte = if i == 0 {
            ((magnitude >> shift) & 0x3F) as u8 | sign
        } else {
            ((magnitude >> shift) & 0x7F) as u8
        };
        if i == len - 1 {
            byte |= 0x80;
        }
        buf.push(byte);
    }
}

/// The single-byte `VarInt` for negative zero. Timestamps use it to mark an
/// unknown local offset.
pub const NEGATIVE_ZERO_VAR_INT: u8 = 0xC0;

/// Decode a `VarUInt` from the start of `buf`.
///
/// # Returns
///
/// `(value, bytes_consumed)` on success.
///
/// # Errors
///
/// - [`WireError::VarIntTooLong`] if the value overflows a `u64`.
/// - [`WireError::UnexpectedEof`] if `buf` ends before the end flag.
pub fn decode_var_uint(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let mut result: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if result > u64::MAX >> 7 {
            return Err(WireError::VarIntTooLong { offset: i });
        }
        result = (result << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 != 0 {
            return Ok((result, i + 1));
        }
    }
    Err(WireError::UnexpectedEof { offset: buf.len() })
}

/// Decode a `VarInt` from the start of `buf`.
///
/// Negative zero decodes as `0`; callers that care about it (timestamp
/// offsets) check the raw byte against [`NEGATIVE_ZERO_VAR_INT`] first.
///
/// # Errors
///
/// - [`WireError::VarIntTooLong`] if the magnitude overflows an `i64`.
/// - [`WireError::UnexpectedEof`] if `buf` ends before the end flag.
pub fn decode_var_int(buf: &[u8]) -> Result<(i64, usize), WireError> {
    let Some(&first) = buf.first() else {
        return Err(WireError::UnexpectedEof { offset: 0 });
    };
    let negative = first & 0x40 != 0;
    let mut magnitude = u64::from(first & 0x3F);
    let mut consumed = 1;

    if first & 0x80 == 0 {
        loop {
            let Some(&byte) = buf.get(consumed) else {
                return Err(WireError::UnexpectedEof { offset: consumed });
            };
            if magnitude > u64::MAX >> 7 {
                return Err(WireError::VarIntTooLong { offset: consumed });
            }
            magnitude = (magnitude << 7) | u64::from(byte & 0x7F);
            consumed += 1;
            if byte & 0x80 != 0 {
                break;
            }
        }
    }

    let value = i64::try_from(magnitude).map_err(|_| WireError::VarIntTooLong { offset: 0 })?;
    Ok((if negative { -value } else { value }, consumed))
}

/// Decode a fixed-width `UInt` occupying all of `bytes`.
///
/// An empty slice is zero.
///
/// # Errors
///
/// Returns [`WireError::UIntTooLong`] if more than 8 significant bytes
/// are present.
pub fn decode_uint(bytes: &[u8]) -> Result<u64, WireError> {
    let significant = trim_leading_zeros(bytes);
    if significant.len() > 8 {
        return Err(WireError::UIntTooLong { len: bytes.len() });
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Encode `value` as a minimal-width `UInt` (zero encodes as no bytes).
pub fn encode_uint(value: u64, buf: &mut Vec<u8>) {
    let bytes = value.to_be_bytes();
    buf.extend_from_slice(trim_leading_zeros(&bytes));
}

/// Split a sign-and-magnitude `Int` into its sign and trimmed big-endian
/// magnitude. Negative zero keeps its sign.
pub fn decode_int(bytes: &[u8]) -> (bool, Vec<u8>) {
    let Some((&first, rest)) = bytes.split_first() else {
        return (false, Vec::new());
    };
    let negative = first & 0x80 != 0;
    let mut magnitude = Vec::with_capacity(bytes.len());
    magnitude.push(first & 0x7F);
    magnitude.extend_from_slice(rest);
    (negative, trim_leading_zeros(&magnitude).to_vec())
}

/// Encode a sign-and-magnitude `Int` from a big-endian magnitude.
///
/// A positive zero encodes as no bytes; a negative zero as `[0x80]`.
pub fn encode_int(negative: bool, magnitude: &[u8], buf: &mut Vec<u8>) {
    let magnitude = trim_leading_zeros(magnitude);
    if magnitude.is_empty() {
        if negative {
            buf.push(0x80);
        }
        return;
    }
    // the sign bit needs room of its own when the top bit is taken
    let start = buf.len();
    if magnitude[0] & 0x80 != 0 {
        buf.push(0x00);
    }
    buf.extend_from_slice(magnitude);
    if negative {
        buf[start] |= 0x80;
    }
}

/// Strip leading zero bytes from a big-endian magnitude.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}
