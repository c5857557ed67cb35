/// Errors raised while reading or writing Ion binary primitives and the
/// object trailer.
///
/// Every variant that points into a byte stream carries the offset where
/// the problem was found, counted from the start of the buffer handed to
/// the failing function.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A `VarUInt`/`VarInt` did not terminate before overflowing 64 bits.
    #[error("variable-length integer too long at offset {offset}")]
    VarIntTooLong { offset: usize },

    /// Input ended before a complete primitive could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A fixed-width `UInt` was wider than the 8 bytes a `u64` can hold.
    #[error("unsigned integer of {len} bytes does not fit in 64 bits")]
    UIntTooLong { len: usize },

    /// The object is too small to hold the 4-byte trailer offset.
    #[error("object of {size} bytes is too small to hold a trailer offset")]
    ObjectTooSmall { size: u64 },

    /// The trailer offset points before the start of the object.
    #[error("trailer offset {offset} exceeds object size {size} minus 4")]
    TrailerOffsetOutOfRange { offset: u32, size: u64 },
}
