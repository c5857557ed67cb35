use ionzst_types::TypeError;

/// Errors that can occur while producing Ion binary or `ion.zst` objects.
///
/// ```text
///   EncodeError
///   ├── UnknownSymbolId     ← Symbol::Unknown(sid) beyond the symbol table
///   ├── TrailerTooLarge     ← trailer length does not fit the u32 offset
///   ├── Compress(io::Error) ← zstd failed
///   └── Type(TypeError)     ← e.g. timestamp that cannot be moved to UTC
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("symbol ID {sid} is not defined (max ID {max_id})")]
    UnknownSymbolId { sid: u64, max_id: u64 },

    #[error("trailer of {len} bytes does not fit a 32-bit offset")]
    TrailerTooLarge { len: usize },

    #[error("zstd compression failed")]
    Compress(#[source] std::io::Error),

    #[error(transparent)]
    Type(#[from] TypeError),
}
