use ionzst_types::{IonType, TypeError};
use ionzst_wire::WireError;

/// Errors that can occur while reading Ion binary or unwrapping an
/// `ion.zst` payload.
///
/// Offsets count bytes from the start of the stream handed to the reader.
///
/// ```text
///   DecodeError
///   ├── MissingMarker          ← stream does not start with E0 01 00 EA
///   ├── UnsupportedVersion     ← E0 xx yy EA for a version other than 1.0
///   ├── UnexpectedEof          ← input ended inside a value
///   ├── InvalidDescriptor      ← reserved type code or impossible length
///   ├── UnexpectedType         ← e.g. a non-blob value in the envelope
///   ├── Malformed              ← value body does not match its type
///   ├── InvalidUtf8            ← string or symbol table text
///   ├── SymbolOutOfRange       ← symbol ID beyond the current table
///   ├── DecompressFailed       ← zstd rejected the fragment stream
///   ├── Output                 ← the sink failed
///   ├── Type(TypeError)        ← value violates the data model
///   ├── Wire(WireError)        ← primitive decoding
///   └── Io(std::io::Error)     ← reading the source failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("input does not start with an Ion binary version marker")]
    MissingMarker,

    #[error("unsupported Ion version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: u64 },

    #[error("invalid type descriptor 0x{byte:02X} at offset {offset}")]
    InvalidDescriptor { byte: u8, offset: u64 },

    #[error("expected {expected} at offset {offset}, found {found}")]
    UnexpectedType {
        expected: IonType,
        found: IonType,
        offset: u64,
    },

    #[error("malformed value at offset {offset}: {reason}")]
    Malformed { reason: &'static str, offset: u64 },

    #[error("invalid UTF-8 text at offset {offset}")]
    InvalidUtf8 { offset: u64 },

    #[error("symbol ID {sid} at offset {offset} is not defined (max ID {max_id})")]
    SymbolOutOfRange { sid: u64, max_id: u64, offset: u64 },

    #[error("zstd decompression failed")]
    DecompressFailed(#[source] std::io::Error),

    #[error("writing output failed")]
    Output(#[source] std::io::Error),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
