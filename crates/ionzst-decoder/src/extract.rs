use std::io::{Read, Write};

use ionzst_types::IonType;

use crate::binary_reader::BinaryReader;
use crate::error::DecodeError;

/// Counters reported by [`extract`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Top-level blobs seen, `null.blob` included.
    pub blobs: u64,
    /// Blob bytes written to the sink.
    pub bytes: u64,
}

/// Unwrap an `ion.zst` payload: write the bytes of every top-level blob to
/// `output`, in order.
///
/// `input` must start with the version marker (see
/// [`MarkerReader`](ionzst_wire::MarkerReader)). Annotations on blobs are
/// ignored and `null.blob` contributes nothing. The sink is flushed once
/// the input is exhausted.
///
/// # Errors
///
/// - [`DecodeError::UnexpectedType`] for the first top-level value that is
///   not a blob; nothing after it is written.
/// - [`DecodeError::Output`] when the sink fails; reading stops.
/// - Any framing error from [`BinaryReader`].
pub fn extract<R: Read, W: Write>(input: R, mut output: W) -> Result<ExtractStats, DecodeError> {
    let mut reader = BinaryReader::new(input);
    let mut stats = ExtractStats::default();

    while let Some(raw) = reader.next_raw()? {
        if raw.ion_type() != IonType::Blob {
            return Err(DecodeError::UnexpectedType {
                expected: IonType::Blob,
                found: raw.ion_type(),
                offset: raw.offset,
            });
        }
        let body = reader.body(&raw);
        output.write_all(body).map_err(DecodeError::Output)?;
        stats.blobs += 1;
        stats.bytes += body.len() as u64;
    }

    output.flush().map_err(DecodeError::Output)?;
    Ok(stats)
}
