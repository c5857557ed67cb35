use std::io::{BufRead, BufReader, ErrorKind, Read, Write};

use crate::error::DecodeError;

const CHUNK_SIZE: usize = 128 * 1024;

/// Decompress a zstd stream of one or more concatenated frames from
/// `input` into `output`, returning the number of bytes written.
///
/// Empty input is an empty stream. The decoder is dropped on return,
/// whether or not decoding succeeded.
///
/// # Errors
///
/// - [`DecodeError::DecompressFailed`] for corrupt or truncated frames, or
///   when reading `input` fails.
/// - [`DecodeError::Output`] when the sink fails.
pub fn decompress<R: Read, W: Write>(input: R, mut output: W) -> Result<u64, DecodeError> {
    let mut input = BufReader::with_capacity(CHUNK_SIZE, input);
    if input.fill_buf().map_err(DecodeError::DecompressFailed)?.is_empty() {
        output.flush().map_err(DecodeError::Output)?;
        return Ok(0);
    }

    let mut decoder =
        zstd::stream::read::Decoder::with_buffer(input).map_err(DecodeError::DecompressFailed)?;
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = match decoder.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::DecompressFailed(e)),
        };
        output.write_all(&chunk[..n]).map_err(DecodeError::Output)?;
        written += n as u64;
    }

    output.flush().map_err(DecodeError::Output)?;
    Ok(written)
}
