use std::io::{Read, Write};

use ionzst_decoder::BinaryReader;

use crate::config::TextStyle;
use crate::error::DriverError;
use crate::text_writer::TextWriter;

/// Decode an Ion binary stream from `input` and write every top-level
/// value to `output` as Ion text, in order. Returns the number of values
/// written.
///
/// The stream must start with the version marker; an empty stream writes
/// nothing. Decoding stops at the first error. The sink is flushed after
/// the last value.
///
/// # Errors
///
/// [`DriverError::Decode`] for anything that is not clean end of input at
/// a value boundary, [`DriverError::Output`] if the sink fails.
pub fn render<R: Read, W: Write>(
    input: R,
    output: W,
    style: TextStyle,
) -> Result<u64, DriverError> {
    let mut reader = BinaryReader::new(input);
    let mut writer = TextWriter::new(output, style);
    while let Some(element) = reader.next_element()? {
        writer.write_element(&element)?;
    }
    let values = writer.values_written();
    writer.finish()?;
    Ok(values)
}
