use ionzst_types::{Element, Value};
use ionzst_wire::descriptor::TypeCode;

use crate::binary_writer::{self, BinaryWriter};
use crate::compression::{self, DEFAULT_COMPRESSION_LEVEL};
use crate::error::EncodeError;

/// Builds `ion.zst` objects.
///
/// Records are grouped into chunks; each chunk is encoded as a standalone
/// Ion binary stream, compressed into one zstd frame, and stored as a
/// top-level blob of the payload.
///
/// ```text
/// ┌──────────────────────────────┬─────────────┬───────────────────┐
/// │ payload (blobs, no marker)   │ trailer     │ u32le(trailer len)│
/// └──────────────────────────────┴─────────────┴───────────────────┘
/// ```
///
/// The trailer is an Ion binary struct describing the blobs; readers only
/// rely on its length.
pub struct EnvelopeBuilder {
    payload: Vec<u8>,
    blob_offsets: Vec<usize>,
    level: i32,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self {
            payload: Vec::new(),
            blob_offsets: Vec::new(),
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Set the zstd level for subsequent chunks.
    pub fn compression_level(&mut self, level: i32) -> &mut Self {
        self.level = level;
        self
    }

    /// Append `bytes` verbatim as a top-level blob.
    pub fn add_blob(&mut self, bytes: &[u8]) -> &mut Self {
        self.blob_offsets.push(self.payload.len());
        let mut blob = Vec::with_capacity(bytes.len() + 10);
        write_blob_header(bytes.len(), &mut blob);
        blob.extend_from_slice(bytes);
        self.payload.extend_from_slice(&blob);
        self
    }

    /// Encode `records` as one Ion binary stream and add it as a single
    /// compressed blob.
    ///
    /// # Errors
    ///
    /// Encoding or compression failures.
    pub fn add_chunk(&mut self, records: &[Element]) -> Result<&mut Self, EncodeError> {
        let ion = binary_writer::encode(records)?;
        let frame = compression::compress_frame(&ion, self.level)?;
        Ok(self.add_blob(&frame))
    }

    /// Append any value at top level of the payload, blob or not.
    ///
    /// Readers reject non-blob values; this exists to produce such objects.
    ///
    /// # Errors
    ///
    /// Encoding failures.
    pub fn add_value(&mut self, element: &Element) -> Result<&mut Self, EncodeError> {
        let mut writer = BinaryWriter::without_marker();
        writer.write(element)?;
        if matches!(element.value, Value::Blob(_)) {
            self.blob_offsets.push(self.payload.len());
        }
        self.payload.extend_from_slice(&writer.finish()?);
        Ok(self)
    }

    /// Number of blobs added so far.
    pub fn blob_count(&self) -> usize {
        self.blob_offsets.len()
    }

    /// Assemble payload, the default trailer, and the trailer offset.
    ///
    /// # Errors
    ///
    /// Encoding failures, or a trailer too large for a `u32` offset.
    pub fn build(&self) -> Result<Vec<u8>, EncodeError> {
        let trailer = self.trailer()?;
        self.build_with_trailer(&trailer)
    }

    /// Assemble payload, the given raw trailer bytes, and the trailer offset.
    ///
    /// # Errors
    ///
    /// [`EncodeError::TrailerTooLarge`] if `trailer` exceeds `u32::MAX` bytes.
    pub fn build_with_trailer(&self, trailer: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let len = u32::try_from(trailer.len())
            .map_err(|_| EncodeError::TrailerTooLarge { len: trailer.len() })?;
        let mut out = Vec::with_capacity(self.payload.len() + trailer.len() + 4);
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(trailer);
        out.extend_from_slice(&len.to_le_bytes());
        Ok(out)
    }

    fn trailer(&self) -> Result<Vec<u8>, EncodeError> {
        let offsets = self
            .blob_offsets
            .iter()
            .map(|&offset| Element::from(i64::try_from(offset).unwrap_or(i64::MAX)))
            .collect();
        let trailer = Element::structure([
            ("version", Element::from(1i64)),
            ("algo", Element::from("zstd")),
            ("blobs", Element::new(Value::List(offsets))),
        ]);
        binary_writer::encode([&trailer])
    }
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_blob_header(len: usize, out: &mut Vec<u8>) {
    out.push(ionzst_wire::TypeDescriptor::byte_for(TypeCode::Blob, len));
    if len >= 14 {
        ionzst_wire::varint::encode_var_uint(len as u64, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_blobs_and_trailer_offset() {
        let object = EnvelopeBuilder::new()
            .add_blob(b"ab")
            .build_with_trailer(b"xyz")
            .unwrap();
        assert_eq!(object, vec![0xA2, b'a', b'b', b'x', b'y', b'z', 3, 0, 0, 0]);
    }

    #[test]
    fn empty_trailer() {
        let object = EnvelopeBuilder::new().build_with_trailer(&[]).unwrap();
        assert_eq!(object, vec![0, 0, 0, 0]);
    }

    #[test]
    fn trailer_length_matches_offset() {
        let mut builder = EnvelopeBuilder::new();
        builder.add_chunk(&[Element::from(1i64)]).unwrap();
        builder.add_chunk(&[Element::from(2i64)]).unwrap();
        assert_eq!(builder.blob_count(), 2);

        let object = builder.build().unwrap();
        let n = object.len();
        let offset = u32::from_le_bytes(object[n - 4..].try_into().unwrap()) as usize;
        let trailer = &object[n - 4 - offset..n - 4];
        assert_eq!(&trailer[..4], &[0xE0, 0x01, 0x00, 0xEA]);
    }

    #[test]
    fn chunks_are_zstd_frames() {
        let mut builder = EnvelopeBuilder::new();
        builder.add_chunk(&[Element::from("hello")]).unwrap();
        let object = builder.build_with_trailer(&[]).unwrap();
        // blob header (length < 14 or VarUInt), then the zstd magic
        let start = if object[0] & 0x0F == 14 { 2 } else { 1 };
        assert_eq!(&object[start..start + 4], &[0x28, 0xB5, 0x2F, 0xFD]);
    }

    #[test]
    fn compression_level_keeps_content() {
        let chunk: Vec<Element> = (0..200i64).map(Element::from).collect();
        let frames: Vec<Vec<u8>> = [1, 19]
            .into_iter()
            .map(|level| {
                let mut builder = EnvelopeBuilder::new();
                builder.compression_level(level).add_chunk(&chunk).unwrap();
                let object = builder.build_with_trailer(&[]).unwrap();
                let start = object
                    .windows(4)
                    .position(|w| w == [0x28, 0xB5, 0x2F, 0xFD])
                    .unwrap();
                zstd::decode_all(&object[start..object.len() - 4]).unwrap()
            })
            .collect();
        assert_eq!(frames[0], frames[1]);
    }

    #[test]
    fn add_value_accepts_non_blobs() {
        let object = EnvelopeBuilder::new()
            .add_value(&Element::from(1i64))
            .unwrap()
            .build_with_trailer(&[])
            .unwrap();
        assert_eq!(object, vec![0x21, 0x01, 0, 0, 0, 0]);
    }
}
