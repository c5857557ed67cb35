use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::{Buf, Bytes};
use ionzst_wire::trailer::{TRAILER_OFFSET_SIZE, decode_trailer_offset, payload_length};
use ionzst_wire::WireError;

use crate::error::PipelineError;

/// A stored object the dump pipeline can read.
///
/// The pipeline asks for the size and the last four bytes once, then
/// streams the payload sequentially from the start. Nothing is retried.
pub trait ObjectSource {
    type Reader: Read + Send;

    /// Total object size in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Exactly `len` bytes starting at `start`.
    fn read_range(&self, start: u64, len: u64) -> io::Result<Vec<u8>>;

    /// A sequential reader over the first `len` bytes. The trailer past
    /// `len` is never fetched.
    fn open(&self, len: u64) -> io::Result<Self::Reader>;
}

/// Length of the payload that precedes the trailer of `source`.
///
/// Reads the little-endian `u32` in the last four bytes (the trailer
/// length) and returns `size - offset - 4`.
///
/// # Errors
///
/// - [`PipelineError::Source`] if the size or tail cannot be read.
/// - [`PipelineError::Trailer`] with [`WireError::ObjectTooSmall`] for
///   objects under four bytes, or [`WireError::TrailerOffsetOutOfRange`]
///   when the offset points before the start of the object.
pub fn size_without_trailer<S: ObjectSource + ?Sized>(source: &S) -> Result<u64, PipelineError> {
    let size = source.size().map_err(PipelineError::Source)?;
    if size < TRAILER_OFFSET_SIZE {
        return Err(WireError::ObjectTooSmall { size }.into());
    }
    let tail = source
        .read_range(size - TRAILER_OFFSET_SIZE, TRAILER_OFFSET_SIZE)
        .map_err(PipelineError::Source)?;
    let offset = decode_trailer_offset(&tail)?;
    Ok(payload_length(size, offset)?)
}

/// An object held in memory.
#[derive(Clone, Debug)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ObjectSource for MemorySource {
    type Reader = bytes::buf::Reader<Bytes>;

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_range(&self, start: u64, len: u64) -> io::Result<Vec<u8>> {
        let range = usize::try_from(start)
            .ok()
            .zip(usize::try_from(len).ok())
            .and_then(|(start, len)| Some(start..start.checked_add(len)?))
            .filter(|range| range.end <= self.data.len())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "range past end of object")
            })?;
        Ok(self.data[range].to_vec())
    }

    fn open(&self, len: u64) -> io::Result<Self::Reader> {
        let end = usize::try_from(len)
            .ok()
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "range past end of object")
            })?;
        Ok(self.data.slice(..end).reader())
    }
}

/// An object stored in a local file.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObjectSource for FileSource {
    type Reader = io::Take<BufReader<File>>;

    fn size(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn read_range(&self, start: u64, len: u64) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::new();
        file.take(len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "range past end of object",
            ));
        }
        Ok(buf)
    }

    fn open(&self, len: u64) -> io::Result<Self::Reader> {
        Ok(BufReader::new(File::open(&self.path)?).take(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_length_from_trailer() {
        // 6 payload bytes, 3 trailer bytes, offset 3
        let source = MemorySource::new(vec![1, 2, 3, 4, 5, 6, 9, 9, 9, 3, 0, 0, 0]);
        assert_eq!(size_without_trailer(&source).unwrap(), 6);
    }

    #[test]
    fn empty_trailer() {
        let source = MemorySource::new(vec![0u8, 0, 0, 0]);
        assert_eq!(size_without_trailer(&source).unwrap(), 0);
    }

    #[test]
    fn too_small() {
        let source = MemorySource::new(vec![0u8, 0, 0]);
        assert!(matches!(
            size_without_trailer(&source),
            Err(PipelineError::Trailer(WireError::ObjectTooSmall { size: 3 }))
        ));
    }

    #[test]
    fn offset_out_of_range() {
        let source = MemorySource::new(vec![1u8, 2, 5, 0, 0, 0]);
        assert!(matches!(
            size_without_trailer(&source),
            Err(PipelineError::Trailer(WireError::TrailerOffsetOutOfRange {
                offset: 5,
                size: 6
            }))
        ));
    }

    #[test]
    fn memory_ranges() {
        let source = MemorySource::new(b"abcdef".to_vec());
        assert_eq!(source.read_range(2, 3).unwrap(), b"cde");
        assert!(source.read_range(4, 3).is_err());
        let mut all = Vec::new();
        source.open(6).unwrap().read_to_end(&mut all).unwrap();
        assert_eq!(all, b"abcdef");
        let mut head = Vec::new();
        source.open(2).unwrap().read_to_end(&mut head).unwrap();
        assert_eq!(head, b"ab");
        assert!(source.open(7).is_err());
    }

    #[test]
    fn file_source() {
        let path = std::env::temp_dir().join(format!("ionzst-source-{}", std::process::id()));
        std::fs::write(&path, [7u8, 7, 2, 0, 0, 0]).unwrap();
        let source = FileSource::new(&path);
        assert_eq!(source.size().unwrap(), 6);
        assert_eq!(size_without_trailer(&source).unwrap(), 0);
        assert_eq!(source.read_range(0, 2).unwrap(), vec![7, 7]);
        let mut payload = Vec::new();
        source.open(2).unwrap().read_to_end(&mut payload).unwrap();
        assert_eq!(payload, vec![7, 7]);
        std::fs::remove_file(&path).unwrap();
    }
}
