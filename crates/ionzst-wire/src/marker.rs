use std::io::{self, Read};

/// The Ion 1.0 binary version marker.
///
/// `ion.zst` payloads are stored without it; [`MarkerReader`] puts it back
/// so a binary reader recognizes the stream.
pub const ION_MARKER: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// Reader that yields [`ION_MARKER`] followed by every byte of the wrapped
/// source. The marker is inserted, not substituted, so the total byte count
/// grows by four.
///
/// ```text
///   Emitting { emitted: 0..4 } ──(4 marker bytes out)──▶ PassThrough
/// ```
///
/// A `read` whose buffer is larger than the remaining marker copies the
/// marker remainder and then performs exactly one read of the wrapped
/// source for the rest of the buffer.
pub struct MarkerReader<R> {
    inner: R,
    state: MarkerState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MarkerState {
    Emitting { emitted: usize },
    PassThrough,
}

impl<R> MarkerReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: MarkerState::Emitting { emitted: 0 },
        }
    }

    /// Number of marker bytes handed out so far (0–4).
    pub fn marker_bytes_emitted(&self) -> usize {
        match self.state {
            MarkerState::Emitting { emitted } => emitted,
            MarkerState::PassThrough => ION_MARKER.len(),
        }
    }
}

impl<R: Read> Read for MarkerReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let MarkerState::Emitting { emitted } = self.state else {
            return self.inner.read(buf);
        };
        if buf.is_empty() {
            return Ok(0);
        }

        let n = buf.len().min(ION_MARKER.len() - emitted);
        buf[..n].copy_from_slice(&ION_MARKER[emitted..emitted + n]);
        let next = if emitted + n == ION_MARKER.len() {
            MarkerState::PassThrough
        } else {
            MarkerState::Emitting { emitted: emitted + n }
        };

        if n == buf.len() {
            self.state = next;
            return Ok(n);
        }

        // The staged marker bytes only count as emitted once this read
        // succeeds. On error nothing is returned, so the next call has to
        // produce them again.
        let more = self.inner.read(&mut buf[n..])?;
        self.state = next;
        Ok(n + more)
    }
}
