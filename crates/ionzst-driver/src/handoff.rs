//! Bounded byte handoffs between pipeline stages.
//!
//! A handoff is a `crossbeam` channel of byte chunks with a [`Write`] end
//! and a [`Read`] end. Dropping the writer closes the handoff; the reader
//! then sees end of input once buffered chunks are drained. A shared
//! [`CancelToken`] wakes up any blocked operation on either end.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

/// Largest chunk a single [`PipeWriter::write`] hands over.
pub const MAX_CHUNK: usize = 64 * 1024;

/// The error carried inside the `io::Error` of a cancelled handoff
/// operation.
#[derive(Debug, thiserror::Error)]
#[error("pipeline cancelled")]
pub struct Cancelled;

/// Whether `err` was produced by a cancelled handoff.
pub fn is_cancellation(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<Cancelled>())
}

fn cancelled() -> io::Error {
    io::Error::other(Cancelled)
}

/// Shared, one-shot cancellation signal.
///
/// Cancelling drops the sending side of an internal channel, which makes
/// every `select!` waiting on [`signal`](Self::signal) fire at once.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    cancelled: AtomicBool,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = channel::bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                trigger: Mutex::new(Some(trigger)),
                signal,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Cancel. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Disconnects (and so becomes ready) on cancellation. Never carries a
    /// message.
    fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a handoff holding at most `capacity` chunks in flight. A
/// capacity of 0 makes every write wait for the matching read.
pub fn pipe(capacity: usize, token: &CancelToken) -> (PipeWriter, PipeReader) {
    let (tx, rx) = channel::bounded(capacity);
    (
        PipeWriter {
            tx,
            token: token.clone(),
            written: 0,
        },
        PipeReader {
            rx,
            token: token.clone(),
            chunk: Vec::new(),
            pos: 0,
        },
    )
}

/// Writing end of a handoff.
pub struct PipeWriter {
    tx: Sender<Vec<u8>>,
    token: CancelToken,
    written: u64,
}

impl PipeWriter {
    /// Bytes accepted by the reading side so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.token.is_cancelled() {
            return Err(cancelled());
        }
        let len = buf.len().min(MAX_CHUNK);
        let chunk = buf[..len].to_vec();
        select! {
            send(self.tx, chunk) -> sent => match sent {
                Ok(()) => {
                    self.written += len as u64;
                    Ok(len)
                }
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "handoff reader is gone",
                )),
            },
            recv(self.token.signal()) -> _ => Err(cancelled()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reading end of a handoff.
pub struct PipeReader {
    rx: Receiver<Vec<u8>>,
    token: CancelToken,
    chunk: Vec<u8>,
    pos: usize,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.chunk.len() {
            if self.token.is_cancelled() {
                return Err(cancelled());
            }
            select! {
                recv(self.rx) -> chunk => match chunk {
                    Ok(chunk) => {
                        self.chunk = chunk;
                        self.pos = 0;
                    }
                    // a writer that failed cancels before it closes
                    Err(_) if self.token.is_cancelled() => return Err(cancelled()),
                    Err(_) => return Ok(0),
                },
                recv(self.token.signal()) -> _ => return Err(cancelled()),
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn bytes_flow_in_order() {
        let token = CancelToken::new();
        let (mut writer, mut reader) = pipe(0, &token);
        let producer = thread::spawn(move || {
            for i in 0..100u8 {
                writer.write_all(&[i; 3]).unwrap();
            }
            writer.bytes_written()
        });
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(producer.join().unwrap(), 300);
        let expected: Vec<u8> = (0..100u8).flat_map(|i| [i; 3]).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn large_writes_are_chunked() {
        let token = CancelToken::new();
        let (mut writer, mut reader) = pipe(4, &token);
        let data = vec![7u8; MAX_CHUNK * 2 + 5];
        let expected = data.clone();
        let producer = thread::spawn(move || writer.write_all(&data));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        producer.join().unwrap().unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn cancel_wakes_blocked_writer() {
        let token = CancelToken::new();
        let (mut writer, _reader) = pipe(0, &token);
        let canceller = token.clone();
        let blocked = thread::spawn(move || writer.write_all(b"never read"));
        thread::sleep(Duration::from_millis(20));
        canceller.cancel();
        let err = blocked.join().unwrap().unwrap_err();
        assert!(is_cancellation(&err));
    }

    #[test]
    fn cancel_wakes_blocked_reader() {
        let token = CancelToken::new();
        let (_writer, mut reader) = pipe(0, &token);
        let canceller = token.clone();
        let blocked = thread::spawn(move || {
            let mut buf = [0u8; 8];
            reader.read(&mut buf)
        });
        thread::sleep(Duration::from_millis(20));
        canceller.cancel();
        let err = blocked.join().unwrap().unwrap_err();
        assert!(is_cancellation(&err));
    }

    #[test]
    fn closed_after_cancel_is_not_clean_eof() {
        let token = CancelToken::new();
        let (writer, mut reader) = pipe(1, &token);
        token.cancel();
        drop(writer);
        let mut buf = [0u8; 1];
        assert!(is_cancellation(&reader.read(&mut buf).unwrap_err()));
    }

    #[test]
    fn dropped_reader_is_broken_pipe() {
        let token = CancelToken::new();
        let (mut writer, reader) = pipe(0, &token);
        drop(reader);
        let err = writer.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
