use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread;

use ionzst_decoder::{DecodeError, ExtractStats, decompress, extract};
use ionzst_wire::MarkerReader;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::handoff::{self, CancelToken};
use crate::render::render;
use crate::source::{ObjectSource, size_without_trailer};

/// What a successful run moved through each stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Top-level blobs in the envelope.
    pub blobs: u64,
    /// Compressed bytes handed from extract to decompress.
    pub compressed_bytes: u64,
    /// Decompressed bytes handed from decompress to render.
    pub decompressed_bytes: u64,
    /// Ion values rendered as text.
    pub values: u64,
}

/// The three-stage dump pipeline.
///
/// ```text
///  payload ─▶ MarkerReader ─▶ [extract] ═A═▶ [decompress] ═B═▶ [render] ─▶ output
/// ```
///
/// Each stage runs on its own scoped thread; `A` and `B` are bounded
/// handoffs. A stage closes its handoffs when it returns, and only after
/// any failure has been recorded. The first stage to fail records its
/// error and cancels the run, which wakes every stage blocked on a
/// handoff; their resulting errors are dropped.
///
/// A pipeline runs once; [`cancel_token`](Self::cancel_token) must be
/// taken before [`run`](Self::run).
pub struct Pipeline {
    config: PipelineConfig,
    token: CancelToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            token: CancelToken::new(),
        }
    }

    /// A token that cancels this pipeline's runs from another thread.
    /// A run cancelled this way fails with [`PipelineError::Cancelled`].
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Run the pipeline over a payload that lacks the Ion version marker
    /// and ends where the trailer begins.
    ///
    /// # Errors
    ///
    /// The first failure of any stage; see [`PipelineError`].
    pub fn run<R, W>(self, payload: R, output: W) -> Result<PipelineReport, PipelineError>
    where
        R: Read + Send,
        W: Write + Send,
    {
        info!(
            handoff_capacity = self.config.handoff_capacity,
            style = ?self.config.style,
            "starting pipeline"
        );
        let failure = Mutex::new(None);
        let token = &self.token;
        let capacity = self.config.handoff_capacity;
        let style = self.config.style;

        let (compressed_tx, compressed_rx) = handoff::pipe(capacity, token);
        let (decompressed_tx, decompressed_rx) = handoff::pipe(capacity, token);

        let (extracted, decompressed, rendered) = thread::scope(|scope| {
            let failure = &failure;

            let extract_stage = scope.spawn(move || {
                let mut sink = compressed_tx;
                let stats = run_stage("extract", failure, token, || {
                    extract(MarkerReader::new(payload), &mut sink).map_err(extract_error)
                });
                drop(sink);
                stats
            });

            let decompress_stage = scope.spawn(move || {
                let mut source = compressed_rx;
                let mut sink = decompressed_tx;
                let stats = run_stage("decompress", failure, token, || {
                    decompress(&mut source, &mut sink).map_err(PipelineError::Decompress)
                });
                drop((source, sink));
                stats
            });

            let render_stage = scope.spawn(move || {
                let mut source = decompressed_rx;
                let values = run_stage("render", failure, token, || {
                    render(&mut source, output, style).map_err(PipelineError::Render)
                });
                drop(source);
                values
            });

            (
                join_stage("extract", extract_stage, failure, token),
                join_stage("decompress", decompress_stage, failure, token),
                join_stage("render", render_stage, failure, token),
            )
        });

        if let Some(err) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(err);
        }

        match (extracted, decompressed, rendered) {
            (Some(extracted), Some(decompressed), Some(values)) => {
                let report = PipelineReport {
                    blobs: extracted.blobs,
                    compressed_bytes: extracted.bytes,
                    decompressed_bytes: decompressed,
                    values,
                };
                info!(
                    blobs = report.blobs,
                    compressed_bytes = report.compressed_bytes,
                    decompressed_bytes = report.decompressed_bytes,
                    values = report.values,
                    "pipeline finished"
                );
                Ok(report)
            }
            // a stage without a result always records a failure
            _ => Err(PipelineError::Cancelled),
        }
    }
}

/// Dump an `ion.zst` object from `source` to `output` as Ion text.
///
/// Sizes the payload from the trailer, then streams exactly the payload
/// bytes through a [`Pipeline`].
///
/// # Errors
///
/// Trailer and source errors before the run starts, then any
/// [`Pipeline::run`] failure.
pub fn dump<S, W>(source: &S, output: W, config: &PipelineConfig) -> Result<PipelineReport, PipelineError>
where
    S: ObjectSource + ?Sized,
    W: Write + Send,
{
    let payload_len = size_without_trailer(source)?;
    debug!(payload_len, "sized payload from trailer");
    let payload = source.open(payload_len).map_err(PipelineError::Source)?;
    Pipeline::new(config.clone()).run(payload, output)
}

fn extract_error(err: DecodeError) -> PipelineError {
    match err {
        DecodeError::Io(err) => PipelineError::Source(err),
        err => PipelineError::Extract(err),
    }
}

fn run_stage<T, F>(
    stage: &'static str,
    failure: &Mutex<Option<PipelineError>>,
    token: &CancelToken,
    work: F,
) -> Option<T>
where
    F: FnOnce() -> Result<T, PipelineError>,
{
    debug!(stage, "stage started");
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(value)) => {
            debug!(stage, "stage finished");
            Some(value)
        }
        Ok(Err(err)) => {
            record_failure(stage, err, failure, token);
            None
        }
        Err(_) => {
            record_failure(stage, PipelineError::StagePanicked { stage }, failure, token);
            None
        }
    }
}

fn join_stage<T>(
    stage: &'static str,
    handle: thread::ScopedJoinHandle<'_, Option<T>>,
    failure: &Mutex<Option<PipelineError>>,
    token: &CancelToken,
) -> Option<T> {
    handle.join().unwrap_or_else(|_| {
        record_failure(stage, PipelineError::StagePanicked { stage }, failure, token);
        None
    })
}

/// Keep the first failure and cancel the run. Failures arriving after
/// cancellation are consequences of it and are dropped.
fn record_failure(
    stage: &'static str,
    err: PipelineError,
    failure: &Mutex<Option<PipelineError>>,
    token: &CancelToken,
) {
    let mut slot = failure.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        debug!(stage, error = %err, "dropping failure after cancellation");
        return;
    }
    if token.is_cancelled() {
        warn!(stage, "pipeline cancelled");
        *slot = Some(PipelineError::Cancelled);
        return;
    }
    warn!(stage, error = %err, "stage failed; cancelling pipeline");
    *slot = Some(err);
    token.cancel();
}

#[cfg(test)]
mod tests {
    use std::io;

    use ionzst_encoder::EnvelopeBuilder;
    use ionzst_types::{Element, Value};

    use super::*;
    use crate::config::TextStyle;
    use crate::source::MemorySource;

    fn two_structs() -> Vec<u8> {
        let mut builder = EnvelopeBuilder::new();
        builder
            .add_chunk(&[Element::structure([("a", Element::from(1i64))])])
            .unwrap()
            .add_chunk(&[Element::structure([("b", Element::from(2i64))])])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn dumps_object_as_text() {
        let source = MemorySource::new(two_structs());
        let mut out = Vec::new();
        let report = dump(&source, &mut out, &PipelineConfig::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{a: 1}\n{b: 2}\n");
        assert_eq!(report.blobs, 2);
        assert_eq!(report.values, 2);
        assert!(report.compressed_bytes > 0);
        assert!(report.decompressed_bytes > 0);
    }

    #[test]
    fn buffered_handoffs_give_the_same_output() {
        let source = MemorySource::new(two_structs());
        let config = PipelineConfig {
            handoff_capacity: 8,
            style: TextStyle::Lines,
        };
        let mut out = Vec::new();
        dump(&source, &mut out, &config).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{a: 1}\n{b: 2}\n");
    }

    #[test]
    fn empty_payload() {
        let source = MemorySource::new(vec![0u8, 0, 0, 0]);
        let mut out = Vec::new();
        let report = dump(&source, &mut out, &PipelineConfig::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(report, PipelineReport::default());
    }

    #[test]
    fn non_blob_fails_in_extract() {
        let object = EnvelopeBuilder::new()
            .add_value(&Element::from(1i64))
            .unwrap()
            .build_with_trailer(&[])
            .unwrap();
        let mut out = Vec::new();
        let err = dump(&MemorySource::new(object), &mut out, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extract(DecodeError::UnexpectedType { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn corrupt_fragment_fails_in_decompress() {
        let object = EnvelopeBuilder::new()
            .add_blob(b"not a zstd frame")
            .build_with_trailer(&[])
            .unwrap();
        let err = dump(&MemorySource::new(object), io::sink(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Decompress(DecodeError::DecompressFailed(_))));
    }

    #[test]
    fn decompressed_garbage_fails_in_render() {
        let frame = ionzst_encoder::compression::compress_frame(b"plain text", 3).unwrap();
        let object = EnvelopeBuilder::new()
            .add_blob(&frame)
            .build_with_trailer(&[])
            .unwrap();
        let err = dump(&MemorySource::new(object), io::sink(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Render(crate::error::DriverError::Decode(DecodeError::MissingMarker))
        ));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_is_reported_once() {
        let records: Vec<Element> = (0..5_000i64)
            .map(|i| Element::structure([("n", Element::from(i))]))
            .collect();
        let mut builder = EnvelopeBuilder::new();
        for chunk in records.chunks(500) {
            builder.add_chunk(chunk).unwrap();
        }
        let object = builder.build().unwrap();
        let err = dump(&MemorySource::new(object), FailingSink, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Render(crate::error::DriverError::Output(_))
        ));
    }

    struct BrokenSource;

    impl Read for BrokenSource {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn source_failure_is_a_source_error() {
        let err = Pipeline::new(PipelineConfig::default())
            .run(BrokenSource, io::sink())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
    }

    struct Panicking;

    impl Write for Panicking {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            panic!("sink exploded");
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn panicking_stage_is_reported() {
        let err = dump(&MemorySource::new(two_structs()), Panicking, &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::StagePanicked { stage: "render" }));
    }

    #[test]
    fn external_cancellation() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        pipeline.cancel_token().cancel();
        let payload = EnvelopeBuilder::new()
            .add_value(&Element::new(Value::Blob(vec![1, 2, 3])))
            .unwrap()
            .build_with_trailer(&[])
            .unwrap();
        let err = pipeline.run(&payload[..payload.len() - 4], io::sink()).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }
}
