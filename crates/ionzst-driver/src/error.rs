use ionzst_decoder::DecodeError;
use ionzst_wire::WireError;

/// Errors from rendering Ion binary as text.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("writing Ion text failed")]
    Output(#[source] std::io::Error),
}

/// The failure reported by a pipeline run.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────────┐
/// │ Variant      │ Cause                                             │
/// ├──────────────┼───────────────────────────────────────────────────┤
/// │ Source       │ Reading the object failed                         │
/// │ Trailer      │ Trailer offset missing or out of range            │
/// │ Extract      │ Envelope is not a sequence of blobs               │
/// │ Decompress   │ Fragment stream is not valid zstd                 │
/// │ Render       │ Decompressed data is not Ion binary, or the sink  │
/// │              │ failed                                            │
/// │ Cancelled    │ The run was cancelled from outside                │
/// │ StagePanicked│ A stage thread panicked                           │
/// └──────────────┴───────────────────────────────────────────────────┘
/// ```
///
/// Only the first failure of a run is reported; stages that fail because
/// of it are not.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("reading object failed")]
    Source(#[source] std::io::Error),

    #[error("invalid object trailer")]
    Trailer(#[from] WireError),

    #[error("extracting payload failed")]
    Extract(#[source] DecodeError),

    #[error("decompressing payload failed")]
    Decompress(#[source] DecodeError),

    #[error("rendering Ion text failed")]
    Render(#[source] DriverError),

    #[error("pipeline cancelled")]
    Cancelled,

    #[error("{stage} stage panicked")]
    StagePanicked { stage: &'static str },
}
