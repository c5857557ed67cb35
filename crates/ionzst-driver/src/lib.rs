#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handoff;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod text_writer;

pub use config::{PipelineConfig, TextStyle};
pub use error::{DriverError, PipelineError};
pub use handoff::{CancelToken, PipeReader, PipeWriter};
pub use pipeline::{Pipeline, PipelineReport, dump};
pub use render::render;
pub use source::{FileSource, MemorySource, ObjectSource, size_without_trailer};
pub use text_writer::{TextWriter, to_text};
