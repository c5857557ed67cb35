#![warn(clippy::pedantic)]

pub mod binary_writer;
pub mod compression;
pub mod envelope;
pub mod error;

pub use binary_writer::BinaryWriter;
pub use envelope::EnvelopeBuilder;
pub use error::EncodeError;
