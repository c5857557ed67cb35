#![warn(clippy::pedantic)]

pub mod binary_reader;
pub mod decompression;
pub mod error;
pub mod extract;

mod parse;

pub use binary_reader::{BinaryReader, RawValue};
pub use decompression::decompress;
pub use error::DecodeError;
pub use extract::{ExtractStats, extract};
