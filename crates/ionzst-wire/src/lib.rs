#![warn(clippy::pedantic)]

pub mod descriptor;
pub mod error;
pub mod marker;
pub mod trailer;
pub mod varint;

pub use descriptor::{TypeCode, TypeDescriptor};
pub use error::WireError;
pub use marker::{ION_MARKER, MarkerReader};
