#![warn(clippy::pedantic)]

pub mod decimal;
pub mod element;
pub mod error;
pub mod int;
pub mod ion_type;
pub mod symbol;
pub mod timestamp;

pub use decimal::Decimal;
pub use element::{Element, Value};
pub use error::TypeError;
pub use int::Int;
pub use ion_type::IonType;
pub use symbol::{Symbol, SymbolTable};
pub use timestamp::{Precision, Timestamp};
