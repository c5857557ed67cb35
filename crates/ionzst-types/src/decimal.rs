use std::fmt;

use crate::int::Int;

/// An Ion decimal: `coefficient × 10^exponent`.
///
/// Precision is significant, so `1.0` (`10d-1`) and `1.00` (`100d-2`)
/// are different values. The coefficient may be a negative zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub coefficient: Int,
    pub exponent: i64,
}

impl Decimal {
    pub fn new(coefficient: impl Into<Int>, exponent: i64) -> Self {
        Self {
            coefficient: coefficient.into(),
            exponent,
        }
    }
}

impl fmt::Display for Decimal {
    /// Ion text form, e.g. `12345d-2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.coefficient, self.exponent)
    }
}
