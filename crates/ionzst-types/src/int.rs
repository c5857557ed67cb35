use std::fmt;

use ionzst_wire::varint::trim_leading_zeros;

/// An arbitrary-size integer in sign-and-magnitude form.
///
/// Ion ints have no width limit, so the magnitude is kept as trimmed
/// big-endian bytes. Decimal coefficients reuse this type and are the only
/// place a negative zero is meaningful.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Int {
    negative: bool,
    magnitude: Vec<u8>,
}

impl Int {
    /// Build from a sign and a big-endian magnitude. Leading zero bytes are
    /// dropped; a zero magnitude keeps its sign.
    pub fn from_parts(negative: bool, magnitude: &[u8]) -> Self {
        Self {
            negative,
            magnitude: trim_leading_zeros(magnitude).to_vec(),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Trimmed big-endian magnitude; empty for zero.
    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    /// The value as an `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        if self.magnitude.len() > 8 {
            return None;
        }
        let magnitude = self
            .magnitude
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        if self.negative {
            if magnitude == 1 << 63 {
                Some(i64::MIN)
            } else {
                i64::try_from(magnitude).ok().map(|m| -m)
            }
        } else {
            i64::try_from(magnitude).ok()
        }
    }

    /// Decimal digits of the magnitude, without sign.
    pub fn magnitude_digits(&self) -> String {
        if self.magnitude.len() <= 16 {
            let value = self
                .magnitude
                .iter()
                .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
            return value.to_string();
        }

        // schoolbook division by 10 over the byte string
        let mut digits = Vec::new();
        let mut current = self.magnitude.clone();
        while !current.is_empty() {
            let mut quotient = Vec::with_capacity(current.len());
            let mut remainder = 0u32;
            for &byte in &current {
                let acc = (remainder << 8) | u32::from(byte);
                let q = acc / 10;
                remainder = acc % 10;
                if !(quotient.is_empty() && q == 0) {
                    #[allow(clippy::cast_possible_truncation)]
                    quotient.push(q as u8);
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            digits.push(b'0' + remainder as u8);
            current = quotient;
        }
        digits.reverse();
        String::from_utf8(digits).unwrap_or_default()
    }
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Self::from_parts(value < 0, &value.unsigned_abs().to_be_bytes())
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        Self::from_parts(false, &value.to_be_bytes())
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.magnitude_digits())
    }
}
