/// Errors raised when constructing values that violate the Ion data model.
///
/// These are semantic checks on already-framed values; byte-level framing
/// problems are [`ionzst_wire::WireError`]s.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A timestamp component is out of range or the date does not exist.
    #[error("invalid timestamp: {reason}")]
    InvalidTimestamp { reason: &'static str },

    /// A timestamp's fractional seconds are negative or not below one.
    #[error("timestamp fraction must be in [0, 1)")]
    InvalidFraction,

    /// The local offset is outside +/- 23:59.
    #[error("timestamp offset {minutes} minutes is out of range")]
    InvalidOffset { minutes: i32 },
}
