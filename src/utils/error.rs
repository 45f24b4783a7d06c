//! Error taxonomy for quantity parsing.

use thiserror::Error;

/// Errors produced while turning user text into base-unit quantities.
///
/// Malformed input, unknown units, overflow and a missing sign are kept as
/// distinct variants so callers can tell them apart without matching on
/// message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The text does not match any accepted frequency grammar.
    #[error("invalid frequency format: {0}")]
    InvalidFrequency(String),

    /// The text is too short to hold a sign and a magnitude.
    #[error("invalid relative frequency: {0}")]
    InvalidRelativeFrequency(String),

    /// The text does not match the `<number>[space]<unit>` time grammar.
    #[error("invalid time format: {0}")]
    InvalidTime(String),

    /// A frequency unit suffix is present but not recognised.
    #[error("invalid unit '{0}'")]
    UnknownUnit(String),

    /// A time unit suffix is present but not recognised.
    #[error("unknown time unit: {0}")]
    UnknownTimeUnit(String),

    /// The value does not fit the target integer width.
    #[error("conversion error: value too large")]
    Overflow,

    /// A relative frequency lacks its leading `+` or `-`.
    #[error("relative frequency must start with '+' or '-'")]
    MissingSign,

    /// Relative frequencies only take metric prefixes.
    #[error("scientific notation not supported in relative frequency: {0}")]
    ScientificNotation(String),
}
