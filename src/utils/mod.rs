//! Quantity parsing and formatting helpers.
//!
//! Everything in here is pure: textual frequencies and durations go in,
//! exact integer hertz or microseconds come out, and the reverse for
//! display. Exact decimal arithmetic is used throughout so values in the
//! gigahertz range never pick up binary floating point drift.

pub mod error;
pub mod format;
pub mod parse;
pub mod text;

pub use error::QuantityError;
pub use format::{format_frequency, format_seconds, format_time_duration};
pub use parse::{parse_frequency, parse_relative_frequency, parse_time_duration};
