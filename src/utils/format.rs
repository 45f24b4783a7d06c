//! Human-readable rendering of base-unit quantities.
//!
//! Values are scaled to the largest unit they reach and printed as the
//! shortest exact decimal: no trailing zeros, no dangling decimal point.

use rust_decimal::Decimal;

/// Frequency units, largest first, as `(scale exponent, suffix)`.
const FREQUENCY_UNITS: &[(u32, &str)] = &[(9, "GHz"), (6, "MHz"), (3, "kHz"), (0, "Hz")];

/// Time units over microseconds, largest first.
const TIME_UNITS: &[(u32, &str)] = &[(6, "s"), (3, "ms"), (0, "µs")];

/// Format a frequency in hertz, e.g. `13_001` becomes `"13.001 kHz"`.
///
/// Thresholds are inclusive, so exactly 1000 Hz renders as `"1 kHz"`.
///
/// # Examples
///
/// ```
/// # use tsactl::utils::format_frequency;
/// assert_eq!(format_frequency(4_500_000_001), "4.500000001 GHz");
/// assert_eq!(format_frequency(0), "0 Hz");
/// ```
#[must_use]
pub fn format_frequency(hertz: u64) -> String {
    format_scaled(hertz, FREQUENCY_UNITS)
}

/// Format a duration in microseconds, e.g. `1_500` becomes `"1.5 ms"`.
#[must_use]
pub fn format_time_duration(microseconds: u64) -> String {
    format_scaled(microseconds, TIME_UNITS)
}

/// Render microseconds as a bare decimal number of seconds.
///
/// This is the form the instrument shell expects for sweep time.
#[must_use]
pub fn format_seconds(microseconds: u64) -> String {
    shift_decimal_point(microseconds, 6).to_string()
}

fn format_scaled(value: u64, units: &[(u32, &str)]) -> String {
    let (scale, suffix) = units
        .iter()
        .find(|(scale, _)| value >= 10u64.pow(*scale))
        .or_else(|| units.last())
        .copied()
        .unwrap_or((0, ""));

    format!("{} {suffix}", shift_decimal_point(value, scale))
}

/// Divide `value` by `10^scale` exactly and strip trailing zeros.
fn shift_decimal_point(value: u64, scale: u32) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(value), scale).normalize()
}
