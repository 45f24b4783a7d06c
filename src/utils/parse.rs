//! Quantity parsing utilities.
//!
//! This module turns user supplied frequency and time strings (like "100M",
//! "1.4e9", "+250k" or "1.5ms") into exact integer values in base units:
//! hertz for frequencies and microseconds for durations.
//!
//! All scaling is done with [`Decimal`] so that inputs such as
//! "1.000000001ghz" come out as exactly `1_000_000_001`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use super::error::QuantityError;

/// `<number><unit>` with an unsigned decimal number and a letter suffix.
static PREFIXED_FREQUENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)([a-z]+)$").expect("prefixed frequency pattern is valid")
});

/// `<number>[e<exponent>]`, also covering bare integers.
static SCIENTIFIC_FREQUENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(?:e(\d+))?$").expect("scientific frequency pattern is valid")
});

/// `<number>[space]<unit>[s]` where the unit is a single character.
static TIME_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*([a-zµ])s?$").expect("time duration pattern is valid")
});

const TEN: Decimal = dec!(10);

/// Parse a frequency string into hertz.
///
/// Units are matched case-insensitively. Metric-prefixed input is scaled in
/// exact decimal arithmetic; scientific notation is accepted when no unit is
/// given and truncated to its integer part.
///
/// # Arguments
///
/// * `text` - A frequency such as `"100M"`, `"2.4GHz"`, `"1.4e9"` or `"433920000"`
///
/// # Errors
///
/// This function will return an error if:
/// - The text matches neither the prefixed nor the scientific grammar
/// - The unit suffix is not one of `hz`, `k`/`khz`, `m`/`mhz`, `g`/`ghz`
/// - The resulting value does not fit in a `u64`
///
/// # Examples
///
/// ```
/// # use tsactl::utils::parse_frequency;
/// assert_eq!(parse_frequency("0.3k").unwrap(), 300);
/// assert_eq!(parse_frequency("1.000000001ghz").unwrap(), 1_000_000_001);
/// assert_eq!(parse_frequency("100e6").unwrap(), 100_000_000);
/// ```
///
/// # Supported Units
///
/// - **Hz**: `hz` or no unit at all
/// - **kHz**: `k`, `khz` (1000)
/// - **MHz**: `m`, `mhz` (1000²)
/// - **GHz**: `g`, `ghz` (1000³)
pub fn parse_frequency(text: &str) -> Result<u64, QuantityError> {
    let lowered = text.to_lowercase();

    if let Some(captures) = PREFIXED_FREQUENCY.captures(&lowered) {
        let number = parse_decimal(&captures[1])?;
        let unit = &captures[2];
        let multiplier =
            frequency_multiplier(unit).ok_or_else(|| QuantityError::UnknownUnit(unit.to_string()))?;

        return whole_u64(multiply_with_overflow_check(number, multiplier)?);
    }

    if let Some(captures) = SCIENTIFIC_FREQUENCY.captures(&lowered) {
        let mantissa = parse_decimal(&captures[1])?;
        let value = match captures.get(2) {
            Some(exponent) => scale_by_power_of_ten(mantissa, exponent.as_str())?,
            None => mantissa,
        };

        return whole_u64(value);
    }

    Err(QuantityError::InvalidFrequency(text.to_string()))
}

/// Parse a signed frequency offset such as `"+100k"` or `"-2M"` into hertz.
///
/// The leading sign is mandatory. The magnitude uses the metric-prefix
/// grammar of [`parse_frequency`]; scientific notation is refused.
///
/// # Errors
///
/// This function will return an error if:
/// - The text is shorter than a sign plus one character
/// - The first character is neither `+` nor `-`
/// - The magnitude contains an `e`/`E` exponent marker
/// - The magnitude is not a valid frequency
/// - The magnitude exceeds `i64::MAX`
///
/// # Examples
///
/// ```
/// # use tsactl::utils::parse_relative_frequency;
/// assert_eq!(parse_relative_frequency("+9.9mhz").unwrap(), 9_900_000);
/// assert_eq!(parse_relative_frequency("-1.2Khz").unwrap(), -1_200);
/// assert!(parse_relative_frequency("1000").is_err());
/// ```
pub fn parse_relative_frequency(text: &str) -> Result<i64, QuantityError> {
    let mut chars = text.chars();
    let sign = chars.next();
    let magnitude = chars.as_str();

    if magnitude.is_empty() {
        return Err(QuantityError::InvalidRelativeFrequency(text.to_string()));
    }

    let negative = match sign {
        Some('+') => false,
        Some('-') => true,
        _ => return Err(QuantityError::MissingSign),
    };

    if magnitude.contains(['e', 'E']) {
        return Err(QuantityError::ScientificNotation(text.to_string()));
    }

    let hertz = i64::try_from(parse_frequency(magnitude)?).map_err(|_| QuantityError::Overflow)?;

    Ok(if negative { -hertz } else { hertz })
}

/// Parse a time duration string into microseconds.
///
/// The unit is a single character (`u`/`µ`, `m` or `s`) with an optional
/// trailing `s`, so `"10us"`, `"1.5ms"` and `"2 s"` are all accepted.
/// Fractions are scaled exactly and truncated toward zero.
///
/// # Errors
///
/// This function will return an error if:
/// - The text has no unit or does not match the duration grammar
/// - The unit character is not one of `u`, `µ`, `m`, `s`
/// - The resulting value does not fit in a `u64`
///
/// # Examples
///
/// ```
/// # use tsactl::utils::parse_time_duration;
/// assert_eq!(parse_time_duration("1.5ms").unwrap(), 1_500);
/// assert_eq!(parse_time_duration("1s").unwrap(), 1_000_000);
/// ```
pub fn parse_time_duration(text: &str) -> Result<u64, QuantityError> {
    let lowered = text.to_lowercase();
    let captures = TIME_DURATION
        .captures(&lowered)
        .ok_or_else(|| QuantityError::InvalidTime(text.to_string()))?;

    let number = parse_decimal(&captures[1])?;
    let unit = &captures[2];
    let multiplier =
        time_multiplier(unit).ok_or_else(|| QuantityError::UnknownTimeUnit(unit.to_string()))?;

    whole_u64(multiply_with_overflow_check(number, multiplier)?)
}

/// Multiplier for a lowercase frequency unit suffix.
fn frequency_multiplier(unit: &str) -> Option<Decimal> {
    match unit {
        "hz" => Some(dec!(1)),
        "k" | "khz" => Some(dec!(1000)),
        "m" | "mhz" => Some(dec!(1000000)),
        "g" | "ghz" => Some(dec!(1000000000)),
        _ => None,
    }
}

/// Multiplier from a single-character time unit to microseconds.
fn time_multiplier(unit: &str) -> Option<Decimal> {
    match unit {
        "u" | "µ" => Some(dec!(1)),
        "m" => Some(dec!(1000)),
        "s" => Some(dec!(1000000)),
        _ => None,
    }
}

/// Significant digits `Decimal` holds without rounding.
const DECIMAL_DIGITS: usize = 28;

/// Parse an already validated digit string.
///
/// `Decimal::from_str` rounds digits it cannot hold, so fractional digits
/// past [`DECIMAL_DIGITS`] significant digits are cut off first. That keeps
/// the final result truncated toward zero: any value that fits a `u64`
/// after scaling is unaffected by the dropped digits. A whole part wider
/// than `Decimal` can hold is reported as [`QuantityError::Overflow`].
fn parse_decimal(digits: &str) -> Result<Decimal, QuantityError> {
    let truncated = match digits.split_once('.') {
        Some((whole, fraction)) => {
            let significant = whole.trim_start_matches('0').len();
            let keep = DECIMAL_DIGITS.saturating_sub(significant).min(fraction.len());
            if keep == 0 {
                whole
            } else {
                &digits[..=whole.len() + keep]
            }
        }
        None => digits,
    };

    Decimal::from_str(truncated).map_err(|_| QuantityError::Overflow)
}

/// Multiply `mantissa` by `10^exponent`, failing on overflow.
fn scale_by_power_of_ten(mantissa: Decimal, exponent: &str) -> Result<Decimal, QuantityError> {
    if mantissa.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let exponent: u32 = exponent.parse().map_err(|_| QuantityError::Overflow)?;
    (0..exponent).try_fold(mantissa, |acc, _| multiply_with_overflow_check(acc, TEN))
}

/// Multiply two decimals with overflow checking.
fn multiply_with_overflow_check(a: Decimal, b: Decimal) -> Result<Decimal, QuantityError> {
    a.checked_mul(b).ok_or(QuantityError::Overflow)
}

/// Truncate toward zero and convert to `u64`.
fn whole_u64(value: Decimal) -> Result<u64, QuantityError> {
    value.trunc().to_u64().ok_or(QuantityError::Overflow)
}
