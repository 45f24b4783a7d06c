//! Value types and clap parsers for command flags.

use anyhow::{Result, bail};

use crate::utils::{parse_frequency, parse_relative_frequency, parse_time_duration};

/// A frequency flag that is either absolute or relative to a value read
/// back from the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyArg {
    /// Absolute frequency in hertz.
    Absolute(u64),

    /// Signed offset in hertz, written with an explicit `+` or `-`.
    Relative(i64),
}

impl FrequencyArg {
    /// Whether the value needs a reference frequency.
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::Relative(_))
    }

    /// Resolve to an absolute frequency.
    ///
    /// `reference` is only called for relative values.
    ///
    /// # Errors
    ///
    /// Returns the reference's error, or an error when the offset moves the
    /// frequency below zero or past `u64::MAX`.
    pub fn resolve(self, reference: impl FnOnce() -> Result<u64>) -> Result<u64> {
        match self {
            Self::Absolute(hertz) => Ok(hertz),
            Self::Relative(delta) => {
                let target = i128::from(reference()?) + i128::from(delta);
                if target < 0 {
                    bail!("invalid frequency: {target}");
                }
                u64::try_from(target).map_err(|_| anyhow::anyhow!("invalid frequency: {target}"))
            }
        }
    }
}

/// Delta mode for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDelta {
    /// Leave delta mode.
    Off,

    /// Measure relative to another marker.
    Reference(u32),
}

/// Clap parser for absolute frequency flags.
///
/// # Errors
///
/// Returns a message naming the parse failure.
pub fn frequency(text: &str) -> Result<u64, String> {
    parse_frequency(text).map_err(|e| format!("failed to parse frequency: {e}"))
}

/// Clap parser for frequency flags that also accept `+`/`-` offsets.
///
/// # Errors
///
/// Returns a message naming the parse failure.
pub fn frequency_or_offset(text: &str) -> Result<FrequencyArg, String> {
    let parsed = if text.starts_with(['+', '-']) {
        parse_relative_frequency(text).map(FrequencyArg::Relative)
    } else {
        parse_frequency(text).map(FrequencyArg::Absolute)
    };

    parsed.map_err(|e| format!("failed to parse frequency: {e}"))
}

/// Clap parser for time flags.
///
/// # Errors
///
/// Returns a message naming the parse failure.
pub fn time(text: &str) -> Result<u64, String> {
    parse_time_duration(text).map_err(|e| format!("failed to parse time: {e}"))
}

/// Clap parser for `--delta`: `off` or a reference marker id.
///
/// # Errors
///
/// Returns a message when the value is neither `off` nor a marker id.
pub fn marker_delta(text: &str) -> Result<MarkerDelta, String> {
    if text.eq_ignore_ascii_case("off") {
        return Ok(MarkerDelta::Off);
    }

    text.parse()
        .map(MarkerDelta::Reference)
        .map_err(|e| format!("failed to parse marker delta value: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_or_offset() {
        assert_eq!(
            frequency_or_offset("100M"),
            Ok(FrequencyArg::Absolute(100_000_000))
        );
        assert_eq!(
            frequency_or_offset("1.4e9"),
            Ok(FrequencyArg::Absolute(1_400_000_000))
        );
        assert_eq!(
            frequency_or_offset("+100k"),
            Ok(FrequencyArg::Relative(100_000))
        );
        assert_eq!(
            frequency_or_offset("-2M"),
            Ok(FrequencyArg::Relative(-2_000_000))
        );
    }

    #[test]
    fn test_frequency_or_offset_errors_keep_cause() {
        assert_eq!(
            frequency_or_offset("+1e3").unwrap_err(),
            "failed to parse frequency: scientific notation not supported in relative frequency: +1e3"
        );
        assert_eq!(
            frequency_or_offset("5x").unwrap_err(),
            "failed to parse frequency: invalid unit 'x'"
        );
    }

    #[test]
    fn test_resolve_absolute_ignores_reference() {
        let value = FrequencyArg::Absolute(42)
            .resolve(|| bail!("must not be read"))
            .unwrap();
        assert_eq!(value, 42);
        assert!(!FrequencyArg::Absolute(42).is_relative());
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            FrequencyArg::Relative(-1_000).resolve(|| Ok(5_000)).unwrap(),
            4_000
        );
        assert_eq!(
            FrequencyArg::Relative(250).resolve(|| Ok(0)).unwrap(),
            250
        );
        assert!(FrequencyArg::Relative(1).is_relative());
    }

    #[test]
    fn test_resolve_relative_below_zero() {
        let err = FrequencyArg::Relative(-6_000)
            .resolve(|| Ok(5_000))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid frequency: -1000");
    }

    #[test]
    fn test_resolve_relative_past_max() {
        assert!(FrequencyArg::Relative(1).resolve(|| Ok(u64::MAX)).is_err());
    }

    #[test]
    fn test_time_and_frequency_parsers() {
        assert_eq!(time("20ms"), Ok(20_000));
        assert_eq!(
            time("20").unwrap_err(),
            "failed to parse time: invalid time format: 20"
        );
        assert_eq!(frequency("433.92M"), Ok(433_920_000));
        assert!(frequency("-1M").is_err());
    }

    #[test]
    fn test_marker_delta() {
        assert_eq!(marker_delta("off"), Ok(MarkerDelta::Off));
        assert_eq!(marker_delta("OFF"), Ok(MarkerDelta::Off));
        assert_eq!(marker_delta("2"), Ok(MarkerDelta::Reference(2)));
        assert!(marker_delta("two").is_err());
    }
}
