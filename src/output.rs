//! Structured JSON output and aligned text tables.
//!
//! When the `--json` flag is passed, read-only views (sweep status, marker
//! and trace listings, device info) are serialized to stdout as a single JSON
//! value instead of the human-readable listing.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::device::{Marker, Sweep, SweepStatus};
use crate::utils::format_frequency;

/// Sweep state as emitted by `sweep --json`.
#[derive(Debug, Serialize)]
pub struct JsonSweepReport {
    /// `"resumed"` or `"paused"`.
    pub status: SweepStatus,

    /// Start frequency in hertz.
    pub start: u64,

    /// Stop frequency in hertz.
    pub stop: u64,

    /// Number of sweep points.
    pub points: u32,

    /// Center frequency in hertz.
    pub center: u64,

    /// Span in hertz.
    pub span: u64,

    /// Whether the sweep sits on a single frequency.
    pub continuous_wave: bool,

    /// Human-readable start frequency (e.g. `"100 MHz"`).
    pub start_formatted: String,

    /// Human-readable stop frequency.
    pub stop_formatted: String,

    /// Human-readable center frequency.
    pub center_formatted: String,

    /// Human-readable span.
    pub span_formatted: String,
}

impl JsonSweepReport {
    /// Build a report from the instrument's sweep status and range.
    #[must_use]
    pub fn new(status: SweepStatus, sweep: &Sweep) -> Self {
        Self {
            status,
            start: sweep.start,
            stop: sweep.stop,
            points: sweep.points,
            center: sweep.center(),
            span: sweep.span(),
            continuous_wave: sweep.is_continuous_wave(),
            start_formatted: format_frequency(sweep.start),
            stop_formatted: format_frequency(sweep.stop),
            center_formatted: format_frequency(sweep.center()),
            span_formatted: format_frequency(sweep.span()),
        }
    }
}

/// A single marker in `marker --json` output.
#[derive(Debug, Serialize)]
pub struct JsonMarkerEntry {
    /// Marker number.
    pub id: u32,

    /// Sweep point index.
    pub index: u32,

    /// Frequency in hertz.
    pub frequency: u64,

    /// Human-readable frequency.
    pub frequency_formatted: String,

    /// Measured level.
    pub value: f64,
}

impl From<&Marker> for JsonMarkerEntry {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id,
            index: marker.index,
            frequency: marker.frequency,
            frequency_formatted: format_frequency(marker.frequency),
            value: marker.value,
        }
    }
}

/// Write `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Gap between table columns.
const COLUMN_GAP: usize = 3;

/// Write rows as a left-aligned table indented by `indent`.
///
/// Every column except the last is padded to its widest cell plus a fixed
/// gap.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_table(out: &mut dyn Write, indent: &str, rows: &[Vec<String>]) -> Result<()> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let mut line = String::from(indent);
        for (col, cell) in row.iter().enumerate() {
            if col + 1 == row.len() {
                line.push_str(cell);
            } else {
                let pad = widths[col] + COLUMN_GAP;
                line.push_str(&format!("{cell:<pad$}"));
            }
        }
        writeln!(out, "{line}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rows: &[Vec<String>]) -> String {
        let mut out = Vec::new();
        write_table(&mut out, "  ", rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sweep_report_fields() {
        let sweep = Sweep {
            start: 100_000_000,
            stop: 300_000_000,
            points: 450,
        };
        let report = JsonSweepReport::new(SweepStatus::Paused, &sweep);

        assert_eq!(report.center, 200_000_000);
        assert_eq!(report.span_formatted, "200 MHz");
        assert!(!report.continuous_wave);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "paused");
        assert_eq!(json["start_formatted"], "100 MHz");
        assert_eq!(json["points"], 450);
    }

    #[test]
    fn test_marker_entry() {
        let marker = Marker {
            id: 1,
            index: 12,
            frequency: 433_920_000,
            value: -41.5,
        };
        let entry = JsonMarkerEntry::from(&marker);
        assert_eq!(entry.frequency_formatted, "433.92 MHz");

        let mut out = Vec::new();
        print_json(&mut out, &[entry]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("]\n"));
        assert!(text.contains("\"value\": -41.5"));
    }

    #[test]
    fn test_write_table_aligns_columns() {
        let text = render(&[
            vec!["Marker 1:".into(), "100 MHz".into(), "-80".into()],
            vec!["Marker 10:".into(), "2.4 GHz".into(), "-7.5".into()],
        ]);
        assert_eq!(
            text,
            "  Marker 1:    100 MHz   -80\n  Marker 10:   2.4 GHz   -7.5\n"
        );
    }

    #[test]
    fn test_write_table_empty() {
        assert_eq!(render(&[]), "");
    }
}
