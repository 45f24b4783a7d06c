//! Debug trace of serial traffic.
//!
//! With `--debug`, every exchange with the instrument is written to stderr as
//! one line: `<timestamp> [DEBUG] <message>, key=value, ...`.

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::utils::text::{escape_line_breaks, is_likely_binary};

/// A value attached to a debug line.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    /// Plain number, rendered as-is.
    Number(u64),

    /// Text, quoted unless it looks binary.
    Text(&'a str),

    /// Raw bytes, hex-dumped when they look binary.
    Bytes(&'a [u8]),
}

/// Write a debug line to stderr.
pub fn debug(message: &str, fields: &[(&str, Field<'_>)]) {
    let line = render_line(Local::now(), message, fields);
    eprintln!("{}", line.dimmed());
}

/// Format a debug line for the given timestamp.
#[must_use]
pub fn render_line(at: DateTime<Local>, message: &str, fields: &[(&str, Field<'_>)]) -> String {
    let timestamp = at.format("%Y-%m-%dT%H:%M:%S%.3f%:z");
    let rendered: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("{key}={}", render_field(*value)))
        .collect();

    if rendered.is_empty() {
        format!("{timestamp} [DEBUG] {message}")
    } else {
        format!("{timestamp} [DEBUG] {message}, {}", rendered.join(", "))
    }
}

fn render_field(value: Field<'_>) -> String {
    match value {
        Field::Number(n) => n.to_string(),
        Field::Text(text) => render_bytes(text.as_bytes()),
        Field::Bytes(bytes) => render_bytes(bytes),
    }
}

fn render_bytes(bytes: &[u8]) -> String {
    if is_likely_binary(bytes) {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{hex}")
    } else {
        format!("\"{}\"", escape_line_breaks(&String::from_utf8_lossy(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
    }

    #[test]
    fn test_render_line_without_fields() {
        let line = render_line(fixed_time(), "open port", &[]);
        assert!(line.starts_with("2024-05-01T12:30:15.000"));
        assert!(line.ends_with(" [DEBUG] open port"));
    }

    #[test]
    fn test_render_text_and_numbers() {
        let line = render_line(
            fixed_time(),
            "rx",
            &[
                ("len", Field::Number(22)),
                ("data", Field::Text("0 350000000 450\r\nch> ")),
            ],
        );
        assert!(line.ends_with("rx, len=22, data=\"0 350000000 450\\r\\nch> \""));
    }

    #[test]
    fn test_render_binary_as_hex() {
        let line = render_line(fixed_time(), "rx", &[("data", Field::Bytes(&[0x00, 0xff, 0x1f]))]);
        assert!(line.ends_with("rx, data=0x00ff1f"));
    }
}
