//! Classification of instrument replies as printable text or binary data.

/// Whether `text` contains any character outside printable ASCII,
/// ignoring newlines, carriage returns and tabs.
#[must_use]
pub fn contains_binary(text: &str) -> bool {
    text.chars().any(|c| !is_printable(c))
}

/// Whether more than 30% of `data` is non-printable.
///
/// Used to decide between quoting a payload and dumping it as hex.
#[must_use]
pub fn is_likely_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }

    let non_printable = data.iter().filter(|&&b| !is_printable(char::from(b))).count();
    non_printable * 10 > data.len() * 3
}

/// Escape line breaks so a payload stays on one log line.
#[must_use]
pub fn escape_line_breaks(text: &str) -> String {
    text.replace('\n', "\\n").replace('\r', "\\r")
}

const fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~' | '\n' | '\r' | '\t')
}
