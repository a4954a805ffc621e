//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum line length in octets (not including CRLF).
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to the 75-octet limit and terminates it with CRLF.
///
/// Continuation lines start with a single space, which counts towards their
/// limit. Breaks never fall inside a UTF-8 sequence.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3 + 2);
    let mut segment_start = 0;
    let mut budget = MAX_LINE_OCTETS;

    for (idx, ch) in line.char_indices() {
        if idx + ch.len_utf8() - segment_start > budget {
            result.push_str(&line[segment_start..idx]);
            result.push_str("\r\n ");
            segment_start = idx;
            budget = MAX_LINE_OCTETS - 1;
        }
    }
    result.push_str(&line[segment_start..]);
    result.push_str("\r\n");

    result
}
