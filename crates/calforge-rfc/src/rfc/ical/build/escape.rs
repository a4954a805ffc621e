//! iCalendar text escaping utilities.

/// Escapes text for iCalendar TEXT values (RFC 5545 §3.3.11).
///
/// Escapes: backslash, comma, semicolon, and newlines.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 10);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {
                // CRLF and lone CR both become one escaped newline
                if chars.peek() != Some(&'\n') {
                    result.push_str("\\n");
                }
            }
            _ => result.push(c),
        }
    }
    result
}

/// Leaves text untouched except for raw line breaks, which are written as
/// the two-character sequence `\n`.
///
/// A raw line break would end the content line early, so even verbatim output
/// has to encode it.
#[must_use]
pub fn neutralize_line_breaks(s: &str) -> String {
    if !s.contains(['\r', '\n']) {
        return s.to_string();
    }
    s.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n")
}

/// Escapes a parameter value if needed.
///
/// Returns the value quoted if it contains special characters.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if needs_quoting(s) {
        // Use caret encoding for special chars inside quotes (RFC 6868)
        let mut result = String::with_capacity(s.len() + 10);
        result.push('"');
        for c in s.chars() {
            match c {
                '^' => result.push_str("^^"),
                '\n' => result.push_str("^n"),
                '"' => result.push_str("^'"),
                _ => result.push(c),
            }
        }
        result.push('"');
        result
    } else {
        s.to_string()
    }
}

/// Checks if a parameter value needs quoting.
fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n'))
}
