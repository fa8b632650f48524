//! Line normalization applied to every script before extraction
//!
//! Both steps work on plain characters without regex.

/// Unify line endings to `\n` and drop horizontal whitespace at line ends.
///
/// `\r\n` and a lone `\r` are both handled in a single pass, so the outcome
/// does not depend on the order in which the two forms are found.
pub fn normalize_line_endings(content: &str) -> String {
    let mut unified = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            unified.push('\n');
        } else {
            unified.push(ch);
        }
    }
    strip_trailing_whitespace(&unified)
}

/// Remove spaces and tabs that directly precede a `\n`.
///
/// The text after the last newline is left untouched.
pub fn strip_trailing_whitespace(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut lines = content.split('\n').peekable();
    while let Some(line) = lines.next() {
        if lines.peek().is_some() {
            result.push_str(line.trim_end_matches(|c| c == ' ' || c == '\t'));
            result.push('\n');
        } else {
            result.push_str(line);
        }
    }
    result
}

/// Collapse every `\n<whitespace>\n` run to a single blank line.
///
/// The whitespace class is the one of `\s` in common regex dialects, newlines
/// included, so stacked blank lines collapse as well. Applying the function a
/// second time changes nothing.
pub fn collapse_blank_lines(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut result = String::with_capacity(content.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut j = i + 1;
            let mut last_newline = None;
            while j < bytes.len() && is_regex_space(bytes[j]) {
                if bytes[j] == b'\n' {
                    last_newline = Some(j);
                }
                j += 1;
            }
            if let Some(end) = last_newline.filter(|&end| end > i + 1) {
                result.push_str(&content[copied..i]);
                result.push_str("\n\n");
                copied = end + 1;
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }

    result.push_str(&content[copied..]);
    result
}

fn is_regex_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_endings("a\r\r\nb"), "a\n\nb");
        assert_eq!(normalize_line_endings("\r\n\r"), "\n\n");
    }

    #[test]
    fn test_line_ending_styles_give_same_lines() {
        let unix = normalize_line_endings("one\ntwo  \nthree");
        let windows = normalize_line_endings("one\r\ntwo  \r\nthree");
        let classic = normalize_line_endings("one\rtwo  \rthree");
        let mixed = normalize_line_endings("one\rtwo\t \r\nthree");
        assert_eq!(unix, "one\ntwo\nthree");
        assert_eq!(windows, unix);
        assert_eq!(classic, unix);
        assert_eq!(mixed, unix);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_line_endings("x = 1 \t\r\n\r\n  y\r");
        assert_eq!(normalize_line_endings(&once), once);
    }

    #[test]
    fn test_trailing_whitespace_only_before_newline() {
        assert_eq!(strip_trailing_whitespace("a \t\nb  "), "a\nb  ");
        assert_eq!(strip_trailing_whitespace("  \n"), "\n");
        assert_eq!(strip_trailing_whitespace("keep  inner\n"), "keep  inner\n");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n   \nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n \n\t\n  x"), "a\n\n  x");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n  b"), "a\n  b");
        assert_eq!(collapse_blank_lines("ünï\n \ncödé"), "ünï\n\ncödé");
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let samples = ["a\n \n \n b\n\n\n", "\n\n\n", "x\n\t\n", "plain"];
        for sample in samples {
            let once = collapse_blank_lines(sample);
            assert_eq!(collapse_blank_lines(&once), once, "input {:?}", sample);
        }
    }
}
