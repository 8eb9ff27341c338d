//! Pure, allocation-free line classifiers.
//!
//! Each function here inspects a single line (already stripped of its
//! trailing newline) and reports whether a particular block-level construct
//! starts there, without consuming anything or touching parser state. These
//! back the `is_type`/`detect_*` half of the block-kind table in spec.md
//! §4.1: every block kind's classifier bottoms out in one or more of these.

/// A run of three or more identical `-` or `*` characters, ignoring
/// interior spaces, with nothing else on the line. Used for both thematic
/// breaks (spec.md §4.6) and as part of disambiguating heading underlines
/// from rules (spec.md §4.3).
pub fn thematic_break(line: &str) -> bool {
    rule_of(line, b'-') || rule_of(line, b'*')
}

fn rule_of(line: &str, ch: u8) -> bool {
    let mut count = 0;
    for b in line.trim_end().bytes() {
        if b == ch {
            count += 1;
        } else if b != b' ' && b != b'\t' {
            return false;
        }
    }
    count >= 3
}

/// The underline character of a setext-style heading line, if any: a line
/// consisting solely of one repeated character from `=`, `-`, or `.`
/// (spec.md §4.2 and the Open Question in §9 about `.` as a level-4 alias).
/// Returns the character and the run length.
pub fn heading_underline(line: &str) -> Option<(u8, usize)> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let first = trimmed.as_bytes()[0];
    if first != b'=' && first != b'-' && first != b'.' {
        return None;
    }
    if trimmed.bytes().any(|b| b != first) {
        return None;
    }
    Some((first, trimmed.len()))
}

/// A level-1 framing line: three or more `=` characters and nothing else.
pub fn top_heading_frame(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'=')
}

/// The opening fence of a fenced code block: optional leading spaces,
/// then three or more backticks or tildes, then an optional attribute
/// string. Returns `(indent, fence_char, fence_len, rest)`.
pub fn fence_open(line: &str) -> Option<(usize, u8, usize, &str)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let fence_char = bytes[i];
    if fence_char != b'`' && fence_char != b'~' {
        return None;
    }
    let indent = i;
    let start = i;
    while i < bytes.len() && bytes[i] == fence_char {
        i += 1;
    }
    let fence_len = i - start;
    if fence_len < 3 {
        return None;
    }
    // A backtick fence's info string cannot itself contain a backtick.
    let rest = &line[i..];
    if fence_char == b'`' && rest.contains('`') {
        return None;
    }
    Some((indent, fence_char, fence_len, rest.trim()))
}

/// Whether `line` closes a fence opened with `fence_char` repeated
/// `fence_len` times: up to three leading spaces, then that many (or more)
/// of the same character, then only trailing space.
pub fn fence_close(line: &str, fence_char: u8, fence_len: usize) -> bool {
    let trimmed_start = line.trim_start_matches(' ');
    if line.len() - trimmed_start.len() > 3 {
        return false;
    }
    let bytes = trimmed_start.trim_end().as_bytes();
    bytes.len() >= fence_len && bytes.iter().all(|&b| b == fence_char)
}

/// The four spaces that mark an indented code-block content line.
pub const INDENTED_CODE_PREFIX: &str = "    ";

/// The run of `>` characters opening a block quote line, and whether
/// exactly one space follows (required by spec.md §4.7). Returns
/// `(level, content_start_byte)`.
pub fn blockquote_prefix(line: &str) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    let mut level = 0;
    while i < bytes.len() && bytes[i] == b'>' {
        level += 1;
        i += 1;
        if i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
    }
    if level == 0 {
        None
    } else {
        Some((level, i))
    }
}

/// An unordered list marker: `-`, `+`, or `*` followed by a space.
/// Returns the marker byte and the content start offset.
pub fn bullet_marker(line: &str) -> Option<(u8, usize)> {
    let bytes = line.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let m = bytes[0];
    if (m == b'-' || m == b'+' || m == b'*') && bytes[1] == b' ' {
        // A run of three+ of the same bullet char with nothing else is a
        // thematic break, not a list marker (spec.md §4.6 disambiguation).
        if thematic_break(line) {
            return None;
        }
        Some((m, 2))
    } else {
        None
    }
}

/// An ordered list marker: one or more digits, then `.` or `)`, then a
/// space. Returns the start number, delimiter byte, and content offset.
pub fn ordered_marker(line: &str) -> Option<(usize, u8, usize)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 || i > 9 {
        return None;
    }
    if i >= bytes.len() {
        return None;
    }
    let delim = bytes[i];
    if delim != b'.' && delim != b')' {
        return None;
    }
    if i + 1 >= bytes.len() || bytes[i + 1] != b' ' {
        return None;
    }
    let start: usize = line[..i].parse().ok()?;
    Some((start, delim, i + 2))
}

/// The detail-block summary marker `--> `.
pub fn detail_summary(line: &str) -> Option<&str> {
    line.strip_prefix("--> ").or_else(|| {
        if line.trim_end() == "-->" {
            Some("")
        } else {
            None
        }
    })
}

/// The detail-block body marker `--| `.
pub fn detail_body(line: &str) -> Option<&str> {
    line.strip_prefix("--| ").or_else(|| {
        if line.trim_end() == "--|" {
            Some("")
        } else {
            None
        }
    })
}

/// Whether `line` opens a table (spec.md §4.11): any line beginning `|`.
pub fn table_start(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Whether every cell of a row is composed only of `-` characters (plus
/// optional leading/trailing `:` for GFM-style alignment, tolerated but
/// unused) — a separator row per spec.md §4.11.
pub fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            let t = c.trim();
            !t.is_empty() && t.bytes().all(|b| b == b'-' || b == b':')
        })
}

/// Split a table row into raw cell strings on unescaped `|`, following the
/// stripping conventions of spec.md §4.11: a leading and trailing `|` are
/// both optional and dropped; `\|` is an escaped pipe, kept literal.
pub fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('|')
        .unwrap_or(trimmed)
        .strip_suffix('|')
        .unwrap_or(trimmed.strip_prefix('|').unwrap_or(trimmed));
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '|' {
                    current.push('|');
                    chars.next();
                    continue;
                }
            }
            current.push(c);
        } else if c == '|' {
            cells.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thematic_breaks() {
        assert!(thematic_break("---"));
        assert!(thematic_break("* * *"));
        assert!(!thematic_break("--"));
        assert!(!thematic_break("- item"));
    }

    #[test]
    fn heading_underlines() {
        assert_eq!(heading_underline("==="), Some((b'=', 3)));
        assert_eq!(heading_underline("---"), Some((b'-', 3)));
        assert_eq!(heading_underline("...."), Some((b'.', 4)));
        assert_eq!(heading_underline("--"), Some((b'-', 2)));
    }

    #[test]
    fn fences() {
        assert_eq!(fence_open("```rust"), Some((0, b'`', 3, "rust")));
        assert_eq!(fence_open("  ~~~~ { .lang }"), Some((2, b'~', 4, "{ .lang }")));
        assert!(fence_close("```", b'`', 3));
        assert!(!fence_close("``", b'`', 3));
    }

    #[test]
    fn blockquote_prefixes() {
        assert_eq!(blockquote_prefix("> hi"), Some((1, 2)));
        assert_eq!(blockquote_prefix(">> hi"), Some((2, 3)));
    }

    #[test]
    fn list_markers() {
        assert_eq!(bullet_marker("- item"), Some((b'-', 2)));
        assert_eq!(ordered_marker("12. item"), Some((12, b'.', 4)));
        assert_eq!(bullet_marker("---"), None);
    }

    #[test]
    fn table_rows() {
        assert_eq!(
            split_table_row("| a | b\\|c | |"),
            vec!["a".to_string(), "b|c".to_string(), "".to_string()]
        );
        assert!(is_separator_row(&["---".to_string(), ":--".to_string()]));
    }
}
