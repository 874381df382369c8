//! Field splitting for line-oriented text formats.

use alloc::vec::Vec;

/// Split `line` on every `delimiter`, keeping empty fields.
///
/// Leading, trailing and consecutive delimiters each produce an empty field,
/// so the result always has one more entry than there are delimiters.
/// An empty `line` yields a single empty field.
pub fn split_string(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

/// Strip spaces, tabs, `\r` and `\n` from both ends of `s`.
pub fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
}
