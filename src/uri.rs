//! Small request-string transforms shared by the protocol adapters.

use percent_encoding::percent_decode;

/// Percent-decode a query string.
///
/// `%HH` triplets with two hex digits become the decoded byte; anything else
/// is copied verbatim, including lone `%` and `%` followed by non-hex.
pub fn percent_decode_str(s: &str) -> String {
    percent_decode(s.as_bytes()).decode_utf8_lossy().into_owned()
}

/// ROT13 over ASCII letters only; all other bytes pass through.
pub fn rot13(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'a'..=b'z' => b'a' + (b - b'a' + 13) % 26,
            b'A'..=b'Z' => b'A' + (b - b'A' + 13) % 26,
            other => other,
        })
        .map(char::from)
        .collect()
}

/// Lowercase every byte of a path component.
///
/// Applied to the path only, never the query.
pub fn fold_path(path: &str) -> String {
    path.to_ascii_lowercase()
}
