//! Parsing utilities.
use std::{borrow::Cow, sync::LazyLock};

use nom::Parser;
use regex::bytes::Regex;

use crate::error::ParseError;

pub mod fields;
pub(crate) mod header_deliminator;

/// Get the index (inclusive) of the header deliminator (an empty line).
pub fn scan_header_deliminator(data: &[u8]) -> Option<usize> {
    match header_deliminator::field_lines(data) {
        Ok((_input, output)) => Some(output.len()),
        Err(_) => None,
    }
}

/// Parse a HTTP-like fields of name-value pairs.
pub fn parse_name_value_fields(value: &[u8]) -> Result<Vec<fields::FieldPairRef<'_>>, ParseError> {
    match nom::combinator::all_consuming(fields::field_pairs).parse(value) {
        Ok((_input, output)) => Ok(output),
        Err(error) => Err(error.into()),
    }
}

/// Returns whether the value is made only of token characters.
pub fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(fields::is_tchar)
}

/// Returns whether the value is a valid cookie value.
///
/// Either a run of cookie octets or the same wrapped in double quotes.
pub fn is_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    inner.bytes().all(fields::is_cookie_octet)
}

/// Parse a value into a `u64`.
///
/// Unlike [`u64::try_from()`], only ASCII digits are permitted. Use of std
/// library parsing functions may lead to security issues.
pub fn parse_u64_strict(value: &str) -> Result<u64, std::num::ParseIntError> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return "?".parse();
    }

    value.parse()
}

static LINE_FOLDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r\n|\n)[ \t]+").unwrap());

/// Remove line folding from a HTTP-like field value.
pub fn remove_line_folding(value: &[u8]) -> Cow<'_, [u8]> {
    LINE_FOLDING.replace_all(value, b" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_header_none() {
        assert_eq!(scan_header_deliminator(b""), None);
        assert_eq!(scan_header_deliminator(b"a"), None);
    }

    #[test]
    fn test_scan_header() {
        assert_eq!(scan_header_deliminator(b"\r\nz"), Some(2));
        assert_eq!(scan_header_deliminator(b"a\r\n\r\nz"), Some(5));
        assert_eq!(scan_header_deliminator(b"a\r\nb\r\n\r\nz"), Some(8));
        assert_eq!(scan_header_deliminator(b"a\nb\n\nz"), Some(5));
    }

    #[test]
    fn test_remove_line_folding() {
        assert_eq!(*remove_line_folding(b"abc"), *b"abc");
        assert_eq!(*remove_line_folding(b"abc\r\n  def"), *b"abc def");
        assert_eq!(
            *remove_line_folding(b"abc\r\n  def\r\n\t123"),
            *b"abc def 123"
        );
        assert_eq!(*remove_line_folding(b"abc\n  def"), *b"abc def");
    }

    #[test]
    fn test_is_token() {
        assert!(is_token("GET"));
        assert!(is_token("session_id"));
        assert!(!is_token(""));
        assert!(!is_token("a b"));
        assert!(!is_token("a;b"));
    }

    #[test]
    fn test_is_cookie_value() {
        assert!(is_cookie_value(""));
        assert!(is_cookie_value("abc123"));
        assert!(is_cookie_value("\"quoted\""));
        assert!(!is_cookie_value("a b"));
        assert!(!is_cookie_value("a;b"));
        assert!(!is_cookie_value("a,b"));
        assert!(!is_cookie_value("\"a\"b\""));
    }

    #[test]
    fn test_parse_u64_strict() {
        assert_eq!(parse_u64_strict("8080"), Ok(8080));
        assert!(parse_u64_strict("+80").is_err());
        assert!(parse_u64_strict("-1").is_err());
        assert!(parse_u64_strict("").is_err());
    }
}
