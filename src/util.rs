use std::borrow::Cow;

pub fn to_ascii_uppercase_cow(text: &str) -> Cow<'_, str> {
    if text.chars().any(|c| c.is_ascii_lowercase()) {
        Cow::Owned(text.to_ascii_uppercase())
    } else {
        Cow::Borrowed(text)
    }
}

pub fn to_ascii_lowercase_cow(text: &str) -> Cow<'_, str> {
    if text.chars().any(|c| c.is_ascii_uppercase()) {
        Cow::Owned(text.to_ascii_lowercase())
    } else {
        Cow::Borrowed(text)
    }
}

/// Returns whether a comma-separated field value lists `item`.
///
/// Items are compared case-insensitively after trimming whitespace.
pub fn comma_list_contains(value: &str, item: &str) -> bool {
    value
        .split(',')
        .any(|candidate| candidate.trim().eq_ignore_ascii_case(item))
}
