//! Percent-encoding of URI components.
//!
//! Encoding is idempotent: a `%` that already starts a valid triplet is
//! copied through, so encoding an encoded component changes nothing.
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// unreserved / sub-delims
const REG_NAME: &AsciiSet = &UNRESERVED
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

pub const HOST: &AsciiSet = REG_NAME;
pub const USER_INFO: &AsciiSet = &REG_NAME.remove(b':');
/// The user part of user info, where `:` would start the password.
pub const USER: &AsciiSet = REG_NAME;
pub const PATH: &AsciiSet = &REG_NAME.remove(b':').remove(b'@').remove(b'/');
pub const FRAGMENT: &AsciiSet = &PATH.remove(b'?');
pub const QUERY_VALUE: &AsciiSet = &FRAGMENT.add(b'&');
pub const QUERY_KEY: &AsciiSet = &QUERY_VALUE.add(b'=');

/// Percent-encode `value`, leaving existing percent-encoded triplets alone.
pub fn encode(value: &str, set: &'static AsciiSet) -> String {
    let bytes = value.as_bytes();
    let mut output = String::with_capacity(value.len());
    let mut start = 0;
    let mut index = 0;

    while let Some(offset) = value[index..].find('%') {
        let position = index + offset;

        if is_triplet(&bytes[position..]) {
            output.extend(utf8_percent_encode(&value[start..position], set));
            output.push_str(&value[position..position + 3]);
            start = position + 3;
            index = start;
        } else {
            index = position + 1;
        }
    }

    output.extend(utf8_percent_encode(&value[start..], set));
    output
}

/// Uppercase the hex digits of every percent-encoded triplet.
pub fn uppercase_triplets(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut output = String::with_capacity(value.len());
    let mut skip = 0;

    for (index, c) in value.char_indices() {
        if skip > 0 {
            skip -= 1;
        } else if is_triplet(&bytes[index..]) {
            output.push('%');
            output.push(char::from(bytes[index + 1].to_ascii_uppercase()));
            output.push(char::from(bytes[index + 2].to_ascii_uppercase()));
            skip = 2;
        } else {
            output.push(c);
        }
    }

    output
}

fn is_triplet(bytes: &[u8]) -> bool {
    bytes.len() >= 3
        && bytes[0] == b'%'
        && bytes[1].is_ascii_hexdigit()
        && bytes[2].is_ascii_hexdigit()
}
