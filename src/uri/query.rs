use std::{borrow::Cow, fmt::Display};

use percent_encoding::percent_decode_str;

use super::encode::{QUERY_KEY, QUERY_VALUE, encode};

/// Ordered query component.
///
/// Keys may repeat. Keys and values are stored percent-encoded. A value of
/// `None` is a key written without `=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, Option<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(value: &str) -> Self {
        let value = value.strip_prefix('?').unwrap_or(value);
        let mut query = Self::new();

        for item in value.split('&').filter(|item| !item.is_empty()) {
            let pair = match item.split_once('=') {
                Some((key, value)) => (encode(key, QUERY_KEY), Some(encode(value, QUERY_VALUE))),
                None => (encode(item, QUERY_KEY), None),
            };

            query.pairs.push(pair);
        }

        query
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the first value for `key`, percent-decoded.
    ///
    /// A key without a value returns an empty string.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get_all(key).next()
    }

    /// Returns every value for `key` in order, percent-decoded.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = Cow<'a, str>> + use<'a> {
        let key = encode(key, QUERY_KEY);

        self.pairs.iter().filter_map(move |(k, v)| {
            if *k == key {
                Some(decode(v.as_deref().unwrap_or_default()))
            } else {
                None
            }
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        let key = encode(key, QUERY_KEY);

        self.pairs.iter().any(|(k, _v)| *k == key)
    }

    /// Replace every entry for `key` with a single entry.
    ///
    /// The entry takes the position of the first existing one, or is
    /// appended.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        let key = encode(key, QUERY_KEY);
        let value = value.map(|value| encode(value, QUERY_VALUE));

        // An empty key without a value has no textual form.
        if key.is_empty() && value.is_none() {
            self.pairs.retain(|(k, _v)| !k.is_empty());
            return;
        }

        match self.pairs.iter().position(|(k, _v)| *k == key) {
            Some(index) => {
                self.pairs[index].1 = value;

                let mut position = 0;
                self.pairs.retain(|(k, _v)| {
                    let keep = position <= index || *k != key;
                    position += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        let key = encode(key, QUERY_KEY);

        self.pairs.retain(|(k, _v)| *k != key);
    }

    /// Iterate over the stored, percent-encoded pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

fn decode(value: &str) -> Cow<'_, str> {
    percent_decode_str(value).decode_utf8_lossy()
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }

            f.write_str(key)?;

            if let Some(value) = value {
                write!(f, "={}", value)?;
            }
        }

        Ok(())
    }
}
