//! HTTP header fields
use std::fmt::Display;

use crate::{
    error::{MessageError, MessageErrorKind},
    util::to_ascii_lowercase_cow,
};

mod ser;

/// Data structure for HTTP header fields.
///
/// An ordered map keyed by the lowercased field name. Each entry keeps the
/// name as it was last given and the list of values in insertion order.
///
/// Names must be tokens and values must not contain control characters
/// other than horizontal tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<HeaderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    key: String,
    name: String,
    values: Vec<String>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from name-value pairs, appending repeated names.
    pub fn try_from_pairs<I, N, V>(pairs: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut bag = Self::new();

        for (name, value) in pairs {
            bag.add(name.as_ref(), value.as_ref())?;
        }

        Ok(bag)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    /// Replace all values of `name` with `value`.
    ///
    /// The given casing of `name` becomes the stored one.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), MessageError> {
        self.set_all(name, [value])
    }

    /// Replace all values of `name` with `values`.
    pub fn set_all<I, V>(&mut self, name: &str, values: I) -> Result<(), MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        validate_name(name)?;

        let values = values
            .into_iter()
            .map(|value| validate_value(value.as_ref()).map(|_| value.as_ref().to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        self.set_trusted(name, values);

        Ok(())
    }

    /// Replace all values of `name` with values built from validated parts.
    pub(crate) fn set_trusted(&mut self, name: &str, values: Vec<String>) {
        debug_assert!(validate_name(name).is_ok());
        debug_assert!(values.iter().all(|value| validate_value(value).is_ok()));

        let key = to_ascii_lowercase_cow(name);

        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.name = name.to_string();
                entry.values = values;
            }
            None => self.entries.push(HeaderEntry {
                key: key.into_owned(),
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Append a value to `name`, creating the entry if absent.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), MessageError> {
        validate_name(name)?;
        validate_value(value)?;

        let key = to_ascii_lowercase_cow(name);

        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.values.push(value.to_string()),
            None => self.entries.push(HeaderEntry {
                key: key.into_owned(),
                name: name.to_string(),
                values: vec![value.to_string()],
            }),
        }

        Ok(())
    }

    pub fn remove(&mut self, name: &str) {
        let key = to_ascii_lowercase_cow(name);

        self.entries.retain(|entry| entry.key != key);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Returns the first value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name)
            .and_then(|entry| entry.values.first())
            .map(String::as_str)
    }

    /// Returns all values of `name`, or an empty slice.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entry(name)
            .map(|entry| entry.values.as_slice())
            .unwrap_or_default()
    }

    /// Returns the values of `name` joined by `", "`.
    ///
    /// `Host` is never joined; only its first value is returned.
    pub fn get_line(&self, name: &str) -> Option<String> {
        let entry = self.entry(name)?;

        if entry.key == "host" {
            entry.values.first().cloned()
        } else {
            Some(entry.values.join(", "))
        }
    }

    /// Returns the stored casing of `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|entry| entry.name.as_str())
    }

    /// Iterate entries as stored name and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    fn entry(&self, name: &str) -> Option<&HeaderEntry> {
        let key = to_ascii_lowercase_cow(name);

        self.entries.iter().find(|entry| entry.key == key)
    }
}

impl Display for HeaderBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, values) in self.iter() {
            for value in values {
                write!(f, "{}: {}\r\n", name, value)?;
            }
        }

        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), MessageError> {
    if crate::parse::is_token(name) {
        Ok(())
    } else {
        Err(MessageError::new(MessageErrorKind::InvalidHeaderName).with_value(name))
    }
}

pub fn validate_value(value: &str) -> Result<(), MessageError> {
    if value.chars().any(|c| c.is_ascii_control() && c != '\t') {
        Err(MessageError::new(MessageErrorKind::InvalidHeaderValue).with_value(value))
    } else {
        Ok(())
    }
}
