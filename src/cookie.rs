//! `Cookie` and `Set-Cookie` header values
use std::fmt::Display;

use crate::{
    error::{MessageError, MessageErrorKind},
    parse::{is_cookie_value, is_token},
};

/// A cookie name-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    /// Create a cookie.
    ///
    /// The name must be a token and the value a run of cookie octets,
    /// optionally in double quotes.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Result<Self, MessageError> {
        let name = name.into();
        let value = value.into();

        if !is_token(&name) || !is_cookie_value(&value) {
            return Err(
                MessageError::new(MessageErrorKind::InvalidCookie).with_value(format!("{name}={value}"))
            );
        }

        Ok(Self { name, value })
    }

    /// Parse a single `name=value` pair, trimming surrounding whitespace.
    pub fn from_header(pair: &str) -> Result<Self, MessageError> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| MessageError::new(MessageErrorKind::InvalidCookie).with_value(pair))?;

        Self::new(name.trim(), value.trim())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn to_header(&self) -> String {
        self.to_string()
    }
}

impl Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Cookies keyed by name in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<Cookie>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self {
            cookies: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Insert a cookie, replacing the value of an existing one in place.
    pub fn insert(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        let index = self.cookies.iter().position(|c| c.name == name)?;

        Some(self.cookies.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cookie> {
        self.cookies.iter()
    }
}

impl<'a> IntoIterator for &'a CookieSet {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Cookie> for CookieSet {
    fn from_iter<T: IntoIterator<Item = Cookie>>(iter: T) -> Self {
        let mut set = Self::new();

        for cookie in iter {
            set.insert(cookie);
        }

        set
    }
}

/// Parse a `Cookie` header value such as `a=1; b=2`.
///
/// A repeated name keeps its first position and takes the later value.
pub fn parse_header_value(line: &str) -> Result<CookieSet, MessageError> {
    let mut set = CookieSet::new();
    parse_into(line, &mut set)?;
    Ok(set)
}

/// Format cookies as a `Cookie` header value.
pub fn to_header_value(cookies: &CookieSet) -> String {
    cookies
        .iter()
        .map(Cookie::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cookie set described by all `Cookie` header lines.
pub fn cookies_from_header<S: AsRef<str>>(lines: &[S]) -> Result<CookieSet, MessageError> {
    let mut set = CookieSet::new();

    for line in lines {
        parse_into(line.as_ref(), &mut set)?;
    }

    Ok(set)
}

/// `Cookie` header value for a set, or `None` when the set is empty.
pub fn header_from_cookies(cookies: &CookieSet) -> Option<String> {
    if cookies.is_empty() {
        None
    } else {
        Some(to_header_value(cookies))
    }
}

fn parse_into(line: &str, set: &mut CookieSet) -> Result<(), MessageError> {
    for pair in line.split(';') {
        if pair.trim().is_empty() {
            continue;
        }

        let cookie = Cookie::from_header(pair)?;
        tracing::trace!(name = cookie.name(), "parsed cookie");
        set.insert(cookie);
    }

    Ok(())
}

/// A cookie sent by a server along with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    cookie: Cookie,
    expires: Option<String>,
    max_age: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
}

impl SetCookie {
    pub fn new(cookie: Cookie) -> Self {
        Self {
            cookie,
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
        }
    }

    /// Parse a `Set-Cookie` header value.
    ///
    /// Attribute names are matched case-insensitively; unknown attributes
    /// are ignored.
    pub fn from_header(line: &str) -> Result<Self, MessageError> {
        let mut parts = line.split(';');
        let cookie = Cookie::from_header(parts.next().unwrap_or_default())?;
        let mut set_cookie = Self::new(cookie);

        for attribute in parts {
            let (name, value) = match attribute.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (attribute.trim(), None),
            };

            match (name.to_ascii_lowercase().as_str(), value) {
                ("expires", Some(value)) => set_cookie.expires = Some(value.to_string()),
                ("max-age", Some(value)) => {
                    let max_age = value.parse::<i64>().map_err(|error| {
                        MessageError::new(MessageErrorKind::InvalidCookie)
                            .with_value(value)
                            .with_source(error)
                    })?;
                    set_cookie.max_age = Some(max_age);
                }
                ("domain", Some(value)) => set_cookie.domain = Some(value.to_string()),
                ("path", Some(value)) => set_cookie.path = Some(value.to_string()),
                ("secure", _) => set_cookie.secure = true,
                ("httponly", _) => set_cookie.http_only = true,
                _ => {
                    tracing::trace!(attribute = name, "ignored cookie attribute");
                }
            }
        }

        Ok(set_cookie)
    }

    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }

    pub fn name(&self) -> &str {
        self.cookie.name()
    }

    pub fn value(&self) -> &str {
        self.cookie.value()
    }

    pub fn expires(&self) -> Option<&str> {
        self.expires.as_deref()
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Set the `Expires` attribute, an HTTP date.
    pub fn with_expires<S: AsRef<str>>(mut self, value: S) -> Result<Self, MessageError> {
        self.expires = Some(checked_attribute(value.as_ref())?);
        Ok(self)
    }

    pub fn with_max_age(mut self, value: i64) -> Self {
        self.max_age = Some(value);
        self
    }

    pub fn with_domain<S: AsRef<str>>(mut self, value: S) -> Result<Self, MessageError> {
        self.domain = Some(checked_attribute(value.as_ref())?);
        Ok(self)
    }

    pub fn with_path<S: AsRef<str>>(mut self, value: S) -> Result<Self, MessageError> {
        self.path = Some(checked_attribute(value.as_ref())?);
        Ok(self)
    }

    pub fn with_secure(mut self, value: bool) -> Self {
        self.secure = value;
        self
    }

    pub fn with_http_only(mut self, value: bool) -> Self {
        self.http_only = value;
        self
    }

    pub fn to_header(&self) -> String {
        self.to_string()
    }
}

impl Display for SetCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cookie)?;

        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires)?;
        }

        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }

        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }

        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }

        if self.secure {
            f.write_str("; Secure")?;
        }

        if self.http_only {
            f.write_str("; HttpOnly")?;
        }

        Ok(())
    }
}

fn checked_attribute(value: &str) -> Result<String, MessageError> {
    if value.chars().any(|c| c.is_ascii_control() || c == ';') {
        Err(MessageError::new(MessageErrorKind::InvalidCookie).with_value(value))
    } else {
        Ok(value.to_string())
    }
}
