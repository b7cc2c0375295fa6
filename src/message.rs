//! HTTP message values
//!
//! [`Request`] and [`Response`] are immutable. Every `with_*` and
//! `without_*` method returns a new value and leaves the receiver as it
//! was; header bags and cookie sets are shared between the old and new
//! value until one of them changes.
use std::{fmt::Display, str::FromStr, sync::Arc};

use crate::{
    error::{MessageError, MessageErrorKind},
    header::HeaderBag,
    stream::Body,
};

mod request;
mod response;
pub mod status;

pub use request::{HostSource, Request, RequestTarget};
pub use response::Response;

/// HTTP protocol version of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    Http10,
    #[default]
    Http11,
}

impl ProtocolVersion {
    /// Returns the version number without the `HTTP/` prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = MessageError;

    /// Accepts `1.0` and `1.1`, with or without a case-insensitive `HTTP/`
    /// prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = match s.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("HTTP/") => &s[5..],
            _ => s,
        };

        match version {
            "1.0" => Ok(Self::Http10),
            "1.1" => Ok(Self::Http11),
            _ => Err(MessageError::new(MessageErrorKind::InvalidProtocolVersion).with_value(s)),
        }
    }
}

impl Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parts common to requests and responses.
#[derive(Debug, Clone, Default)]
pub struct Message {
    protocol: ProtocolVersion,
    headers: Arc<HeaderBag>,
    body: Option<Body>,
}

impl Message {
    pub fn new(headers: HeaderBag, body: Option<Body>, protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            headers: Arc::new(headers),
            body,
        }
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers.get_all(name)
    }

    /// Returns the values of `name` joined by `", "`.
    pub fn header_line(&self, name: &str) -> Option<String> {
        self.headers.get_line(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn with_protocol_version(&self, protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            ..self.clone()
        }
    }

    pub fn with_header(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let mut new = self.clone();
        new.headers_mut().set(name, value)?;
        Ok(new)
    }

    pub fn with_header_values<I, V>(&self, name: &str, values: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let mut new = self.clone();
        new.headers_mut().set_all(name, values)?;
        Ok(new)
    }

    pub fn with_added_header(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let mut new = self.clone();
        new.headers_mut().add(name, value)?;
        Ok(new)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();

        if new.headers.contains(name) {
            new.headers_mut().remove(name);
        }

        new
    }

    pub fn with_body(&self, body: Body) -> Self {
        Self {
            body: Some(body),
            ..self.clone()
        }
    }

    pub fn without_body(&self) -> Self {
        Self {
            body: None,
            ..self.clone()
        }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderBag {
        Arc::make_mut(&mut self.headers)
    }

    #[cfg(test)]
    pub(crate) fn shares_headers_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.headers, &other.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Http11);
        assert_eq!("1.0".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::Http10);
        assert_eq!("HTTP/1.1".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::Http11);
        assert_eq!("http/1.0".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::Http10);
        assert_eq!(ProtocolVersion::Http10.to_string(), "1.0");

        for value in ["2", "1.2", "HTTP/2.0", ""] {
            assert_eq!(
                value.parse::<ProtocolVersion>().unwrap_err().kind(),
                MessageErrorKind::InvalidProtocolVersion
            );
        }
    }

    #[test]
    fn test_copy_on_write_headers() {
        let message = Message::default().with_header("Accept", "*/*").unwrap();
        let same = message.with_protocol_version(ProtocolVersion::Http10);
        let changed = message.with_added_header("Accept", "text/html").unwrap();

        assert!(same.shares_headers_with(&message));
        assert!(!changed.shares_headers_with(&message));
        assert_eq!(message.header_values("accept"), ["*/*"]);
        assert_eq!(changed.header_values("accept"), ["*/*", "text/html"]);
        assert_eq!(same.protocol_version(), ProtocolVersion::Http10);
        assert_eq!(message.protocol_version(), ProtocolVersion::Http11);
    }

    #[test]
    fn test_failed_mutation_leaves_original() {
        let message = Message::default().with_header("X-A", "1").unwrap();

        assert!(message.with_header("X-A", "bad\r\nvalue").is_err());
        assert!(message.with_header("Bad Name", "1").is_err());
        assert_eq!(message.header("x-a"), Some("1"));

        let removed = message.without_header("x-a");
        assert!(!removed.has_header("X-A"));
        assert!(message.has_header("X-A"));
    }

    #[test]
    fn test_body_shared() {
        let message = Message::default().with_body(Body::from_bytes("data"));
        let other = message.with_header("X", "1").unwrap();

        assert!(message.body().unwrap().ptr_eq(other.body().unwrap()));
        assert!(other.without_body().body().is_none());
    }
}
