use std::{borrow::Cow, fmt::Display, sync::Arc};

use crate::{
    cookie::{Cookie, CookieSet, cookies_from_header, header_from_cookies},
    error::{MessageError, MessageErrorKind},
    header::HeaderBag,
    stream::Body,
    uri::{
        IntoUri, Query, Uri,
        encode::{PATH, encode},
    },
    util::to_ascii_uppercase_cow,
};

use super::{Message, ProtocolVersion};

const HOST: &str = "Host";
const COOKIE: &str = "Cookie";

/// Where the `Host` header of a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSource {
    /// Set by the caller. URI changes leave it alone.
    Explicit,
    /// Computed from the URI authority and recomputed whenever the URI
    /// changes.
    DerivedFromUri,
}

/// An explicitly set request-target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestTarget {
    /// `/path?query`, percent-encoded.
    Origin(String),
    /// `http://host/path`, kept as given.
    Absolute(String),
    /// `host:port` kept as given, or any other form normalized to
    /// `//authority[/path][?query]`.
    Authority(String),
    /// `*`
    Asterisk,
}

impl RequestTarget {
    /// Classify and validate a request-target.
    ///
    /// An empty string means no explicit target. Control characters are
    /// never accepted. Spaces are percent-encoded except in the forms kept
    /// verbatim, where they are rejected.
    pub fn parse(value: &str) -> Result<Option<Self>, MessageError> {
        if value.is_empty() {
            return Ok(None);
        }

        if value.chars().any(|c| c.is_control()) {
            return Err(invalid_target(value));
        }

        if value == "*" {
            return Ok(Some(Self::Asterisk));
        }

        let value = value.split_once('#').map_or(value, |(target, _)| target);

        if value.starts_with('/') {
            let (path, query) = value.split_once('?').unwrap_or((value, ""));

            return Ok(Some(Self::Origin(join_path_query(
                &encode(path, PATH),
                &Query::parse(query),
            ))));
        }

        let verbatim = has_http_prefix(value) || !value.contains(['/', '?', '@']);

        if verbatim && value.contains(char::is_whitespace) {
            return Err(invalid_target(value));
        }

        if has_http_prefix(value) {
            let uri = Uri::parse(value)?;

            if uri.host().is_empty() {
                return Err(invalid_target(value));
            }

            return Ok(Some(Self::Absolute(value.to_string())));
        }

        if value.contains("://") {
            return Err(invalid_target(value));
        }

        let uri = Uri::parse(&format!("//{}", value))?;

        if uri.host().is_empty() {
            return Err(invalid_target(value));
        }

        if verbatim && uri.explicit_port().is_some() {
            return Ok(Some(Self::Authority(value.to_string())));
        }

        let mut target = format!("//{}", uri.authority());

        if value.contains('/') {
            target.push_str(uri.path());
        }

        Ok(Some(Self::Authority(join_path_query(&target, uri.query_pairs()))))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Origin(value) | Self::Absolute(value) | Self::Authority(value) => value,
            Self::Asterisk => "*",
        }
    }
}

impl Display for RequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn invalid_target(value: &str) -> MessageError {
    MessageError::new(MessageErrorKind::InvalidTarget).with_value(value)
}

fn join_path_query(path: &str, query: &Query) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

fn has_http_prefix(value: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// HTTP request.
///
/// The `Host` header follows the URI while [`Request::host_source`] is
/// [`HostSource::DerivedFromUri`]. The `Cookie` header and the cookie set
/// always describe the same cookies.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: String,
    uri: Arc<Uri>,
    target: Option<RequestTarget>,
    host_source: HostSource,
    cookies: Arc<CookieSet>,
}

impl Request {
    pub fn new<U: IntoUri>(method: &str, uri: U) -> Result<Self, MessageError> {
        Self::from_parts(
            method,
            uri,
            HeaderBag::new(),
            None,
            "",
            ProtocolVersion::default(),
        )
    }

    /// Create a request from all of its parts.
    ///
    /// A `Host` header in `headers` is treated as explicit. An empty
    /// `target` derives the request-target from the URI.
    pub fn from_parts<U: IntoUri>(
        method: &str,
        uri: U,
        headers: HeaderBag,
        body: Option<Body>,
        target: &str,
        protocol: ProtocolVersion,
    ) -> Result<Self, MessageError> {
        let method = filter_method(method)?;
        let uri = uri.into_uri()?;
        let target = RequestTarget::parse(target)?;
        let cookies = cookies_from_header(headers.get_all(COOKIE))?;
        let host_source = if headers.contains(HOST) {
            HostSource::Explicit
        } else {
            HostSource::DerivedFromUri
        };

        let mut request = Self {
            message: Message::new(headers, body, protocol),
            method,
            uri: Arc::new(uri),
            target,
            host_source,
            cookies: Arc::new(cookies),
        };

        if host_source == HostSource::DerivedFromUri {
            request.derive_host();
        }

        Ok(request)
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request-target.
    ///
    /// Without an explicit target, this is the URI path, always starting
    /// with `/`, followed by the query when present.
    pub fn request_target(&self) -> Cow<'_, str> {
        if let Some(target) = &self.target {
            return Cow::Borrowed(target.as_str());
        }

        let path = self.uri.path();

        let path = if path.starts_with('/') {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(format!("/{}", path))
        };

        Cow::Owned(join_path_query(&path, self.uri.query_pairs()))
    }

    pub fn explicit_target(&self) -> Option<&RequestTarget> {
        self.target.as_ref()
    }

    pub fn host_source(&self) -> HostSource {
        self.host_source
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.message.protocol_version()
    }

    pub fn headers(&self) -> &HeaderBag {
        self.message.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.message.header(name)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.message.header_values(name)
    }

    pub fn header_line(&self, name: &str) -> Option<String> {
        self.message.header_line(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.message.has_header(name)
    }

    pub fn body(&self) -> Option<&Body> {
        self.message.body()
    }

    pub fn cookies(&self) -> &CookieSet {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains(name)
    }

    pub fn with_method(&self, method: &str) -> Result<Self, MessageError> {
        Ok(Self {
            method: filter_method(method)?,
            ..self.clone()
        })
    }

    /// Replace the URI, updating `Host` unless it was set explicitly.
    pub fn with_uri<U: IntoUri>(&self, uri: U) -> Result<Self, MessageError> {
        let mut new = Self {
            uri: Arc::new(uri.into_uri()?),
            ..self.clone()
        };

        if new.host_source == HostSource::DerivedFromUri {
            new.derive_host();
        }

        Ok(new)
    }

    /// Set an explicit request-target, or clear it with an empty string.
    pub fn with_request_target(&self, target: &str) -> Result<Self, MessageError> {
        Ok(Self {
            target: RequestTarget::parse(target)?,
            ..self.clone()
        })
    }

    pub fn with_protocol_version(&self, protocol: ProtocolVersion) -> Self {
        Self {
            message: self.message.with_protocol_version(protocol),
            ..self.clone()
        }
    }

    pub fn with_header(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let mut new = Self {
            message: self.message.with_header(name, value)?,
            ..self.clone()
        };

        if name.eq_ignore_ascii_case(HOST) {
            new.host_source = HostSource::Explicit;
        } else if name.eq_ignore_ascii_case(COOKIE) {
            new.sync_cookies_from_header()?;
        }

        Ok(new)
    }

    /// Append a header value.
    ///
    /// Adding `Host` to a request whose `Host` is derived replaces the
    /// derived value.
    pub fn with_added_header(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let is_host = name.eq_ignore_ascii_case(HOST);

        if is_host && self.host_source == HostSource::DerivedFromUri {
            return Ok(Self {
                message: self.message.with_header(name, value)?,
                host_source: HostSource::Explicit,
                ..self.clone()
            });
        }

        let mut new = Self {
            message: self.message.with_added_header(name, value)?,
            ..self.clone()
        };

        if name.eq_ignore_ascii_case(COOKIE) {
            new.sync_cookies_from_header()?;
        }

        Ok(new)
    }

    /// Remove a header.
    ///
    /// Removing `Host` derives it from the URI again. Removing `Cookie`
    /// clears the cookie set.
    pub fn without_header(&self, name: &str) -> Self {
        let mut new = Self {
            message: self.message.without_header(name),
            ..self.clone()
        };

        if name.eq_ignore_ascii_case(HOST) {
            new.derive_host();
        } else if name.eq_ignore_ascii_case(COOKIE) {
            new.cookies = Arc::new(CookieSet::new());
        }

        new
    }

    pub fn with_body(&self, body: Body) -> Self {
        Self {
            message: self.message.with_body(body),
            ..self.clone()
        }
    }

    pub fn without_body(&self) -> Self {
        Self {
            message: self.message.without_body(),
            ..self.clone()
        }
    }

    /// Add or replace a cookie and rewrite the `Cookie` header.
    pub fn with_cookie(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let cookie = Cookie::new(name, value)?;
        let mut new = self.clone();

        Arc::make_mut(&mut new.cookies).insert(cookie);
        new.sync_header_from_cookies();

        Ok(new)
    }

    /// Remove a cookie and rewrite the `Cookie` header.
    ///
    /// The header is removed when no cookies remain.
    pub fn without_cookie(&self, name: &str) -> Self {
        let mut new = self.clone();

        if new.cookies.contains(name) {
            Arc::make_mut(&mut new.cookies).remove(name);
            new.sync_header_from_cookies();
        }

        new
    }

    fn derive_host(&mut self) {
        self.host_source = HostSource::DerivedFromUri;

        let host = self.uri.host();

        if host.is_empty() {
            if self.message.has_header(HOST) {
                tracing::debug!("URI has no host, removing Host header");
                self.message.headers_mut().remove(HOST);
            }
            return;
        }

        let value = match self.uri.explicit_port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        tracing::debug!(host = value.as_str(), "derived Host header from URI");
        self.message.headers_mut().set_trusted(HOST, vec![value]);
    }

    fn sync_cookies_from_header(&mut self) -> Result<(), MessageError> {
        self.cookies = Arc::new(cookies_from_header(self.message.header_values(COOKIE))?);
        Ok(())
    }

    fn sync_header_from_cookies(&mut self) {
        match header_from_cookies(&self.cookies) {
            Some(value) => self.message.headers_mut().set_trusted(COOKIE, vec![value]),
            None => {
                if self.message.has_header(COOKIE) {
                    self.message.headers_mut().remove(COOKIE);
                }
            }
        }
    }
}

fn filter_method(method: &str) -> Result<String, MessageError> {
    if crate::parse::is_token(method) {
        Ok(to_ascii_uppercase_cow(method).into_owned())
    } else {
        Err(MessageError::new(MessageErrorKind::InvalidMethod).with_value(method))
    }
}
