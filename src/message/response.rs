use std::sync::Arc;

use crate::{
    cookie::SetCookie,
    error::{MessageError, MessageErrorKind},
    header::HeaderBag,
    stream::Body,
};

use super::{
    Message, ProtocolVersion,
    status::{is_valid_status, reason_phrase},
};

const SET_COOKIE: &str = "Set-Cookie";

/// HTTP response.
///
/// Cookies set by the response are kept in step with its `Set-Cookie`
/// header lines, one line per cookie.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
    cookies: Arc<Vec<SetCookie>>,
}

impl Response {
    /// Create a response with the standard reason phrase for `status`.
    pub fn new(status: u16) -> Result<Self, MessageError> {
        Self::from_parts(status, None, HeaderBag::new(), None, ProtocolVersion::default())
    }

    pub fn from_parts(
        status: u16,
        reason: Option<&str>,
        headers: HeaderBag,
        body: Option<Body>,
        protocol: ProtocolVersion,
    ) -> Result<Self, MessageError> {
        let (status, reason) = filter_status(status, reason)?;
        let cookies = set_cookies_from_header(headers.get_all(SET_COOKIE))?;

        Ok(Self {
            message: Message::new(headers, body, protocol),
            status,
            reason,
            cookies: Arc::new(cookies),
        })
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
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

    pub fn cookies(&self) -> &[SetCookie] {
        &self.cookies
    }

    /// Returns the first cookie named `name`.
    ///
    /// Cookies with the same name but a different `Domain` or `Path` are
    /// separate entries; see [`Self::cookies`].
    pub fn cookie(&self, name: &str) -> Option<&SetCookie> {
        self.cookies.iter().find(|cookie| cookie.name() == name)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookie(name).is_some()
    }

    /// Set the status code.
    ///
    /// Without a reason phrase, the standard one for the code is used, or an
    /// empty string for unregistered codes.
    pub fn with_status(&self, status: u16, reason: Option<&str>) -> Result<Self, MessageError> {
        let (status, reason) = filter_status(status, reason)?;

        Ok(Self {
            status,
            reason,
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

        if name.eq_ignore_ascii_case(SET_COOKIE) {
            new.sync_cookies_from_header()?;
        }

        Ok(new)
    }

    pub fn with_added_header(&self, name: &str, value: &str) -> Result<Self, MessageError> {
        let mut new = Self {
            message: self.message.with_added_header(name, value)?,
            ..self.clone()
        };

        if name.eq_ignore_ascii_case(SET_COOKIE) {
            new.sync_cookies_from_header()?;
        }

        Ok(new)
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut new = Self {
            message: self.message.without_header(name),
            ..self.clone()
        };

        if name.eq_ignore_ascii_case(SET_COOKIE) {
            new.cookies = Arc::new(Vec::new());
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

    /// Add a cookie and rewrite the `Set-Cookie` lines.
    ///
    /// A cookie with the same name, domain, and path is replaced in place.
    pub fn with_cookie(&self, cookie: SetCookie) -> Self {
        let mut new = self.clone();

        insert_cookie(Arc::make_mut(&mut new.cookies), cookie);
        new.sync_header_from_cookies();

        new
    }

    /// Remove every cookie named `name`, whatever its domain or path.
    pub fn without_cookie(&self, name: &str) -> Self {
        let mut new = self.clone();

        if new.has_cookie(name) {
            Arc::make_mut(&mut new.cookies).retain(|cookie| cookie.name() != name);
            new.sync_header_from_cookies();
        }

        new
    }

    fn sync_cookies_from_header(&mut self) -> Result<(), MessageError> {
        self.cookies = Arc::new(set_cookies_from_header(
            self.message.header_values(SET_COOKIE),
        )?);
        Ok(())
    }

    fn sync_header_from_cookies(&mut self) {
        if self.cookies.is_empty() {
            if self.message.has_header(SET_COOKIE) {
                self.message.headers_mut().remove(SET_COOKIE);
            }
        } else {
            let lines = self.cookies.iter().map(SetCookie::to_header).collect();
            self.message.headers_mut().set_trusted(SET_COOKIE, lines);
        }
    }
}

fn filter_status(status: u16, reason: Option<&str>) -> Result<(u16, String), MessageError> {
    if !is_valid_status(status) {
        return Err(
            MessageError::new(MessageErrorKind::InvalidStatus).with_value(status.to_string())
        );
    }

    let reason = match reason {
        Some(reason) => {
            if reason.chars().any(|c| c.is_ascii_control() && c != '\t') {
                return Err(
                    MessageError::new(MessageErrorKind::InvalidReasonPhrase).with_value(reason)
                );
            }
            reason.to_string()
        }
        None => reason_phrase(status).unwrap_or_default().to_string(),
    };

    Ok((status, reason))
}

fn set_cookies_from_header(lines: &[String]) -> Result<Vec<SetCookie>, MessageError> {
    let mut cookies = Vec::new();

    for line in lines {
        insert_cookie(&mut cookies, SetCookie::from_header(line)?);
    }

    Ok(cookies)
}

fn insert_cookie(cookies: &mut Vec<SetCookie>, cookie: SetCookie) {
    let existing = cookies.iter_mut().find(|c| {
        c.name() == cookie.name() && c.domain() == cookie.domain() && c.path() == cookie.path()
    });

    match existing {
        Some(existing) => *existing = cookie,
        None => cookies.push(cookie),
    }
}

#[cfg(test)]
mod tests {
    use crate::cookie::Cookie;

    use super::*;

    #[test]
    fn test_status() {
        let response = Response::new(404).unwrap();

        assert_eq!(response.status(), 404);
        assert_eq!(response.reason(), "Not Found");

        let response = response.with_status(599, None).unwrap();
        assert_eq!(response.reason(), "");

        let response = response.with_status(200, Some("Fine")).unwrap();
        assert_eq!(response.reason(), "Fine");

        for status in [0, 99, 600, 1000] {
            assert_eq!(
                Response::new(status).unwrap_err().kind(),
                MessageErrorKind::InvalidStatus
            );
            assert_eq!(
                response.with_status(status, None).unwrap_err().kind(),
                MessageErrorKind::InvalidStatus
            );
        }

        assert_eq!(
            response
                .with_status(200, Some("OK\r\nX-Injected: 1"))
                .unwrap_err()
                .kind(),
            MessageErrorKind::InvalidReasonPhrase
        );
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "Fine");
    }

    #[test]
    fn test_set_cookie_sync() {
        let response = Response::new(200)
            .unwrap()
            .with_cookie(SetCookie::new(Cookie::new("a", "1").unwrap()).with_http_only(true))
            .with_cookie(SetCookie::new(Cookie::new("b", "2").unwrap()));

        assert_eq!(response.header_values("set-cookie"), ["a=1; HttpOnly", "b=2"]);

        let response = response.with_cookie(SetCookie::new(Cookie::new("a", "3").unwrap()));
        assert_eq!(response.header_values("Set-Cookie"), ["a=3", "b=2"]);

        let response = response.without_cookie("a");
        assert!(!response.has_cookie("a"));
        assert_eq!(response.header_values("Set-Cookie"), ["b=2"]);

        let response = response.without_cookie("b");
        assert!(!response.has_header("Set-Cookie"));
    }

    #[test]
    fn test_set_cookie_scoped_by_domain_and_path() {
        let response = Response::new(200)
            .unwrap()
            .with_header("Set-Cookie", "id=1; Path=/a")
            .unwrap()
            .with_added_header("Set-Cookie", "id=2; Path=/b")
            .unwrap()
            .with_added_header("Set-Cookie", "id=3; Domain=example.com; Path=/b")
            .unwrap();

        assert_eq!(response.cookies().len(), 3);

        let response = response.with_cookie(
            SetCookie::new(Cookie::new("id", "4").unwrap())
                .with_path("/b")
                .unwrap(),
        );
        assert_eq!(
            response.header_values("Set-Cookie"),
            ["id=1; Path=/a", "id=4; Path=/b", "id=3; Domain=example.com; Path=/b"]
        );

        let response = response.with_cookie(SetCookie::new(Cookie::new("other", "x").unwrap()));
        assert_eq!(response.cookies().len(), 4);
        assert_eq!(response.header_values("Set-Cookie")[2], "id=3; Domain=example.com; Path=/b");

        let response = response.without_cookie("id");
        assert_eq!(response.header_values("Set-Cookie"), ["other=x"]);
    }

    #[test]
    fn test_set_cookie_header_sync() {
        let response = Response::new(200)
            .unwrap()
            .with_header("Set-Cookie", "id=1; Path=/")
            .unwrap()
            .with_added_header("Set-Cookie", "theme=dark; Max-Age=60")
            .unwrap();

        assert_eq!(response.cookies().len(), 2);
        assert_eq!(response.cookie("id").and_then(SetCookie::path), Some("/"));
        assert_eq!(response.cookie("theme").and_then(SetCookie::max_age), Some(60));

        assert!(response.with_added_header("Set-Cookie", "novalue").is_err());

        let response = response.without_header("set-cookie");
        assert!(response.cookies().is_empty());
    }
}
