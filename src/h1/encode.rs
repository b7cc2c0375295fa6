use std::borrow::Cow;

use crate::{
    header::HeaderBag,
    message::{Request, Response},
};

/// Serializes message heads into HTTP/1.1 wire format.
///
/// The output is the start-line, one line per header value, and the empty
/// line that ends the head. `Host` lines are written first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Http1Encoder {}

impl Http1Encoder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn encode_request(&self, request: &Request) -> Vec<u8> {
        let mut output = format!(
            "{} {} HTTP/{}\r\n",
            request.method(),
            escape(&request.request_target()),
            request.protocol_version()
        );

        encode_headers(request.headers(), &mut output);
        tracing::debug!(len = output.len(), "encoded request head");

        output.into_bytes()
    }

    pub fn encode_response(&self, response: &Response) -> Vec<u8> {
        let mut output = format!(
            "HTTP/{} {:03} {}\r\n",
            response.protocol_version(),
            response.status(),
            escape(response.reason())
        );

        encode_headers(response.headers(), &mut output);
        tracing::debug!(len = output.len(), "encoded response head");

        output.into_bytes()
    }
}

fn encode_headers(headers: &HeaderBag, output: &mut String) {
    let (host, other): (Vec<_>, Vec<_>) = headers
        .iter()
        .partition(|(name, _values)| name.eq_ignore_ascii_case("host"));

    for (name, values) in host.into_iter().chain(other) {
        for value in values {
            output.push_str(name);
            output.push_str(": ");
            output.push_str(&escape(value));
            output.push_str("\r\n");
        }
    }

    output.push_str("\r\n");
}

/// Remove CR and LF so a value cannot end its line early.
fn escape(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(value.replace(['\r', '\n'], ""))
    } else {
        Cow::Borrowed(value)
    }
}
