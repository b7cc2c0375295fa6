use std::borrow::Cow;

use crate::{
    error::{GeneralError, ParseError, ParseErrorKind},
    header::HeaderBag,
    message::{ProtocolVersion, Request, Response},
    parse::{parse_name_value_fields, remove_line_folding, scan_header_deliminator},
    uri::Uri,
};

use super::{
    codec::{apply_codecs, build_decoders},
    parse::{request_line, status_line},
};

/// Options for [`Http1Decoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum length of a message head, including the empty line.
    pub max_header_length: usize,
    /// Whether obsolete line folding in field values is accepted and
    /// replaced by a space.
    pub allow_line_folding: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_header_length: 16384,
            allow_line_folding: true,
        }
    }
}

/// Body bytes with transfer codings removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBody {
    pub data: Vec<u8>,
    /// Unparsed bytes that followed the last chunk.
    pub trailer: Vec<u8>,
}

/// Parses HTTP/1.1 message heads.
///
/// The decoder works on complete buffers. The returned length is the
/// number of bytes of the head; the body, if any, starts after it.
#[derive(Debug, Clone, Default)]
pub struct Http1Decoder {
    config: DecoderConfig,
}

impl Http1Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode_request(&self, input: &[u8]) -> Result<(Request, usize), GeneralError> {
        let head_len = self.scan_head(input)?;
        let (fields, line) = request_line(&input[..head_len]).map_err(ParseError::from)?;

        let method = std::str::from_utf8(line.method).map_err(ParseError::from)?;
        let target = std::str::from_utf8(line.request_target).map_err(ParseError::from)?;
        let protocol = parse_version(line.http_version)?;
        let headers = self.decode_fields(fields)?;
        let uri = request_uri(target, &headers)?;

        tracing::debug!(method, target, head_len, "decoded request head");

        let request = Request::from_parts(method, uri, headers, None, target, protocol)?;

        Ok((request, head_len))
    }

    pub fn decode_response(&self, input: &[u8]) -> Result<(Response, usize), GeneralError> {
        let head_len = self.scan_head(input)?;
        let (fields, line) = status_line(&input[..head_len]).map_err(ParseError::from)?;

        let protocol = parse_version(line.http_version)?;
        let status = std::str::from_utf8(line.status_code)
            .map_err(ParseError::from)?
            .parse::<u16>()
            .map_err(|error| ParseError::new(ParseErrorKind::Syntax).with_source(error))?;
        let reason = String::from_utf8_lossy(line.reason_phrase);
        let headers = self.decode_fields(fields)?;

        tracing::debug!(status, head_len, "decoded response head");

        let response = Response::from_parts(status, Some(&*reason), headers, None, protocol)?;

        Ok((response, head_len))
    }

    /// Remove the transfer codings listed in `headers` from a complete body.
    pub fn decode_body(&self, headers: &HeaderBag, input: &[u8]) -> Result<DecodedBody, GeneralError> {
        let mut codecs = build_decoders(headers);
        let (data, trailer) = apply_codecs(&mut codecs, input)?;

        Ok(DecodedBody { data, trailer })
    }

    fn scan_head(&self, input: &[u8]) -> Result<usize, ParseError> {
        let limit = &input[..input.len().min(self.config.max_header_length)];

        match scan_header_deliminator(limit) {
            Some(len) => Ok(len),
            None if input.len() >= self.config.max_header_length => {
                Err(ParseError::new(ParseErrorKind::HeaderTooBig)
                    .with_position(self.config.max_header_length as u64))
            }
            None => Err(ParseError::new(ParseErrorKind::IncompleteInput)),
        }
    }

    fn decode_fields(&self, fields: &[u8]) -> Result<HeaderBag, GeneralError> {
        // Drop the empty line that ends the head.
        let fields = fields
            .strip_suffix(b"\r\n")
            .or_else(|| fields.strip_suffix(b"\n"))
            .unwrap_or(fields);

        let fields = remove_line_folding(fields);

        if matches!(fields, Cow::Owned(_)) && !self.config.allow_line_folding {
            return Err(ParseError::new(ParseErrorKind::Syntax)
                .with_snippet("obsolete line folding")
                .into());
        }

        let mut headers = HeaderBag::new();

        for pair in parse_name_value_fields(&fields)? {
            let name = std::str::from_utf8(pair.name).map_err(ParseError::from)?;
            let value = String::from_utf8_lossy(pair.value);

            headers.add(name, value.trim())?;
        }

        Ok(headers)
    }
}

fn parse_version(value: &[u8]) -> Result<ProtocolVersion, GeneralError> {
    let value = std::str::from_utf8(value).map_err(ParseError::from)?;

    Ok(value.parse::<ProtocolVersion>()?)
}

/// URI of a decoded request, from an absolute-form target or from `Host`.
fn request_uri(target: &str, headers: &HeaderBag) -> Result<Uri, GeneralError> {
    if !target.starts_with('/') && target.contains("://") {
        return Ok(Uri::parse(target)?);
    }

    let mut uri = match headers.get("host") {
        Some(host) if !host.is_empty() => Uri::parse(&format!("//{}", host))?,
        _ => Uri::new(),
    };

    if target.starts_with('/') {
        let reference = Uri::parse(target)?;
        uri = uri.with_path(reference.path()).with_query(&reference.query());
    }

    Ok(uri)
}
