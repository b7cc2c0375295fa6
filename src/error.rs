//! Error representations
use std::{backtrace::Backtrace, fmt::Display, str::Utf8Error, string::FromUtf8Error};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GeneralError {
    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error from the underlying byte stream, passed through unmodified.
    #[error(transparent)]
    Stream(#[from] std::io::Error),
}

impl GeneralError {
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(..))
    }

    pub fn as_message(&self) -> Option<&MessageError> {
        if let Self::Message(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn try_into_message(self) -> Result<MessageError, Self> {
        if let Self::Message(v) = self {
            Ok(v)
        } else {
            Err(self)
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(..))
    }

    pub fn as_parse(&self) -> Option<&ParseError> {
        if let Self::Parse(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn try_into_parse(self) -> Result<ParseError, Self> {
        if let Self::Parse(v) = self {
            Ok(v)
        } else {
            Err(self)
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(..))
    }

    pub fn as_stream(&self) -> Option<&std::io::Error> {
        if let Self::Stream(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn try_into_stream(self) -> Result<std::io::Error, Self> {
        if let Self::Stream(v) = self {
            Ok(v)
        } else {
            Err(self)
        }
    }
}

/// Error for invalid message components.
///
/// Raised synchronously when constructing or modifying a value. The value
/// that was being modified is left untouched.
#[derive(Debug, thiserror::Error)]
pub struct MessageError {
    kind: MessageErrorKind,
    value: Option<String>,
    backtrace: Option<Box<Backtrace>>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MessageError {
    pub fn new(kind: MessageErrorKind) -> Self {
        Self {
            kind,
            value: None,
            backtrace: Some(Box::new(std::backtrace::Backtrace::capture())),
            source: None,
        }
    }

    /// Attach the offending input.
    ///
    /// Only a short escaped prefix is kept.
    pub fn with_value<S: AsRef<str>>(mut self, value: S) -> Self {
        let value = value.as_ref();
        let end = value
            .char_indices()
            .nth(32)
            .map(|(index, _)| index)
            .unwrap_or(value.len());

        self.value = Some(value[..end].escape_debug().to_string());
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(Box::new(backtrace));
        self
    }

    pub fn with_source<T: Into<Box<dyn std::error::Error + Send + Sync>>>(
        mut self,
        source: T,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> MessageErrorKind {
        self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "message error: {}", self.kind)?;

        if let Some(value) = &self.value {
            write!(f, " '{}'", value)?;
        }

        Ok(())
    }
}

impl From<MessageErrorKind> for MessageError {
    fn from(value: MessageErrorKind) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MessageErrorKind {
    InvalidScheme,
    InvalidPort,
    InvalidHost,
    InvalidMethod,
    InvalidTarget,
    InvalidHeaderName,
    InvalidHeaderValue,
    InvalidCookie,
    InvalidStatus,
    InvalidReasonPhrase,
    InvalidProtocolVersion,
}

impl Display for MessageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::InvalidScheme => "invalid scheme",
            Self::InvalidPort => "invalid port",
            Self::InvalidHost => "invalid host",
            Self::InvalidMethod => "invalid method",
            Self::InvalidTarget => "invalid request target",
            Self::InvalidHeaderName => "invalid header name",
            Self::InvalidHeaderValue => "invalid header value",
            Self::InvalidCookie => "invalid cookie",
            Self::InvalidStatus => "invalid status code",
            Self::InvalidReasonPhrase => "invalid reason phrase",
            Self::InvalidProtocolVersion => "invalid protocol version",
        };

        f.write_str(value)
    }
}

/// Error for parsing wire data.
#[derive(Debug, thiserror::Error)]
pub struct ParseError {
    kind: ParseErrorKind,
    position: Option<u64>,
    snippet: Option<String>,
    backtrace: Option<Box<Backtrace>>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            position: None,
            snippet: None,
            backtrace: Some(Box::new(std::backtrace::Backtrace::capture())),
            source: None,
        }
    }

    pub fn other(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(ParseErrorKind::Other).with_source(error)
    }

    pub fn with_position(mut self, value: u64) -> Self {
        self.position = Some(value);
        self
    }

    pub fn with_snippet<S: Into<String>>(mut self, value: S) -> Self {
        self.snippet = Some(value.into());
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(Box::new(backtrace));
        self
    }

    pub fn with_source<T: Into<Box<dyn std::error::Error + Send + Sync>>>(
        mut self,
        source: T,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn position(&self) -> Option<u64> {
        self.position
    }

    pub fn snippet(&self) -> Option<&String> {
        self.snippet.as_ref()
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.kind)?;

        if let Some(position) = self.position {
            write!(f, " position {}", position)?;
        }

        if let Some(snippet) = &self.snippet {
            write!(f, " near '{}'", snippet)?;
        }

        Ok(())
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(value: ParseErrorKind) -> Self {
        Self::new(value)
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for ParseError {
    fn from(value: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match value {
            nom::Err::Incomplete(_needed) => ParseError::new(ParseErrorKind::IncompleteInput),
            nom::Err::Error(error) | nom::Err::Failure(error) => {
                ParseError::new(ParseErrorKind::Syntax)
                    .with_snippet(
                        error.input[0..error.input.len().min(16)]
                            .escape_ascii()
                            .to_string(),
                    )
                    .with_source(nom::error::Error::new(error.input.len(), error.code))
            }
        }
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(value: FromUtf8Error) -> Self {
        ParseError::new(ParseErrorKind::InvalidUtf8)
            .with_position(value.utf8_error().valid_up_to() as u64)
    }
}

impl From<Utf8Error> for ParseError {
    fn from(value: Utf8Error) -> Self {
        ParseError::new(ParseErrorKind::InvalidUtf8).with_position(value.valid_up_to() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ParseErrorKind {
    IncompleteInput,
    Syntax,
    InvalidUtf8,
    HeaderTooBig,
    InvalidChunkedEncoding,
    Other,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompleteInput => write!(f, "incomplete input"),
            Self::Syntax => write!(f, "syntax error"),
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
            Self::HeaderTooBig => write!(f, "header too big"),
            Self::InvalidChunkedEncoding => write!(f, "invalid chunked encoding"),
            Self::Other => write!(f, "other"),
        }
    }
}
