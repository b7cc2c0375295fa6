//! Immutable HTTP/1.1 messages
//!
//! This crate models HTTP/1.1 requests and responses as immutable values
//! and converts them to and from the wire format. It does not do any
//! networking; bodies are read from and written to Tokio I/O traits that
//! the caller provides.
//!
//! Quick start:
//!
//! ```
//! use httpmsg::{h1::Http1Encoder, message::Request};
//!
//! let request = Request::new("get", "http://example.com/search?q=rust")?
//!     .with_cookie("session", "abc")?;
//!
//! let head = Http1Encoder::new().encode_request(&request);
//!
//! assert_eq!(
//!     head,
//!     b"GET /search?q=rust HTTP/1.1\r\n\
//!     Host: example.com\r\n\
//!     Cookie: session=abc\r\n\
//!     \r\n"
//! );
//! # Ok::<(), httpmsg::error::MessageError>(())
//! ```
//!
//! Modules:
//!
//! * [`uri`]: URI values
//! * [`header`]: header field storage
//! * [`cookie`]: `Cookie` and `Set-Cookie` values
//! * [`message`]: requests and responses
//! * [`h1`]: HTTP/1.1 encoding, decoding, and chunked transfer coding
//! * [`stream`]: body handles
pub mod cookie;
pub mod error;
pub mod h1;
pub mod header;
pub mod message;
pub mod parse;
pub mod stream;
pub mod uri;
mod util;

#[cfg(feature = "bin")]
#[doc(hidden)]
pub mod app;
