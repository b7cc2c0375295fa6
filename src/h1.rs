//! HTTP/1.1 wire format
//!
//! [`Http1Encoder`] and [`Http1Decoder`] convert message heads to and from
//! bytes without doing any I/O. Bodies go through the transfer codings in
//! [`codec`]. [`send::Sender`] ties both to an asynchronous writer.
pub mod codec;
mod decode;
mod encode;
mod parse;
pub mod send;

pub use decode::{DecodedBody, DecoderConfig, Http1Decoder};
pub use encode::Http1Encoder;
