//! Transfer-coding transforms of message bodies
use std::fmt::Debug;

use crate::{error::GeneralError, header::HeaderBag, util::comma_list_contains};

pub use chunked::{ChunkedDecoder, ChunkedEncoder, ChunkedWriter};

pub mod chunked;

pub type BoxedCodec = Box<dyn Codec>;

/// Incremental body transform.
pub trait Codec: Debug + Send {
    /// Process a piece of input, appending any produced bytes to `output`.
    fn transform(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<(), GeneralError>;

    /// Signal the end of input.
    fn finish_input(&mut self, output: &mut Vec<u8>) -> Result<(), GeneralError> {
        let _ = output;
        Ok(())
    }

    fn has_remaining_trailer(&self) -> bool {
        false
    }

    fn remaining_trailer(&mut self, trailer: &mut Vec<u8>) {
        let _ = trailer;
    }
}

/// Decoders for the transfer codings listed in `Transfer-Encoding`.
///
/// Only `chunked` is understood. Other codings are left in place.
pub fn build_decoders(headers: &HeaderBag) -> Vec<BoxedCodec> {
    build_codecs(headers, false)
}

/// Encoders for the transfer codings listed in `Transfer-Encoding`.
pub fn build_encoders(headers: &HeaderBag) -> Vec<BoxedCodec> {
    build_codecs(headers, true)
}

/// Returns whether `Transfer-Encoding` lists `chunked`.
pub fn is_chunked(headers: &HeaderBag) -> bool {
    headers
        .get_all("transfer-encoding")
        .iter()
        .any(|value| comma_list_contains(value, "chunked"))
}

fn build_codecs(headers: &HeaderBag, encode: bool) -> Vec<BoxedCodec> {
    let mut codecs: Vec<BoxedCodec> = Vec::new();

    for value in headers.get_all("transfer-encoding") {
        for name in value.split(',').map(str::trim) {
            if name.eq_ignore_ascii_case("chunked") {
                if encode {
                    codecs.push(Box::new(ChunkedEncoder::new()));
                } else {
                    codecs.push(Box::new(ChunkedDecoder::new()));
                }
            } else if !name.is_empty() && !name.eq_ignore_ascii_case("identity") {
                tracing::debug!(name, "unsupported transfer coding");
            }
        }
    }

    codecs
}

/// Run `input` through `codecs` in order and finish them.
///
/// Returns the transformed bytes and the trailer of the last codec that
/// kept one.
pub fn apply_codecs(
    codecs: &mut [BoxedCodec],
    input: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), GeneralError> {
    let mut data = input.to_vec();
    let mut trailer = Vec::new();

    for codec in codecs.iter_mut() {
        let mut output = Vec::new();

        codec.transform(&data, &mut output)?;
        codec.finish_input(&mut output)?;

        if codec.has_remaining_trailer() {
            trailer.clear();
            codec.remaining_trailer(&mut trailer);
        }

        data = output;
    }

    Ok((data, trailer))
}
