use std::{collections::VecDeque, io::Read};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{GeneralError, ParseError, ParseErrorKind};

use super::Codec;

const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// Frames data with the chunked transfer coding.
///
/// Each non-empty input becomes exactly one chunk. The last chunk is
/// written once.
#[derive(Debug, Default)]
pub struct ChunkedEncoder {
    finished: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { finished: false }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append one chunk holding `data`. Empty data appends nothing.
    pub fn encode_chunk(&self, data: &[u8], output: &mut Vec<u8>) {
        if data.is_empty() {
            return;
        }

        tracing::trace!(len = data.len(), "encode chunk");

        output.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
        output.extend_from_slice(data);
        output.extend_from_slice(b"\r\n");
    }

    /// Append the last chunk unless it was already written.
    pub fn encode_end(&mut self, output: &mut Vec<u8>) {
        if !self.finished {
            tracing::trace!("encode last chunk");
            output.extend_from_slice(LAST_CHUNK);
            self.finished = true;
        }
    }
}

impl Codec for ChunkedEncoder {
    fn transform(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<(), GeneralError> {
        self.encode_chunk(input, output);

        Ok(())
    }

    fn finish_input(&mut self, output: &mut Vec<u8>) -> Result<(), GeneralError> {
        self.encode_end(output);

        Ok(())
    }
}

/// Writes chunked framing to an asynchronous writer.
///
/// Errors from the writer are returned unmodified. If a write fails or is
/// cancelled, part of a chunk may already have reached the writer; the
/// stream should then be discarded.
#[derive(Debug)]
pub struct ChunkedWriter<W> {
    writer: W,
    encoder: ChunkedEncoder,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> ChunkedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            encoder: ChunkedEncoder::new(),
            buf: Vec::new(),
        }
    }

    /// Write `data` as one chunk.
    ///
    /// Empty data writes nothing. Writing after [`Self::end`] fails with
    /// [`std::io::ErrorKind::BrokenPipe`].
    pub async fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        if self.encoder.is_finished() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "chunked stream already ended",
            ));
        }

        if data.is_empty() {
            return Ok(());
        }

        self.buf.clear();
        self.encoder.encode_chunk(data, &mut self.buf);
        self.writer.write_all(&self.buf).await
    }

    /// Write the last chunk and flush. Later calls do nothing.
    pub async fn end(&mut self) -> std::io::Result<()> {
        if self.encoder.is_finished() {
            return Ok(());
        }

        self.writer.write_all(LAST_CHUNK).await?;
        self.writer.flush().await?;

        self.buf.clear();
        self.encoder.encode_end(&mut self.buf);

        Ok(())
    }

    pub fn is_ended(&self) -> bool {
        self.encoder.is_finished()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Continue,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedDecoderState {
    SizeLine,
    ChunkData,
    Boundary,
    Done,
}

/// Removes chunked framing.
///
/// Chunk extensions are skipped. Bytes after the last chunk are kept as
/// the trailer without being interpreted.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkedDecoderState,
    buf: VecDeque<u8>,
    chunk_len: u64,
    chunk_position: u64,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self {
            state: ChunkedDecoderState::SizeLine,
            buf: VecDeque::new(),
            chunk_len: 0,
            chunk_position: 0,
        }
    }

    /// Returns whether the last chunk was read.
    pub fn is_done(&self) -> bool {
        self.state == ChunkedDecoderState::Done
    }

    fn process_size_line(&mut self) -> Result<LoopState, GeneralError> {
        let buf_len = self.buf.len();

        match parse::chunk_size_line(self.buf.make_contiguous()) {
            Ok((remain, len)) => {
                let consumed_len = buf_len - remain.len();

                self.buf.drain(..consumed_len);
                self.chunk_len = len;
                self.chunk_position = 0;
                tracing::trace!(len, consumed_len, "parsed chunk line");

                if len == 0 {
                    tracing::trace!("SizeLine -> Done");
                    self.state = ChunkedDecoderState::Done;
                } else {
                    tracing::trace!("SizeLine -> ChunkData");
                    self.state = ChunkedDecoderState::ChunkData;
                }

                Ok(LoopState::Continue)
            }
            Err(nom::Err::Incomplete(_needed)) => Ok(LoopState::Break),
            Err(_) => Err(invalid_encoding()),
        }
    }

    fn process_chunk(&mut self, output: &mut Vec<u8>) -> Result<LoopState, GeneralError> {
        debug_assert!(self.chunk_position <= self.chunk_len);

        let chunk_remain_len = self.chunk_len - self.chunk_position;

        let mut reader = (&mut self.buf).take(chunk_remain_len);
        let len = reader.read_to_end(output)? as u64;

        self.chunk_position += len;

        tracing::trace!(self.chunk_position, self.chunk_len, "process chunk data");

        if self.chunk_position == self.chunk_len {
            tracing::trace!("ChunkData -> Boundary");
            self.state = ChunkedDecoderState::Boundary;
        }

        Ok(LoopState::Continue)
    }

    fn process_boundary(&mut self) -> Result<LoopState, GeneralError> {
        match parse::chunk_boundary(self.buf.make_contiguous()) {
            Ok((_remain, consumed)) => {
                let len = consumed.len();
                self.buf.drain(..len);

                tracing::trace!("Boundary -> SizeLine");
                self.state = ChunkedDecoderState::SizeLine;

                Ok(LoopState::Continue)
            }
            Err(nom::Err::Incomplete(_needed)) => Ok(LoopState::Break),
            Err(_) => Err(invalid_encoding()),
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ChunkedDecoder {
    fn transform(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<(), GeneralError> {
        self.buf.extend(input);

        loop {
            let loop_state = match self.state {
                ChunkedDecoderState::SizeLine => self.process_size_line()?,
                ChunkedDecoderState::ChunkData => self.process_chunk(output)?,
                ChunkedDecoderState::Boundary => self.process_boundary()?,
                ChunkedDecoderState::Done => LoopState::Break,
            };

            if self.buf.is_empty() || loop_state == LoopState::Break {
                break;
            }
        }

        Ok(())
    }

    fn finish_input(&mut self, _output: &mut Vec<u8>) -> Result<(), GeneralError> {
        if self.is_done() {
            Ok(())
        } else {
            Err(ParseError::new(ParseErrorKind::IncompleteInput).into())
        }
    }

    fn has_remaining_trailer(&self) -> bool {
        self.is_done() && !self.buf.is_empty()
    }

    fn remaining_trailer(&mut self, trailer: &mut Vec<u8>) {
        if self.is_done() {
            tracing::trace!(len = self.buf.len(), "remaining trailer");

            trailer.extend(self.buf.drain(..));
        }
    }
}

fn invalid_encoding() -> GeneralError {
    ParseError::new(ParseErrorKind::InvalidChunkedEncoding).into()
}

mod parse {
    use core::str;

    use nom::{
        IResult, Parser,
        bytes::streaming::{tag, take_while},
        character::streaming::{hex_digit1, line_ending},
        combinator::{map_res, verify},
        sequence::terminated,
    };

    pub fn chunk_size_line(input: &[u8]) -> IResult<&[u8], u64> {
        terminated((chunk_size, chunk_ext), tag("\r\n"))
            .map(|(size, _ext)| size)
            .parse(input)
    }

    fn chunk_size(input: &[u8]) -> IResult<&[u8], u64> {
        let digits = verify(hex_digit1, |b: &[u8]| b.len() <= 16);

        map_res(digits, |b: &[u8]| {
            str::from_utf8(b)
                .ok()
                .and_then(|s| u64::from_str_radix(s, 16).ok())
                .ok_or(())
        })
        .parse(input)
    }

    fn chunk_ext(input: &[u8]) -> IResult<&[u8], &[u8]> {
        take_while(|b: u8| b.is_ascii_graphic() || b == b' ' || b == b'\t').parse(input)
    }

    pub fn chunk_boundary(input: &[u8]) -> IResult<&[u8], &[u8]> {
        line_ending(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tracing_test::traced_test]
    #[test]
    fn test_encode() {
        let mut encoder = ChunkedEncoder::new();
        let mut output = Vec::new();

        encoder.transform(b"Hello world!", &mut output).unwrap();
        encoder.transform(b"", &mut output).unwrap();
        encoder.finish_input(&mut output).unwrap();
        encoder.finish_input(&mut output).unwrap();

        assert_eq!(
            output,
            b"c\r\n\
            Hello world!\
            \r\n\
            0\r\n\
            \r\n"
        );
    }

    #[tokio::test]
    async fn test_writer() {
        let mut writer = ChunkedWriter::new(Vec::new());

        writer.write(b"hello").await.unwrap();
        assert_eq!(writer.get_ref(), b"5\r\nhello\r\n");

        writer.write(b"").await.unwrap();
        assert_eq!(writer.get_ref(), b"5\r\nhello\r\n");

        writer.end().await.unwrap();
        writer.end().await.unwrap();
        assert!(writer.is_ended());

        let error = writer.write(b"late").await.unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::BrokenPipe);

        assert_eq!(writer.into_inner(), b"5\r\nhello\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn test_writer_error_passthrough() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);

        let mut writer = ChunkedWriter::new(client);
        let error = writer.write(b"hello").await.unwrap_err();

        assert_eq!(error.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(!writer.is_ended());
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_decode() {
        let mut decoder = ChunkedDecoder::new();

        let mut output = Vec::new();

        decoder.transform(b"6\r\n", &mut output).unwrap();
        decoder.transform(b"Hello ", &mut output).unwrap();
        decoder.transform(b"\r\n", &mut output).unwrap();
        decoder.transform(b"6;name=value\r\n", &mut output).unwrap();
        decoder.transform(b"world!", &mut output).unwrap();
        decoder.transform(b"\r\n", &mut output).unwrap();
        decoder.transform(b"0\r\n", &mut output).unwrap();
        decoder.transform(b"a: b\r\n", &mut output).unwrap();
        decoder.transform(b"\r\n", &mut output).unwrap();
        decoder.finish_input(&mut output).unwrap();

        assert_eq!(output, b"Hello world!");

        assert!(decoder.has_remaining_trailer());
        let mut trailer = Vec::new();
        decoder.remaining_trailer(&mut trailer);

        assert_eq!(trailer, b"a: b\r\n\r\n");
        assert!(!decoder.has_remaining_trailer());
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_decode_partial_chunk_size() {
        let mut decoder = ChunkedDecoder::new();

        let mut output = Vec::new();

        decoder.transform(b"1", &mut output).unwrap();
        assert!(output.is_empty());

        decoder.transform(b"f", &mut output).unwrap();
        assert!(output.is_empty());

        decoder.transform(b"\r", &mut output).unwrap();
        assert!(output.is_empty());

        decoder.transform(b"\n", &mut output).unwrap();
        assert!(output.is_empty());

        decoder.transform(&[1u8; 0x1f], &mut output).unwrap();
        decoder.transform(b"\r\n", &mut output).unwrap();
        assert_eq!(output.len(), 0x1f);
        assert!(!decoder.has_remaining_trailer());
        assert!(decoder.finish_input(&mut output).is_err());
    }

    #[test]
    fn test_decode_invalid() {
        let mut decoder = ChunkedDecoder::new();
        let mut output = Vec::new();

        let error = decoder.transform(b"zz\r\n", &mut output).unwrap_err();

        assert_eq!(
            error.as_parse().map(ParseError::kind),
            Some(ParseErrorKind::InvalidChunkedEncoding)
        );

        let mut decoder = ChunkedDecoder::new();
        let error = decoder
            .transform(b"2\r\nabXY", &mut output)
            .unwrap_err();

        assert_eq!(
            error.as_parse().map(ParseError::kind),
            Some(ParseErrorKind::InvalidChunkedEncoding)
        );
    }
}
