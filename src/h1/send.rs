use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    error::GeneralError,
    header::HeaderBag,
    message::{Request, Response},
    stream::Body,
};

use super::{
    codec::{ChunkedWriter, is_chunked},
    encode::Http1Encoder,
};

/// Writes whole messages to an asynchronous writer.
///
/// The head is written first, then the body. A body is chunk-encoded
/// when `Transfer-Encoding` lists `chunked` and copied as is otherwise.
/// The writer is flushed after each message.
///
/// Important: Content-Length is not checked against the body.
#[derive(Debug)]
pub struct Sender<W> {
    writer: W,
    encoder: Http1Encoder,
}

impl<W: AsyncWrite + Unpin> Sender<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            encoder: Http1Encoder::new(),
        }
    }

    pub async fn send_request(&mut self, request: &Request) -> Result<(), GeneralError> {
        let head = self.encoder.encode_request(request);

        self.send_message(&head, request.headers(), request.body())
            .await
    }

    pub async fn send_response(&mut self, response: &Response) -> Result<(), GeneralError> {
        let head = self.encoder.encode_response(response);

        self.send_message(&head, response.headers(), response.body())
            .await
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn send_message(
        &mut self,
        head: &[u8],
        headers: &HeaderBag,
        body: Option<&Body>,
    ) -> Result<(), GeneralError> {
        self.writer.write_all(head).await?;

        if is_chunked(headers) {
            let mut writer = ChunkedWriter::new(&mut self.writer);

            if let Some(body) = body {
                while let Some(chunk) = body.next_chunk().await? {
                    writer.write(&chunk).await?;
                }
            }

            writer.end().await?;
        } else if let Some(body) = body {
            while let Some(chunk) = body.next_chunk().await? {
                tracing::trace!(len = chunk.len(), "send body data");
                self.writer.write_all(&chunk).await?;
            }
        }

        self.writer.flush().await?;

        Ok(())
    }
}
