//! Body stream handles
//!
//! The readable side is [`Body`], a shared handle over any
//! [`tokio::io::AsyncRead`]. The writable side is any
//! [`tokio::io::AsyncWrite`]; see [`crate::h1::codec::ChunkedWriter`] and
//! [`crate::h1::send::Sender`].
use std::{fmt::Debug, io::Cursor, pin::Pin, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::Mutex,
};

pub const DEFAULT_CHUNK_SIZE: usize = 8192;

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

/// Readable body handle.
///
/// Cloning the handle does not clone the stream: all clones read from the
/// same underlying reader. Reads are sequential; a pending
/// [`Body::next_chunk`] holds the reader until it completes.
#[derive(Clone)]
pub struct Body {
    reader: Arc<Mutex<BoxedReader>>,
    chunk_size: usize,
}

impl Body {
    pub fn new<R: AsyncRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Arc::new(Mutex::new(Box::pin(reader))),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Body over an in-memory buffer.
    pub fn from_bytes<B: Into<Vec<u8>>>(data: B) -> Self {
        Self::new(Cursor::new(data.into()))
    }

    /// Body with no content.
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Maximum number of bytes returned by one [`Body::next_chunk`] call.
    pub fn with_chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read the next chunk of bytes.
    ///
    /// Returns `None` once the reader is exhausted. Errors from the reader
    /// are returned as is.
    pub async fn next_chunk(&self) -> std::io::Result<Option<Vec<u8>>> {
        let mut reader = self.reader.lock().await;
        let mut buf = vec![0u8; self.chunk_size];

        let len = reader.read(&mut buf).await?;

        if len == 0 {
            Ok(None)
        } else {
            buf.truncate(len);
            tracing::trace!(len, "body chunk");
            Ok(Some(buf))
        }
    }

    /// Read the remaining bytes into a buffer.
    pub async fn read_to_end(&self) -> std::io::Result<Vec<u8>> {
        let mut output = Vec::new();

        while let Some(chunk) = self.next_chunk().await? {
            output.extend_from_slice(&chunk);
        }

        Ok(output)
    }

    /// Returns whether both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl From<&'static [u8]> for Body {
    fn from(value: &'static [u8]) -> Self {
        Self::new(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::from_bytes(value)
    }
}
