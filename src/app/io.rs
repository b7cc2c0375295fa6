use std::{
    path::Path,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::{
    fs::File,
    io::{AsyncRead, AsyncWrite, ReadBuf, Stdin, Stdout},
};

#[derive(Debug)]
pub enum ProgramInput {
    File(File),
    Stdin(Stdin),
}

impl ProgramInput {
    pub async fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();

        if path.to_str() == Some("-") {
            Ok(Self::Stdin(tokio::io::stdin()))
        } else {
            let file = File::open(path).await?;
            Ok(Self::File(file))
        }
    }
}

impl AsyncRead for ProgramInput {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProgramInput::File(r) => Pin::new(r).poll_read(cx, buf),
            ProgramInput::Stdin(r) => Pin::new(r).poll_read(cx, buf),
        }
    }
}

#[derive(Debug)]
pub enum ProgramOutput {
    File(File),
    Stdout(Stdout),
}

impl ProgramOutput {
    pub async fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();

        if path.to_str() == Some("-") {
            Ok(Self::Stdout(tokio::io::stdout()))
        } else {
            let file = File::create(path).await?;
            Ok(Self::File(file))
        }
    }
}

impl AsyncWrite for ProgramOutput {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            ProgramOutput::File(w) => Pin::new(w).poll_write(cx, buf),
            ProgramOutput::Stdout(w) => Pin::new(w).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProgramOutput::File(w) => Pin::new(w).poll_flush(cx),
            ProgramOutput::Stdout(w) => Pin::new(w).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ProgramOutput::File(w) => Pin::new(w).poll_shutdown(cx),
            ProgramOutput::Stdout(w) => Pin::new(w).poll_shutdown(cx),
        }
    }
}
