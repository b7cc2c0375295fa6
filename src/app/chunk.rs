use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::{
    h1::codec::{ChunkedDecoder, ChunkedWriter, Codec},
    stream::Body,
};

use super::{
    arg::{ChunkCommand, DechunkCommand},
    io::{ProgramInput, ProgramOutput},
};

pub async fn chunk(args: &ChunkCommand) -> anyhow::Result<()> {
    let input = ProgramInput::open(&args.input).await?;
    let output = ProgramOutput::open(&args.output).await?;

    chunk_stream(input, output, args.chunk_size).await?;

    Ok(())
}

pub async fn dechunk(args: &DechunkCommand) -> anyhow::Result<()> {
    let input = ProgramInput::open(&args.input).await?;
    let output = ProgramOutput::open(&args.output).await?;

    let trailer = dechunk_stream(input, output).await?;

    if let Some(path) = &args.trailer {
        tokio::fs::write(path, trailer).await?;
    }

    Ok(())
}

async fn chunk_stream<R, W>(input: R, output: W, chunk_size: usize) -> anyhow::Result<W>
where
    R: AsyncRead + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let body = Body::new(input).with_chunk_size(chunk_size);
    let mut writer = ChunkedWriter::new(output);

    while let Some(chunk) = body.next_chunk().await? {
        writer.write(&chunk).await?;
    }

    writer.end().await?;

    Ok(writer.into_inner())
}

async fn dechunk_stream<R, W>(input: R, mut output: W) -> anyhow::Result<Vec<u8>>
where
    R: AsyncRead + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let body = Body::new(input);
    let mut decoder = ChunkedDecoder::new();
    let mut buf = Vec::new();

    while let Some(chunk) = body.next_chunk().await? {
        buf.clear();
        decoder.transform(&chunk, &mut buf)?;
        output.write_all(&buf).await?;

        if decoder.is_done() {
            break;
        }
    }

    // Whatever follows the last chunk belongs to the trailer.
    while let Some(chunk) = body.next_chunk().await? {
        decoder.transform(&chunk, &mut buf)?;
    }

    decoder.finish_input(&mut buf)?;
    output.flush().await?;

    let mut trailer = Vec::new();
    decoder.remaining_trailer(&mut trailer);

    Ok(trailer)
}
