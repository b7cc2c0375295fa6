use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::message::ProtocolVersion;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Level of log messages to show.
    #[clap(long, default_value = "warn")]
    pub log_level: super::logging::Level,

    /// Write log messages to a file instead of stderr.
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Format log messages as JSON.
    #[clap(long)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a request and write its wire form.
    Request(RequestCommand),
    /// Encode data with the chunked transfer coding.
    Chunk(ChunkCommand),
    /// Decode data in the chunked transfer coding.
    Dechunk(DechunkCommand),
}

#[derive(Parser, Debug)]
pub struct RequestCommand {
    /// Request URI.
    pub uri: String,

    #[clap(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Header field as `Name: value`. May be repeated.
    #[clap(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Cookie as `name=value`. May be repeated.
    #[clap(long = "cookie", short = 'b')]
    pub cookies: Vec<String>,

    /// Explicit request-target.
    #[clap(long)]
    pub target: Option<String>,

    #[clap(long, default_value = "1.1")]
    pub protocol: ProtocolVersion,

    /// Body data.
    #[clap(long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read body data from a file, or `-` for stdin.
    #[clap(long)]
    pub data_file: Option<PathBuf>,

    /// Send the body with `Transfer-Encoding: chunked`.
    #[clap(long)]
    pub chunked: bool,

    #[clap(long, default_value = "-")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ChunkCommand {
    #[clap(long, default_value = "-")]
    pub input: PathBuf,

    #[clap(long, default_value = "-")]
    pub output: PathBuf,

    /// Maximum chunk length.
    #[clap(long, default_value_t = crate::stream::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Parser, Debug)]
pub struct DechunkCommand {
    #[clap(long, default_value = "-")]
    pub input: PathBuf,

    #[clap(long, default_value = "-")]
    pub output: PathBuf,

    /// Write the trailer section to this file.
    #[clap(long)]
    pub trailer: Option<PathBuf>,
}
