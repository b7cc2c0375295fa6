use std::process::ExitCode;

use clap::Parser;

use self::arg::Args;
use self::arg::Command;

mod arg;
mod chunk;
mod io;
mod logging;
mod request;

pub fn run() -> ExitCode {
    match run_impl() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            tracing::error!(?error);
            eprintln!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run_impl() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    self::logging::set_up_logging(args.log_level, args.log_file.as_deref(), args.log_json)?;

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;

    runtime.block_on(async {
        match &args.command {
            Command::Request(args) => self::request::request(args).await,
            Command::Chunk(args) => self::chunk::chunk(args).await,
            Command::Dechunk(args) => self::chunk::dechunk(args).await,
        }
    })?;

    Ok(ExitCode::SUCCESS)
}
