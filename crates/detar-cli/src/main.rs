//! detar - unpack a tar archive, restoring modes, ownership, timestamps and
//! special files.

mod cli;
mod error;
mod extract;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    extract::execute(&cli)
}
