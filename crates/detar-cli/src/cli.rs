//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "detar")]
#[command(author, version, long_about = None)]
#[command(about = "Unpack a tar archive, restoring modes, owners, times and special files")]
pub struct Cli {
    /// Directory to unpack to
    #[arg(short = 'C', long = "directory", value_name = "DIR", default_value = ".")]
    pub directory: OsString,

    /// Log more details (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Archive to unpack; `.gz` and `.tgz` files are gunzipped first
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

impl Cli {
    /// Destination directory, with an empty argument meaning `.`.
    pub fn destination(&self) -> PathBuf {
        if self.directory.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.directory)
        }
    }

    /// Log level selected by the `-v` count.
    pub const fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
