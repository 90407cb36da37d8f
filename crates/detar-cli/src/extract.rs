//! Opening, decompressing and unpacking the archive.

use crate::cli::Cli;
use crate::error::add_archive_context;
use anyhow::Context;
use anyhow::Result;
use detar_core::ExtractConfig;
use detar_core::Extractor;
use detar_core::formats::TarEntries;
use flate2::read::GzDecoder;
use log::debug;
use log::info;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

/// Unpacks the archive named on the command line.
pub fn execute(cli: &Cli) -> Result<()> {
    let reader = open_archive(&cli.archive)?;

    let destination = cli.destination();
    fs::create_dir_all(&destination).with_context(|| {
        format!("failed to create destination directory '{}'", destination.display())
    })?;
    let mut archive = tar::Archive::new(reader);
    let entries = add_archive_context(TarEntries::new(&mut archive), &cli.archive)?;

    info!(
        "unpacking {} into {}",
        cli.archive.display(),
        destination.display()
    );
    add_archive_context(
        Extractor::new(ExtractConfig::default()).extract(entries, &destination),
        &cli.archive,
    )
}

/// Opens `path`, gunzipping it when the name says it is compressed.
fn open_archive(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open archive '{}'", path.display()))?;
    let reader = BufReader::new(file);

    if is_gzip_name(path) {
        debug!("{} is gzip compressed", path.display());
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn is_gzip_name(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "gz" || ext == "tgz")
}
