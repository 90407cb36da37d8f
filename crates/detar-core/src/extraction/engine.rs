//! Core extraction engine.

use std::fs;
use std::path::Path;

use log::debug;
use log::warn;

use crate::ExtractConfig;
use crate::Result;
use crate::apply::apply_entry;
use crate::collision::remove_existing;
use crate::copy::CopyBuffer;
use crate::copy::CopyBufferPool;
use crate::metadata;
use crate::process::UmaskGuard;
use crate::types::DestDir;
use crate::types::Entry;
use crate::types::EntryType;
use crate::types::SafePath;

/// Main extraction engine.
///
/// # Examples
///
/// ```no_run
/// use detar_core::types::Entry;
/// use detar_core::{ExtractConfig, Extractor, OwnershipPolicy};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractConfig::default().with_ownership(OwnershipPolicy::Never));
/// let entries = vec![Ok(Entry::directory("a")), Ok(Entry::file("a/b.txt", &b"hi"[..]))];
/// extractor.extract(entries, "/tmp/out")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates a new extraction engine with the given configuration.
    #[must_use]
    pub const fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Materializes `entries`, in order, under `root`.
    ///
    /// Privilege is decided once up front. When configured to, the process
    /// umask is cleared for the whole run and restored on every exit path.
    /// The first failure aborts the run; objects created before it stay.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if `root` is not a writable directory or
    /// the entry stream fails, `ExtractionError::UnsupportedEntryType` for an
    /// unknown entry type, `ExtractionError::SymlinkEscape` when a symlink
    /// already on disk would lead an entry out of `root`, and
    /// `ExtractionError::Filesystem` for any failed filesystem operation.
    pub fn extract<'a, I>(&self, entries: I, root: impl AsRef<Path>) -> Result<()>
    where
        I: IntoIterator<Item = Result<Entry<'a>>>,
    {
        let dest = DestDir::new(root.as_ref())?;
        let privileged = self.config.ownership.resolve();
        debug!(
            "extracting into {} (restore ownership: {privileged})",
            dest.as_path().display()
        );

        let _umask = self.config.clear_umask.then(UmaskGuard::clear);
        let mut buffer = CopyBufferPool::global().get();

        let mut count: u64 = 0;
        for entry in entries {
            let mut entry = entry?;
            extract_entry(&mut entry, &dest, &mut buffer, privileged)?;
            count += 1;
        }

        debug!("extracted {count} entries");
        Ok(())
    }
}

fn extract_entry(
    entry: &mut Entry<'_>,
    dest: &DestDir,
    buffer: &mut CopyBuffer,
    privileged: bool,
) -> Result<()> {
    let safe = SafePath::sanitize(&entry.name);
    if safe.was_clamped() {
        warn!(
            "entry name {:?} leaves the destination, extracting as {:?}",
            entry.name,
            safe.as_path()
        );
    }
    let path = dest.join(&safe);
    debug!("{} {}", entry.entry_type, path.display());

    dest.confine(&path)?;
    if let EntryType::Hardlink { target } = &entry.entry_type {
        dest.confine(&dest.resolve(target))?;
    }
    if entry.entry_type.is_file() || entry.entry_type.is_directory() {
        unlink_symlink(&path)?;
    }

    create(entry, &path, |entry, path| apply_entry(entry, path, dest, buffer))?;

    if entry.entry_type.restores_metadata() {
        metadata::restore(&path, entry, privileged)?;
    }
    Ok(())
}

/// Removes a symbolic link at `path` so a file or directory replaces it
/// instead of writing through it.
fn unlink_symlink(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            debug!("{} is a symlink, replacing it", path.display());
            remove_existing(path)
        }
        _ => Ok(()),
    }
}

/// Runs `apply`, removing an object in the way and retrying once.
///
/// A second collision is returned as is.
fn create<'a, F>(entry: &mut Entry<'a>, path: &Path, mut apply: F) -> Result<()>
where
    F: FnMut(&mut Entry<'a>, &Path) -> Result<()>,
{
    let mut replaced = false;
    loop {
        match apply(entry, path) {
            Err(e) if e.is_path_collision() && entry.entry_type.replaces_existing() && !replaced => {
                debug!("{} already exists, replacing it", path.display());
                remove_existing(path)?;
                replaced = true;
            }
            result => return result,
        }
    }
}
