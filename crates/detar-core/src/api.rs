//! High-level public API for archive extraction.

use std::io::Read;
use std::path::Path;

use crate::Extractor;
use crate::Result;
use crate::formats::TarEntries;
use crate::types::Entry;

/// Extracts a sequence of entries under `root` with the default
/// configuration.
///
/// Ownership is restored only when the process is privileged, and the umask
/// is cleared for the duration of the call. Equivalent to
/// `Extractor::default().extract(entries, root)`.
///
/// # Errors
///
/// Returns an error if:
/// - `root` is not an existing, writable directory
/// - The entry sequence yields an error
/// - An entry has an unsupported type
/// - A symlink already on disk would lead an entry out of `root`
/// - A filesystem operation fails
///
/// # Examples
///
/// ```no_run
/// use detar_core::extract;
/// use detar_core::mode::FileMode;
/// use detar_core::types::Entry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let entries = vec![
///     Ok(Entry::directory("a").with_mode(FileMode::from_bits(0o755))),
///     Ok(Entry::file("a/b.txt", &b"hello"[..]).with_mode(FileMode::from_bits(0o644))),
/// ];
/// extract(entries, "/tmp/output")?;
/// # Ok(())
/// # }
/// ```
pub fn extract<'a, I, P>(entries: I, root: P) -> Result<()>
where
    I: IntoIterator<Item = Result<Entry<'a>>>,
    P: AsRef<Path>,
{
    Extractor::default().extract(entries, root)
}

/// Reads a tar stream from `reader` and extracts it under `root` with the
/// default configuration.
///
/// The stream must already be decompressed.
///
/// # Errors
///
/// As [`extract`], plus `ExtractionError::Io` for malformed tar data.
///
/// # Examples
///
/// ```no_run
/// use detar_core::extract_tar;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// extract_tar(File::open("archive.tar")?, "/tmp/output")?;
/// # Ok(())
/// # }
/// ```
pub fn extract_tar<R: Read, P: AsRef<Path>>(reader: R, root: P) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    extract(TarEntries::new(&mut archive)?, root)
}
