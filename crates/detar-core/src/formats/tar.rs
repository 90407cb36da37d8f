//! Adapter from `tar::Archive` to the engine's entry sequence.
//!
//! The `tar` crate already folds GNU long names and PAX `path`/`linkpath`
//! records into each entry. Times and ids from PAX records are merged here,
//! as is the GNU `atime` header field.

use std::io;
use std::io::Read;
use std::path::PathBuf;

use log::debug;

use crate::Result;
use crate::mode::FileMode;
use crate::types::DeviceNumber;
use crate::types::Entry;
use crate::types::EntryType;
use crate::types::Owner;
use crate::types::Timestamp;

const NANOS_DIGITS: usize = 9;

/// Iterator over the entries of a tar archive, converted for extraction.
///
/// Each item borrows the archive; it must be dropped before the next one is
/// requested, which [`crate::extract`] does.
///
/// # Examples
///
/// ```no_run
/// use detar_core::formats::tar::TarEntries;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = tar::Archive::new(File::open("archive.tar")?);
/// detar_core::extract(TarEntries::new(&mut archive)?, "/tmp/out")?;
/// # Ok(())
/// # }
/// ```
pub struct TarEntries<'a, R: 'a + Read> {
    inner: tar::Entries<'a, R>,
}

impl<'a, R: Read> TarEntries<'a, R> {
    /// Starts reading entries from `archive`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the archive was already read.
    pub fn new(archive: &'a mut tar::Archive<R>) -> Result<Self> {
        Ok(Self {
            inner: archive.entries()?,
        })
    }
}

impl<'a, R: Read> Iterator for TarEntries<'a, R> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.inner.next()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e.into())),
            };
            match convert_entry(raw) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Times and ids overridden by PAX extended header records.
#[derive(Debug, Default, PartialEq, Eq)]
struct PaxOverrides {
    accessed: Option<Timestamp>,
    modified: Option<Timestamp>,
    uid: Option<u32>,
    gid: Option<u32>,
}

fn convert_entry<'a, R: 'a + Read>(mut raw: tar::Entry<'a, R>) -> io::Result<Option<Entry<'a>>> {
    let code = raw.header().entry_type().as_byte();
    if code == b'g' {
        debug!("skipping pax global header");
        return Ok(None);
    }

    let pax = read_pax_overrides(&mut raw)?;
    let name = raw.path()?.into_owned();
    let header = raw.header();

    let entry_type = match code {
        b'0' | b'\0' => EntryType::File,
        b'1' => EntryType::Hardlink {
            target: link_target(&raw)?,
        },
        b'2' => EntryType::Symlink {
            target: link_target(&raw)?,
        },
        b'3' => EntryType::CharDevice {
            device: device_number(header)?,
        },
        b'4' => EntryType::BlockDevice {
            device: device_number(header)?,
        },
        b'5' => EntryType::Directory,
        b'6' => EntryType::Fifo,
        other => EntryType::Unsupported { code: other },
    };

    let fields = header.as_old();
    let owner = Owner::new(
        pax.uid.map_or_else(|| id_field(numeric_field(&fields.uid, "uid")?, "uid"), Ok)?,
        pax.gid.map_or_else(|| id_field(numeric_field(&fields.gid, "gid")?, "gid"), Ok)?,
    );
    let modified = match pax.modified {
        Some(modified) => modified,
        None => Timestamp::from_secs(numeric_field(&fields.mtime, "mtime")?),
    };
    let accessed = pax.accessed.or_else(|| {
        header
            .as_gnu()
            .and_then(|gnu| numeric_field(&gnu.atime, "atime").ok())
            .filter(|&atime| atime != 0)
            .map(Timestamp::from_secs)
    });
    let mode = id_field(numeric_field(&fields.mode, "mode")?, "mode")?;

    let mut entry = Entry::new(name, entry_type)
        .with_mode(FileMode::from_bits(mode))
        .with_owner(owner)
        .with_modified(modified);
    if let Some(accessed) = accessed {
        entry = entry.with_accessed(accessed);
    }
    if entry.entry_type.is_file() {
        entry = entry.with_content(raw);
    }
    Ok(Some(entry))
}

fn read_pax_overrides<R: Read>(raw: &mut tar::Entry<'_, R>) -> io::Result<PaxOverrides> {
    let mut overrides = PaxOverrides::default();
    let Some(extensions) = raw.pax_extensions()? else {
        return Ok(overrides);
    };

    for extension in extensions {
        let extension = extension?;
        let (Ok(key), Ok(value)) = (extension.key(), extension.value()) else {
            continue;
        };
        match key {
            "atime" => overrides.accessed = Some(parse_pax_time(value)?),
            "mtime" => overrides.modified = Some(parse_pax_time(value)?),
            "uid" => overrides.uid = Some(parse_pax_id(value)?),
            "gid" => overrides.gid = Some(parse_pax_id(value)?),
            _ => {}
        }
    }
    Ok(overrides)
}

/// Parses a PAX time record such as `1700000000.25` or `-1.5`.
///
/// The fraction is truncated to nanoseconds. A negative value counts
/// backwards from the epoch, fraction included.
pub(crate) fn parse_pax_time(value: &str) -> io::Result<Timestamp> {
    let invalid = || invalid_data(format!("invalid pax time {value:?}"));

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let negative = whole.starts_with('-');
    let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let secs: i64 = whole.parse().map_err(|_| invalid())?;
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(NANOS_DIGITS)
        .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));

    if negative && nanos > 0 {
        Ok(Timestamp::new(
            secs.checked_sub(1).ok_or_else(invalid)?,
            1_000_000_000 - nanos,
        ))
    } else {
        Ok(Timestamp::new(secs, nanos))
    }
}

fn parse_pax_id(value: &str) -> io::Result<u32> {
    value
        .parse()
        .map_err(|_| invalid_data(format!("invalid pax id {value:?}")))
}

fn link_target<R: Read>(raw: &tar::Entry<'_, R>) -> io::Result<PathBuf> {
    Ok(raw
        .link_name()?
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default())
}

fn device_number(header: &tar::Header) -> io::Result<DeviceNumber> {
    let fields = header
        .as_gnu()
        .map(|gnu| (&gnu.dev_major, &gnu.dev_minor))
        .or_else(|| header.as_ustar().map(|ustar| (&ustar.dev_major, &ustar.dev_minor)));
    let Some((major, minor)) = fields else {
        return Ok(DeviceNumber::new(0, 0));
    };
    Ok(DeviceNumber::new(
        id_field(numeric_field(major, "devmajor")?, "devmajor")?,
        id_field(numeric_field(minor, "devminor")?, "devminor")?,
    ))
}

/// Reads a numeric header field.
///
/// Octal text may be padded with NULs and spaces on either side and ends at
/// the first NUL inside it; an empty field reads as 0. A field whose first
/// byte has the high bit set holds a big-endian two's complement number
/// (the GNU base-256 extension), which is how negative times are stored.
pub(crate) fn numeric_field(field: &[u8], name: &str) -> io::Result<i64> {
    match field.first() {
        Some(&lead) if lead & 0x80 != 0 => base256_field(field, lead, name),
        _ => octal_field(field, name),
    }
}

fn octal_field(field: &[u8], name: &str) -> io::Result<i64> {
    let is_padding = |b: &u8| *b == b'\0' || *b == b' ';
    let start = field.iter().position(|b| !is_padding(b)).unwrap_or(field.len());
    let end = field.iter().rposition(|b| !is_padding(b)).map_or(start, |i| i + 1);
    let digits = field[start..end].split(|b| *b == b'\0').next().unwrap_or(&[]);

    let invalid = || {
        invalid_data(format!(
            "{name} field {:?} is not an octal number",
            String::from_utf8_lossy(digits)
        ))
    };
    if !digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
        return Err(invalid());
    }
    digits
        .iter()
        .try_fold(0i64, |acc, &digit| {
            acc.checked_mul(8)?.checked_add(i64::from(digit - b'0'))
        })
        .ok_or_else(invalid)
}

fn base256_field(field: &[u8], lead: u8, name: &str) -> io::Result<i64> {
    let overflow = || invalid_data(format!("{name} field overflows a 64-bit number"));
    let invert = if lead & 0x40 == 0 { 0 } else { 0xff };

    let mut value: u64 = 0;
    for (i, &byte) in field.iter().enumerate() {
        let mut byte = byte ^ invert;
        if i == 0 {
            byte &= 0x7f;
        }
        if value >> 56 != 0 {
            return Err(overflow());
        }
        value = (value << 8) | u64::from(byte);
    }

    let value = i64::try_from(value).map_err(|_| overflow())?;
    Ok(if invert == 0 { value } else { !value })
}

fn id_field(value: i64, field: &str) -> io::Result<u32> {
    u32::try_from(value).map_err(|_| invalid_data(format!("{field} {value} out of range")))
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
