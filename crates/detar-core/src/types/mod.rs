//! Entry data model and destination path types.
//!
//! Entries describe what to create; [`DestDir`] and [`SafePath`] decide
//! where. An entry name only ever reaches the filesystem after going through
//! [`SafePath::sanitize`], so no entry can land outside the destination.

pub mod dest_dir;
pub mod entry;
pub mod entry_type;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry::Entry;
pub use entry::Owner;
pub use entry::Timestamp;
pub use entry_type::DeviceNumber;
pub use entry_type::EntryType;
pub use safe_path::SafePath;
pub use safe_path::clean_lexical;
