//! Tar extraction engine with faithful metadata restoration.
//!
//! `detar-core` turns a sequence of archive entries into a filesystem tree
//! under a destination directory. It restores permission and special bits,
//! timestamps and (when privileged) ownership, and creates hard links,
//! symlinks, FIFOs and device nodes. Entry names are confined to the
//! destination; existing links and special files in the way are replaced,
//! existing directories are merged.
//!
//! # Examples
//!
//! ```no_run
//! use detar_core::extract_tar;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! extract_tar(File::open("rootfs.tar")?, "/srv/rootfs")?;
//! # Ok(())
//! # }
//! ```
//!
//! Entries can also come from any other source:
//!
//! ```no_run
//! use detar_core::types::{Entry, Timestamp};
//! use detar_core::{ExtractConfig, Extractor, OwnershipPolicy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = vec![
//!     Ok(Entry::directory("etc")),
//!     Ok(Entry::symlink("etc/localtime", "/usr/share/zoneinfo/UTC")
//!         .with_modified(Timestamp::from_secs(1_700_000_000))),
//! ];
//! Extractor::new(ExtractConfig::default().with_ownership(OwnershipPolicy::Never))
//!     .extract(entries, "/srv/rootfs")?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(unix))]
compile_error!("detar-core only supports Unix platforms");

pub mod api;
pub mod apply;
pub mod collision;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod metadata;
pub mod mode;
pub mod process;
pub mod types;

// Re-export main API types
pub use api::extract;
pub use api::extract_tar;
pub use config::ExtractConfig;
pub use config::OwnershipPolicy;
pub use error::ExtractionError;
pub use error::Result;
pub use extraction::Extractor;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::Entry;
pub use types::EntryType;
pub use types::SafePath;
