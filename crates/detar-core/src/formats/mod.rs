//! Archive format adapters.
//!
//! An adapter turns a decoded archive into the sequence of
//! [`crate::types::Entry`] values the extraction engine consumes.

pub mod tar;

pub use tar::TarEntries;
