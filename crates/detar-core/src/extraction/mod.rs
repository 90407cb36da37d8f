//! Extraction engine driving entries onto the filesystem.

mod engine;

pub use engine::Extractor;
