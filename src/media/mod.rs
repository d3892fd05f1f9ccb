//! Captured media on disk: listing, lookup and deletion.

mod library;

pub use library::{format_date, format_size, MediaEntry, MediaError, MediaKind, MediaLibrary};
