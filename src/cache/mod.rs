//! Image metadata caching for RustGallery.
//!
//! Decoding an image and choosing its tint color is the expensive part of a
//! run, so the results are kept in one JSON sidecar file per root directory
//! and reused while a file's modification time is unchanged.
//!
//! # Architecture
//!
//! * [`store`]: the [`ImageCache`] itself: loading, invalidation and the
//!   guaranteed write on release.
//! * [`entry`]: the serialized data model.
//! * [`slug`]: cache file naming.
//!
//! # Cache Invalidation
//!
//! An entry is reused only when its stored mtime is exactly equal to the
//! file's current mtime. Size and content are not consulted. Entries for
//! files that were not seen during a run are dropped when the record is
//! written back.

pub mod entry;
pub mod slug;
pub mod store;

pub use entry::{CacheRecord, Dimensions, ImageEntry};
pub use slug::slugify;
pub use store::{
    cache_file_path, init_cache_dir, CacheError, CacheResult, CacheStats, ImageCache,
};
