//! Cache record and entry definitions.
//!
//! Field order is alphabetical and images live in a [`BTreeMap`], so the
//! serialized sidecar always has sorted keys.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Height in pixels
    pub height: u32,
    /// Width in pixels
    pub width: u32,
}

impl Dimensions {
    /// Create a new `Dimensions`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { height, width }
    }
}

/// Cached metadata for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Pixel dimensions
    pub dimensions: Dimensions,
    /// Modification time in seconds since the Unix epoch
    pub mtime: f64,
    /// Representative color as `#rrggbb`
    pub tint_color: String,
}

impl ImageEntry {
    /// Modification time as a [`SystemTime`].
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        from_timestamp(self.mtime)
    }
}

/// Persisted cache contents for one root directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Entries keyed by root-relative path
    pub images: BTreeMap<String, ImageEntry>,
    /// Absolute root directory this record belongs to
    pub root: String,
}

impl CacheRecord {
    /// Create an empty record for `root`.
    #[must_use]
    pub fn empty(root: impl Into<String>) -> Self {
        Self {
            images: BTreeMap::new(),
            root: root.into(),
        }
    }
}

/// Convert a [`SystemTime`] to fractional seconds since the Unix epoch.
///
/// Times before the epoch become negative.
#[must_use]
pub fn to_timestamp(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Inverse of [`to_timestamp`], saturating at the epoch for invalid input.
#[must_use]
pub fn from_timestamp(secs: f64) -> SystemTime {
    if !secs.is_finite() {
        return UNIX_EPOCH;
    }
    let magnitude = Duration::try_from_secs_f64(secs.abs()).unwrap_or(Duration::ZERO);
    if secs >= 0.0 {
        UNIX_EPOCH + magnitude
    } else {
        UNIX_EPOCH
            .checked_sub(magnitude)
            .unwrap_or(UNIX_EPOCH)
    }
}
