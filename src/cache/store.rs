//! JSON-backed per-root image metadata cache.
//!
//! An [`ImageCache`] is opened for one root directory, populated with
//! [`ImageCache::add_image`] and persisted exactly once when it is released.
//! Release happens through [`ImageCache::close`], through
//! [`ImageCache::scope`], or through `Drop` when the cache goes out of scope
//! on an error or panic path.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::ImageReader;

use super::entry::{to_timestamp, CacheRecord, Dimensions, ImageEntry};
use super::slug::slugify;
use crate::tint::{as_hex, TintError, TintExtractor};

/// Extension of cache sidecar files.
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Errors that can occur while loading, populating or saving the cache.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The cache file exists but could not be read.
    #[error("Failed to read cache file {path}: {source}")]
    Read {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not a valid cache record.
    #[error("Failed to parse cache file {path}: {source}")]
    Parse {
        /// Cache file path
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The cache file belongs to a different root directory.
    #[error("Cache root mismatch: expected {expected}, found {found}")]
    RootMismatch {
        /// Root the cache was opened for
        expected: String,
        /// Root stored in the cache file
        found: String,
    },

    /// An image path does not lie under the cache root.
    #[error("Path {path} is not under root {root}")]
    OutsideRoot {
        /// Offending image path
        path: PathBuf,
        /// Cache root
        root: PathBuf,
    },

    /// An image path has a component that is not valid UTF-8 and so has no
    /// unambiguous cache key.
    #[error("Path {path} is not valid UTF-8")]
    NonUtf8Path {
        /// Offending image path
        path: PathBuf,
    },

    /// File metadata for an image could not be read.
    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        /// Image path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The image header could not be read.
    #[error("Failed to read image dimensions for {path}: {source}")]
    Image {
        /// Image path
        path: PathBuf,
        /// The underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// The tint extractor failed.
    #[error(transparent)]
    Tint(#[from] TintError),

    /// The cache record could not be serialized.
    #[error("Failed to serialize cache record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The cache file could not be written.
    #[error("Failed to write cache file {path}: {source}")]
    Write {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Counters describing how a run used the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries copied forward from the previous run
    pub hits: usize,
    /// Entries recomputed because they were new or modified
    pub misses: usize,
    /// Previous entries whose files were not seen this run
    pub dropped: usize,
}

/// Create the cache directory (and parents) and return its path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn init_cache_dir(base: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(base)?;
    log::debug!("Cache directory ready: {}", base.display());
    Ok(base.to_path_buf())
}

/// Path of the sidecar file for `root` inside `cache_dir`.
#[must_use]
pub fn cache_file_path(cache_dir: &Path, root: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}", slugify(root), CACHE_FILE_EXTENSION))
}

/// Per-root image metadata cache.
pub struct ImageCache {
    root: PathBuf,
    path: PathBuf,
    record: CacheRecord,
    previous: BTreeMap<String, ImageEntry>,
    extractor: Box<dyn TintExtractor>,
    stats: CacheStats,
    persisted: bool,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("root", &self.root)
            .field("path", &self.path)
            .field("images", &self.record.images.len())
            .field("stats", &self.stats)
            .field("persisted", &self.persisted)
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Load the cache for `root` from `cache_dir`.
    ///
    /// A missing cache file yields an empty record. The previous entries are
    /// kept aside; only images passed to [`add_image`](Self::add_image) end
    /// up in the record that is written back.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RootMismatch`] if the stored record belongs to a
    /// different root, and read or parse errors for an unusable file. No file
    /// is written when opening fails.
    pub fn open(
        cache_dir: &Path,
        root: &Path,
        extractor: Box<dyn TintExtractor>,
    ) -> CacheResult<Self> {
        let root_str = root.to_string_lossy().into_owned();
        let path = cache_file_path(cache_dir, &root_str);

        let mut record = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<CacheRecord>(&content).map_err(|source| {
                CacheError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No cache file at {}, starting empty", path.display());
                CacheRecord::empty(root_str.clone())
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        if record.root != root_str {
            return Err(CacheError::RootMismatch {
                expected: root_str,
                found: record.root,
            });
        }

        let previous = std::mem::take(&mut record.images);
        log::debug!(
            "Loaded {} cached entries for {} from {}",
            previous.len(),
            root_str,
            path.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            path,
            record,
            previous,
            extractor,
            stats: CacheStats::default(),
            persisted: false,
        })
    }

    /// Open the cache, run `f`, and always persist before returning.
    ///
    /// The result of `f` is returned unchanged. A persist failure is only
    /// reported when `f` itself succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error of [`open`](Self::open), of `f`, or of the final
    /// write, in that order of precedence.
    pub fn scope<T, E, F>(
        cache_dir: &Path,
        root: &Path,
        extractor: Box<dyn TintExtractor>,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut ImageCache) -> Result<T, E>,
        E: From<CacheError>,
    {
        let mut cache = Self::open(cache_dir, root, extractor)?;
        let result = f(&mut cache);
        let saved = cache.close();
        let value = result?;
        saved?;
        Ok(value)
    }

    /// Path of the sidecar file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Usage counters for this run.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of entries in the current record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.record.images.len()
    }

    /// Whether the current record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record.images.is_empty()
    }

    /// Record metadata for the image at `path`.
    ///
    /// The previous entry is reused verbatim when its stored mtime equals the
    /// file's current mtime. Otherwise the image header is read for its
    /// dimensions and the tint extractor is run.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is outside the root or not valid UTF-8, its
    /// metadata cannot be read, its dimensions cannot be decoded, or the extractor fails.
    pub fn add_image(&mut self, path: &Path) -> CacheResult<()> {
        let rel_path = self.relative_key(path)?;

        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| CacheError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;
        let mtime = to_timestamp(modified);

        if let Some(previous) = self.previous.get(&rel_path) {
            if previous.mtime == mtime {
                log::trace!("Cache hit: {}", rel_path);
                self.record.images.insert(rel_path, previous.clone());
                self.stats.hits += 1;
                return Ok(());
            }
        }

        log::debug!("Cache miss: {}", rel_path);
        let entry = self.compute_entry(path, mtime)?;
        self.record.images.insert(rel_path, entry);
        self.stats.misses += 1;
        Ok(())
    }

    /// Current entries, most recently modified first.
    ///
    /// Entries with identical mtimes are ordered by relative path.
    #[must_use]
    pub fn images(&self) -> Vec<(String, ImageEntry)> {
        let mut images: Vec<_> = self
            .record
            .images
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        // The map iterates in path order and the sort is stable.
        images.sort_by(|a, b| b.1.mtime.total_cmp(&a.1.mtime));
        images
    }

    /// Persist the record and release the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn close(mut self) -> CacheResult<()> {
        self.persist()
    }

    fn persist(&mut self) -> CacheResult<()> {
        if self.persisted {
            return Ok(());
        }
        self.persisted = true;

        self.stats.dropped = self
            .previous
            .keys()
            .filter(|k| !self.record.images.contains_key(*k))
            .count();

        let json = serde_json::to_string_pretty(&self.record).map_err(CacheError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;

        log::info!(
            "Saved {} entries to {} ({} reused, {} computed, {} dropped)",
            self.record.images.len(),
            self.path.display(),
            self.stats.hits,
            self.stats.misses,
            self.stats.dropped
        );
        Ok(())
    }

    fn relative_key(&self, path: &Path) -> CacheResult<String> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| CacheError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;
        let key = rel
            .iter()
            .map(|c| {
                c.to_str().ok_or_else(|| CacheError::NonUtf8Path {
                    path: path.to_path_buf(),
                })
            })
            .collect::<CacheResult<Vec<_>>>()?
            .join("/");
        if key.is_empty() {
            return Err(CacheError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            });
        }
        Ok(key)
    }

    fn compute_entry(&self, path: &Path, mtime: f64) -> CacheResult<ImageEntry> {
        let image_error = |source| CacheError::Image {
            path: path.to_path_buf(),
            source,
        };
        let (width, height) = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| image_error(image::ImageError::IoError(e)))?
            .into_dimensions()
            .map_err(image_error)?;

        let tint = self.extractor.extract(path)?;

        Ok(ImageEntry {
            dimensions: Dimensions::new(width, height),
            mtime,
            tint_color: as_hex(tint),
        })
    }
}

impl Drop for ImageCache {
    fn drop(&mut self) {
        if let Err(e) = self.persist() {
            log::error!("Failed to save image cache: {}", e);
        }
    }
}
