//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! [`Walker`] validates the root up front and then lazily yields every
//! regular file below it, in file-name order within each directory.
//! [`Walker::images`] adds the [`ImageFilter`] stage on top.
//!
//! # Example
//!
//! ```no_run
//! use rustgallery::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default()).unwrap();
//! let images: Vec<_> = walker.images().filter_map(Result::ok).collect();
//! println!("Found {} images", images.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::sniff::ImageFilter;
use super::{ScanError, WalkerConfig};

/// Recursive file walker rooted at one directory.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotFound`] if the root does not exist and
    /// [`ScanError::NotADirectory`] if it is not a directory.
    pub fn new(root: &Path, config: WalkerConfig) -> Result<Self, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    /// Lazily yield every regular file under the root.
    ///
    /// Symlinks to files are yielded under their link path even when
    /// `follow_symlinks` is off; that option only controls descent into
    /// linked directories. Unreadable directories and entries are logged and
    /// skipped.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(self.config.skip_hidden && Self::is_hidden(entry)))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    // Unfollowed links still count when they point at a file.
                    if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
                        Some(entry.into_path())
                    } else {
                        None
                    }
                }
                Err(e) => {
                    let path = e.path().map_or_else(
                        || self.root.display().to_string(),
                        |p| p.display().to_string(),
                    );
                    log::warn!("Skipping unreadable entry {}: {}", path, e);
                    None
                }
            })
    }

    /// Lazily yield every image file under the root.
    ///
    /// Files that cannot be read for sniffing are yielded as errors.
    pub fn images(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let filter = ImageFilter;
        self.files().filter_map(move |path| match filter.accept(&path) {
            Ok(true) => Some(Ok(path)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        })
    }
}
