//! Content-based image detection.
//!
//! Whether a file is an image is decided from its leading bytes, never from
//! its extension. The only extension-based rule is the markdown exclusion.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use image::ImageFormat;

use super::ScanError;

/// Number of leading bytes read for signature sniffing.
pub const SNIFF_LEN: u64 = 32;

/// Whether `path` names a markdown file (`*.md`, case-sensitive).
///
/// ```
/// use rustgallery::scanner::sniff::is_markdown;
/// use std::path::Path;
///
/// assert!(is_markdown(Path::new("notes/README.md")));
/// assert!(!is_markdown(Path::new("photo.png")));
/// ```
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().ends_with(".md")
}

/// Identify the image format of `path` from its signature.
///
/// Returns `Ok(None)` for files that are not a recognized image, or whose
/// format cannot be decoded by this build.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sniff_image(path: &Path) -> Result<Option<ImageFormat>, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::from_io(path, e))?;
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN)
        .read_to_end(&mut header)
        .map_err(|e| ScanError::from_io(path, e))?;

    Ok(image::guess_format(&header)
        .ok()
        .filter(ImageFormat::reading_enabled))
}

/// Second-stage filter over walked paths.
///
/// Markdown files are rejected before any I/O happens; every other path is
/// kept only if [`sniff_image`] recognizes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilter;

impl ImageFilter {
    /// Decide whether `path` should be listed as an image.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-markdown file cannot be read.
    pub fn accept(&self, path: &Path) -> Result<bool, ScanError> {
        if is_markdown(path) {
            log::trace!("Skipping markdown file: {}", path.display());
            return Ok(false);
        }

        match sniff_image(path)? {
            Some(format) => {
                log::trace!("Detected {:?}: {}", format, path.display());
                Ok(true)
            }
            None => {
                log::trace!("Not an image: {}", path.display());
                Ok(false)
            }
        }
    }
}
