//! Tint color extraction.
//!
//! A tint color is a single representative color for an image, used as the
//! placeholder background of its tile in the gallery page. The cache treats
//! the extractor as a black box behind the [`TintExtractor`] trait, so tests
//! (and alternative algorithms) can swap it out.
//!
//! # Example
//!
//! ```no_run
//! use rustgallery::tint::{as_hex, DominantTint, TintExtractor};
//! use std::path::Path;
//!
//! let rgb = DominantTint::default().extract(Path::new("photo.png")).unwrap();
//! println!("{}", as_hex(rgb));
//! ```

use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

/// A color as three channels in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Errors that can occur while choosing a tint color.
#[derive(Debug, Error)]
pub enum TintError {
    /// The image could not be opened.
    #[error("Failed to open image {path}: {source}")]
    Open {
        /// Image path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The image could not be decoded.
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        /// Image path
        path: PathBuf,
        /// The underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// The extractor could not produce a color for this image.
    #[error("Cannot choose a tint color for {path}: {message}")]
    Extraction {
        /// Image path
        path: PathBuf,
        /// Reason reported by the extractor
        message: String,
    },
}

/// Chooses a representative color for an image file.
pub trait TintExtractor {
    /// Return the tint color of the image at `path` as channels in `[0, 1]`.
    fn extract(&self, path: &Path) -> Result<Rgb, TintError>;
}

impl<F> TintExtractor for F
where
    F: Fn(&Path) -> Result<Rgb, TintError>,
{
    fn extract(&self, path: &Path) -> Result<Rgb, TintError> {
        self(path)
    }
}

/// Edge length of the thumbnail the histogram is computed on.
const SAMPLE_SIZE: u32 = 64;

/// Bits kept per channel when bucketing pixels.
const BUCKET_BITS: u32 = 4;

/// Pixels more transparent than this are ignored when possible.
const MIN_ALPHA: u8 = 128;

/// Picks the most common color of a downscaled copy of the image.
///
/// Pixels are quantized into `2^(3 * BUCKET_BITS)` buckets; the tint is the
/// mean color of the most populated bucket. Mostly transparent pixels are
/// skipped unless the whole image is transparent.
#[derive(Debug, Clone, Copy)]
pub struct DominantTint {
    sample_size: u32,
}

impl Default for DominantTint {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
        }
    }
}

impl DominantTint {
    /// Create an extractor that samples a thumbnail of at most
    /// `sample_size` x `sample_size` pixels.
    #[must_use]
    pub fn with_sample_size(sample_size: u32) -> Self {
        Self {
            sample_size: sample_size.max(1),
        }
    }

    /// Compute the dominant color of already decoded pixels.
    fn dominant(&self, pixels: &image::RgbaImage) -> Option<Rgb> {
        let buckets = 1usize << (3 * BUCKET_BITS);
        let mut counts = vec![0u32; buckets];
        let mut sums = vec![[0u64; 3]; buckets];

        let opaque = pixels.pixels().any(|p| p.0[3] >= MIN_ALPHA);

        for pixel in pixels.pixels() {
            let [r, g, b, a] = pixel.0;
            if opaque && a < MIN_ALPHA {
                continue;
            }
            let shift = 8 - BUCKET_BITS;
            let index = ((r as usize >> shift) << (2 * BUCKET_BITS))
                | ((g as usize >> shift) << BUCKET_BITS)
                | (b as usize >> shift);
            counts[index] += 1;
            sums[index][0] += u64::from(r);
            sums[index][1] += u64::from(g);
            sums[index][2] += u64::from(b);
        }

        // First maximum wins, so ties resolve towards darker buckets.
        let (best, &count) = counts
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &u32)>, (i, c)| match best {
                Some((_, bc)) if bc >= c => best,
                _ => Some((i, c)),
            })?;
        if count == 0 {
            return None;
        }

        let mean = |channel: usize| sums[best][channel] as f32 / count as f32 / 255.0;
        Some([mean(0), mean(1), mean(2)])
    }
}

impl TintExtractor for DominantTint {
    fn extract(&self, path: &Path) -> Result<Rgb, TintError> {
        let img = ImageReader::open(path)
            .map_err(|source| TintError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| TintError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| TintError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        let sample = img.thumbnail(self.sample_size, self.sample_size).to_rgba8();
        self.dominant(&sample).ok_or_else(|| TintError::Extraction {
            path: path.to_path_buf(),
            message: "image has no pixels".to_string(),
        })
    }
}

/// Format a color as a lowercase `#rrggbb` string.
///
/// Channels are clamped to `[0, 1]` and scaled by 255 with truncation.
///
/// ```
/// use rustgallery::tint::as_hex;
///
/// assert_eq!(as_hex([1.0, 0.5, 0.0]), "#ff7f00");
/// ```
#[must_use]
pub fn as_hex(color: Rgb) -> String {
    let [r, g, b] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}
