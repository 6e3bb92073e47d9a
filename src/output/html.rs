//! HTML gallery page generated with the `askama` template engine.
//!
//! # Features
//!
//! * **Ordered**: images appear in the order given, most recent first.
//! * **Tinted**: each tile uses the cached tint color as its placeholder
//!   background while the image loads.
//! * **Safe**: paths are escaped by the template engine.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rustgallery::output::html::GalleryPage;
//!
//! let page = GalleryPage::new(&root, &cache.images(), &static_dir);
//! let html = page.to_html().unwrap();
//! ```

use std::path::Path;
use std::time::SystemTime;

use askama::Template;
use chrono::{DateTime, Local};
use url::Url;

use crate::cache::ImageEntry;

/// Name of the stylesheet inside the static directory.
pub const STYLESHEET: &str = "gallery.css";

/// Complete gallery page for the Askama template.
#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryPage {
    /// Absolute root directory
    pub root: String,
    /// URL of the stylesheet in the static directory
    pub stylesheet_url: String,
    /// Formatted generation timestamp
    pub timestamp: String,
    /// Application version
    pub version: String,
    /// Images formatted for HTML, in display order
    pub images: Vec<GalleryImage>,
}

/// A single image formatted for HTML presentation.
pub struct GalleryImage {
    /// Root-relative path
    pub rel_path: String,
    /// `file://` URL of the image
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Width divided by height, for the CSS `aspect-ratio`
    pub aspect_ratio: String,
    /// Placeholder color
    pub tint_color: String,
    /// Formatted modification time
    pub modified: String,
}

impl GalleryPage {
    /// Build the page model.
    ///
    /// # Arguments
    ///
    /// * `root` - Absolute root directory the images are relative to
    /// * `images` - `(relative path, entry)` pairs in display order
    /// * `static_dir` - Directory holding the stylesheet
    #[must_use]
    pub fn new(root: &Path, images: &[(String, ImageEntry)], static_dir: &Path) -> Self {
        let images = images
            .iter()
            .map(|(rel_path, entry)| {
                let dims = entry.dimensions;
                GalleryImage {
                    rel_path: rel_path.clone(),
                    url: file_url(&root.join(rel_path)),
                    width: dims.width,
                    height: dims.height,
                    aspect_ratio: format_aspect(dims.width, dims.height),
                    tint_color: entry.tint_color.clone(),
                    modified: format_time(entry.modified()),
                }
            })
            .collect();

        Self {
            root: root.display().to_string(),
            stylesheet_url: file_url(&static_dir.join(STYLESHEET)),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            images,
        }
    }

    /// Generate the HTML string.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }
}

/// Convert an absolute path to a `file://` URL, percent-encoding as needed.
///
/// Relative paths cannot be expressed as file URLs and are returned as-is.
#[must_use]
pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path).map_or_else(|()| path.display().to_string(), String::from)
}

fn format_aspect(width: u32, height: u32) -> String {
    if height == 0 {
        return "1".to_string();
    }
    format!("{:.4}", f64::from(width) / f64::from(height))
}

/// Format a SystemTime as a local date string.
fn format_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}
