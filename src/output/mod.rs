//! Rendering of the gallery page.
//!
//! - [`html`]: the askama page model and template
//! - [`browser`]: temporary output file and browser launch
//!
//! # Example
//!
//! ```no_run
//! use rustgallery::output::{open_in_browser, write_temp_html, GalleryPage};
//! use std::path::Path;
//!
//! let page = GalleryPage::new(Path::new("/photos"), &[], Path::new("static"));
//! let path = write_temp_html(&page.to_html().unwrap()).unwrap();
//! open_in_browser(&path).unwrap();
//! ```

pub mod browser;
pub mod html;

// Re-export main types
pub use browser::{open_in_browser, write_temp_html};
pub use html::{GalleryImage, GalleryPage};

/// Errors that can occur while producing or opening the gallery page.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// Template rendering error
    #[error("HTML template error: {0}")]
    Template(#[from] askama::Error),

    /// I/O error while writing the page
    #[error("I/O error during HTML generation: {0}")]
    Io(#[from] std::io::Error),

    /// The browser launcher could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        /// Launcher program name
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
