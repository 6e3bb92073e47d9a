//! Command-line interface definitions for RustGallery.
//!
//! # Example
//!
//! ```bash
//! # Build the gallery for a folder and open it
//! rustgallery ~/Pictures
//!
//! # Write the page without launching a browser
//! rustgallery ~/Pictures --no-open
//!
//! # Keep the cache somewhere else
//! rustgallery ~/Pictures --cache-dir /tmp/gallery-cache
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Local image gallery viewer.
///
/// Scans a directory tree for images, caches their dimensions and tint
/// colors, and opens an HTML page listing them newest first.
#[derive(Debug, Parser)]
#[command(name = "rustgallery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for images
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the metadata cache files
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding the page stylesheet
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Write the page and print its path instead of opening a browser
    #[arg(long)]
    pub no_open: bool,

    /// Follow symbolic links during the scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}
