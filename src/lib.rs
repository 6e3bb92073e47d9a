//! RustGallery - Local Image Gallery Viewer
//!
//! Scans a directory tree for images, caches per-image metadata (dimensions,
//! tint color, modification time) in a JSON sidecar per root, and renders an
//! HTML page listing the images newest first.
//!
//! The flow of a run is:
//!
//! 1. [`scanner`] walks the root and keeps files that sniff as images.
//! 2. [`cache`] reuses or recomputes each image's metadata.
//! 3. [`output`] renders the page, writes it to a temporary file and opens it.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod tint;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cache::{init_cache_dir, CacheStats, ImageCache, ImageEntry};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{AppError, ExitCode};
use crate::output::{open_in_browser, write_temp_html, GalleryPage};
use crate::progress::{Progress, ProgressCallback, PHASE_CACHE, PHASE_SCAN};
use crate::scanner::{ScanError, Walker, WalkerConfig};
use crate::signal::ShutdownHandler;
use crate::tint::{DominantTint, TintExtractor};

/// Inputs for building a gallery.
#[derive(Debug, Clone)]
pub struct GalleryOptions {
    /// Directory to scan
    pub root: PathBuf,
    /// Directory holding the cache files (created if missing)
    pub cache_dir: PathBuf,
    /// Walk behavior
    pub walker: WalkerConfig,
}

/// Result of scanning a root and refreshing its cache.
#[derive(Debug, Clone)]
pub struct Gallery {
    /// Canonical absolute root
    pub root: PathBuf,
    /// `(relative path, entry)` pairs, most recently modified first
    pub images: Vec<(String, ImageEntry)>,
    /// Cache usage for this run
    pub stats: CacheStats,
}

/// Resolve `root` to an absolute, canonical directory path.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`] for an
/// invalid root.
pub fn canonical_root(root: &Path) -> Result<PathBuf, ScanError> {
    let canonical = std::fs::canonicalize(root).map_err(|e| ScanError::from_io(root, e))?;
    if !canonical.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(canonical)
}

/// Scan `options.root` and bring its metadata cache up to date.
///
/// The root is validated before the cache directory is created or any cache
/// file is opened. Once the cache is open its record is written back exactly
/// once, whether processing finishes, fails on an image, or is interrupted.
///
/// # Errors
///
/// Returns an error for an invalid root, unreadable files, a cache root
/// mismatch, per-image failures, or [`AppError::Interrupted`].
pub fn build_gallery(
    options: &GalleryOptions,
    extractor: Box<dyn TintExtractor>,
    shutdown: &ShutdownHandler,
    progress: &dyn ProgressCallback,
) -> Result<Gallery> {
    let root = canonical_root(&options.root)?;
    let walker = Walker::new(&root, options.walker.clone())?;

    progress.on_phase_start(PHASE_SCAN, 0);
    let mut paths = Vec::new();
    for path in walker.images() {
        if shutdown.is_shutdown_requested() {
            progress.on_phase_end(PHASE_SCAN);
            return Err(AppError::Interrupted {
                processed: 0,
                total: paths.len(),
            }
            .into());
        }
        let path = path.context("Failed to scan for images")?;
        progress.on_progress(paths.len() + 1, &path.to_string_lossy());
        paths.push(path);
    }
    progress.on_phase_end(PHASE_SCAN);
    log::info!("Found {} images under {}", paths.len(), root.display());

    let cache_dir = init_cache_dir(&options.cache_dir).with_context(|| {
        format!(
            "Failed to create cache directory {}",
            options.cache_dir.display()
        )
    })?;

    let populate = |cache: &mut ImageCache| -> Result<Gallery> {
        let total = paths.len();
        progress.on_phase_start(PHASE_CACHE, total);

        for (i, path) in paths.iter().enumerate() {
            if shutdown.is_shutdown_requested() {
                progress.on_phase_end(PHASE_CACHE);
                return Err(AppError::Interrupted {
                    processed: i,
                    total,
                }
                .into());
            }
            cache
                .add_image(path)
                .with_context(|| format!("Failed to process {}", path.display()))?;
            progress.on_progress(i + 1, &path.to_string_lossy());
        }

        progress.on_phase_end(PHASE_CACHE);
        Ok(Gallery {
            root: root.clone(),
            images: cache.images(),
            stats: cache.stats(),
        })
    };

    ImageCache::scope(&cache_dir, &root, extractor, populate)
}

/// Render `gallery` to a kept temporary HTML file and return its path.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn render_gallery(gallery: &Gallery, static_dir: &Path) -> Result<PathBuf> {
    let page = GalleryPage::new(&gallery.root, &gallery.images, static_dir);
    let html = page.to_html().context("Failed to render gallery page")?;
    let path = write_temp_html(&html).context("Failed to write gallery page")?;
    Ok(path)
}

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns any error that aborts the run; `main` maps it to an exit code
/// with [`ExitCode::from_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler()?;
    let progress = Progress::new(cli.quiet);

    let options = GalleryOptions {
        root: cli.root.clone(),
        cache_dir: config.resolved_cache_dir(),
        walker: WalkerConfig::new(config.follow_symlinks, config.skip_hidden),
    };

    let gallery = build_gallery(
        &options,
        Box::new(DominantTint::default()),
        &shutdown,
        &progress,
    )?;
    log::debug!(
        "{} images ({} reused, {} computed)",
        gallery.images.len(),
        gallery.stats.hits,
        gallery.stats.misses
    );

    let page = render_gallery(&gallery, &config.resolved_static_dir())?;

    if config.open_browser {
        open_in_browser(&page).context("Failed to open the gallery in a browser")?;
        log::info!("Opened {}", page.display());
    } else {
        println!("{}", page.display());
    }

    Ok(ExitCode::Success)
}
