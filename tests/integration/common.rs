use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb as Pixel, RgbImage};
use rustgallery::progress::ProgressCallback;
use rustgallery::tint::{Rgb, TintError, TintExtractor};

/// Write a solid-color PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, Pixel([40, 80, 120]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a 2x2 binary PPM.
pub fn write_ppm(path: &Path) {
    let mut data = b"P6\n2 2\n255\n".to_vec();
    data.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]);
    std::fs::write(path, data).unwrap();
}

/// Set a file's modification time to whole seconds since the epoch.
pub fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(secs, 0)).unwrap();
}

/// Extractor that returns a fixed color and counts its calls.
pub fn counting_extractor(color: Rgb) -> (Box<dyn TintExtractor>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let extractor = move |_: &Path| -> Result<Rgb, TintError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(color)
    };
    (Box::new(extractor), calls)
}

/// Extractor that fails on every call.
pub fn failing_extractor() -> Box<dyn TintExtractor> {
    Box::new(|path: &Path| -> Result<Rgb, TintError> {
        Err(TintError::Extraction {
            path: path.to_path_buf(),
            message: "extractor must not be called".to_string(),
        })
    })
}

/// Extractor that fails only for one file name.
pub fn failing_for(name: &'static str) -> Box<dyn TintExtractor> {
    Box::new(move |path: &Path| -> Result<Rgb, TintError> {
        if path.file_name().is_some_and(|n| n == name) {
            Err(TintError::Extraction {
                path: path.to_path_buf(),
                message: "broken".to_string(),
            })
        } else {
            Ok([0.0, 0.0, 0.0])
        }
    })
}

/// Progress callback that draws nothing.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}
    fn on_progress(&self, _current: usize, _path: &str) {}
    fn on_phase_end(&self, _phase: &str) {}
}

/// All files currently in `dir`.
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
