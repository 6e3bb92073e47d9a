//! Writing the generated page to disk and opening it.
//!
//! The page goes to a fresh temporary file that outlives the process, since
//! the browser reads it after we exit.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::html::file_url;
use super::OutputError;

/// Write `html` to a new temporary `.html` file and return its path.
///
/// # Errors
///
/// Returns an error if the file cannot be created, written or kept.
pub fn write_temp_html(html: &str) -> Result<PathBuf, OutputError> {
    let mut file = tempfile::Builder::new()
        .prefix("rustgallery-")
        .suffix(".html")
        .tempfile()?;
    file.write_all(html.as_bytes())?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| OutputError::Io(e.error))?;
    log::debug!("Wrote gallery page to {}", path.display());
    Ok(path)
}

/// The platform command used to open a URL with the default handler.
fn opener(url: &str) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        command
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

/// Open `path` in the host's default browser.
///
/// The launcher is spawned and not waited for.
///
/// # Errors
///
/// Returns an error if the launcher cannot be started.
pub fn open_in_browser(path: &Path) -> Result<(), OutputError> {
    let url = file_url(path);
    let mut command = opener(&url);
    log::debug!("Opening {} with {:?}", url, command.get_program());

    command.spawn().map_err(|source| OutputError::Launch {
        program: command.get_program().to_string_lossy().into_owned(),
        source,
    })?;
    Ok(())
}
