//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. Environment variables prefixed with `RUSTGALLERY_`
//! 4. CLI flags (applied by [`Config::apply_cli`])

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "RUSTGALLERY_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the per-root cache files.
    pub cache_dir: Option<PathBuf>,
    /// Directory holding the page stylesheet.
    pub static_dir: Option<PathBuf>,
    /// Open the generated page in the default browser.
    pub open_browser: bool,
    /// Follow symbolic links while scanning.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories while scanning.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            static_dir: None,
            open_browser: true,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `config_file` must exist; the platform default file is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any layer fails to
    /// parse.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    log::debug!("Looking for config at {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Failed to load configuration")
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.cache_dir {
            self.cache_dir = Some(dir.clone());
        }
        if let Some(dir) = &cli.static_dir {
            self.static_dir = Some(dir.clone());
        }
        if cli.no_open {
            self.open_browser = false;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
    }

    /// Cache directory to use: configured, else the platform cache dir, else
    /// `.cache` in the current directory.
    #[must_use]
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".cache"))
    }

    /// Static asset directory to use: configured, else `static/` shipped
    /// next to the crate manifest.
    #[must_use]
    pub fn resolved_static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("static"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "rustgallery", "rustgallery")
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
