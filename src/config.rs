//! Configuration management for subtidy.
//!
//! This module provides the [`Config`] struct which controls the rendered
//! layout. Configuration can be loaded from:
//! - TOML files (`subtidy.toml`)
//! - CLI arguments (which override file settings)
//! - In-file directives (`# subtidy: --indent 4`)
//!
//! Config files are auto-discovered by searching parent directories from the
//! file being formatted up to the filesystem root, plus the user's home
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["subtidy.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    // Try HOME environment variable first (works on Unix and some Windows setups)
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_indent() -> usize {
    4
}
fn default_spacing() -> usize {
    2
}
fn default_width() -> usize {
    120
}

/// Layout configuration for subtidy
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of spaces per nesting level (1-8, default: 4)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Number of spaces after a comma (1-8, default: 2)
    #[serde(default = "default_spacing")]
    pub spacing: usize,

    /// Soft maximum output line length (60-800, default: 120)
    #[serde(default = "default_width")]
    pub width: usize,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub indent: Option<usize>,
    pub spacing: Option<usize>,
    pub width: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: 4,
            spacing: 2,
            width: 120,
        }
    }
}

impl Config {
    /// Minimum indent size
    const MIN_INDENT: usize = 1;
    /// Maximum indent size
    const MAX_INDENT: usize = 8;
    /// Minimum spacing after a comma
    const MIN_SPACING: usize = 1;
    /// Maximum spacing after a comma
    const MAX_SPACING: usize = 8;
    /// Minimum output width
    const MIN_WIDTH: usize = 60;
    /// Maximum output width
    const MAX_WIDTH: usize = 800;

    /// Validate configuration values are within range
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent < Self::MIN_INDENT || self.indent > Self::MAX_INDENT {
            return Some(format!(
                "indent {} outside range {} to {}",
                self.indent,
                Self::MIN_INDENT,
                Self::MAX_INDENT
            ));
        }
        if self.spacing < Self::MIN_SPACING || self.spacing > Self::MAX_SPACING {
            return Some(format!(
                "spacing {} outside range {} to {}",
                self.spacing,
                Self::MIN_SPACING,
                Self::MAX_SPACING
            ));
        }
        if self.width < Self::MIN_WIDTH || self.width > Self::MAX_WIDTH {
            return Some(format!(
                "width {} outside range {} to {}",
                self.width,
                Self::MIN_WIDTH,
                Self::MAX_WIDTH
            ));
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.indent {
            self.indent = v;
        }
        if let Some(v) = partial.spacing {
            self.spacing = v;
        }
        if let Some(v) = partial.width {
            self.width = v;
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home
    /// directory config. Returns config file paths in order of priority
    /// (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Add home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        // Start from the file's parent directory (or the path itself if it's a directory)
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            // Path doesn't exist, use current directory
            std::env::current_dir().ok()
        };

        // Collect config files from parent directories (from root to current)
        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Reverse so we go from root to current (less specific to more specific)
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let config_files = Self::discover_config_files(start_path);

        if config_files.is_empty() {
            return Self::default();
        }

        let mut config = Self::default();
        for path in &config_files {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
