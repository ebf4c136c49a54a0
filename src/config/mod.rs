//! Editor configuration management for `editor.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[paths]`   | Project root, pages and data directories       |
//! | `[build]`   | External site generator and publish directory  |
//! | `[serve]`   | API server (interface, port, body limit, CORS) |
//!
//! # Example
//!
//! ```toml
//! [paths]
//! pages = "pages"
//! data = "data"
//!
//! [build]
//! command = ["composer", "exec", "cecil", "build"]
//! output = "_site"
//! publish = "docs"
//!
//! [serve]
//! port = 3000
//! ```

mod build;
pub mod defaults;
mod error;
mod handle;
mod paths;
mod serve;

pub use handle::{cfg, init_config};

use build::BuildConfig;
use error::ConfigError;
use paths::PathsConfig;
use serve::ServeConfig;

use crate::{
    cli::{Cli, Commands},
    store::{DocumentKind, DocumentRoot},
};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B (bytes), KB (kilobytes), MB (megabytes).
/// Case-insensitive for the suffix.
///
/// # Examples
/// ```ignore
/// parse_size_string("20KB") // → 20480
/// parse_size_string("10MB") // → 10485760
/// parse_size_string("100")  // → 100 (defaults to bytes)
/// ```
fn parse_size_string(s: &str) -> usize {
    let s = s.to_uppercase();
    let (multiplier, suffix_len) = if s.ends_with("MB") {
        (1024 * 1024, 2)
    } else if s.ends_with("KB") {
        (1024, 2)
    } else if s.ends_with('B') {
        (1, 1)
    } else {
        (1, 0)
    };
    let value: usize = s[..s.len() - suffix_len].trim().parse().unwrap_or(0);
    multiplier * value
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing editor.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Document roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Rebuild settings
    #[serde(default)]
    pub build: BuildConfig,

    /// API server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl EditorConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).with_context(|| format!("in `{}`", path.display()))
    }

    /// Load the config named by the CLI, falling back to defaults when the
    /// file does not exist, then apply CLI overrides.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().map_or_else(|| PathBuf::from("./"), expand_tilde);
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.paths.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.paths.root = Some(path.to_path_buf());
    }

    /// Maximum accepted request body in bytes.
    pub fn get_max_body(&self) -> usize {
        parse_size_string(&self.serve.max_body)
    }

    /// Root holding Markdown pages.
    pub fn pages_root(&self) -> DocumentRoot {
        DocumentRoot::new(DocumentKind::Pages, &self.paths.pages)
    }

    /// Root holding YAML data files.
    pub fn data_root(&self) -> DocumentRoot {
        DocumentRoot::new(DocumentKind::Data, &self.paths.data)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        let root = cli
            .root
            .as_deref()
            .map_or_else(|| self.get_root().to_owned(), expand_tilde);

        Self::update_option(&mut self.paths.pages, cli.pages.as_ref());
        Self::update_option(&mut self.paths.data, cli.data.as_ref());
        self.update_path_with_root(&root, &cli.config);

        self.serve.max_body = self.serve.max_body.to_uppercase();

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths against the root directory and make them absolute
    fn update_path_with_root(&mut self, root: &Path, config: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config));
        self.paths.pages = Self::normalize_path(&root.join(&self.paths.pages));
        self.paths.data = Self::normalize_path(&root.join(&self.paths.data));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.publish = Self::normalize_path(&root.join(&self.build.publish));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let valid_size_suffixes = ["B", "KB", "MB"];
        if !valid_size_suffixes
            .iter()
            .any(|s| self.serve.max_body.ends_with(s))
        {
            bail!(ConfigError::Validation(
                "[serve.max_body] must end with B, KB, or MB".into()
            ));
        }

        if self.paths.pages == self.paths.data {
            bail!(ConfigError::Validation(
                "[paths.pages] and [paths.data] must be different directories".into()
            ));
        }

        if self.build.enable {
            Self::check_command_installed("[build.command]", &self.build.command)?;

            if self.build.publish == self.build.output {
                bail!(ConfigError::Validation(
                    "[build.publish] must differ from [build.output]".into()
                ));
            }
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        let Some(cmd) = command.first() else {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        };

        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

/// Expand a leading `~` in a CLI path.
fn expand_tilde(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

// ============================================================================
// Tests
// ============================================================================
