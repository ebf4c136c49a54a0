//! `[paths]` section configuration.
//!
//! Locations of the two document roots, relative to the project root until
//! [`EditorConfig::update_with_cli`](super::EditorConfig::update_with_cli)
//! makes them absolute.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[paths]` section in editor.toml.
///
/// # Example
/// ```toml
/// [paths]
/// pages = "pages"   # Markdown pages (*.md)
/// data = "data"     # YAML data files (*.yml, *.yaml)
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::paths::root")]
    #[educe(Default = defaults::paths::root())]
    pub root: Option<PathBuf>,

    /// Pages root.
    #[serde(default = "defaults::paths::pages")]
    #[educe(Default = defaults::paths::pages())]
    pub pages: PathBuf,

    /// Data files root.
    #[serde(default = "defaults::paths::data")]
    #[educe(Default = defaults::paths::data())]
    pub data: PathBuf,
}
