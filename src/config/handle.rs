//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads. The config is loaded once in `main`
//! and read by every request handler through [`cfg`].
//!
//! # Usage
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! let pages = c.pages_root();  // Arc auto-derefs to &EditorConfig
//! ```

use super::EditorConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
///
/// Initialized with the default config, then replaced with the loaded config
/// in `main`.
static CONFIG: LazyLock<ArcSwap<EditorConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(EditorConfig::default()));

/// Get current config as `Arc<EditorConfig>`.
///
/// Thread-safe and wait-free.
#[inline]
pub fn cfg() -> Arc<EditorConfig> {
    CONFIG.load_full()
}

/// Install the loaded config (called once at startup).
#[inline]
pub fn init_config(config: EditorConfig) {
    CONFIG.store(Arc::new(config));
}
