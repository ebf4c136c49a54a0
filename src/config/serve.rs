//! `[serve]` section configuration.
//!
//! Contains API server settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[serve]` section in editor.toml - API server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 3000
/// max_body = "10MB"      # Largest accepted request body
/// cors = true            # Allow the editor UI on another origin
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 3000).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Maximum request body size, with a `B`, `KB`, or `MB` suffix.
    #[serde(default = "defaults::serve::max_body")]
    #[educe(Default = defaults::serve::max_body())]
    pub max_body: String,

    /// Send `Access-Control-Allow-Origin: *` on every response.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub cors: bool,
}

#[cfg(test)]
mod tests {
    use super::super::EditorConfig;

    #[test]
    fn test_serve_config() {
        let config = r#"
            [serve]
            interface = "0.0.0.0"
            port = 8080
            max_body = "1MB"
            cors = false
        "#;
        let config: EditorConfig = toml::from_str(config).unwrap();

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.max_body, "1MB");
        assert!(!config.serve.cors);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config: EditorConfig = toml::from_str("").unwrap();

        assert_eq!(config.serve.interface, "127.0.0.1");
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.max_body, "10MB");
        assert!(config.serve.cors);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [serve]
            watch = true
        "#;
        let result: Result<EditorConfig, _> = toml::from_str(config);

        assert!(result.is_err());
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = r#"
            [serve]
            port = 4000
        "#;
        let config: EditorConfig = toml::from_str(config).unwrap();

        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.serve.interface, "127.0.0.1");
    }
}
