//! `[build]` section configuration.
//!
//! Describes the external site generator run after every save.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in editor.toml - rebuild trigger configuration.
///
/// # Example
/// ```toml
/// [build]
/// command = ["composer", "exec", "cecil", "build"]
/// output = "_site"   # Where the generator writes
/// publish = "docs"   # Where the output is moved after a successful build
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Run the generator after saves and deletes.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Generator command and arguments, run in the project root.
    #[serde(default = "defaults::build::command")]
    #[educe(Default = defaults::build::command())]
    pub command: Vec<String>,

    /// Directory the generator writes to.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory the output is relocated to after a successful build.
    #[serde(default = "defaults::build::publish")]
    #[educe(Default = defaults::build::publish())]
    pub publish: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::super::EditorConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: EditorConfig = toml::from_str("").unwrap();

        assert!(config.build.enable);
        assert_eq!(config.build.command, vec!["composer", "exec", "cecil", "build"]);
        assert_eq!(config.build.output, PathBuf::from("_site"));
        assert_eq!(config.build.publish, PathBuf::from("docs"));
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            enable = false
            command = ["zola", "build"]
            output = "public"
            publish = "site"
        "#;
        let config: EditorConfig = toml::from_str(config).unwrap();

        assert!(!config.build.enable);
        assert_eq!(config.build.command, vec!["zola", "build"]);
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.publish, PathBuf::from("site"));
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [build]
            minify = true
        "#;
        assert!(toml::from_str::<EditorConfig>(config).is_err());
    }
}
