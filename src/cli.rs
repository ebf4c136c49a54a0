//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Local content editor for static sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: editor.toml)
    #[arg(short = 'C', long, default_value = "editor.toml")]
    pub config: PathBuf,

    /// Pages directory path (relative to project root)
    #[arg(long)]
    pub pages: Option<PathBuf>,

    /// Data directory path (relative to project root)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the editing API
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the site generator once and publish its output
    Build,

    /// Create a page from the default template, e.g. `blog/first-post`
    New {
        /// page path, relative to the pages directory
        path: String,
    },

    /// Print the editable fields of a data file
    Fields {
        /// data file path, relative to the data directory
        path: String,
    },

    /// Edit fields of a data file, then rebuild
    Edit {
        /// data file path, relative to the data directory
        path: String,

        /// `FIELD=VALUE` assignments, e.g. `hero.title=Welcome`
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// markdown field to open in $VISUAL or $EDITOR
        #[arg(short, long = "open", value_name = "FIELD")]
        open: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["pagedit", "--root", "site", "serve", "--port", "4000"]);
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert_eq!(cli.config, PathBuf::from("editor.toml"));
        match cli.command {
            Commands::Serve { port, interface } => {
                assert_eq!(port, Some(4000));
                assert!(interface.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_new() {
        let cli = Cli::parse_from(["pagedit", "new", "blog/first-post"]);
        assert!(matches!(cli.command, Commands::New { ref path } if path == "blog/first-post"));
    }

    #[test]
    fn test_parse_edit() {
        let cli = Cli::parse_from([
            "pagedit", "edit", "team.yml", "-s", "lead=Ann", "--set", "size=4", "-o", "bio",
        ]);
        match cli.command {
            Commands::Edit { path, set, open } => {
                assert_eq!(path, "team.yml");
                assert_eq!(set, vec!["lead=Ann", "size=4"]);
                assert_eq!(open, vec!["bio"]);
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from(["pagedit", "--pages", "p", "--data", "d", "-C", "x.toml", "build"]);
        assert_eq!(cli.pages, Some(PathBuf::from("p")));
        assert_eq!(cli.data, Some(PathBuf::from("d")));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(cli.command, Commands::Build));
    }
}
