//! Document store gateway.
//!
//! Lists, reads, writes, and deletes documents under one root directory.
//! Every relative path goes through [`path`] containment checks first.
//!
//! # Roots
//!
//! | Kind    | Extensions       | Pinned first |
//! |---------|------------------|--------------|
//! | `pages` | `.md`            | `index.md`   |
//! | `data`  | `.yml`, `.yaml`  | -            |

pub mod path;

use crate::error::{EditorError, Result};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

/// Suffix of the scratch file written before the atomic rename.
const TEMP_SUFFIX: &str = ".tmp";

/// Which kind of document a root holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Markdown pages with front matter.
    Pages,
    /// YAML data files.
    Data,
}

impl DocumentKind {
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Pages => &[".md"],
            Self::Data => &[".yml", ".yaml"],
        }
    }

    /// Entry listed before everything else, if present.
    pub const fn pinned(self) -> Option<&'static str> {
        match self {
            Self::Pages => Some("index.md"),
            Self::Data => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pages => "page",
            Self::Data => "data file",
        }
    }

    /// True if `rel` ends with one of this kind's extensions.
    pub fn matches(self, rel: &str) -> bool {
        self.extensions().iter().any(|ext| rel.ends_with(ext))
    }
}

/// A directory holding documents of one kind.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    pub kind: DocumentKind,
    pub dir: PathBuf,
}

impl DocumentRoot {
    pub fn new(kind: DocumentKind, dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            dir: dir.into(),
        }
    }

    /// List documents as `/`-separated paths relative to the root.
    ///
    /// Sorted lexicographically, with the kind's pinned entry first. A
    /// missing root lists as empty.
    pub fn list(&self) -> Vec<String> {
        let mut files = list(&self.dir, self.kind.extensions());
        if let Some(pinned) = self.kind.pinned() {
            sort_pinned_first(&mut files, pinned);
        }
        files
    }

    /// Read a document's raw text.
    pub fn read(&self, rel: &str) -> Result<String> {
        let target = path::resolve_existing(&self.dir, rel)?;
        fs::read_to_string(&target).map_err(|e| path::io_error(&target, rel, e))
    }

    /// Create or replace a document.
    ///
    /// Content goes to a sibling scratch file first and is renamed over the
    /// target, so readers never see a partial write.
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let target = path::resolve_for_write(&self.dir, rel)?;
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| EditorError::AccessDenied(rel.to_owned()))?;
        let scratch = target.with_file_name(format!(".{file_name}{TEMP_SUFFIX}"));

        fs::write(&scratch, content)
            .and_then(|()| fs::rename(&scratch, &target))
            .map_err(|e| {
                let _ = fs::remove_file(&scratch);
                EditorError::Io(target.clone(), e)
            })
    }

    /// Remove a document.
    pub fn delete(&self, rel: &str) -> Result<()> {
        let target = path::resolve_existing(&self.dir, rel)?;
        fs::remove_file(&target).map_err(|e| path::io_error(&target, rel, e))
    }

    /// True if a document exists at `rel` (and `rel` is inside the root).
    pub fn exists(&self, rel: &str) -> bool {
        path::resolve_existing(&self.dir, rel).is_ok()
    }
}

/// Recursively collect files under `root` ending with one of `extensions`.
pub fn list(root: &Path, extensions: &[&str]) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            extensions.iter().any(|ext| name.ends_with(ext))
        })
        .filter_map(|e| e.path().strip_prefix(root).ok().map(to_slash))
        .collect();
    files.sort();
    files
}

/// Move `pinned` to the front, keeping the rest in order.
fn sort_pinned_first(files: &mut [String], pinned: &str) {
    files.sort_by(|a, b| {
        (a != pinned)
            .cmp(&(b != pinned))
            .then_with(|| a.cmp(b))
    });
}

/// Join path components with `/` regardless of platform.
fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_list_pages_index_first() {
        let dir = TempDir::new().unwrap();
        for rel in ["zebra.md", "index.md", "about.md"] {
            touch(dir.path(), rel);
        }
        let root = DocumentRoot::new(DocumentKind::Pages, dir.path());
        assert_eq!(root.list(), vec!["index.md", "about.md", "zebra.md"]);
    }

    #[test]
    fn test_list_recursive_and_filtered() {
        let dir = TempDir::new().unwrap();
        for rel in ["blog/b.md", "blog/a.md", "notes.txt", "blog/index.md", "a.md"] {
            touch(dir.path(), rel);
        }
        let root = DocumentRoot::new(DocumentKind::Pages, dir.path());
        // only the exact top-level `index.md` is pinned
        assert_eq!(root.list(), vec!["a.md", "blog/a.md", "blog/b.md", "blog/index.md"]);
    }

    #[test]
    fn test_list_data_extensions() {
        let dir = TempDir::new().unwrap();
        for rel in ["team.yaml", "nav.yml", "index.md", "sub/menu.yml"] {
            touch(dir.path(), rel);
        }
        let root = DocumentRoot::new(DocumentKind::Data, dir.path());
        let files = root.list();
        assert_eq!(files, vec!["nav.yml", "sub/menu.yml", "team.yaml"]);
        assert!(files.iter().all(|f| !f.contains("..")));
    }

    #[test]
    fn test_list_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = DocumentRoot::new(DocumentKind::Data, dir.path().join("nope"));
        assert!(root.list().is_empty());
    }

    #[test]
    fn test_write_read_delete() {
        let dir = TempDir::new().unwrap();
        let root = DocumentRoot::new(DocumentKind::Pages, dir.path());

        root.write("blog/new.md", "hello").unwrap();
        assert_eq!(root.read("blog/new.md").unwrap(), "hello");

        root.write("blog/new.md", "again").unwrap();
        assert_eq!(root.read("blog/new.md").unwrap(), "again");
        assert_eq!(root.list(), vec!["blog/new.md"]);

        root.delete("blog/new.md").unwrap();
        assert!(!root.exists("blog/new.md"));
        assert!(matches!(root.delete("blog/new.md"), Err(EditorError::NotFound(_))));
        assert!(matches!(root.read("blog/new.md"), Err(EditorError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_write_leaves_no_scratch_file() {
        let dir = TempDir::new().unwrap();
        let root = DocumentRoot::new(DocumentKind::Pages, dir.path());
        root.write("a.md", "old").unwrap();

        // scratch name points into a missing directory, so writing it fails
        let scratch = dir.path().join(".a.md.tmp");
        std::os::unix::fs::symlink(dir.path().join("missing/x"), &scratch).unwrap();

        assert!(matches!(root.write("a.md", "new"), Err(EditorError::Io(..))));
        assert!(fs::symlink_metadata(&scratch).is_err());
        assert_eq!(root.read("a.md").unwrap(), "old");
    }

    #[test]
    fn test_traversal_rejected() {
        let parent = TempDir::new().unwrap();
        let pages = parent.path().join("pages");
        fs::create_dir(&pages).unwrap();
        fs::write(parent.path().join("secret.md"), "s").unwrap();
        let root = DocumentRoot::new(DocumentKind::Pages, &pages);

        for rel in ["../secret.md", "a/../../secret.md", "/etc/passwd"] {
            assert!(matches!(root.read(rel), Err(EditorError::AccessDenied(_))), "{rel}");
            assert!(matches!(root.write(rel, "x"), Err(EditorError::AccessDenied(_))), "{rel}");
            assert!(matches!(root.delete(rel), Err(EditorError::AccessDenied(_))), "{rel}");
        }
        assert_eq!(fs::read_to_string(parent.path().join("secret.md")).unwrap(), "s");
    }

    #[test]
    fn test_kind_matches() {
        assert!(DocumentKind::Pages.matches("a/b.md"));
        assert!(!DocumentKind::Pages.matches("a.yml"));
        assert!(DocumentKind::Data.matches("a.yaml"));
        assert!(DocumentKind::Data.matches("a.yml"));
    }
}
