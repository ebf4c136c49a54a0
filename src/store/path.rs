//! Relative path validation and root containment.
//!
//! Two layers guard every store operation:
//!
//! 1. [`check_relative`] rejects suspicious input before any file system call
//!    (`..` segments, leading `/` or `\`, absolute paths).
//! 2. [`resolve_existing`] / [`resolve_for_write`] canonicalize the result,
//!    following symlinks, and require it to lie strictly inside the root.

use crate::error::{EditorError, Result};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

/// Reject relative paths that could leave their root.
///
/// # Errors
///
/// [`EditorError::AccessDenied`] for empty, absolute, or `..`-containing paths.
pub fn check_relative(rel: &str) -> Result<&Path> {
    let denied = || EditorError::AccessDenied(rel.to_owned());

    if rel.is_empty() || rel.starts_with('/') || rel.starts_with('\\') {
        return Err(denied());
    }
    // Backslash separators are not split on unix, so check them by hand.
    if rel.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(denied());
    }

    let path = Path::new(rel);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || path.is_absolute() {
        return Err(denied());
    }
    Ok(path)
}

/// Resolve `rel` to an existing file strictly inside `root`.
///
/// The returned path is `root/rel`, not the symlink-resolved target, so
/// deleting it removes the link rather than what it points to.
///
/// # Errors
///
/// - [`EditorError::AccessDenied`] if the path escapes `root`
/// - [`EditorError::NotFound`] if nothing exists at the path
pub fn resolve_existing(root: &Path, rel: &str) -> Result<PathBuf> {
    let relative = check_relative(rel)?;
    let root = canonical_root(root, rel)?;
    let target = root.join(relative);

    if fs::symlink_metadata(&target).is_err() {
        return Err(EditorError::NotFound(rel.to_owned()));
    }
    let resolved = target.canonicalize().map_err(|e| io_error(&target, rel, e))?;
    ensure_inside(&root, &resolved, rel)?;

    if resolved.is_dir() {
        return Err(EditorError::NotFound(rel.to_owned()));
    }
    Ok(target)
}

/// Resolve `rel` for writing, creating intermediate directories.
///
/// Containment is checked against the nearest existing ancestor before any
/// directory is created, then again once the parent exists.
///
/// # Errors
///
/// - [`EditorError::AccessDenied`] if the path escapes `root`
/// - [`EditorError::ValidationFailure`] if the target is a directory
/// - [`EditorError::Io`] if directories cannot be created
pub fn resolve_for_write(root: &Path, rel: &str) -> Result<PathBuf> {
    let relative = check_relative(rel)?;
    fs::create_dir_all(root).map_err(|e| EditorError::Io(root.to_path_buf(), e))?;
    let root = canonical_root(root, rel)?;
    let target = root.join(relative);
    let parent = target
        .parent()
        .ok_or_else(|| EditorError::AccessDenied(rel.to_owned()))?;

    if let Some(existing) = parent.ancestors().find(|p| p.exists()) {
        let resolved = existing.canonicalize().map_err(|e| io_error(existing, rel, e))?;
        ensure_inside_or_root(&root, &resolved, rel)?;
    }

    fs::create_dir_all(parent).map_err(|e| EditorError::Io(parent.to_path_buf(), e))?;
    let resolved = parent.canonicalize().map_err(|e| io_error(parent, rel, e))?;
    ensure_inside_or_root(&root, &resolved, rel)?;

    if target.exists() {
        let resolved = target.canonicalize().map_err(|e| io_error(&target, rel, e))?;
        ensure_inside(&root, &resolved, rel)?;
        if resolved.is_dir() {
            return Err(EditorError::ValidationFailure(format!("`{rel}` is a directory")));
        }
    }
    Ok(target)
}

fn canonical_root(root: &Path, rel: &str) -> Result<PathBuf> {
    root.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EditorError::NotFound(rel.to_owned()),
        _ => EditorError::Io(root.to_path_buf(), e),
    })
}

/// `resolved` must be below `root` and not `root` itself.
fn ensure_inside(root: &Path, resolved: &Path, rel: &str) -> Result<()> {
    if resolved.starts_with(root) && resolved != root {
        Ok(())
    } else {
        Err(EditorError::AccessDenied(rel.to_owned()))
    }
}

/// Like [`ensure_inside`], but directories may be the root itself.
fn ensure_inside_or_root(root: &Path, resolved: &Path, rel: &str) -> Result<()> {
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(EditorError::AccessDenied(rel.to_owned()))
    }
}

/// Map an IO error, treating `NotFound` as a missing document.
pub(super) fn io_error(path: &Path, rel: &str, err: io::Error) -> EditorError {
    match err.kind() {
        io::ErrorKind::NotFound => EditorError::NotFound(rel.to_owned()),
        _ => EditorError::Io(path.to_path_buf(), err),
    }
}
