//! Markdown fields edited in an external text editor.
//!
//! Each [`ScratchWidget`] backs one markdown field with a file in a scratch
//! directory. Opening it runs `$VISUAL` (or `$EDITOR`) on that file and
//! reads the result back.

use super::command::prepare;
use crate::{document::FieldPath, log, session::MarkdownWidget};
use anyhow::{Context, Result, bail};
use std::{env, fs, path::PathBuf};

/// Used when neither `$VISUAL` nor `$EDITOR` is set.
const FALLBACK_EDITOR: &str = "vi";

/// Editor command plus the scratch directory its widgets live in.
///
/// The directory is removed when the editor is dropped.
#[derive(Debug)]
pub struct ExternalEditor {
    command: Vec<String>,
    dir: PathBuf,
}

impl ExternalEditor {
    /// Editor named by the environment, with a per-process scratch directory
    /// under the system temp dir.
    ///
    /// # Errors
    /// Returns error if the editor program is not installed.
    pub fn from_env() -> Result<Self> {
        let line = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_owned());
        let command: Vec<String> = line.split_whitespace().map(str::to_owned).collect();

        if let Some(program) = command.first() {
            which::which(program)
                .with_context(|| format!("`{program}` not found, set $VISUAL or $EDITOR"))?;
        }

        let dir = env::temp_dir().join(format!("pagedit-{}", std::process::id()));
        Self::new(command, dir)
    }

    pub fn new(command: Vec<String>, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create `{}`", dir.display()))?;
        Ok(Self { command, dir })
    }

    /// Widget for the `n`th markdown field of a session.
    pub fn widget(&self, n: usize, field: &FieldPath) -> ScratchWidget {
        let name: String = field
            .to_string()
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();

        ScratchWidget {
            file: self.dir.join(format!("{n}-{name}.md")),
            text: String::new(),
        }
    }

    /// Run the editor on the widget's file and take what it left there.
    ///
    /// # Errors
    /// Returns error if the editor cannot be spawned, exits non-zero, or the
    /// file cannot be read back. The widget keeps its old text then.
    pub fn edit(&self, widget: &mut ScratchWidget) -> Result<()> {
        let mut cmd = self.command.clone();
        cmd.push(widget.file.to_string_lossy().into_owned());
        let (name, mut command) = prepare(None, &cmd)?;

        let status = command
            .status()
            .with_context(|| format!("Failed to execute `{name}`"))?;
        if !status.success() {
            bail!("`{name}` exited with {status}");
        }

        let text = fs::read_to_string(&widget.file)
            .with_context(|| format!("Failed to read `{}`", widget.file.display()))?;

        // editors add a final newline on save
        widget.text = match text.strip_suffix('\n') {
            Some(stripped) if !widget.text.ends_with('\n') => stripped.to_owned(),
            _ => text,
        };
        Ok(())
    }
}

impl Drop for ExternalEditor {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// One markdown field, backed by a scratch file.
#[derive(Debug)]
pub struct ScratchWidget {
    file: PathBuf,
    text: String,
}

impl MarkdownWidget for ScratchWidget {
    fn set_content(&mut self, text: &str) {
        self.text = text.to_owned();
        if let Err(e) = fs::write(&self.file, text) {
            log!("edit"; "cannot write {}: {e}", self.file.display());
        }
    }

    fn content(&self) -> String {
        self.text.clone()
    }

    fn destroy(&mut self) {
        let _ = fs::remove_file(&self.file);
    }
}
