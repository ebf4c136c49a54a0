//! Site rebuild trigger.
//!
//! After every save or delete the external generator runs once in the
//! project root. On success its output directory replaces the publish
//! directory.
//!
//! ```text
//! trigger()
//!     │
//!     ├── run `build.command` (blocking)   ──► non-zero exit: rebuilt = false
//!     │
//!     └── relocate()
//!             ├── remove `publish`
//!             └── rename `output` → `publish` ──► failure: warning only
//! ```

use crate::{
    config::EditorConfig,
    error::{EditorError, Result},
    log,
    utils::command,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Outcome of a generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Output was moved into the publish directory.
    pub relocated: bool,
    /// Filtered generator console output.
    pub console: String,
}

/// How to rebuild the site.
#[derive(Debug, Clone)]
pub struct Rebuild {
    pub enable: bool,
    pub command: Vec<String>,
    /// Working directory of the generator.
    pub root: PathBuf,
    pub output: PathBuf,
    pub publish: PathBuf,
}

impl Rebuild {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            enable: config.build.enable,
            command: config.build.command.clone(),
            root: config.get_root().to_owned(),
            output: config.build.output.clone(),
            publish: config.build.publish.clone(),
        }
    }

    /// A trigger that never runs anything.
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            enable: false,
            command: Vec::new(),
            root: PathBuf::new(),
            output: PathBuf::new(),
            publish: PathBuf::new(),
        }
    }

    /// Run the generator and relocate its output.
    ///
    /// Runs even when the trigger is disabled; callers that honour
    /// `enable` go through [`Rebuild::trigger`].
    ///
    /// # Errors
    ///
    /// [`EditorError::BuildFailure`] if the command cannot be spawned or
    /// exits non-zero. Relocation problems are not errors.
    pub fn run(&self) -> Result<RebuildReport> {
        log!("build"; "running `{}`", self.command.join(" "));

        let output = command::run(Some(&self.root), &self.command)
            .map_err(|err| EditorError::BuildFailure(format!("{err:#}")))?;

        if !output.success {
            let status = output
                .code
                .map_or_else(|| "signal".to_owned(), |code| format!("exit code {code}"));
            return Err(EditorError::BuildFailure(format!(
                "`{}` failed with {status}",
                output.name
            )));
        }

        let relocated = match relocate(&self.output, &self.publish) {
            Ok(()) => true,
            Err(err) => {
                log!("build"; "warning: could not publish output: {err}");
                false
            }
        };

        Ok(RebuildReport {
            relocated,
            console: output.console,
        })
    }

    /// Rebuild after a change and report whether the site was rebuilt.
    ///
    /// Failures are logged and never retried.
    pub fn trigger(&self) -> bool {
        if !self.enable {
            return false;
        }
        match self.run() {
            Ok(_) => {
                log!("build"; "site rebuilt");
                true
            }
            Err(err) => {
                log!("error"; "{err}");
                false
            }
        }
    }
}

/// Replace `publish` with `output`.
fn relocate(output: &Path, publish: &Path) -> Result<()> {
    if !output.is_dir() {
        return Err(EditorError::NotFound(output.display().to_string()));
    }
    if publish.exists() {
        fs::remove_dir_all(publish).map_err(|err| EditorError::Io(publish.to_path_buf(), err))?;
    }
    fs::rename(output, publish).map_err(|err| EditorError::Io(output.to_path_buf(), err))
}
