//! External command execution.
//!
//! Runs the site generator and captures its console output. A non-zero exit
//! is not an error here: callers decide what a failed build means.

use crate::log;
use anyhow::{Context, Result};
use std::{
    path::Path,
    process::{Command, Output},
};

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Program name (first element of the command).
    pub name: String,
    /// Exit status was zero.
    pub success: bool,
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    /// Combined stdout and stderr, noise filtered, trimmed.
    pub console: String,
}

/// Run `cmd` (program followed by its arguments) in `root` and wait for it.
///
/// # Errors
/// Returns error if the command is empty or cannot be spawned.
pub fn run(root: Option<&Path>, cmd: &[String]) -> Result<CommandOutput> {
    let (name, mut command) = prepare(root, cmd)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    Ok(collect_output(name, &output))
}

/// Prepare a Command from components.
pub(crate) fn prepare(root: Option<&Path>, cmd: &[String]) -> Result<(String, Command)> {
    let (program, args) = cmd.split_first().context("Empty command")?;

    let mut command = Command::new(program);
    command.args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((program.clone(), command))
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for generator output noise.
///
/// Matches lines that start with a prefix AND contain all required keywords.
struct FilterRule {
    /// Line must start with one of these (case-insensitive, after trim).
    starts_with: &'static [&'static str],
    /// Line must also contain ALL of these keywords (case-insensitive).
    contains: &'static [&'static str],
}

impl FilterRule {
    const fn new(starts_with: &'static [&'static str], contains: &'static [&'static str]) -> Self {
        Self { starts_with, contains }
    }

    fn matches(&self, line: &str) -> bool {
        let lower = line.trim().to_ascii_lowercase();
        let has_prefix = self.starts_with.is_empty()
            || self.starts_with.iter().any(|p| lower.starts_with(p));
        let has_keywords = self.contains.iter().all(|kw| lower.contains(kw));
        has_prefix && has_keywords
    }
}

/// Lines dropped from the console.
///
/// Composer example:
///   Deprecation Notice: Return type of ... should be compatible with ...
///   PHP Deprecated:  Creation of dynamic property ...
const NOISE: &[FilterRule] = &[
    FilterRule::new(&["deprecation notice:"], &[]),
    FilterRule::new(&["php deprecated:"], &[]),
];

fn is_noise(line: &str) -> bool {
    line.trim().is_empty() || NOISE.iter().any(|r| r.matches(line))
}

/// Keep the lines worth showing from one output stream.
fn filter_stream(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|line| !is_noise(line))
        .map(|line| line.trim_end().to_owned())
        .collect()
}

/// Build the captured result and log a failed run.
fn collect_output(name: String, output: &Output) -> CommandOutput {
    let mut lines = filter_stream(&output.stdout);
    lines.extend(filter_stream(&output.stderr));
    let console = lines.join("\n");

    let success = output.status.success();
    if !success {
        log!(&name; "exited with {}", output.status);
        if !console.is_empty() {
            log!(&name; "{console}");
        }
    }

    CommandOutput {
        name,
        success,
        code: output.status.code(),
        console,
    }
}

// ============================================================================
// Tests
// ============================================================================
