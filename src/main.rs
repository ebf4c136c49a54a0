//! pagedit - a local content editor for static sites.

mod cli;
mod config;
mod document;
mod error;
mod logger;
mod rebuild;
mod serve;
mod session;
mod store;
mod utils;
mod workspace;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{EditorConfig, cfg, init_config};
use document::{FieldInput, FieldKind, FieldPath};
use rebuild::Rebuild;
use serve::serve_editor;
use session::{EditSession, WidgetSet};
use utils::editor::ExternalEditor;
use workspace::Workspace;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    init_config(load_config(cli)?);

    match &cli.command {
        Commands::Serve { .. } => serve_editor(),
        Commands::Build => build_once(),
        Commands::New { path } => new_page(path),
        Commands::Fields { path } => print_fields(path),
        Commands::Edit { path, set, open } => edit_data(path, set, open),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<EditorConfig> {
    let config = EditorConfig::load(cli)?;

    // Printing fields never runs the generator
    if !matches!(cli.command, Commands::Fields { .. }) {
        config.validate()?;
    }

    Ok(config)
}

/// Run the generator once, failing on a non-zero exit.
fn build_once() -> Result<()> {
    let report = Rebuild::from_config(&cfg()).run()?;
    if !report.console.is_empty() {
        log!("build"; "{}", report.console);
    }
    if report.relocated {
        log!("build"; "published to {}", cfg().build.publish.display());
    }
    Ok(())
}

fn new_page(name: &str) -> Result<()> {
    let (draft, outcome) = Workspace::from_config(&cfg()).create_page(name)?;
    log!("new"; "created {} ({})", draft.path, draft.title);
    if !outcome.rebuilt {
        log!("new"; "site was not rebuilt");
    }
    Ok(())
}

fn print_fields(path: &str) -> Result<()> {
    let fields = Workspace::from_config(&cfg()).fields(path)?;
    let width = fields
        .iter()
        .map(|f| f.path.to_string().len())
        .max()
        .unwrap_or(0);

    for field in fields {
        let marker = if field.ambiguous { " (ambiguous)" } else { "" };
        let value = if field.is_leaf() {
            format!(" = {}", preview(&field.value))
        } else {
            String::new()
        };
        println!(
            "{:<width$}  {:<8}  {}{marker}{value}",
            field.path.to_string(),
            field.kind,
            field.name
        );
    }
    Ok(())
}

/// First line of a value's YAML form.
fn preview(value: &document::Document) -> String {
    let text = serde_yaml::to_string(value).unwrap_or_default();
    let mut lines = text.trim().lines();
    let first = lines.next().unwrap_or_default();
    if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first.to_owned()
    }
}

/// Apply `FIELD=VALUE` assignments and external edits of markdown fields,
/// then save and rebuild.
fn edit_data(path: &str, assignments: &[String], open: &[String]) -> Result<()> {
    let workspace = Workspace::from_config(&cfg());
    let mut session = workspace.open_data(path)?;

    for assignment in assignments {
        let (field, text) = assignment
            .split_once('=')
            .with_context(|| format!("expected FIELD=VALUE, got `{assignment}`"))?;
        let field = FieldPath::parse(field);
        let input = cli_input(&session, &field, text)?;
        session.edit_input(&field, input)?;
    }

    if !open.is_empty() {
        let editor = ExternalEditor::from_env()?;
        let mut widgets = WidgetSet::new();
        let mut count = 0;
        widgets.rebuild(session.fields(), |field| {
            count += 1;
            editor.widget(count, field)
        });
        if widgets.is_empty() {
            anyhow::bail!("{path} has no markdown fields");
        }

        for dotted in open {
            let widget = widgets
                .get_mut(&FieldPath::parse(dotted))
                .with_context(|| format!("`{dotted}` is not a markdown field"))?;
            editor.edit(widget)?;
        }
        session.apply_widgets(&widgets);
    }

    if !session.is_dirty() {
        log!("edit"; "no changes to {path}");
        return Ok(());
    }

    let outcome = workspace.save_session(session)?;
    log!("edit"; "{} ({path})", outcome.message);
    if !outcome.rebuilt {
        log!("edit"; "site was not rebuilt");
    }
    Ok(())
}

/// Boolean fields take `true`/`false` as checkbox state; everything else is
/// typed text.
fn cli_input(session: &EditSession, field: &FieldPath, text: &str) -> Result<FieldInput> {
    match session.field(field) {
        Some(descriptor) if descriptor.kind == FieldKind::Boolean => {
            let checked = text
                .parse()
                .with_context(|| format!("`{field}` takes `true` or `false`"))?;
            Ok(FieldInput::Checked(checked))
        }
        _ => Ok(FieldInput::Text(text.to_owned())),
    }
}
