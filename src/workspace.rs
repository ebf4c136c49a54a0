//! Editing operations over the pages and data roots.
//!
//! Each operation is one sequential unit: resolve and check the path, read
//! or transform or write the document, then (for mutations) run the blocking
//! rebuild. A failed rebuild never undoes a write; it only shows up as
//! `rebuilt: false` in the outcome.

use crate::{
    config::EditorConfig,
    document::{
        Document, FieldDescriptor, FieldInput, FieldPath, FrontMatter, expand, front_matter,
    },
    error::{EditorError, Result},
    log,
    rebuild::Rebuild,
    session::EditSession,
    store::{DocumentRoot, path::check_relative},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

// ============================================================================
// Requests and Responses
// ============================================================================

/// A page split into its parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub markdown: String,
    pub front_matter: Mapping,
    pub front_matter_raw: String,
    pub path: String,
}

/// A decoded data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataView {
    pub data: Document,
    pub path: String,
}

/// Result of a save or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub message: String,
    pub rebuilt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Body of a page save. At most one front matter mode may be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePage {
    pub markdown: String,
    #[serde(default)]
    pub front_matter_raw: Option<String>,
    #[serde(default)]
    pub front_matter: Option<Mapping>,
}

impl SavePage {
    /// Resolve the front matter mode.
    ///
    /// # Errors
    ///
    /// [`EditorError::ValidationFailure`] if both modes are supplied.
    pub fn front_matter(&self) -> Result<FrontMatter> {
        match (&self.front_matter_raw, &self.front_matter) {
            (Some(_), Some(_)) => Err(EditorError::ValidationFailure(
                "supply either `frontMatterRaw` or `frontMatter`, not both".into(),
            )),
            (Some(raw), None) => Ok(FrontMatter::Raw(raw.clone())),
            (None, Some(map)) => Ok(FrontMatter::Structured(map.clone())),
            (None, None) => Ok(FrontMatter::Raw(String::new())),
        }
    }
}

/// Body of a data save: a full document, dotted-path edits, or both.
///
/// `inputs` carries raw control values (text or checkbox state), coerced by
/// each field's inferred kind before they are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveData {
    #[serde(default)]
    pub data: Option<Document>,
    #[serde(default)]
    pub edits: BTreeMap<String, Value>,
    #[serde(default)]
    pub inputs: BTreeMap<String, FieldInput>,
}

/// A new page that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    pub path: String,
    pub title: String,
    pub front_matter_raw: String,
    pub markdown: String,
}

impl PageDraft {
    /// Full page text as it would be written.
    pub fn render(&self) -> Result<String> {
        front_matter::render(&FrontMatter::Raw(self.front_matter_raw.clone()), &self.markdown)
    }
}

// ============================================================================
// Page Drafts
// ============================================================================

/// Placeholder body of a new page, after its heading.
const DRAFT_BODY: &str = "Start writing your content here...";

/// Draft a page named by a user-typed path such as `blog/first-post`, dated
/// today (UTC).
pub fn draft_page(name: &str) -> Result<PageDraft> {
    draft_page_on(name, Utc::now().date_naive())
}

/// Draft a page with an explicit date.
///
/// # Errors
///
/// [`EditorError::ValidationFailure`] for an empty name;
/// [`EditorError::AccessDenied`] for a name containing `..` or starting
/// with `/`.
pub fn draft_page_on(name: &str, date: NaiveDate) -> Result<PageDraft> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditorError::ValidationFailure(
            "page path is required, e.g. `about.md` or `blog/post.md`".into(),
        ));
    }
    if name.contains("..") || name.starts_with('/') {
        return Err(EditorError::AccessDenied(name.to_owned()));
    }

    let path = if name.ends_with(".md") {
        name.to_owned()
    } else {
        format!("{name}.md")
    };
    let title = title_from_path(&path);

    Ok(PageDraft {
        front_matter_raw: format!(
            "title: \"{title}\"\ndate: {}\npublished: true",
            date.format("%Y-%m-%d")
        ),
        markdown: format!("# {title}\n\n{DRAFT_BODY}"),
        title,
        path,
    })
}

/// `blog/my-first-post.md` → `My First Post`
fn title_from_path(path: &str) -> String {
    let stem = path.rsplit('/').next().unwrap_or(path);
    let stem = stem.strip_suffix(".md").unwrap_or(stem);

    let mut title = String::with_capacity(stem.len());
    let mut word_start = true;
    for c in stem.chars().map(|c| if c == '-' { ' ' } else { c }) {
        let is_word = c.is_alphanumeric() || c == '_';
        if word_start && is_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        word_start = !is_word;
    }
    title
}

// ============================================================================
// Workspace
// ============================================================================

/// The two document roots plus the rebuild trigger.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub pages: DocumentRoot,
    pub data: DocumentRoot,
    pub rebuild: Rebuild,
}

impl Workspace {
    pub const fn new(pages: DocumentRoot, data: DocumentRoot, rebuild: Rebuild) -> Self {
        Self {
            pages,
            data,
            rebuild,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            config.pages_root(),
            config.data_root(),
            Rebuild::from_config(config),
        )
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    pub fn list_pages(&self) -> Vec<String> {
        self.pages.list()
    }

    /// Read a page and split it into front matter and body.
    ///
    /// Malformed front matter parses as an empty mapping; the raw text is
    /// still returned so it can be fixed.
    pub fn get_page(&self, rel: &str) -> Result<PageView> {
        let raw = self.pages.read(rel)?;
        let (front_matter_raw, body) = front_matter::split(&raw);
        Ok(PageView {
            markdown: body.to_owned(),
            front_matter: front_matter::parse(front_matter_raw),
            front_matter_raw: front_matter_raw.to_owned(),
            path: rel.to_owned(),
        })
    }

    pub fn save_page(&self, rel: &str, request: &SavePage) -> Result<Outcome> {
        check_document(&self.pages, rel)?;
        let content = front_matter::render(&request.front_matter()?, &request.markdown)?;
        self.pages.write(rel, &content)?;
        log!("store"; "saved page {rel}");

        Ok(self.changed("Page saved successfully", Some(rel)))
    }

    pub fn delete_page(&self, rel: &str) -> Result<Outcome> {
        self.pages.delete(rel)?;
        log!("store"; "deleted page {rel}");
        Ok(self.changed("Page deleted successfully", None))
    }

    /// Write a fresh draft for `name`, refusing to replace an existing page.
    pub fn create_page(&self, name: &str) -> Result<(PageDraft, Outcome)> {
        let draft = draft_page(name)?;
        if self.pages.exists(&draft.path) {
            return Err(EditorError::ValidationFailure(format!(
                "page `{}` already exists",
                draft.path
            )));
        }
        self.pages.write(&draft.path, &draft.render()?)?;
        log!("store"; "created page {}", draft.path);

        let outcome = self.changed("Page created successfully", Some(&draft.path));
        Ok((draft, outcome))
    }

    // ------------------------------------------------------------------------
    // Data files
    // ------------------------------------------------------------------------

    pub fn list_data(&self) -> Vec<String> {
        self.data.list()
    }

    pub fn get_data(&self, rel: &str) -> Result<DataView> {
        Ok(DataView {
            data: self.read_document(rel)?,
            path: rel.to_owned(),
        })
    }

    /// Save a data file.
    ///
    /// `edits` and `inputs` are applied on top of `data` when given,
    /// otherwise on top of the stored file. Everything not edited is kept as
    /// is.
    pub fn save_data(&self, rel: &str, request: SaveData) -> Result<Outcome> {
        check_document(&self.data, rel)?;

        let SaveData { data, edits, inputs } = request;
        let mut session = match data {
            Some(document) => EditSession::open(rel, document),
            None if edits.is_empty() && inputs.is_empty() => {
                return Err(EditorError::ValidationFailure(
                    "request needs `data`, `edits`, `inputs`, or a combination".into(),
                ));
            }
            None => self.open_data(rel)?,
        };

        for (dotted, value) in edits {
            session.edit(FieldPath::parse(&dotted), value);
        }
        for (dotted, input) in inputs {
            session.edit_input(&FieldPath::parse(&dotted), input)?;
        }
        self.save_session(session)
    }

    /// Load a data file into a fresh edit session.
    pub fn open_data(&self, rel: &str) -> Result<EditSession> {
        Ok(EditSession::open(rel, editable(self.read_document(rel)?)))
    }

    /// Write the edited document of `session` back to its file.
    pub fn save_session(&self, session: EditSession) -> Result<Outcome> {
        let rel = session.doc_path().to_owned();
        check_document(&self.data, &rel)?;

        let document = session.finish()?;
        self.data.write(&rel, &serde_yaml::to_string(&document)?)?;
        log!("store"; "saved data {rel}");

        Ok(self.changed("Data file saved successfully", Some(&rel)))
    }

    pub fn delete_data(&self, rel: &str) -> Result<Outcome> {
        self.data.delete(rel)?;
        log!("store"; "deleted data {rel}");
        Ok(self.changed("Data file deleted successfully", None))
    }

    /// Editable fields of a data file, in document order.
    pub fn fields(&self, rel: &str) -> Result<Vec<FieldDescriptor>> {
        Ok(expand(&self.read_document(rel)?))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn read_document(&self, rel: &str) -> Result<Document> {
        let raw = self.data.read(rel)?;
        if raw.trim().is_empty() {
            return Ok(Document::Null);
        }
        Ok(serde_yaml::from_str(&raw)?)
    }

    fn changed(&self, message: &str, path: Option<&str>) -> Outcome {
        Outcome {
            message: message.to_owned(),
            rebuilt: self.rebuild.trigger(),
            path: path.map(ToOwned::to_owned),
        }
    }
}

/// An empty or null data file takes new top-level keys like an empty mapping.
fn editable(document: Document) -> Document {
    match document {
        Document::Null => Document::Mapping(Mapping::new()),
        other => other,
    }
}

/// Reject escaping paths, then paths with the wrong extension.
fn check_document(root: &DocumentRoot, rel: &str) -> Result<()> {
    check_relative(rel)?;
    if !root.kind.matches(rel) {
        return Err(EditorError::ValidationFailure(format!(
            "`{rel}` is not a {} ({})",
            root.kind.label(),
            root.kind.extensions().join(", ")
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
