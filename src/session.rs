//! Edit session for one loaded document.
//!
//! A session is opened when a document is loaded and consumed when the
//! edited document is produced. Rich-text widgets for markdown fields live
//! in a [`WidgetSet`], which releases every widget it created whenever the
//! field set is rebuilt or the set is dropped.
//!
//! ```text
//! open(path, doc) ──► expand ──► fields
//!                                  │
//!      edit / edit_input ──────────┤ pending edits
//!      WidgetSet::collect ─────────┘
//!                                  │
//! finish() ◄──── collapse(doc, edits)
//! ```

use crate::{
    document::{
        Document, Edits, FieldDescriptor, FieldInput, FieldKind, FieldPath, coerce, collapse,
        expand, path,
    },
    error::{EditorError, Result},
};
use serde_yaml::Value;

/// Editing state scoped to one document.
#[derive(Debug)]
pub struct EditSession {
    doc_path: String,
    base: Document,
    fields: Vec<FieldDescriptor>,
    edits: Edits,
}

impl EditSession {
    pub fn open(doc_path: impl Into<String>, document: Document) -> Self {
        let fields = expand(&document);
        Self {
            doc_path: doc_path.into(),
            base: document,
            fields,
            edits: Edits::new(),
        }
    }

    pub fn doc_path(&self) -> &str {
        &self.doc_path
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, path: &FieldPath) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| &f.path == path)
    }

    pub fn is_dirty(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Record a new value for `path`. A later edit to the same path wins;
    /// a value equal to the loaded one drops any pending edit.
    ///
    /// The path is checked when the session is finished.
    pub fn edit(&mut self, field: FieldPath, value: Value) {
        if path::get(&self.base, &field) == Some(&value) {
            self.edits.remove(&field);
        } else {
            self.edits.insert(field, value);
        }
    }

    /// Record raw control input, coerced by the field's inferred kind.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidPath`] if no field lives at `path`;
    /// [`EditorError::ValidationFailure`] if the input does not fit the kind.
    pub fn edit_input(&mut self, path: &FieldPath, input: FieldInput) -> Result<()> {
        let kind = self
            .field(path)
            .map(|f| f.kind)
            .ok_or_else(|| EditorError::invalid_path(path, "no such field"))?;
        let value = coerce(kind, input)?;
        self.edit(path.clone(), value);
        Ok(())
    }

    /// Merge the contents of every live widget into the pending edits.
    pub fn apply_widgets<W: MarkdownWidget>(&mut self, widgets: &WidgetSet<W>) {
        for (field, value) in widgets.collect() {
            self.edit(field, value);
        }
    }

    /// Produce the edited document, ending the session.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidPath`] if an edit does not address a location
    /// inside the loaded document.
    pub fn finish(self) -> Result<Document> {
        collapse(&self.base, &self.edits)
    }
}

// ============================================================================
// Markdown Widgets
// ============================================================================

/// Opaque rich-text editing control.
pub trait MarkdownWidget {
    fn set_content(&mut self, text: &str);
    fn content(&self) -> String;
    /// Release the control. Called exactly once per widget.
    fn destroy(&mut self);
}

/// One widget per markdown field, keyed by field path.
pub struct WidgetSet<W: MarkdownWidget> {
    widgets: Vec<(FieldPath, W)>,
}

impl<W: MarkdownWidget> Default for WidgetSet<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: MarkdownWidget> WidgetSet<W> {
    pub const fn new() -> Self {
        Self {
            widgets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut W> {
        self.widgets
            .iter_mut()
            .find(|(p, _)| p == path)
            .map(|(_, widget)| widget)
    }

    /// Destroy every held widget, then create one per markdown field in
    /// `fields`, seeded with the field's current text.
    pub fn rebuild<F>(&mut self, fields: &[FieldDescriptor], mut factory: F)
    where
        F: FnMut(&FieldPath) -> W,
    {
        self.release();
        for field in fields.iter().filter(|f| f.kind == FieldKind::Markdown) {
            let mut widget = factory(&field.path);
            widget.set_content(&scalar_text(&field.value));
            self.widgets.push((field.path.clone(), widget));
        }
    }

    /// Current widget contents as edits.
    pub fn collect(&self) -> Edits {
        self.widgets
            .iter()
            .map(|(path, widget)| (path.clone(), Value::String(widget.content())))
            .collect()
    }

    fn release(&mut self) {
        for (_, mut widget) in self.widgets.drain(..) {
            widget.destroy();
        }
    }
}

impl<W: MarkdownWidget> Drop for WidgetSet<W> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Text shown in a widget for a scalar value.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    fn doc(yaml: &str) -> Document {
        serde_yaml::from_str(yaml).unwrap()
    }

    /// Widget that counts how often it was destroyed.
    struct FakeWidget {
        text: String,
        destroyed: Rc<Cell<usize>>,
    }

    impl MarkdownWidget for FakeWidget {
        fn set_content(&mut self, text: &str) {
            self.text = text.to_owned();
        }
        fn content(&self) -> String {
            self.text.clone()
        }
        fn destroy(&mut self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    fn factory(counter: &Rc<Cell<usize>>) -> impl FnMut(&FieldPath) -> FakeWidget + '_ {
        move |_| FakeWidget {
            text: String::new(),
            destroyed: Rc::clone(counter),
        }
    }

    const PROFILE: &str = "name: Ann\nbio: Writes code\nage: 30\nactive: false\n";

    #[test]
    fn test_open_expands_fields() {
        let session = EditSession::open("team.yml", doc(PROFILE));
        assert_eq!(session.doc_path(), "team.yml");
        assert_eq!(session.fields().len(), 4);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_finish_without_edits_is_identity() {
        let original = doc(PROFILE);
        let session = EditSession::open("team.yml", original.clone());
        assert_eq!(session.finish().unwrap(), original);
    }

    #[test]
    fn test_edit_input_coerces_by_kind() {
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        session
            .edit_input(&FieldPath::parse("age"), FieldInput::Text("31".into()))
            .unwrap();
        session
            .edit_input(&FieldPath::parse("active"), FieldInput::Checked(true))
            .unwrap();
        assert!(session.is_dirty());

        let edited = session.finish().unwrap();
        assert_eq!(edited, doc("name: Ann\nbio: Writes code\nage: 31\nactive: true\n"));
    }

    #[test]
    fn test_edit_input_rejects_unknown_field() {
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        let err = session
            .edit_input(&FieldPath::parse("missing"), FieldInput::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidPath { .. }));
    }

    #[test]
    fn test_edit_input_rejects_bad_number() {
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        let err = session
            .edit_input(&FieldPath::parse("age"), FieldInput::Text("old".into()))
            .unwrap_err();
        assert!(matches!(err, EditorError::ValidationFailure(_)));
    }

    #[test]
    fn test_unchanged_value_is_not_an_edit() {
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        session.edit(FieldPath::parse("name"), Value::from("Ann"));
        assert!(!session.is_dirty());

        session.edit(FieldPath::parse("name"), Value::from("Bo"));
        assert!(session.is_dirty());
        session.edit(FieldPath::parse("name"), Value::from("Ann"));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_untouched_widgets_leave_session_clean() {
        let destroyed = Rc::new(Cell::new(0));
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        let mut widgets = WidgetSet::new();
        widgets.rebuild(session.fields(), factory(&destroyed));

        session.apply_widgets(&widgets);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_finish_reports_bad_edit() {
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        session.edit(FieldPath::parse("name.first"), Value::from("x"));
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_widgets_created_for_markdown_fields() {
        let destroyed = Rc::new(Cell::new(0));
        let session = EditSession::open("team.yml", doc(PROFILE));
        let mut widgets = WidgetSet::new();
        widgets.rebuild(session.fields(), factory(&destroyed));

        assert_eq!(widgets.collect().len(), 1);
        let bio = widgets.get_mut(&FieldPath::parse("bio")).unwrap();
        assert_eq!(bio.content(), "Writes code");
    }

    #[test]
    fn test_rebuild_destroys_previous_widgets() {
        let destroyed = Rc::new(Cell::new(0));
        let session = EditSession::open("p.yml", doc("bio: a\nsummary: b\n"));
        let mut widgets = WidgetSet::new();

        widgets.rebuild(session.fields(), factory(&destroyed));
        assert_eq!(destroyed.get(), 0);
        widgets.rebuild(session.fields(), factory(&destroyed));
        assert_eq!(destroyed.get(), 2);
        assert_eq!(widgets.collect().len(), 2);

        drop(widgets);
        assert_eq!(destroyed.get(), 4);
    }

    #[test]
    fn test_widget_contents_become_edits() {
        let destroyed = Rc::new(Cell::new(0));
        let mut session = EditSession::open("team.yml", doc(PROFILE));
        let mut widgets = WidgetSet::new();
        widgets.rebuild(session.fields(), factory(&destroyed));

        widgets
            .get_mut(&FieldPath::parse("bio"))
            .unwrap()
            .set_content("Writes **Rust**");
        session.apply_widgets(&widgets);

        let edited = session.finish().unwrap();
        assert_eq!(edited["bio"], Value::from("Writes **Rust**"));
        assert_eq!(edited["name"], Value::from("Ann"));
    }
}
