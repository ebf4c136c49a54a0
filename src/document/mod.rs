//! Nested document editing model.
//!
//! Documents are decoded YAML values (`serde_yaml::Value`): mappings keep
//! their insertion order, so a load/edit/save cycle writes keys back in the
//! order the author used.
//!
//! | Module         | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `path`         | Typed field paths, dot-path `get`/`set`        |
//! | `infer`        | Field kind inference for rendering             |
//! | `fields`       | `expand` into descriptors, `collapse` edits    |
//! | `front_matter` | Split/parse/render page front matter           |

pub mod fields;
pub mod front_matter;
pub mod infer;
pub mod path;

pub use fields::{Edits, FieldDescriptor, FieldInput, coerce, collapse, expand};
pub use front_matter::FrontMatter;
pub use infer::FieldKind;
pub use path::FieldPath;

/// Decoded content of a data file or front matter block.
pub type Document = serde_yaml::Value;
