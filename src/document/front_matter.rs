//! Front matter splitting, parsing, and rendering.
//!
//! ```text
//! ---                 ┐
//! title: Hello        │ front matter (YAML)
//! date: 2024-05-01    │
//! ---                 ┘
//! # Hello             ┐
//!                     │ body (markdown)
//! Some text.          ┘
//! ```

use crate::{error::EditorError, log};
use serde_yaml::{Mapping, Value};

/// Fence line around the front matter block.
pub const FENCE: &str = "---";

/// Front matter supplied with a save, in exactly one of two modes.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontMatter {
    /// Text the user edited directly; written back verbatim.
    Raw(String),
    /// Fields to serialize as YAML.
    Structured(Mapping),
}

impl FrontMatter {
    fn is_empty(&self) -> bool {
        match self {
            Self::Raw(raw) => raw.is_empty(),
            Self::Structured(map) => map.is_empty(),
        }
    }
}

/// Split raw page text into `(front_matter_raw, body)`.
///
/// Both parts are trimmed. Text without a leading fence, or with no closing
/// fence, is all body.
pub fn split(raw: &str) -> (&str, &str) {
    if let Some(rest) = raw.strip_prefix(FENCE)
        && let Some(end) = rest.find(FENCE)
    {
        let front_matter = rest[..end].trim();
        let body = rest[end + FENCE.len()..].trim();
        return (front_matter, body);
    }
    ("", raw)
}

/// Parse front matter YAML into a mapping.
///
/// Fails soft: malformed or non-mapping front matter yields an empty mapping
/// so the body can still be loaded.
pub fn parse(front_matter_raw: &str) -> Mapping {
    if front_matter_raw.trim().is_empty() {
        return Mapping::new();
    }
    match serde_yaml::from_str::<Value>(front_matter_raw) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            let err = EditorError::ParseFailure("front matter is not a mapping".into());
            log!("front-matter"; "{err}");
            Mapping::new()
        }
        Err(e) => {
            let err = EditorError::ParseFailure(e.to_string());
            log!("front-matter"; "{err}");
            Mapping::new()
        }
    }
}

/// Render a page from front matter and body.
///
/// Empty front matter renders the body alone. Raw text is emitted exactly
/// as given.
///
/// # Errors
///
/// Structured front matter that cannot be serialized.
pub fn render(front_matter: &FrontMatter, body: &str) -> Result<String, EditorError> {
    if front_matter.is_empty() {
        return Ok(body.to_owned());
    }
    let block = match front_matter {
        FrontMatter::Raw(raw) => raw.clone(),
        FrontMatter::Structured(map) => serde_yaml::to_string(map)?.trim_end().to_owned(),
    };
    Ok(format!("{FENCE}\n{block}\n{FENCE}\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        assert_eq!(split("---\ntitle: X\n---\nBody"), ("title: X", "Body"));
    }

    #[test]
    fn test_split_trims_parts() {
        let raw = "---\n\ntitle: X\ndate: 2024-01-01\n\n---\n\n# Heading\n\ntext\n";
        assert_eq!(split(raw), ("title: X\ndate: 2024-01-01", "# Heading\n\ntext"));
    }

    #[test]
    fn test_split_without_fence() {
        let raw = "# Just markdown\n---\nnot front matter";
        assert_eq!(split(raw), ("", raw));
    }

    #[test]
    fn test_split_unclosed_fence() {
        let raw = "---\ntitle: X\nno closing";
        assert_eq!(split(raw), ("", raw));
    }

    #[test]
    fn test_split_empty_block() {
        assert_eq!(split("------\nBody"), ("", "Body"));
    }

    #[test]
    fn test_parse_mapping() {
        let map = parse("title: Hello\npublished: true");
        assert_eq!(map.get("title"), Some(&Value::from("Hello")));
        assert_eq!(map.get("published"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_parse_fails_soft() {
        assert!(parse("title: [unclosed").is_empty());
        assert!(parse("- a\n- b").is_empty());
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_render_raw() {
        let fm = FrontMatter::Raw("title: X\ncustom:  kept as typed".into());
        assert_eq!(
            render(&fm, "Body").unwrap(),
            "---\ntitle: X\ncustom:  kept as typed\n---\nBody"
        );
    }

    #[test]
    fn test_render_raw_is_verbatim() {
        let fm = FrontMatter::Raw("title: X\n".into());
        assert_eq!(render(&fm, "Body").unwrap(), "---\ntitle: X\n\n---\nBody");

        let fm = FrontMatter::Raw("  ".into());
        assert_eq!(render(&fm, "Body").unwrap(), "---\n  \n---\nBody");
    }

    #[test]
    fn test_render_structured() {
        let mut map = Mapping::new();
        map.insert("title".into(), "Hello".into());
        map.insert("date".into(), "2024-05-01".into());
        map.insert("published".into(), true.into());
        let fm = FrontMatter::Structured(map);
        assert_eq!(
            render(&fm, "# Hello").unwrap(),
            "---\ntitle: Hello\ndate: 2024-05-01\npublished: true\n---\n# Hello"
        );
    }

    #[test]
    fn test_render_empty_front_matter() {
        assert_eq!(render(&FrontMatter::Raw(String::new()), "Body").unwrap(), "Body");
        assert_eq!(
            render(&FrontMatter::Structured(Mapping::new()), "Body").unwrap(),
            "Body"
        );
    }

    #[test]
    fn test_render_then_split() {
        let fm = FrontMatter::Raw("title: X".into());
        let text = render(&fm, "Body text").unwrap();
        assert_eq!(split(&text), ("title: X", "Body text"));
    }
}
