//! Field kind inference.
//!
//! Best-effort UI guidance, not a schema. Rules are checked in order and the
//! first match wins:
//!
//! | # | Condition                                           | Kind       |
//! |---|-----------------------------------------------------|------------|
//! | 1 | value is a sequence                                 | `array`    |
//! | 2 | value is a mapping                                  | `object`   |
//! | 3 | value is a boolean                                  | `boolean`  |
//! | 4 | value is a number                                   | `number`   |
//! | 5 | name is a known prose field (`content`, `bio`, ...) | `markdown` |
//! | 6 | string value looks like markdown                    | `markdown` |
//! | 7 | name mentions a link (`url`, `image`, `src`, ...)   | `url`      |
//! | 8 | anything else                                       | `text`     |

use super::path::untag;
use serde::Serialize;
use serde_yaml::Value;

/// Field names always edited as markdown (compared lowercase).
const MARKDOWN_NAMES: &[&str] = &[
    "content",
    "body",
    "description",
    "bio",
    "summary",
    "text",
    "excerpt",
    "message",
    "quote",
    "details",
    "about",
];

/// Substrings of field names holding links (compared lowercase).
const URL_NAME_PARTS: &[&str] = &["link", "url", "href", "image", "video", "src", "path"];

/// Substrings that mark a string value as markdown.
const MARKDOWN_MARKERS: &[&str] = &["\n\n", "**", "*", "[", "#"];

/// Strings longer than this containing a newline are treated as markdown.
const LONG_TEXT_LEN: usize = 100;

/// How a field should be rendered for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Array,
    Object,
    Boolean,
    Number,
    Markdown,
    Url,
    Text,
}

impl FieldKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Markdown => "markdown",
            Self::Url => "url",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classify a field from its name and current value.
pub fn infer(name: &str, value: &Value) -> FieldKind {
    let value = untag(value);
    match value {
        Value::Sequence(_) => return FieldKind::Array,
        Value::Mapping(_) => return FieldKind::Object,
        Value::Bool(_) => return FieldKind::Boolean,
        Value::Number(_) => return FieldKind::Number,
        _ => {}
    }

    let name = name.to_lowercase();
    if MARKDOWN_NAMES.contains(&name.as_str()) {
        return FieldKind::Markdown;
    }

    if let Value::String(text) = value
        && looks_like_markdown(text)
    {
        return FieldKind::Markdown;
    }

    if URL_NAME_PARTS.iter().any(|part| name.contains(part)) {
        return FieldKind::Url;
    }

    FieldKind::Text
}

fn looks_like_markdown(text: &str) -> bool {
    MARKDOWN_MARKERS.iter().any(|m| text.contains(m))
        || (text.len() > LONG_TEXT_LEN && text.contains('\n'))
}
