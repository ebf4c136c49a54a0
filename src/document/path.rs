//! Field paths and dot-path access into documents.
//!
//! Paths are kept as typed segments internally and only joined with `.` at
//! the API boundary.
//!
//! # Dotted Encoding
//!
//! | Dotted       | Segments                               |
//! |--------------|----------------------------------------|
//! | `title`      | `[Key("title")]`                       |
//! | `tags.1`     | `[Key("tags"), Index(1)]`              |
//! | `0.links.2`  | `[Index(0), Key("links"), Index(2)]`   |
//!
//! A mapping key that itself contains `.` cannot round-trip through the
//! dotted form. Such paths report [`FieldPath::is_ambiguous`].

use crate::error::{EditorError, Result};
use serde::{Serialize, Serializer};
use serde_yaml::Value;
use std::fmt;

/// Separator used by the dotted encoding.
pub const SEPARATOR: char = '.';

// ============================================================================
// Segments
// ============================================================================

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Member of a mapping.
    Key(String),
    /// Element of a sequence.
    Index(usize),
}

impl Segment {
    /// Interpret this segment as a sequence index.
    ///
    /// A canonical decimal key is accepted, since dotted paths cannot tell
    /// `"0"` the key from `0` the index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(k) => canonical_index(k),
        }
    }

    /// Only canonical decimals (`0`, `7`, `12`) become indices; `007` stays
    /// a key so it prints and resolves as written.
    fn parse(raw: &str) -> Self {
        canonical_index(raw).map_or_else(|| Self::Key(raw.to_owned()), Self::Index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

fn canonical_index(s: &str) -> Option<usize> {
    let digits = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits && (s == "0" || !s.starts_with('0')) {
        s.parse().ok()
    } else {
        None
    }
}

// ============================================================================
// FieldPath
// ============================================================================

/// Location of a value inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub const fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Parse a dotted path. The empty string is the root path.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self {
            segments: dotted.split(SEPARATOR).map(Segment::parse).collect(),
        }
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Path to a mapping member below this one.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Key(key.into()));
        path
    }

    /// Path to a sequence element below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Index(index));
        path
    }

    /// True if some key contains the separator, so the dotted form of this
    /// path parses back to a different path.
    pub fn is_ambiguous(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Key(k) if k.contains(SEPARATOR)))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Look up the value at `path`.
///
/// Returns `None` when any step is missing or lands on a scalar. Never fails:
/// descriptors may be looked up speculatively.
pub fn get<'doc>(document: &'doc Value, path: &FieldPath) -> Option<&'doc Value> {
    path.segments
        .iter()
        .try_fold(document, |cursor, segment| step(cursor, segment))
}

/// Assign `value` at `path`.
///
/// Intermediate containers must already exist. On a mapping the final key is
/// replaced in place or appended; on a sequence the index is replaced, or
/// appended when it equals the length.
///
/// # Errors
///
/// [`EditorError::InvalidPath`] if the path is empty, an intermediate does
/// not resolve to a container, or the final index is out of range.
pub fn set(document: &mut Value, path: &FieldPath, value: Value) -> Result<()> {
    let Some((last, parents)) = path.segments.split_last() else {
        return Err(EditorError::invalid_path(path, "path is empty"));
    };

    let mut cursor = document;
    for (depth, segment) in parents.iter().enumerate() {
        cursor = step_mut(cursor, segment).ok_or_else(|| {
            let prefix: FieldPath = parents[..=depth].iter().cloned().collect();
            EditorError::invalid_path(path, format!("`{prefix}` does not resolve to a container"))
        })?;
    }

    match untag_mut(cursor) {
        Value::Mapping(map) => {
            let key = last.to_string();
            let slot = find_key(map, &key).cloned().unwrap_or(Value::String(key));
            map.insert(slot, value);
            Ok(())
        }
        Value::Sequence(seq) => {
            let index = last
                .as_index()
                .ok_or_else(|| EditorError::invalid_path(path, format!("`{last}` is not an index")))?;
            match index.cmp(&seq.len()) {
                std::cmp::Ordering::Less => seq[index] = value,
                std::cmp::Ordering::Equal => seq.push(value),
                std::cmp::Ordering::Greater => {
                    return Err(EditorError::invalid_path(
                        path,
                        format!("index {index} is out of range (length {})", seq.len()),
                    ));
                }
            }
            Ok(())
        }
        _ => Err(EditorError::invalid_path(path, "parent is not a container")),
    }
}

fn step<'doc>(cursor: &'doc Value, segment: &Segment) -> Option<&'doc Value> {
    match untag(cursor) {
        Value::Mapping(map) => {
            let key = find_key(map, &segment.to_string())?;
            map.get(key)
        }
        Value::Sequence(seq) => seq.get(segment.as_index()?),
        _ => None,
    }
}

fn step_mut<'doc>(cursor: &'doc mut Value, segment: &Segment) -> Option<&'doc mut Value> {
    match untag_mut(cursor) {
        Value::Mapping(map) => {
            let key = find_key(map, &segment.to_string())?.clone();
            map.get_mut(&key)
        }
        Value::Sequence(seq) => seq.get_mut(segment.as_index()?),
        _ => None,
    }
}

/// Find the mapping key addressed by `key`.
///
/// Non-string scalar keys (`1: a`, `true: b`) are matched by their string form.
fn find_key<'map>(map: &'map serde_yaml::Mapping, key: &str) -> Option<&'map Value> {
    map.keys().find(|k| key_text(k).as_deref() == Some(key))
}

/// String form of a mapping key, if it is a scalar.
pub fn key_text(key: &Value) -> Option<String> {
    match untag(key) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_owned()),
        _ => None,
    }
}

pub(crate) fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

pub(crate) fn untag_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Tagged(tagged) => untag_mut(&mut tagged.value),
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let path = FieldPath::parse("items.0.title");
        assert_eq!(
            path.segments,
            &[
                Segment::Key("items".into()),
                Segment::Index(0),
                Segment::Key("title".into())
            ]
        );
        assert_eq!(path.to_string(), "items.0.title");
        assert!(FieldPath::parse("").segments.is_empty());
    }

    #[test]
    fn test_builders() {
        let path = FieldPath::root().key("tags").index(3);
        assert_eq!(path.to_string(), "tags.3");
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.last(), Some(&Segment::Index(3)));
    }

    #[test]
    fn test_ambiguous_key() {
        let path = FieldPath::root().key("version.major");
        assert!(path.is_ambiguous());
        assert_ne!(FieldPath::parse(&path.to_string()), path);
        assert!(!FieldPath::parse("a.b").is_ambiguous());
    }

    #[test]
    fn test_get_nested() {
        let d = doc("title: A\nauthor:\n  name: Bo\ntags: [x, y]\n");
        assert_eq!(get(&d, &"title".into()), Some(&Value::from("A")));
        assert_eq!(get(&d, &"author.name".into()), Some(&Value::from("Bo")));
        assert_eq!(get(&d, &"tags.1".into()), Some(&Value::from("y")));
        assert_eq!(get(&d, &FieldPath::root()), Some(&d));
    }

    #[test]
    fn test_get_missing_is_none() {
        let d = doc("title: A\ntags: [x]\n");
        assert_eq!(get(&d, &"nope".into()), None);
        assert_eq!(get(&d, &"tags.5".into()), None);
        assert_eq!(get(&d, &"title.inner".into()), None);
        assert_eq!(get(&d, &"tags.x".into()), None);
    }

    #[test]
    fn test_get_root_sequence() {
        let d = doc("- name: a\n- name: b\n");
        assert_eq!(get(&d, &"1.name".into()), Some(&Value::from("b")));
    }

    #[test]
    fn test_get_numeric_key() {
        let d = doc("2024:\n  title: Year\n");
        assert_eq!(get(&d, &"2024.title".into()), Some(&Value::from("Year")));
    }

    #[test]
    fn test_set_replaces_leaf() {
        let mut d = doc("title: A\ntags: [x, y]\n");
        set(&mut d, &"tags.1".into(), "z".into()).unwrap();
        assert_eq!(d, doc("title: A\ntags: [x, z]\n"));
    }

    #[test]
    fn test_set_keeps_key_order() {
        let mut d = doc("a: 1\nb: 2\nc: 3\n");
        set(&mut d, &"b".into(), 20.into()).unwrap();
        let keys: Vec<_> = d.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        assert_eq!(d["b"], Value::from(20));
    }

    #[test]
    fn test_set_appends_new_key_and_index() {
        let mut d = doc("meta: {}\nlist: [1]\n");
        set(&mut d, &"meta.draft".into(), true.into()).unwrap();
        set(&mut d, &"list.1".into(), 2.into()).unwrap();
        assert_eq!(d, doc("meta: {draft: true}\nlist: [1, 2]\n"));
    }

    #[test]
    fn test_set_numeric_key_keeps_original_key() {
        let mut d = doc("2024: old\n");
        set(&mut d, &"2024".into(), "new".into()).unwrap();
        assert_eq!(d, doc("2024: new\n"));
    }

    #[test]
    fn test_leading_zero_stays_a_key() {
        let path = FieldPath::parse("months.01");
        assert_eq!(
            path.segments,
            &[Segment::Key("months".into()), Segment::Key("01".into())]
        );
        assert_eq!(path.to_string(), "months.01");
        assert_eq!(FieldPath::parse("0").segments, &[Segment::Index(0)]);

        let d = doc("\"007\": bond\nmonths:\n  \"01\": Jan\n  \"1\": one\n");
        assert_eq!(get(&d, &"007".into()), Some(&Value::from("bond")));
        assert_eq!(get(&d, &"months.01".into()), Some(&Value::from("Jan")));
        assert_eq!(get(&d, &"months.1".into()), Some(&Value::from("one")));

        // a padded number never indexes a sequence
        let list = doc("[a, b]\n");
        assert_eq!(get(&list, &"01".into()), None);
    }

    #[test]
    fn test_set_leading_zero_key_in_place() {
        let mut d = doc("months:\n  \"01\": Jan\n  \"02\": Feb\n");
        set(&mut d, &"months.01".into(), "January".into()).unwrap();
        assert_eq!(d, doc("months:\n  \"01\": January\n  \"02\": Feb\n"));
    }

    #[test]
    fn test_set_invalid_paths() {
        let mut d = doc("title: A\nlist: [1]\n");
        let before = d.clone();

        let err = set(&mut d, &FieldPath::root(), Value::Null).unwrap_err();
        assert!(matches!(err, EditorError::InvalidPath { .. }));

        // missing intermediate
        let err = set(&mut d, &"missing.child".into(), Value::Null).unwrap_err();
        assert!(err.to_string().contains("`missing`"));

        // scalar parent
        assert!(set(&mut d, &"title.sub".into(), Value::Null).is_err());

        // index past the end
        assert!(set(&mut d, &"list.5".into(), Value::Null).is_err());

        // key on a sequence
        assert!(set(&mut d, &"list.name".into(), Value::Null).is_err());

        assert_eq!(d, before);
    }
}
