//! # Output Value Model
//!
//! This module defines the in-memory representation of the translated YAML
//! document. Handlers build `Value`s; the writer renders them.
//!
//! ## Key Components
//!
//! - **`Value`**: a string, a native boolean, an insertion-ordered mapping,
//!   or a sequence. Numeric settings stay strings; the writer never turns a
//!   numeric-looking string into a number the engine did not coerce.
//! - **`Scope`**: one level of the output document, an ordered sequence of
//!   `(key, value)` entries. Entry order equals source-encounter order.
//! - **Fallback codec** (`Value::raw_xml`): wraps the verbatim XML text of
//!   an unsupported subtree as `{"raw": {"xml": <text>}}` so nothing is
//!   ever silently dropped.
//! - **Text coercion** (`Value::from_text`): the one policy applied
//!   everywhere element text becomes a value.

use indexmap::IndexMap;

/// An insertion-ordered mapping of output entries.
pub type Map = IndexMap<String, Value>;

/// One level of the output document: an ordered sequence of entries.
pub type Scope = Vec<(String, Value)>;

/// A translated output value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Literal text, including integer-valued settings kept as strings.
    String(String),
    /// A native boolean; the writer emits it unquoted.
    Bool(bool),
    /// An ordered sequence of values.
    Seq(Vec<Value>),
    /// An insertion-ordered mapping.
    Map(Map),
}

impl Value {
    /// Coerce element text into a value.
    ///
    /// - missing or empty text becomes the empty string, never a null, so
    ///   "blank" serializes unambiguously;
    /// - text exactly `true`/`false` becomes a native boolean;
    /// - anything else is kept verbatim, whitespace untouched.
    pub fn from_text(text: Option<&str>) -> Value {
        match text {
            None | Some("") => Value::String(String::new()),
            Some("true") => Value::Bool(true),
            Some("false") => Value::Bool(false),
            Some(other) => Value::String(other.to_string()),
        }
    }

    /// Wrap a verbatim XML serialization as an opaque fallback value:
    /// `{"raw": {"xml": <text>}}`.
    ///
    /// The text must reproduce the source subtree exactly as captured,
    /// including the element's own tag and attributes, so operators can
    /// hand-finish those spots without information loss. This codec always
    /// succeeds.
    pub fn raw_xml(xml: impl Into<String>) -> Value {
        let mut inner = Map::new();
        inner.insert("xml".to_string(), Value::String(xml.into()));
        let mut outer = Map::new();
        outer.insert("raw".to_string(), Value::Map(inner));
        Value::Map(outer)
    }

    /// Build a single-key mapping, the `{label: settings}` shape every
    /// subsystem item uses.
    pub fn labeled(label: impl Into<String>, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(label.into(), value);
        Value::Map(map)
    }

    /// Build a string value.
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    /// Returns the inner mapping if this value is a map.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the inner sequence if this value is one.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// True if this value is a fallback block produced by [`Value::raw_xml`].
    pub fn is_raw(&self) -> bool {
        self.as_map()
            .is_some_and(|map| map.len() == 1 && map.contains_key("raw"))
    }

    /// The verbatim XML text of a fallback block, if this is one.
    pub fn raw_text(&self) -> Option<&str> {
        let inner = self.as_map()?.get("raw")?.as_map()?;
        match inner.get("xml")? {
            Value::String(xml) => Some(xml),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}
