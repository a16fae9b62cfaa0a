//! Typed document tree for advisory records.
//!
//! Raw YAML is parsed with `serde_yaml` and immediately lowered into a small
//! tagged union ([`Node`]). Rules never inspect the YAML value directly; they go
//! through the accessors on [`Mapping`], which report a field as
//! [`Access::Found`], [`Access::Missing`] or [`Access::WrongType`] so that every
//! schema check is an explicit `match`.

use std::fmt;

use serde_yaml::Value;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure to turn raw text into an advisory document.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text is not well-formed YAML (including duplicate keys).
    #[error("{0}")]
    Syntax(#[from] serde_yaml::Error),

    /// The document parsed, but its root is not a mapping.
    #[error("expected a mapping at the document root, found {0}")]
    NotAMapping(&'static str),

    /// A mapping key is a sequence or mapping.
    #[error("unsupported non-scalar mapping key")]
    ComplexKey,
}

// ============================================================================
// Tree
// ============================================================================

/// One node of a parsed advisory document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

/// Insertion-ordered mapping with string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

/// Result of looking up a typed field in a [`Mapping`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access<'a, T> {
    /// The key exists and holds a value of the requested type.
    Found(T),
    /// The key does not exist.
    Missing,
    /// The key exists but holds something else.
    WrongType(&'a Node),
}

impl<'a, T> Access<'a, T> {
    /// Returns the value when found, `None` for missing or mistyped fields.
    pub fn found(self) -> Option<T> {
        match self {
            Access::Found(value) => Some(value),
            Access::Missing | Access::WrongType(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Access::Missing)
    }
}

impl Node {
    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    fn from_yaml(value: Value) -> Result<Self, ParseError> {
        Ok(match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Integer(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::String(s),
            Value::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .map(Node::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    entries.push((scalar_key(key)?, Node::from_yaml(value)?));
                }
                Node::Mapping(Mapping { entries })
            }
            // Custom tags carry no meaning for advisories; keep the payload.
            Value::Tagged(tagged) => Node::from_yaml(tagged.value)?,
        })
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("null"),
            Node::Bool(b) => write!(f, "{b}"),
            Node::Integer(i) => write!(f, "{i}"),
            Node::Float(x) => write!(f, "{x}"),
            Node::String(s) => f.write_str(s),
            Node::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Node::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn scalar_key(key: Value) -> Result<String, ParseError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => scalar_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(ParseError::ComplexKey),
    }
}

impl Mapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Raw node lookup.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn string(&self, key: &str) -> Access<'_, &str> {
        self.typed(key, Node::as_str)
    }

    pub fn sequence(&self, key: &str) -> Access<'_, &[Node]> {
        self.typed(key, Node::as_sequence)
    }

    pub fn mapping(&self, key: &str) -> Access<'_, &Mapping> {
        self.typed(key, Node::as_mapping)
    }

    fn typed<'a, T>(&'a self, key: &str, cast: impl Fn(&'a Node) -> Option<T>) -> Access<'a, T> {
        match self.get(key) {
            None => Access::Missing,
            Some(node) => match cast(node) {
                Some(value) => Access::Found(value),
                None => Access::WrongType(node),
            },
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses raw advisory text into its top-level mapping.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not valid YAML or its root is not a
/// mapping.
pub fn parse(text: &str) -> Result<Mapping, ParseError> {
    let value: Value = serde_yaml::from_str(text)?;
    match Node::from_yaml(value)? {
        Node::Mapping(map) => Ok(map),
        other => Err(ParseError::NotAMapping(other.kind())),
    }
}

// ============================================================================
// Tests
// ============================================================================
