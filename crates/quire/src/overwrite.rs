//! Field overwrites applied to the data tree before rendering.
//!
//! A directive has the form `path=value` and sets the string `value` at
//! `path`, creating missing containers on the way. The path syntax:
//!
//! - `.` separates segments; `\.` is a literal dot inside a key
//! - a numeric segment indexes an existing array, or creates an array when
//!   nothing exists yet; on an existing object it is an ordinary key
//! - `-1` appends to an array
//! - a leading `:` forces an object key (`items.:0` sets key `"0"`)
//!
//! Directives without `=` are skipped. Values are never type-converted.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;

/// A parsed `path=value` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub path: &'a str,
    pub value: &'a str,
}

impl<'a> Directive<'a> {
    /// Splits at the first `=`. Returns `None` when there is no `=`.
    pub fn parse(directive: &'a str) -> Option<Self> {
        directive
            .split_once('=')
            .map(|(path, value)| Directive { path, value })
    }
}

/// Errors in overwrite paths.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path cannot be empty")]
    Empty,

    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("segment {0:?} is not an array index")]
    NotAnIndex(String),

    #[error("segment {0:?} descends into a value that is neither object nor array")]
    NotAContainer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    forced_key: bool,
}

impl Segment {
    /// Position this segment addresses in an array of length `len`.
    fn array_index(&self, len: usize) -> Option<usize> {
        if self.forced_key {
            return None;
        }
        if self.name == "-1" {
            return Some(len);
        }
        self.name.parse().ok()
    }

    fn new_container(&self) -> Value {
        if self.array_index(0).is_some() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    }
}

fn parse_path(path: &str) -> Result<Vec<Segment>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut raw = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            '.' => raw.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    raw.push(current);

    raw.into_iter()
        .map(|name| {
            let (name, forced_key) = match name.strip_prefix(':') {
                Some(rest) => (rest.to_string(), true),
                None => (name, false),
            };
            if name.is_empty() {
                Err(PathError::EmptySegment(path.to_string()))
            } else {
                Ok(Segment { name, forced_key })
            }
        })
        .collect()
}

fn set_path(target: &mut Value, segments: &[Segment], value: Value) -> Result<(), PathError> {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    if target.is_null() {
        *target = head.new_container();
    }

    match target {
        Value::Object(map) => {
            let child = map.entry(head.name.clone()).or_insert(Value::Null);
            set_path(child, rest, value)
        }
        Value::Array(items) => {
            let index = head
                .array_index(items.len())
                .ok_or_else(|| PathError::NotAnIndex(head.name.clone()))?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            set_path(&mut items[index], rest, value)
        }
        _ => Err(PathError::NotAContainer(head.name.clone())),
    }
}

/// Sets `value` (as a string) at `path` inside `tree`.
pub fn set_string(tree: &mut Value, path: &str, value: &str) -> Result<(), PathError> {
    let segments = parse_path(path)?;
    set_path(tree, &segments, Value::String(value.to_string()))
}

/// Applies `directives` in order to a serialized copy of `data`.
///
/// # Errors
///
/// [`Error::Overwrite`] naming the directive whose path is malformed or
/// cannot be set, or if `data` cannot be serialized.
pub fn apply_overwrites<T, S>(data: &T, directives: &[S]) -> Result<Value, Error>
where
    T: Serialize + ?Sized,
    S: AsRef<str>,
{
    let mut tree =
        serde_json::to_value(data).map_err(|e| Error::overwrite("(serializing input data)", e))?;

    for directive in directives {
        let directive = directive.as_ref();
        let Some(Directive { path, value }) = Directive::parse(directive) else {
            debug!(directive, "skipping overwrite without '='");
            continue;
        };
        set_string(&mut tree, path, value).map_err(|e| Error::overwrite(directive, e))?;
    }
    Ok(tree)
}
