//! Total traversal of a property tree along a [`PropertyPath`].
//!
//! [`pluck`] is the lenient form used when absence is an acceptable answer;
//! [`try_pluck`] names why a path does not resolve. Both descend one segment
//! at a time and never return a partial value.

use thiserror::Error;

use crate::core::path::{PropertyPath, Segment};
use crate::core::property::{NodeKind, PropertyValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluckError {
    #[error("path must be non-empty")]
    EmptyPath,
    #[error("'{path}' not found: no {segment} at '{at}'")]
    PathNotFound {
        path: String,
        at: String,
        segment: String,
    },
    #[error("'{path}': expected {expected} at '{at}', found {found}")]
    TypeMismatch {
        path: String,
        at: String,
        expected: String,
        found: NodeKind,
    },
}

/// Value at `path`, or `None` if any segment fails to resolve.
pub fn pluck<'a>(tree: &'a PropertyValue, path: &PropertyPath) -> Option<&'a PropertyValue> {
    try_pluck(tree, path).ok()
}

/// Shorthand for the common all-keys path, e.g. `["metadata", "name"]`.
pub fn pluck_keys<'a>(tree: &'a PropertyValue, keys: &[&str]) -> Option<&'a PropertyValue> {
    pluck(tree, &PropertyPath::keys(keys))
}

/// Value at `path`, or the first reason traversal stopped.
pub fn try_pluck<'a>(
    tree: &'a PropertyValue,
    path: &PropertyPath,
) -> Result<&'a PropertyValue, PluckError> {
    if path.is_empty() {
        return Err(PluckError::EmptyPath);
    }

    let mut node = tree;
    for (depth, segment) in path.segments().iter().enumerate() {
        node = match (segment, node) {
            (Segment::Key(key), PropertyValue::Mapping(map)) => {
                map.get(key).ok_or_else(|| not_found(path, depth))?
            }
            (Segment::Index(index), PropertyValue::Sequence(items)) => {
                items.get(*index).ok_or_else(|| not_found(path, depth))?
            }
            (Segment::Key(_), other) => {
                return Err(mismatch(path, depth, NodeKind::Mapping, other));
            }
            (Segment::Index(_), other) => {
                return Err(mismatch(path, depth, NodeKind::Sequence, other));
            }
        };
    }
    Ok(node)
}

/// String leaf at `path`; a non-string leaf is a [`PluckError::TypeMismatch`].
pub fn pluck_str<'a>(tree: &'a PropertyValue, path: &PropertyPath) -> Result<&'a str, PluckError> {
    let value = try_pluck(tree, path)?;
    value
        .as_str()
        .ok_or_else(|| mismatch(path, path.len(), NodeKind::String, value))
}

/// Boolean leaf at `path`.
pub fn pluck_bool(tree: &PropertyValue, path: &PropertyPath) -> Result<bool, PluckError> {
    let value = try_pluck(tree, path)?;
    value
        .as_bool()
        .ok_or_else(|| mismatch(path, path.len(), NodeKind::Bool, value))
}

/// Integer leaf at `path`.
pub fn pluck_i64(tree: &PropertyValue, path: &PropertyPath) -> Result<i64, PluckError> {
    let value = try_pluck(tree, path)?;
    value
        .as_i64()
        .ok_or_else(|| mismatch(path, path.len(), NodeKind::Number, value))
}

fn not_found(path: &PropertyPath, depth: usize) -> PluckError {
    let segment = match &path.segments()[depth] {
        Segment::Key(key) => format!("key '{key}'"),
        Segment::Index(index) => format!("index {index}"),
    };
    PluckError::PathNotFound {
        path: path.to_string(),
        at: at_display(path, depth),
        segment,
    }
}

fn mismatch(
    path: &PropertyPath,
    depth: usize,
    expected: NodeKind,
    found: &PropertyValue,
) -> PluckError {
    PluckError::TypeMismatch {
        path: path.to_string(),
        at: at_display(path, depth),
        expected: expected.to_string(),
        found: found.kind(),
    }
}

fn at_display(path: &PropertyPath, depth: usize) -> String {
    if depth == 0 {
        "<root>".to_string()
    } else {
        path.prefix_display(depth)
    }
}
