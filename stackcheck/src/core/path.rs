//! Paths into a property tree.
//!
//! Text form is dot-separated keys with bracketed sequence indexes, e.g.
//! `spec.containers[0].image`. A key containing `.` or `[` can only be
//! expressed by building the path from segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Ordered sequence of segments. An empty path never resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("path must be non-empty")]
    Empty,
    #[error("empty key at offset {offset} in '{path}'")]
    EmptyKey { path: String, offset: usize },
    #[error("unterminated index at offset {offset} in '{path}'")]
    UnterminatedIndex { path: String, offset: usize },
    #[error("invalid index '{index}' in '{path}': expected a non-negative integer")]
    InvalidIndex { path: String, index: String },
}

impl PropertyPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Path made only of mapping keys.
    pub fn keys(keys: &[&str]) -> Self {
        Self::new(keys.iter().copied())
    }

    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        if input.is_empty() {
            return Err(PathParseError::Empty);
        }
        let bytes = input.as_bytes();
        let mut segments = Vec::new();
        let mut pos = 0;
        // After `]` a key needs a `.` separator; at the start it does not.
        let mut expect_key = true;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' if expect_key && !segments.is_empty() => {
                    return Err(PathParseError::EmptyKey {
                        path: input.to_string(),
                        offset: pos,
                    });
                }
                b'[' => {
                    let close = input[pos..]
                        .find(']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| PathParseError::UnterminatedIndex {
                            path: input.to_string(),
                            offset: pos,
                        })?;
                    let raw = &input[pos + 1..close];
                    let index = parse_index(raw).ok_or_else(|| PathParseError::InvalidIndex {
                        path: input.to_string(),
                        index: raw.to_string(),
                    })?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;
                    expect_key = false;
                }
                b'.' if !expect_key => {
                    pos += 1;
                    expect_key = true;
                    if pos == bytes.len() {
                        return Err(PathParseError::EmptyKey {
                            path: input.to_string(),
                            offset: pos,
                        });
                    }
                }
                _ if expect_key => {
                    let end = input[pos..]
                        .find(['.', '['])
                        .map(|offset| pos + offset)
                        .unwrap_or(bytes.len());
                    if end == pos {
                        return Err(PathParseError::EmptyKey {
                            path: input.to_string(),
                            offset: pos,
                        });
                    }
                    segments.push(Segment::Key(input[pos..end].to_string()));
                    pos = end;
                    expect_key = false;
                }
                _ => {
                    // A key directly after `]` without a separating dot.
                    return Err(PathParseError::EmptyKey {
                        path: input.to_string(),
                        offset: pos,
                    });
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// New path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Render the first `len` segments, used to name the failing prefix.
    pub fn prefix_display(&self, len: usize) -> String {
        render(&self.segments[..len.min(self.segments.len())])
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (position, segment) in segments.iter().enumerate() {
        if position > 0 && matches!(segment, Segment::Key(_)) {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments))
    }
}

impl FromStr for PropertyPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
