//! Dotted field paths
//!
//! Provides [`DottedPath`] for addressing fields inside a nested document.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Maximum number of segments a field path may have.
pub const MAX_DEPTH: usize = 3;

/// Field name using `.` as a nesting separator
///
/// A path always has between 1 and [`MAX_DEPTH`] non-empty segments.
///
/// # Examples
/// - `["age"]` → `age`
/// - `["profile", "address", "city"]` → `profile.address.city`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DottedPath(Vec<String>);

impl DottedPath {
    /// Create path from segments
    ///
    /// # Errors
    /// Returns error if there are no segments, a segment is empty, or the
    /// path is deeper than [`MAX_DEPTH`].
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment(segments.join(".")));
        }
        if segments.len() > MAX_DEPTH {
            return Err(PathError::DepthExceeded {
                path: segments.join("."),
                depth: segments.len(),
                max: MAX_DEPTH,
            });
        }
        Ok(Self(segments))
    }

    /// Create path from a single segment
    ///
    /// # Errors
    /// Returns error if the segment is empty.
    pub fn single(segment: impl Into<String>) -> Result<Self, PathError> {
        Self::new(vec![segment.into()])
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns error if the result would exceed [`MAX_DEPTH`] or the segment
    /// is empty.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for DottedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for DottedPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        Self::new(s.split('.').map(str::to_string).collect())
    }
}

/// Errors related to dotted paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path has no segments at all
    #[error("field name is empty")]
    Empty,

    /// Empty segment, e.g. `a..b`
    #[error("field name '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Too many segments
    #[error("field name '{path}' has depth {depth}, maximum is {max}")]
    DepthExceeded {
        path: String,
        depth: usize,
        max: usize,
    },
}
