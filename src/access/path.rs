//! Property path parsing.
//!
//! A path is a sequence of segments over the `a[0][1].b` grammar: the first
//! segment is a bare identifier or an `[index]`, every later property is
//! introduced by `.`, and index segments chain freely. Index tokens are
//! arbitrary non-empty strings; whether one is usable as an array position is
//! decided at traversal time, not parse time.

use core::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::AccessError;

// -----------------------------------------------------------------------------
// Segment

/// One hop of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    name: Box<str>,
    index: bool,
}

impl Segment {
    /// The segment name: the identifier of a property segment, or the raw
    /// token between the brackets of an index segment.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this segment was written in `[...]` form.
    #[inline]
    pub fn is_index(&self) -> bool {
        self.index
    }

    /// The token as an array position, when this is an index segment whose
    /// token parses as one.
    pub fn array_index(&self) -> Option<usize> {
        if !self.index {
            return None;
        }
        self.name.parse().ok()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index {
            write!(f, "[{}]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

// -----------------------------------------------------------------------------
// PropertyPath

#[derive(Debug, PartialEq, Eq, Hash)]
struct Inner {
    raw: Box<str>,
    segments: Box<[Segment]>,
}

/// A parsed, immutable property path.
///
/// Cheap to clone; clones share the parsed representation. Equality and
/// hashing go by the raw string, which the grammar maps one-to-one onto
/// segment sequences.
///
/// # Examples
///
/// ```
/// use prop_access::PropertyPath;
///
/// let path = PropertyPath::parse("orders[0].total")?;
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.get(0).unwrap().name(), "orders");
/// assert!(path.get(1).unwrap().is_index());
/// assert_eq!(path.last().name(), "total");
/// # Ok::<(), prop_access::AccessError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Arc<Inner>);

impl PropertyPath {
    /// Parses a raw path string.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidPath`] with the byte offset of the
    /// offending character when the string does not match the grammar.
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let invalid = |offset: usize, reason: &'static str| AccessError::InvalidPath {
            path: raw.into(),
            offset,
            reason: reason.into(),
        };

        if raw.is_empty() {
            return Err(invalid(0, "the path must not be empty"));
        }

        let mut segments: SmallVec<[Segment; 8]> = SmallVec::new();
        let bytes = raw.as_bytes();
        let mut at = 0;
        // A property is valid at the start and after `.`; an index is valid
        // at the start and after any complete segment.
        let mut expect_property = true;

        while at < bytes.len() {
            match bytes[at] {
                b'[' => {
                    let start = at + 1;
                    let mut end = start;
                    loop {
                        match bytes.get(end) {
                            None => return Err(invalid(at, "unclosed `[`")),
                            Some(b']') => break,
                            Some(b'[') => {
                                return Err(invalid(end, "unexpected `[` inside an index"));
                            }
                            Some(_) => end += 1,
                        }
                    }
                    if end == start {
                        return Err(invalid(at, "the index between `[` and `]` must not be empty"));
                    }
                    segments.push(Segment {
                        name: raw[start..end].into(),
                        index: true,
                    });
                    at = end + 1;
                    expect_property = false;
                }
                b'.' if !expect_property => {
                    at += 1;
                    expect_property = true;
                }
                b']' => return Err(invalid(at, "unexpected `]`")),
                _ if expect_property => {
                    let start = at;
                    while at < bytes.len() && !matches!(bytes[at], b'.' | b'[' | b']') {
                        at += 1;
                    }
                    if at == start {
                        return Err(invalid(at, "a property name must not be empty"));
                    }
                    segments.push(Segment {
                        name: raw[start..at].into(),
                        index: false,
                    });
                    expect_property = false;
                }
                _ => return Err(invalid(at, "expected `.` or `[`")),
            }
        }

        if expect_property {
            return Err(invalid(raw.len(), "a property name must not be empty"));
        }

        Ok(Self(Arc::new(Inner {
            raw: raw.into(),
            segments: segments.into_vec().into_boxed_slice(),
        })))
    }

    /// The raw path string this was parsed from.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.0.raw
    }

    /// The number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.segments.is_empty()
    }

    /// All segments, in traversal order.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.0.segments
    }

    /// The segment at position `at`.
    #[inline]
    pub fn get(&self, at: usize) -> Option<&Segment> {
        self.0.segments.get(at)
    }

    /// The terminal segment. A parsed path always has at least one.
    #[inline]
    pub fn last(&self) -> &Segment {
        &self.0.segments[self.0.segments.len() - 1]
    }
}

impl fmt::Display for PropertyPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.raw)
    }
}

// -----------------------------------------------------------------------------
// Tests
