//! Error taxonomy for path parsing, traversal and member access.

use core::fmt;
use std::borrow::Cow;

use crate::value::ValueKind;

// -----------------------------------------------------------------------------
// AccessError

/// An error returned from a failed path read or write.
///
/// All variants are synchronous and non-retryable; it is up to the caller to
/// decide whether a given failure is bad input or a programming defect.
///
/// Use the `Display` impl of this type to get the full diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The raw path string could not be parsed.
    InvalidPath {
        /// The path that the error occurred in.
        path: Box<str>,
        /// Byte position in `path`.
        offset: usize,
        /// The underlying error.
        reason: Cow<'static, str>,
    },
    /// No read strategy matched a property segment.
    PropertyNotFound {
        /// The property segment that failed to resolve.
        property: Box<str>,
        /// Full diagnostic, naming every member that was tried.
        detail: Box<str>,
    },
    /// An index segment named a missing key while reading strictly.
    IndexNotFound {
        /// The index token that was not found.
        index: Box<str>,
        /// The path being traversed.
        path: Box<str>,
        /// Preformatted list of the keys that do exist.
        available: Box<str>,
    },
    /// A non-terminal hop landed on a value the path cannot continue through.
    UnexpectedType {
        /// The kind of the offending value.
        actual: ValueKind,
        /// The path being traversed.
        path: Box<str>,
        /// The segment position at which traversal stopped.
        offset: usize,
    },
    /// No write strategy matched the terminal property segment.
    WriteAccess {
        /// The property segment that failed to resolve.
        property: Box<str>,
        /// Full diagnostic, naming every member that was tried.
        detail: Box<str>,
    },
    /// A resolved writer rejected the runtime type of the incoming value.
    TypeMismatch {
        /// The property being written.
        property: Box<str>,
        /// The type the writer expected.
        expected: Box<str>,
        /// The resolved runtime type of the offending value.
        actual: Box<str>,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath {
                path,
                offset,
                reason,
            } => write!(
                f,
                "Encountered an error at offset {offset} while parsing `{path}`: {reason}",
            ),
            Self::PropertyNotFound { detail, .. } => f.write_str(detail),
            Self::IndexNotFound {
                index,
                path,
                available,
            } => write!(
                f,
                "Cannot read index `{index}` while trying to traverse path `{path}`. \
                 Available indices are {available}.",
            ),
            Self::UnexpectedType {
                actual,
                path,
                offset,
            } => write!(
                f,
                "Path `{path}` cannot be traversed further at segment {offset}: \
                 unexpected {actual} value.",
            ),
            Self::WriteAccess { detail, .. } => f.write_str(detail),
            Self::TypeMismatch {
                property,
                expected,
                actual,
            } => write!(
                f,
                "Expected argument of type `{expected}` for property `{property}`, \
                 `{actual}` given.",
            ),
        }
    }
}

impl core::error::Error for AccessError {}

// -----------------------------------------------------------------------------
// TypeMismatch

/// A type rejection raised by a setter, adder, remover or field-write closure.
///
/// The closure only names the type it expected; the engine re-raises this as
/// [`AccessError::TypeMismatch`] carrying the offending value's resolved
/// runtime type as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The type the writer expected, e.g. `"int"`.
    pub expected: Cow<'static, str>,
}

impl TypeMismatch {
    /// Creates a mismatch naming the expected type.
    #[inline]
    pub fn expected(expected: impl Into<Cow<'static, str>>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl fmt::Display for TypeMismatch {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a value of type `{}`", self.expected)
    }
}

impl core::error::Error for TypeMismatch {}
