//! The dynamic value model traversed by the accessor.
//!
//! A [`Value`] is a runtime graph of unknown shape: scalars, integer-indexed
//! [`Value::Array`]s, string-keyed, order-preserving [`Value::Map`]s, and
//! [`Value::Object`]s wrapping user types introspectable through their
//! registered [`TypeSchema`](crate::schema::TypeSchema).
//!
//! Cloning follows the semantics the engine relies on: `Array` and `Map` are
//! value-semantic (a clone is an independent copy), while `Object` clones
//! share the underlying entity (object semantics = shared ownership).
//!
//! # Examples
//!
//! ```
//! use prop_access::value::{Map, Value, ValueKind};
//!
//! let mut order = Map::default();
//! order.insert("total".to_string(), Value::Int(10));
//!
//! let root = Value::Map(order);
//! assert_eq!(root.kind(), ValueKind::Map);
//! assert!(root.is_container());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod object;

pub use object::{Entity, Object};

use core::fmt;

use crate::error::TypeMismatch;

// -----------------------------------------------------------------------------
// Value

/// The map container used by [`Value::Map`].
///
/// Insertion order is preserved, so writing one key never disturbs the
/// position of its siblings.
pub type Map = indexmap::IndexMap<String, Value, foldhash::fast::RandomState>;

/// A dynamic value: the root, every intermediate hop, and the result of a
/// path access.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// An integer-indexed, value-semantic container.
    Array(Vec<Value>),
    /// A string-keyed, order-preserving, value-semantic container.
    Map(Map),
    /// A shared handle to an introspectable user type.
    Object(Object),
}

impl Value {
    /// Returns the [`ValueKind`] of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Whether a path can continue through this value.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Map(_) | Self::Object(_))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A display label for diagnostics: the schema name for objects, the
    /// kind name for everything else.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Object(object) => object.schema().name(),
            other => other.kind().as_str(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Extracts a `bool`, or reports the mismatch for the engine to re-raise.
    ///
    /// The `expect_*` family is intended for setter closures registered in a
    /// [`TypeSchema`](crate::schema::TypeSchema):
    ///
    /// ```
    /// # use prop_access::value::Value;
    /// # use prop_access::error::TypeMismatch;
    /// # fn set(value: Value) -> Result<(), TypeMismatch> {
    /// let total = value.expect_int()?;
    /// # let _ = total; Ok(()) }
    /// # assert!(set(Value::Int(3)).is_ok());
    /// # assert!(set(Value::Bool(true)).is_err());
    /// ```
    pub fn expect_bool(&self) -> Result<bool, TypeMismatch> {
        self.as_bool().ok_or_else(|| TypeMismatch::expected("bool"))
    }

    pub fn expect_int(&self) -> Result<i64, TypeMismatch> {
        self.as_int().ok_or_else(|| TypeMismatch::expected("int"))
    }

    pub fn expect_float(&self) -> Result<f64, TypeMismatch> {
        self.as_float()
            .ok_or_else(|| TypeMismatch::expected("float"))
    }

    pub fn expect_str(&self) -> Result<&str, TypeMismatch> {
        self.as_str()
            .ok_or_else(|| TypeMismatch::expected("string"))
    }

    pub fn expect_array(&self) -> Result<&[Value], TypeMismatch> {
        self.as_array()
            .ok_or_else(|| TypeMismatch::expected("array"))
    }

    pub fn expect_object(&self) -> Result<&Object, TypeMismatch> {
        self.as_object()
            .ok_or_else(|| TypeMismatch::expected("object"))
    }

    /// Consumes the value, extracting the array items.
    pub fn into_array(self) -> Result<Vec<Value>, TypeMismatch> {
        match self {
            Self::Array(items) => Ok(items),
            _ => Err(TypeMismatch::expected("array")),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    #[inline]
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Object> for Value {
    #[inline]
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

// -----------------------------------------------------------------------------
// ValueKind

/// The kind of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Map,
    Object,
}

impl ValueKind {
    /// The lowercase display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Tests
