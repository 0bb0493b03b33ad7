//! Path-based property access.
//!
//! The pipeline has three stages, each cached independently:
//!
//! 1. [`PropertyPath::parse`] turns a raw string into segments.
//! 2. The resolver maps a (type, member) pair onto a read or write
//!    strategy by probing the type's [`TypeSchema`](crate::schema::TypeSchema)
//!    in a fixed convention order.
//! 3. The traversal applies the segments to a [`Value`](crate::value::Value)
//!    graph, dispatching property segments through the resolved strategies.
//!
//! [`PropertyAccessor`] ties the stages together and owns the caches.

mod accessor;
mod inflector;
mod path;
mod reader;
mod resolver;
mod writer;

pub use accessor::PropertyAccessor;
pub use path::{PropertyPath, Segment};
pub use resolver::{ReadDescriptor, ReadKind, WriteDescriptor, WriteKind};
