#![doc = include_str!("../README.md")]

pub mod access;
pub mod cache;
pub mod error;
mod hash;
pub mod schema;
pub mod value;

pub use access::{PropertyAccessor, PropertyPath, Segment};
pub use cache::{CacheEntry, DescriptorCache, MemoryCache};
pub use error::{AccessError, TypeMismatch};
pub use schema::{SchemaBuilder, TypeSchema};
pub use value::{Entity, Object, Value, ValueKind};
