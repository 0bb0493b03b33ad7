//! Pluggable second-layer cache for resolved descriptors and parsed paths.
//!
//! The accessor always memoizes in process. A [`DescriptorCache`] adds an
//! external layer that survives the accessor instance: entries keyed
//! `p{raw}` for parsed paths, `r{type}..{member}` for read strategies and
//! `w{type}..{member}` for write strategies. Resolution is pure, so a stale
//! or missing reply is never incorrect, only slower.

use std::sync::{PoisonError, RwLock};

use crate::access::{PropertyPath, ReadDescriptor, WriteDescriptor};
use crate::hash::HashMap;

/// One cacheable resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Path(PropertyPath),
    Read(ReadDescriptor),
    Write(WriteDescriptor),
}

/// An external descriptor cache.
///
/// Implementations must tolerate concurrent use; the accessor calls `get`
/// and `set` without any outer synchronization. A `get` returning an entry
/// of the wrong variant for its key is treated as a miss.
pub trait DescriptorCache: Send + Sync {
    /// Fetches the entry stored under `key`, if any.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `entry` under `key`, replacing any previous entry.
    fn set(&self, key: &str, entry: CacheEntry);

    /// Whether an entry exists under `key`.
    fn hit(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The in-memory reference implementation of [`DescriptorCache`].
///
/// Useful for sharing resolved strategies between accessor instances in one
/// process, and as the model for persistent implementations.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<Box<str>, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DescriptorCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, entry: CacheEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }
}

// -----------------------------------------------------------------------------
// Tests
