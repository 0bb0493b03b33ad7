//! Hash container aliases shared across the crate.

/// The default hash state for all in-process maps.
pub(crate) type FoldState = foldhash::fast::RandomState;

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, FoldState>;
