//! The accessor: configuration, cache layers, and the public entry points.

use core::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::Equivalent;

use crate::access::path::PropertyPath;
use crate::access::resolver::{self, ReadDescriptor, WriteDescriptor};
use crate::cache::{CacheEntry, DescriptorCache};
use crate::error::AccessError;
use crate::hash::HashMap;
use crate::schema::TypeSchema;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Cache keys

/// In-process memoization key: one resolved member of one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MemberKey {
    type_id: TypeId,
    member: Box<str>,
}

/// Borrowed probe for [`MemberKey`], so lookups never allocate.
#[derive(Hash)]
struct MemberRef<'a>(TypeId, &'a str);

impl Equivalent<MemberKey> for MemberRef<'_> {
    fn equivalent(&self, key: &MemberKey) -> bool {
        self.0 == key.type_id && self.1 == &*key.member
    }
}

// -----------------------------------------------------------------------------
// PropertyAccessor

/// Reads and writes values through string property paths.
///
/// An accessor is immutable configuration plus caches; it holds no data and
/// can be shared freely across threads. Strategy resolution per (type,
/// member) and path parsing per raw string are memoized in process, with an
/// optional external [`DescriptorCache`] as a second layer.
///
/// # Examples
///
/// ```
/// use prop_access::{PropertyAccessor, Value};
/// use prop_access::value::Map;
///
/// let accessor = PropertyAccessor::new();
///
/// let mut inner = Map::default();
/// inner.insert("total".to_string(), Value::Int(10));
/// let mut root = Value::Array(vec![Value::Map(inner)]);
///
/// assert_eq!(accessor.read(&root, "[0].total")?, Value::Int(10));
/// accessor.write(&mut root, "[0].total", Value::Int(25))?;
/// assert_eq!(accessor.read(&root, "[0].total")?, Value::Int(25));
/// # Ok::<(), prop_access::AccessError>(())
/// ```
pub struct PropertyAccessor {
    pub(crate) magic_call: bool,
    pub(crate) lenient_indices: bool,
    path_cache: RwLock<HashMap<Box<str>, PropertyPath>>,
    read_cache: RwLock<HashMap<MemberKey, ReadDescriptor>>,
    write_cache: RwLock<HashMap<MemberKey, WriteDescriptor>>,
    external: Option<Arc<dyn DescriptorCache>>,
}

impl Default for PropertyAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyAccessor {
    /// An accessor with the default configuration: strict index reads, no
    /// dynamic-call fallback, no external cache.
    pub fn new() -> Self {
        Self {
            magic_call: false,
            lenient_indices: false,
            path_cache: RwLock::new(HashMap::default()),
            read_cache: RwLock::new(HashMap::default()),
            write_cache: RwLock::new(HashMap::default()),
            external: None,
        }
    }

    /// Enables the dynamic-call fallback: when no other strategy matches a
    /// member, types exposing a `magic_call_get`/`magic_call_set` hook get a
    /// last chance to handle the probed method name.
    pub fn with_magic_call(mut self, enabled: bool) -> Self {
        self.magic_call = enabled;
        self
    }

    /// Makes missing index segments read as `Null` instead of raising
    /// [`AccessError::IndexNotFound`]. Writes are always lenient.
    pub fn with_lenient_indices(mut self, enabled: bool) -> Self {
        self.lenient_indices = enabled;
        self
    }

    /// Attaches an external second-layer cache.
    pub fn with_cache(mut self, cache: Arc<dyn DescriptorCache>) -> Self {
        self.external = Some(cache);
        self
    }

    /// Reads the value at `path` below `root`.
    ///
    /// Terminal results are detached copies, except objects, whose clones
    /// share the live entity.
    ///
    /// # Errors
    ///
    /// [`AccessError::InvalidPath`] if `path` does not parse; otherwise the
    /// traversal errors described on [`AccessError`].
    pub fn read(&self, root: &Value, path: &str) -> Result<Value, AccessError> {
        let path = self.property_path(path)?;
        self.read_root(root, &path)
    }

    /// Writes `value` at `path` below `root`.
    ///
    /// Missing intermediate containers under index segments are created;
    /// value-semantic hops are written back one level up; object hops
    /// mutate the shared entity in place.
    ///
    /// # Errors
    ///
    /// [`AccessError::InvalidPath`] if `path` does not parse; otherwise the
    /// traversal and strategy errors described on [`AccessError`].
    pub fn write(&self, root: &mut Value, path: &str, value: Value) -> Result<(), AccessError> {
        let path = self.property_path(path)?;
        self.write_root(root, &path, value)
    }

    /// Drops every in-process memoized path and descriptor. The external
    /// cache, if any, is left untouched.
    pub fn clear_cache(&self) {
        self.path_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.read_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.write_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // -------------------------------------------------------------------------
    // Memoized resolution

    /// Parses `raw` through both cache layers.
    pub fn property_path(&self, raw: &str) -> Result<PropertyPath, AccessError> {
        if let Some(path) = self
            .path_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw)
        {
            return Ok(path.clone());
        }

        let key = self.external.as_ref().map(|_| format!("p{raw}"));
        if let (Some(external), Some(key)) = (&self.external, &key) {
            if let Some(CacheEntry::Path(path)) = external.get(key) {
                log::trace!("path cache hit for `{raw}`");
                self.path_cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(raw.into(), path.clone());
                return Ok(path);
            }
        }

        let path = PropertyPath::parse(raw)?;
        if let (Some(external), Some(key)) = (&self.external, &key) {
            external.set(key, CacheEntry::Path(path.clone()));
        }
        self.path_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(raw.into(), path.clone());
        Ok(path)
    }

    /// The read strategy for `member` on the given type, memoized.
    pub(crate) fn read_access(&self, schema: &TypeSchema, member: &str) -> ReadDescriptor {
        let probe = MemberRef(schema.type_id(), member);
        if let Some(access) = self
            .read_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&probe)
        {
            return access.clone();
        }

        let key = self
            .external
            .as_ref()
            .map(|_| format!("r{}..{member}", schema.name()));
        if let (Some(external), Some(key)) = (&self.external, &key) {
            if let Some(CacheEntry::Read(access)) = external.get(key) {
                log::trace!("read access cache hit for {}::{member}", schema.name());
                self.store_read(schema, member, access.clone());
                return access;
            }
        }

        let access = resolver::resolve_read(schema, member, self.magic_call);
        log::debug!(
            "resolved read access for {}::{member}: {:?}",
            schema.name(),
            access.kind,
        );
        if let (Some(external), Some(key)) = (&self.external, &key) {
            external.set(key, CacheEntry::Read(access.clone()));
        }
        self.store_read(schema, member, access.clone());
        access
    }

    /// The write strategy for `member` on the given type, memoized.
    pub(crate) fn write_access(&self, schema: &TypeSchema, member: &str) -> WriteDescriptor {
        let probe = MemberRef(schema.type_id(), member);
        if let Some(access) = self
            .write_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&probe)
        {
            return access.clone();
        }

        let key = self
            .external
            .as_ref()
            .map(|_| format!("w{}..{member}", schema.name()));
        if let (Some(external), Some(key)) = (&self.external, &key) {
            if let Some(CacheEntry::Write(access)) = external.get(key) {
                log::trace!("write access cache hit for {}::{member}", schema.name());
                self.store_write(schema, member, access.clone());
                return access;
            }
        }

        let access = resolver::resolve_write(schema, member, self.magic_call);
        log::debug!(
            "resolved write access for {}::{member}: {:?}",
            schema.name(),
            access.kind,
        );
        if let (Some(external), Some(key)) = (&self.external, &key) {
            external.set(key, CacheEntry::Write(access.clone()));
        }
        self.store_write(schema, member, access.clone());
        access
    }

    fn store_read(&self, schema: &TypeSchema, member: &str, access: ReadDescriptor) {
        self.read_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                MemberKey {
                    type_id: schema.type_id(),
                    member: member.into(),
                },
                access,
            );
    }

    fn store_write(&self, schema: &TypeSchema, member: &str, access: WriteDescriptor) {
        self.write_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                MemberKey {
                    type_id: schema.type_id(),
                    member: member.into(),
                },
                access,
            );
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::PropertyAccessor;
    use crate::cache::{DescriptorCache, MemoryCache};
    use crate::error::AccessError;
    use crate::schema::TypeSchema;
    use crate::value::{Entity, Map, Object, Value};
    use core::any::Any;
    use std::sync::{Arc, LazyLock};

    macro_rules! entity_boilerplate {
        ($ty:ty, $schema:ident) => {
            impl Entity for $ty {
                fn schema(&self) -> &'static TypeSchema {
                    &$schema
                }
                fn as_any(&self) -> &dyn Any {
                    self
                }
                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }
            }
        };
    }

    struct Order {
        total: i64,
    }

    static ORDER: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Order>("Order")
            .getter("get_total", |o: &Order| Value::Int(o.total))
            .setter("set_total", |o: &mut Order, v| {
                o.total = v.expect_int()?;
                Ok(())
            })
            .build()
    });
    entity_boilerplate!(Order, ORDER);

    struct Customer {
        orders: Vec<Object>,
    }

    static CUSTOMER: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Customer>("Customer")
            .getter("get_orders", |c: &Customer| {
                Value::Array(c.orders.iter().cloned().map(Value::Object).collect())
            })
            .setter("add_order", |c: &mut Customer, v| {
                c.orders.push(v.expect_object()?.clone());
                Ok(())
            })
            .setter("remove_order", |c: &mut Customer, v| {
                let gone = v.expect_object()?;
                c.orders.retain(|o| !o.ptr_eq(gone));
                Ok(())
            })
            .build()
    });
    entity_boilerplate!(Customer, CUSTOMER);

    struct Playlist {
        tracks: Vec<i64>,
        calls: Vec<String>,
    }

    static PLAYLIST: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Playlist>("Playlist")
            .getter("get_tracks", |p: &Playlist| {
                Value::Array(p.tracks.iter().copied().map(Value::Int).collect())
            })
            .setter("add_track", |p: &mut Playlist, v| {
                let track = v.expect_int()?;
                p.tracks.push(track);
                p.calls.push(format!("add {track}"));
                Ok(())
            })
            .setter("remove_track", |p: &mut Playlist, v| {
                let track = v.expect_int()?;
                p.tracks.retain(|t| *t != track);
                p.calls.push(format!("remove {track}"));
                Ok(())
            })
            .build()
    });
    entity_boilerplate!(Playlist, PLAYLIST);

    struct Grab;

    static GRAB: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Grab>("Grab")
            .magic_call_get(|_: &Grab, name| {
                name.strip_prefix("get_").map(Value::from)
            })
            .build()
    });
    entity_boilerplate!(Grab, GRAB);

    fn two_orders() -> Value {
        Value::from(Object::new(Customer {
            orders: vec![
                Object::new(Order { total: 10 }),
                Object::new(Order { total: 20 }),
            ],
        }))
    }

    #[test]
    fn reads_through_objects_and_indices() {
        let accessor = PropertyAccessor::new();
        let root = two_orders();
        assert_eq!(accessor.read(&root, "orders[1].total").unwrap(), Value::Int(20));
        assert_eq!(accessor.read(&root, "orders[0].total").unwrap(), Value::Int(10));
    }

    #[test]
    fn writes_reach_the_shared_entity_and_spare_siblings() {
        let accessor = PropertyAccessor::new();
        let mut root = two_orders();

        accessor
            .write(&mut root, "orders[1].total", Value::Int(25))
            .unwrap();

        assert_eq!(accessor.read(&root, "orders[1].total").unwrap(), Value::Int(25));
        assert_eq!(accessor.read(&root, "orders[0].total").unwrap(), Value::Int(10));
    }

    #[test]
    fn writes_materialize_missing_containers() {
        let accessor = PropertyAccessor::new();

        let mut root = Value::Null;
        accessor.write(&mut root, "a[0].b", Value::Int(7)).unwrap();
        assert_eq!(accessor.read(&root, "a[0].b").unwrap(), Value::Int(7));

        // Numeric next segment materializes an array, not a map.
        assert!(matches!(
            accessor.read(&root, "a").unwrap(),
            Value::Array(_)
        ));
    }

    #[test]
    fn writes_do_not_disturb_existing_siblings() {
        let accessor = PropertyAccessor::new();

        let mut map = Map::default();
        map.insert("keep".to_string(), Value::Int(1));
        let mut root = Value::Map(map);

        accessor.write(&mut root, "a[1]", Value::Int(2)).unwrap();

        let map = root.as_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["keep", "a"]);
        // The array grew to fit index 1, padding with nulls.
        assert_eq!(
            map["a"].as_array().unwrap(),
            [Value::Null, Value::Int(2)]
        );
    }

    #[test]
    fn collection_writes_apply_the_symmetric_difference() {
        let accessor = PropertyAccessor::new();
        let playlist = Object::new(Playlist {
            tracks: vec![1, 2, 3],
            calls: Vec::new(),
        });
        let mut root = Value::from(playlist.clone());

        accessor
            .write(
                &mut root,
                "tracks",
                Value::Array(vec![Value::Int(2), Value::Int(3), Value::Int(4)]),
            )
            .unwrap();

        let guard = playlist.read();
        let playlist = guard.downcast_ref::<Playlist>().unwrap();
        assert_eq!(playlist.tracks, [2, 3, 4]);
        assert_eq!(playlist.calls, ["remove 1", "add 4"]);
    }

    #[test]
    fn collection_writes_reject_non_array_values() {
        let accessor = PropertyAccessor::new();
        let mut root = Value::from(Object::new(Playlist {
            tracks: Vec::new(),
            calls: Vec::new(),
        }));

        let err = accessor
            .write(&mut root, "tracks", Value::Int(9))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`add_track()`/`remove_track()`"), "{message}");
        assert!(message.contains("must be an array, `int` given"), "{message}");
    }

    #[test]
    fn missing_member_reads_name_every_probe() {
        let accessor = PropertyAccessor::new();
        let root = two_orders();

        let err = accessor.read(&root, "orders[0].shipping").unwrap_err();
        let message = err.to_string();
        for needle in [
            "`get_shipping()`",
            "`is_shipping()`",
            "`has_shipping()`",
            "type `Order`",
        ] {
            assert!(message.contains(needle), "missing {needle} in: {message}");
        }
    }

    #[test]
    fn setter_type_rejections_carry_both_types() {
        let accessor = PropertyAccessor::new();
        let mut root = two_orders();

        let err = accessor
            .write(&mut root, "orders[0].total", Value::from("lots"))
            .unwrap_err();
        assert_eq!(
            err,
            AccessError::TypeMismatch {
                property: "total".into(),
                expected: "int".into(),
                actual: "string".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected argument of type `int` for property `total`, `string` given."
        );
    }

    #[test]
    fn strict_index_misses_enumerate_the_keys() {
        let accessor = PropertyAccessor::new();
        let root = Value::Array(vec![Value::Int(1), Value::Int(2)]);

        let err = accessor.read(&root, "[5]").unwrap_err();
        let AccessError::IndexNotFound { available, .. } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(&**available, "`0`, `1`");
    }

    #[test]
    fn lenient_index_misses_read_as_null() {
        let accessor = PropertyAccessor::new().with_lenient_indices(true);
        let root = two_orders();

        assert_eq!(accessor.read(&root, "orders[9].total").unwrap(), Value::Null);
    }

    #[test]
    fn property_segments_on_arrays_suggest_the_index_form() {
        let accessor = PropertyAccessor::new();
        let root = Value::Array(vec![Value::Int(1)]);

        let err = accessor.read(&root, "first").unwrap_err();
        assert!(err.to_string().contains("as `[first]` instead"));

        let mut root = root;
        let err = accessor.write(&mut root, "first", Value::Null).unwrap_err();
        assert!(err.to_string().contains("as `[first]` instead"));
    }

    #[test]
    fn dynamic_call_fallback_is_opt_in() {
        let root = Value::from(Object::new(Grab));

        let strict = PropertyAccessor::new();
        assert!(matches!(
            strict.read(&root, "title"),
            Err(AccessError::PropertyNotFound { .. })
        ));

        let magic = PropertyAccessor::new().with_magic_call(true);
        assert_eq!(magic.read(&root, "title").unwrap(), Value::from("title"));
    }

    #[test]
    fn clearing_caches_does_not_change_outcomes() {
        let accessor = PropertyAccessor::new();
        let root = two_orders();

        let before = accessor.read(&root, "orders[1].total").unwrap();
        accessor.clear_cache();
        let after = accessor.read(&root, "orders[1].total").unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn external_cache_is_shared_between_accessors() {
        let cache = Arc::new(MemoryCache::new());
        let root = two_orders();

        let first = PropertyAccessor::new().with_cache(cache.clone());
        assert_eq!(first.read(&root, "orders[1].total").unwrap(), Value::Int(20));

        assert!(cache.hit("porders[1].total"));
        assert!(cache.hit("rCustomer..orders"));
        assert!(cache.hit("rOrder..total"));

        let second = PropertyAccessor::new().with_cache(cache);
        assert_eq!(second.read(&root, "orders[1].total").unwrap(), Value::Int(20));
    }

    #[test]
    fn writes_landing_in_a_shared_entity_skip_ancestor_write_back() {
        struct Archive {
            orders: Vec<Object>,
        }
        static ARCHIVE: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder::<Archive>("Archive")
                .getter("get_orders", |a: &Archive| {
                    Value::Array(a.orders.iter().cloned().map(Value::Object).collect())
                })
                .build()
        });
        entity_boilerplate!(Archive, ARCHIVE);

        // `orders` is readable-only; the terminal write lands in the shared
        // `Order`, so no write-back up through `orders` may be attempted.
        let accessor = PropertyAccessor::new();
        let mut root = Value::from(Object::new(Archive {
            orders: vec![
                Object::new(Order { total: 10 }),
                Object::new(Order { total: 20 }),
            ],
        }));

        accessor
            .write(&mut root, "orders[1].total", Value::Int(25))
            .unwrap();

        assert_eq!(accessor.read(&root, "orders[1].total").unwrap(), Value::Int(25));
        assert_eq!(accessor.read(&root, "orders[0].total").unwrap(), Value::Int(10));
    }

    #[test]
    fn collection_writes_require_a_readable_previous_collection() {
        struct Basket {
            items: Vec<i64>,
        }
        static BASKET: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder::<Basket>("Basket")
                .setter("add_item", |b: &mut Basket, v| {
                    b.items.push(v.expect_int()?);
                    Ok(())
                })
                .setter("remove_item", |b: &mut Basket, v| {
                    let item = v.expect_int()?;
                    b.items.retain(|it| *it != item);
                    Ok(())
                })
                .build()
        });
        entity_boilerplate!(Basket, BASKET);

        let accessor = PropertyAccessor::new();
        let mut root = Value::from(Object::new(Basket { items: vec![1] }));

        // The diff cannot run without reading the previous items.
        let err = accessor
            .write(&mut root, "items", Value::Array(vec![Value::Int(2)]))
            .unwrap_err();
        assert!(matches!(err, AccessError::PropertyNotFound { .. }));
        assert!(err.to_string().contains("`get_items()`"));
    }

    #[test]
    fn invalid_paths_surface_the_parse_error() {
        let accessor = PropertyAccessor::new();
        let root = Value::Array(Vec::new());
        assert!(matches!(
            accessor.read(&root, "a[0"),
            Err(AccessError::InvalidPath { offset: 1, .. })
        ));
    }
}
