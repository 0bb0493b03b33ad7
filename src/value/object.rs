//! Shared handles around introspectable user types.

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::schema::TypeSchema;

// -----------------------------------------------------------------------------
// Entity

/// A user type that can be traversed by property segments.
///
/// An entity hands out the [`TypeSchema`] describing its members; the
/// accessor resolves every read and write strategy against that table.
/// The schema is expected to be stable for the process lifetime, which is
/// what makes resolved strategies cacheable.
///
/// The `as_any` pair is boilerplate Rust cannot supply for us; implement it
/// as `self` on both sides. See [`TypeSchema::builder`] for a complete
/// entity example.
pub trait Entity: Any + Send + Sync {
    /// The capability table describing this type's members.
    fn schema(&self) -> &'static TypeSchema;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Entity {
    /// Whether the underlying entity is a `T`.
    #[inline]
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to a concrete entity type.
    #[inline]
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Downcasts to a concrete entity type, mutably.
    #[inline]
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

// -----------------------------------------------------------------------------
// Object

/// A shared, mutably-lockable handle to an [`Entity`].
///
/// Cloning an `Object` clones the handle, not the entity: every clone sees
/// and applies the same mutations. This is the reference-bearing node of the
/// value graph, and it is why the writer can stop rebuilding ancestors as
/// soon as a hop reaches an object.
#[derive(Clone)]
pub struct Object {
    schema: &'static TypeSchema,
    inner: Arc<RwLock<dyn Entity>>,
}

impl Object {
    /// Wraps an entity into a shared handle.
    pub fn new<T: Entity>(entity: T) -> Self {
        let schema = entity.schema();
        Self {
            schema,
            inner: Arc::new(RwLock::new(entity)),
        }
    }

    /// The capability table of the wrapped entity, without locking.
    #[inline]
    pub fn schema(&self) -> &'static TypeSchema {
        self.schema
    }

    /// The [`TypeId`] of the wrapped entity type.
    #[inline]
    pub fn entity_type_id(&self) -> TypeId {
        self.schema.type_id()
    }

    /// Takes a read lock on the entity.
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Entity> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the entity.
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Entity> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles share the same entity.
    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Object {
    /// Handle identity first; otherwise the schema's registered equality
    /// hook, if any. Distinct handles of a type without a hook are never
    /// equal.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.schema.type_id() != other.schema.type_id() {
            return false;
        }
        match self.schema.eq_fn() {
            Some(eq) => eq(&*self.read(), &*other.read()),
            None => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.schema.name())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Entity, Object};
    use crate::schema::TypeSchema;
    use crate::value::Value;
    use core::any::Any;
    use std::sync::LazyLock;

    struct Counter {
        count: i64,
    }

    static COUNTER: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Counter>("Counter")
            .getter("get_count", |c: &Counter| Value::Int(c.count))
            .setter("set_count", |c: &mut Counter, v| {
                c.count = v.expect_int()?;
                Ok(())
            })
            .eq(|a: &Counter, b: &Counter| a.count == b.count)
            .build()
    });

    impl Entity for Counter {
        fn schema(&self) -> &'static TypeSchema {
            &COUNTER
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn clones_share_the_entity() {
        let a = Object::new(Counter { count: 0 });
        let b = a.clone();
        b.write().downcast_mut::<Counter>().unwrap().count = 7;
        assert_eq!(a.read().downcast_ref::<Counter>().unwrap().count, 7);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn equality_uses_the_registered_hook() {
        let a = Object::new(Counter { count: 3 });
        let b = Object::new(Counter { count: 3 });
        let c = Object::new(Counter { count: 4 });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn downcasting() {
        let object = Object::new(Counter { count: 1 });
        let guard = object.read();
        assert!(guard.is::<Counter>());
        assert_eq!(guard.downcast_ref::<Counter>().unwrap().count, 1);
    }
}
