//! Per-type capability tables.
//!
//! Rust has no runtime class reflection, so every traversable user type
//! registers an explicit [`TypeSchema`]: its zero-arg read methods, one-arg
//! write methods, fields, optional magic hooks, and optional adder/remover
//! pairs. The accessor probes this table by naming convention — `get_x`,
//! the fluent `x`, `is_x`, `has_x` on reads; `add_y`/`remove_y`, `set_x`,
//! the fluent `x` on writes — and memoizes the outcome per (type, member).
//!
//! A schema is built once per type, typically inside a
//! [`LazyLock`](std::sync::LazyLock), and handed out by
//! [`Entity::schema`] as a `&'static` reference. Member layout must be
//! stable for the process lifetime; that stability is what makes resolved
//! strategies cacheable.

use core::any::TypeId;
use core::marker::PhantomData;

use crate::error::TypeMismatch;
use crate::hash::HashMap;
use crate::value::{Entity, Value};

// -----------------------------------------------------------------------------
// Closure types

/// A zero-arg read: getter methods, field reads, `is_*`/`has_*` accessors.
pub type GetFn = Box<dyn Fn(&dyn Entity) -> Value + Send + Sync>;

/// A one-arg write: setters, adders, removers, field writes.
pub type SetFn = Box<dyn Fn(&mut dyn Entity, Value) -> Result<(), TypeMismatch> + Send + Sync>;

/// A type-level dynamic-read hook, invoked with the property name.
pub type MagicGetFn = Box<dyn Fn(&dyn Entity, &str) -> Value + Send + Sync>;

/// A type-level dynamic-write hook, invoked with the property name.
pub type MagicSetFn = Box<dyn Fn(&mut dyn Entity, &str, Value) -> Result<(), TypeMismatch> + Send + Sync>;

/// A dynamic-call fallback on the read side, invoked with the *method* name
/// (e.g. `get_total`). Returning `None` rejects the call.
pub type CallGetFn = Box<dyn Fn(&dyn Entity, &str) -> Option<Value> + Send + Sync>;

/// An equality hook used when comparing two objects of the same type.
pub type EqFn = Box<dyn Fn(&dyn Entity, &dyn Entity) -> bool + Send + Sync>;

// -----------------------------------------------------------------------------
// Members

/// A named public field with a read closure and an optional write closure.
pub struct FieldSchema {
    name: &'static str,
    get: GetFn,
    set: Option<SetFn>,
}

impl FieldSchema {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the field can be written.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    #[inline]
    pub(crate) fn get_fn(&self) -> &GetFn {
        &self.get
    }

    #[inline]
    pub(crate) fn set_fn(&self) -> Option<&SetFn> {
        self.set.as_ref()
    }
}

enum MethodImpl {
    Get(GetFn),
    Set(SetFn),
}

/// A named method: either a zero-arg reader or a one-arg writer.
pub struct MethodSchema {
    name: &'static str,
    imp: MethodImpl,
}

impl MethodSchema {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is a zero-arg reader.
    #[inline]
    pub fn is_getter(&self) -> bool {
        matches!(self.imp, MethodImpl::Get(_))
    }

    /// Whether this is a one-arg writer.
    #[inline]
    pub fn is_setter(&self) -> bool {
        matches!(self.imp, MethodImpl::Set(_))
    }
}

// -----------------------------------------------------------------------------
// TypeSchema

/// The capability table of one entity type.
///
/// Built with [`TypeSchema::builder`]; immutable afterwards.
pub struct TypeSchema {
    name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldSchema>,
    field_index: HashMap<&'static str, usize>,
    methods: Vec<MethodSchema>,
    method_index: HashMap<&'static str, usize>,
    collections: HashMap<&'static str, (&'static str, &'static str)>,
    magic_get: Option<MagicGetFn>,
    magic_set: Option<MagicSetFn>,
    call_get: Option<CallGetFn>,
    call_set: Option<MagicSetFn>,
    eq: Option<EqFn>,
}

impl TypeSchema {
    /// Starts a schema for entity type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::any::Any;
    /// use std::sync::LazyLock;
    /// use prop_access::schema::TypeSchema;
    /// use prop_access::value::{Entity, Value};
    ///
    /// struct Order {
    ///     total: i64,
    /// }
    ///
    /// static ORDER: LazyLock<TypeSchema> = LazyLock::new(|| {
    ///     TypeSchema::builder::<Order>("Order")
    ///         .getter("get_total", |order: &Order| Value::Int(order.total))
    ///         .setter("set_total", |order: &mut Order, value| {
    ///             order.total = value.expect_int()?;
    ///             Ok(())
    ///         })
    ///         .build()
    /// });
    ///
    /// impl Entity for Order {
    ///     fn schema(&self) -> &'static TypeSchema {
    ///         &ORDER
    ///     }
    ///
    ///     fn as_any(&self) -> &dyn Any {
    ///         self
    ///     }
    ///
    ///     fn as_any_mut(&mut self) -> &mut dyn Any {
    ///         self
    ///     }
    /// }
    ///
    /// assert_eq!(ORDER.name(), "Order");
    /// assert!(ORDER.has_getter("get_total"));
    /// assert!(ORDER.has_setter("set_total"));
    /// ```
    pub fn builder<T: Entity>(name: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            schema: TypeSchema {
                name,
                type_id: TypeId::of::<T>(),
                fields: Vec::new(),
                field_index: HashMap::default(),
                methods: Vec::new(),
                method_index: HashMap::default(),
                collections: HashMap::default(),
                magic_get: None,
                magic_set: None,
                call_get: None,
                call_set: None,
                eq: None,
            },
            _marker: PhantomData,
        }
    }

    /// The display name of the entity type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The [`TypeId`] of the entity type this schema describes.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSchema> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    /// Whether a zero-arg reader with this name exists.
    #[inline]
    pub fn has_getter(&self, name: &str) -> bool {
        self.getter(name).is_some()
    }

    /// Whether a one-arg writer with this name exists.
    #[inline]
    pub fn has_setter(&self, name: &str) -> bool {
        self.setter(name).is_some()
    }

    pub(crate) fn getter(&self, name: &str) -> Option<&GetFn> {
        match &self.method(name)?.imp {
            MethodImpl::Get(f) => Some(f),
            MethodImpl::Set(_) => None,
        }
    }

    pub(crate) fn setter(&self, name: &str) -> Option<&SetFn> {
        match &self.method(name)?.imp {
            MethodImpl::Set(f) => Some(f),
            MethodImpl::Get(_) => None,
        }
    }

    pub(crate) fn collection_override(
        &self,
        member: &str,
    ) -> Option<(&'static str, &'static str)> {
        self.collections.get(member).copied()
    }

    pub(crate) fn magic_get_fn(&self) -> Option<&MagicGetFn> {
        self.magic_get.as_ref()
    }

    pub(crate) fn magic_set_fn(&self) -> Option<&MagicSetFn> {
        self.magic_set.as_ref()
    }

    pub(crate) fn call_get_fn(&self) -> Option<&CallGetFn> {
        self.call_get.as_ref()
    }

    pub(crate) fn call_set_fn(&self) -> Option<&MagicSetFn> {
        self.call_set.as_ref()
    }

    pub(crate) fn eq_fn(&self) -> Option<&EqFn> {
        self.eq.as_ref()
    }
}

// -----------------------------------------------------------------------------
// SchemaBuilder

fn expect_entity<T: Entity>(entity: &dyn Entity) -> &T {
    match entity.downcast_ref::<T>() {
        Some(entity) => entity,
        None => panic!("type schema invoked with a mismatched entity type"),
    }
}

fn expect_entity_mut<T: Entity>(entity: &mut dyn Entity) -> &mut T {
    match entity.downcast_mut::<T>() {
        Some(entity) => entity,
        None => panic!("type schema invoked with a mismatched entity type"),
    }
}

/// Builds a [`TypeSchema`] from typed closures.
///
/// Every closure receives the concrete entity type; the builder wraps it
/// with the downcast from `dyn Entity`.
///
/// # Panics
///
/// Registering two members with the same name panics, as does
/// [`build`](Self::build) when a [`collection`](Self::collection) override
/// names methods that were not registered as one-arg writers.
pub struct SchemaBuilder<T: Entity> {
    schema: TypeSchema,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> SchemaBuilder<T> {
    /// Registers a zero-arg read method, e.g. `get_total`, the fluent
    /// `total`, `is_active` or `has_comments`.
    pub fn getter(
        self,
        name: &'static str,
        f: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_method(
            name,
            MethodImpl::Get(Box::new(move |entity| f(expect_entity::<T>(entity)))),
        )
    }

    /// Registers a one-arg write method, e.g. `set_total`, the fluent
    /// `total`, `add_question` or `remove_question`.
    pub fn setter(
        self,
        name: &'static str,
        f: impl Fn(&mut T, Value) -> Result<(), TypeMismatch> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(
            name,
            MethodImpl::Set(Box::new(move |entity, value| {
                f(expect_entity_mut::<T>(entity), value)
            })),
        )
    }

    /// Registers a readable and writable public field.
    pub fn field(
        mut self,
        name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<(), TypeMismatch> + Send + Sync + 'static,
    ) -> Self {
        self.push_field(FieldSchema {
            name,
            get: Box::new(move |entity| get(expect_entity::<T>(entity))),
            set: Some(Box::new(move |entity, value| {
                set(expect_entity_mut::<T>(entity), value)
            })),
        });
        self
    }

    /// Registers a read-only public field.
    pub fn field_readonly(
        mut self,
        name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push_field(FieldSchema {
            name,
            get: Box::new(move |entity| get(expect_entity::<T>(entity))),
            set: None,
        });
        self
    }

    /// Registers the dynamic-read hook (magic getter). Non-referenceable;
    /// shadows fields in the resolution order, as the original convention
    /// does.
    pub fn magic_get(mut self, f: impl Fn(&T, &str) -> Value + Send + Sync + 'static) -> Self {
        self.schema.magic_get = Some(Box::new(move |entity, name| {
            f(expect_entity::<T>(entity), name)
        }));
        self
    }

    /// Registers the dynamic-write hook (magic setter).
    pub fn magic_set(
        mut self,
        f: impl Fn(&mut T, &str, Value) -> Result<(), TypeMismatch> + Send + Sync + 'static,
    ) -> Self {
        self.schema.magic_set = Some(Box::new(move |entity, name, value| {
            f(expect_entity_mut::<T>(entity), name, value)
        }));
        self
    }

    /// Registers the dynamic-call fallback on the read side. The closure
    /// receives the probed method name (e.g. `get_total`) and may reject it
    /// with `None`. Only consulted by accessors built with
    /// [`with_magic_call`](crate::PropertyAccessor::with_magic_call).
    pub fn magic_call_get(
        mut self,
        f: impl Fn(&T, &str) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.schema.call_get = Some(Box::new(move |entity, name| {
            f(expect_entity::<T>(entity), name)
        }));
        self
    }

    /// Registers the dynamic-call fallback on the write side. The closure
    /// receives the probed method name (e.g. `set_total`).
    pub fn magic_call_set(
        mut self,
        f: impl Fn(&mut T, &str, Value) -> Result<(), TypeMismatch> + Send + Sync + 'static,
    ) -> Self {
        self.schema.call_set = Some(Box::new(move |entity, name, value| {
            f(expect_entity_mut::<T>(entity), name, value)
        }));
        self
    }

    /// Declares an explicit adder/remover pair for a collection-valued
    /// member, bypassing singularization. Both names must be registered as
    /// one-arg writers before [`build`](Self::build).
    pub fn collection(
        mut self,
        member: &'static str,
        adder: &'static str,
        remover: &'static str,
    ) -> Self {
        self.schema.collections.insert(member, (adder, remover));
        self
    }

    /// Registers the equality hook used to compare two objects of this type,
    /// e.g. by identifier. Without it, distinct handles never compare equal.
    pub fn eq(mut self, f: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        self.schema.eq = Some(Box::new(move |a, b| {
            f(expect_entity::<T>(a), expect_entity::<T>(b))
        }));
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> TypeSchema {
        let schema = self.schema;
        for (member, (adder, remover)) in &schema.collections {
            if schema.setter(adder).is_none() || schema.setter(remover).is_none() {
                panic!(
                    "collection override for `{member}` on type `{}` names \
                     `{adder}()`/`{remover}()`, but both must be registered one-arg methods",
                    schema.name,
                );
            }
        }
        schema
    }

    fn push_method(mut self, name: &'static str, imp: MethodImpl) -> Self {
        if self.schema.method_index.contains_key(name) {
            panic!(
                "duplicate method `{name}` on type schema `{}`",
                self.schema.name
            );
        }
        self.schema
            .method_index
            .insert(name, self.schema.methods.len());
        self.schema.methods.push(MethodSchema { name, imp });
        self
    }

    fn push_field(&mut self, field: FieldSchema) {
        if self.schema.field_index.contains_key(field.name) {
            panic!(
                "duplicate field `{}` on type schema `{}`",
                field.name, self.schema.name
            );
        }
        self.schema
            .field_index
            .insert(field.name, self.schema.fields.len());
        self.schema.fields.push(field);
    }
}

// -----------------------------------------------------------------------------
// Tests
