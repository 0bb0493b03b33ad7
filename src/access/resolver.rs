//! Access-strategy resolution.
//!
//! Given a type's capability table and a member name, decide *how* that
//! member is read or written by probing naming conventions in a fixed
//! order. Resolution never touches an entity instance, so the resulting
//! descriptors are pure per (type, member) and safe to memoize.

use core::fmt::Write as _;

use crate::access::inflector::singular_candidates;
use crate::schema::TypeSchema;

// -----------------------------------------------------------------------------
// Read side

/// How a property segment is read from an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadKind {
    /// Invoke the named zero-arg method.
    Getter(Box<str>),
    /// Read the named public field.
    Field(Box<str>),
    /// Invoke the type's dynamic-read hook with the property name.
    MagicGet,
    /// Invoke the dynamic-call fallback with the named method.
    MagicCall(Box<str>),
    /// Nothing matched; the payload is the full diagnostic.
    NotFound(Box<str>),
}

/// The memoized outcome of read resolution for one (type, member).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadDescriptor {
    pub kind: ReadKind,
    /// Whether the strategy yields a value backed by the live object graph.
    /// Only field reads are; everything returned from a method is a copy.
    pub referenceable: bool,
}

/// Probes the read conventions in order: `get_x`, the fluent `x`, `is_x`,
/// `has_x`, the magic getter, the field `x`, then the dynamic-call fallback
/// when `magic_call` is enabled.
pub(crate) fn resolve_read(
    schema: &TypeSchema,
    property: &str,
    magic_call: bool,
) -> ReadDescriptor {
    let getter = format!("get_{property}");

    for name in [getter.as_str(), property] {
        if schema.has_getter(name) {
            return ReadDescriptor {
                kind: ReadKind::Getter(name.into()),
                referenceable: false,
            };
        }
    }
    for prefix in ["is", "has"] {
        let name = format!("{prefix}_{property}");
        if schema.has_getter(&name) {
            return ReadDescriptor {
                kind: ReadKind::Getter(name.into()),
                referenceable: false,
            };
        }
    }
    if schema.magic_get_fn().is_some() {
        return ReadDescriptor {
            kind: ReadKind::MagicGet,
            referenceable: false,
        };
    }
    if schema.field(property).is_some() {
        return ReadDescriptor {
            kind: ReadKind::Field(property.into()),
            referenceable: true,
        };
    }
    if magic_call && schema.call_get_fn().is_some() {
        return ReadDescriptor {
            kind: ReadKind::MagicCall(getter.into_boxed_str()),
            referenceable: false,
        };
    }

    let mut methods = format!("`{getter}()`, `{property}()`, `is_{property}()`, `has_{property}()`, `magic_get()`");
    if magic_call {
        methods.push_str(", `magic_call()`");
    }
    ReadDescriptor {
        kind: ReadKind::NotFound(
            format!(
                "Neither the property `{property}` nor one of the methods {methods} \
                 exist and have public access in type `{}`.",
                schema.name(),
            )
            .into_boxed_str(),
        ),
        referenceable: false,
    }
}

// -----------------------------------------------------------------------------
// Write side

/// How a terminal property segment is written on an object, once the
/// adder/remover route (if any) has been ruled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteKind {
    /// Invoke the named one-arg method.
    Setter(Box<str>),
    /// Write the named public field.
    Field(Box<str>),
    /// Invoke the type's dynamic-write hook with the property name.
    MagicSet,
    /// Invoke the dynamic-call fallback with the named method.
    MagicCall(Box<str>),
    /// Nothing matched; the payload is the full diagnostic.
    NotFound(Box<str>),
}

/// The memoized outcome of write resolution for one (type, member).
///
/// Both routes are resolved up front so the descriptor stays independent of
/// any particular incoming value: the adder/remover pair applies when the
/// value is an array, `kind` covers everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteDescriptor {
    /// The adder/remover pair for collection-valued writes, when one exists.
    pub collection: Option<(Box<str>, Box<str>)>,
    pub kind: WriteKind,
}

/// Probes the write conventions: the explicit collection mapping or an
/// inferred `add_{singular}`/`remove_{singular}` pair, and independently
/// `set_x`, the fluent `x`, the magic setter, the field `x`, then the
/// dynamic-call fallback when `magic_call` is enabled.
pub(crate) fn resolve_write(
    schema: &TypeSchema,
    property: &str,
    magic_call: bool,
) -> WriteDescriptor {
    let collection = find_adder_and_remover(schema, property);

    let setter = format!("set_{property}");
    for name in [setter.as_str(), property] {
        if schema.has_setter(name) {
            return WriteDescriptor {
                collection,
                kind: WriteKind::Setter(name.into()),
            };
        }
    }
    if schema.magic_set_fn().is_some() {
        return WriteDescriptor {
            collection,
            kind: WriteKind::MagicSet,
        };
    }
    if schema.field(property).is_some_and(|f| f.is_writable()) {
        return WriteDescriptor {
            collection,
            kind: WriteKind::Field(property.into()),
        };
    }
    if magic_call && schema.call_set_fn().is_some() {
        return WriteDescriptor {
            collection,
            kind: WriteKind::MagicCall(setter.into_boxed_str()),
        };
    }

    let mut methods = String::new();
    for singular in singular_candidates(property) {
        let _ = write!(methods, "`add_{singular}()`/`remove_{singular}()`, ");
    }
    let _ = write!(methods, "`{setter}()`, `{property}()`, `magic_set()`");
    if magic_call {
        methods.push_str(" or `magic_call()`");
    }
    WriteDescriptor {
        collection,
        kind: WriteKind::NotFound(
            format!(
                "Neither the property `{property}` nor one of the methods {methods} \
                 exist and have public access in type `{}`.",
                schema.name(),
            )
            .into_boxed_str(),
        ),
    }
}

/// The explicit collection mapping wins; otherwise try every singular
/// candidate and take the first whose `add_*`/`remove_*` pair is fully
/// registered as one-arg methods.
fn find_adder_and_remover(
    schema: &TypeSchema,
    property: &str,
) -> Option<(Box<str>, Box<str>)> {
    if let Some((adder, remover)) = schema.collection_override(property) {
        return Some((adder.into(), remover.into()));
    }
    for singular in singular_candidates(property) {
        let adder = format!("add_{singular}");
        let remover = format!("remove_{singular}");
        if schema.has_setter(&adder) && schema.has_setter(&remover) {
            return Some((adder.into_boxed_str(), remover.into_boxed_str()));
        }
    }
    None
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ReadKind, WriteKind, resolve_read, resolve_write};
    use crate::schema::TypeSchema;
    use crate::value::{Entity, Value};
    use core::any::Any;
    use std::sync::LazyLock;

    struct Article;

    static ARTICLE: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder::<Article>("Article")
            .getter("get_title", |_: &Article| Value::Null)
            .getter("title", |_: &Article| Value::Null)
            .getter("published", |_: &Article| Value::Null)
            .getter("is_draft", |_: &Article| Value::Null)
            .getter("has_comments", |_: &Article| Value::Null)
            .setter("set_title", |_: &mut Article, _| Ok(()))
            .setter("rating", |_: &mut Article, _| Ok(()))
            .setter("add_tag", |_: &mut Article, _| Ok(()))
            .setter("remove_tag", |_: &mut Article, _| Ok(()))
            .field("word_count", |_: &Article| Value::Int(0), |_, _| Ok(()))
            .field_readonly("slug", |_: &Article| Value::Null)
            .build()
    });

    impl Entity for Article {
        fn schema(&self) -> &'static TypeSchema {
            &ARTICLE
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn prefixed_getter_wins_over_fluent() {
        let access = resolve_read(&ARTICLE, "title", false);
        assert_eq!(access.kind, ReadKind::Getter("get_title".into()));
        assert!(!access.referenceable);
    }

    #[test]
    fn fluent_then_boolean_accessors() {
        assert_eq!(
            resolve_read(&ARTICLE, "published", false).kind,
            ReadKind::Getter("published".into())
        );
        assert_eq!(
            resolve_read(&ARTICLE, "draft", false).kind,
            ReadKind::Getter("is_draft".into())
        );
        assert_eq!(
            resolve_read(&ARTICLE, "comments", false).kind,
            ReadKind::Getter("has_comments".into())
        );
    }

    #[test]
    fn field_reads_are_referenceable() {
        let access = resolve_read(&ARTICLE, "word_count", false);
        assert_eq!(access.kind, ReadKind::Field("word_count".into()));
        assert!(access.referenceable);
    }

    #[test]
    fn read_miss_names_every_probe() {
        let access = resolve_read(&ARTICLE, "missing", false);
        let ReadKind::NotFound(detail) = access.kind else {
            panic!("expected a miss");
        };
        for needle in [
            "`get_missing()`",
            "`missing()`",
            "`is_missing()`",
            "`has_missing()`",
            "`magic_get()`",
            "type `Article`",
        ] {
            assert!(detail.contains(needle), "missing {needle} in: {detail}");
        }
        assert!(!detail.contains("magic_call"));

        let ReadKind::NotFound(with_call) = resolve_read(&ARTICLE, "missing", true).kind else {
            panic!("expected a miss");
        };
        assert!(with_call.contains("`magic_call()`"));
    }

    #[test]
    fn write_probes_setters_then_fields() {
        assert_eq!(
            resolve_write(&ARTICLE, "title", false).kind,
            WriteKind::Setter("set_title".into())
        );
        assert_eq!(
            resolve_write(&ARTICLE, "rating", false).kind,
            WriteKind::Setter("rating".into())
        );
        assert_eq!(
            resolve_write(&ARTICLE, "word_count", false).kind,
            WriteKind::Field("word_count".into())
        );
    }

    #[test]
    fn readonly_fields_do_not_resolve_for_writing() {
        let access = resolve_write(&ARTICLE, "slug", false);
        assert!(matches!(access.kind, WriteKind::NotFound(_)));
    }

    #[test]
    fn adder_and_remover_are_inferred_from_the_plural() {
        let access = resolve_write(&ARTICLE, "tags", false);
        assert_eq!(
            access.collection,
            Some(("add_tag".into(), "remove_tag".into()))
        );
        // No scalar strategy for `tags` exists alongside the pair.
        assert!(matches!(access.kind, WriteKind::NotFound(_)));
    }

    #[test]
    fn explicit_collection_mapping_bypasses_inflection() {
        struct Deck;
        static DECK: LazyLock<TypeSchema> = LazyLock::new(|| {
            TypeSchema::builder::<Deck>("Deck")
                .setter("add_card", |_: &mut Deck, _| Ok(()))
                .setter("remove_card", |_: &mut Deck, _| Ok(()))
                .collection("hand", "add_card", "remove_card")
                .build()
        });
        impl Entity for Deck {
            fn schema(&self) -> &'static TypeSchema {
                &DECK
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let access = resolve_write(&DECK, "hand", false);
        assert_eq!(
            access.collection,
            Some(("add_card".into(), "remove_card".into()))
        );
    }

    #[test]
    fn write_miss_names_every_probe() {
        let access = resolve_write(&ARTICLE, "stories", false);
        let WriteKind::NotFound(detail) = access.kind else {
            panic!("expected a miss");
        };
        for needle in [
            "`add_story()`/`remove_story()`",
            "`add_stories()`/`remove_stories()`",
            "`set_stories()`",
            "`stories()`",
            "`magic_set()`",
            "type `Article`",
        ] {
            assert!(detail.contains(needle), "missing {needle} in: {detail}");
        }
    }
}
