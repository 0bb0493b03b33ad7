//! Path traversal for writes.
//!
//! Descent is lenient: missing or `Null` intermediate slots are materialized
//! as an empty container chosen from the next segment, and arrays grow to
//! fit an out-of-range numeric index. Value-semantic hops (arrays and maps
//! read out of an object member) are mutated as detached copies and written
//! back through the member's write strategy exactly one level up; once a
//! mutation lands through an object hop, at any depth, no ancestor writes
//! back, because the shared entity already holds it.

use crate::access::accessor::PropertyAccessor;
use crate::access::path::{PropertyPath, Segment};
use crate::access::reader::array_indices;
use crate::access::resolver::WriteKind;
use crate::error::{AccessError, TypeMismatch};
use crate::value::{Map, Object, Value};

impl PropertyAccessor {
    pub(crate) fn write_root(
        &self,
        root: &mut Value,
        path: &PropertyPath,
        value: Value,
    ) -> Result<(), AccessError> {
        // A `Null` root is promoted to a container so a fresh `Value` can be
        // written into directly; anything else non-traversable is rejected.
        if root.is_null() {
            *root = empty_container_for(&path.segments()[0]);
        } else if !root.is_container() {
            return Err(AccessError::UnexpectedType {
                actual: root.kind(),
                path: path.raw().into(),
                offset: 0,
            });
        }
        self.write_in(root, path, 0, value)?;
        Ok(())
    }

    /// Returns whether the terminal write landed through an object hop at
    /// this depth or below. Ancestors must not write back once it has: the
    /// shared entity already carries the mutation, and re-writing a member
    /// that happens to be readable-only would fail a write that succeeded.
    fn write_in(
        &self,
        host: &mut Value,
        path: &PropertyPath,
        at: usize,
        value: Value,
    ) -> Result<bool, AccessError> {
        if at + 1 == path.len() {
            return self.write_segment(host, path, at, value);
        }

        let segment = &path.segments()[at];
        if let Value::Object(object) = host {
            if segment.is_index() {
                return Err(AccessError::UnexpectedType {
                    actual: host.kind(),
                    path: path.raw().into(),
                    offset: at,
                });
            }
            let object = object.clone();
            let mut child = self.read_property(&object, segment.name())?;
            if child.is_null() {
                child = empty_container_for(&path.segments()[at + 1]);
            } else if !child.is_container() {
                return Err(AccessError::UnexpectedType {
                    actual: child.kind(),
                    path: path.raw().into(),
                    offset: at + 1,
                });
            }
            let landed = self.write_in(&mut child, path, at + 1, value)?;
            if !landed {
                // The detached copy was mutated; propagate it into the graph.
                self.write_property(&object, segment.name(), child)?;
            }
            return Ok(true);
        }

        let next = &path.segments()[at + 1];
        let slot = slot_mut(host, segment, next, path, at)?;
        self.write_in(slot, path, at + 1, value)
    }

    fn write_segment(
        &self,
        host: &mut Value,
        path: &PropertyPath,
        at: usize,
        value: Value,
    ) -> Result<bool, AccessError> {
        let segment = &path.segments()[at];
        match host {
            Value::Object(object) => {
                if segment.is_index() {
                    return Err(AccessError::UnexpectedType {
                        actual: host.kind(),
                        path: path.raw().into(),
                        offset: at,
                    });
                }
                let object = object.clone();
                self.write_property(&object, segment.name(), value)?;
                Ok(true)
            }
            Value::Array(items) => {
                if !segment.is_index() {
                    return Err(write_property_to_array(segment));
                }
                match segment.array_index() {
                    Some(i) => {
                        if items.len() <= i {
                            items.resize(i + 1, Value::Null);
                        }
                        items[i] = value;
                        Ok(false)
                    }
                    None => Err(AccessError::IndexNotFound {
                        index: segment.name().into(),
                        path: path.raw().into(),
                        available: array_indices(items.len()).into_boxed_str(),
                    }),
                }
            }
            Value::Map(map) => {
                map.insert(segment.name().to_string(), value);
                Ok(false)
            }
            other => Err(AccessError::UnexpectedType {
                actual: other.kind(),
                path: path.raw().into(),
                offset: at,
            }),
        }
    }

    /// Writes one member of an object through its resolved strategy.
    pub(crate) fn write_property(
        &self,
        object: &Object,
        member: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        let schema = object.schema();
        let access = self.write_access(schema, member);

        let mut value = value;
        if let Some((adder, remover)) = &access.collection {
            match value {
                Value::Array(incoming) => {
                    return self.write_collection(object, member, adder, remover, incoming);
                }
                other if matches!(access.kind, WriteKind::NotFound(_)) => {
                    return Err(AccessError::WriteAccess {
                        property: member.into(),
                        detail: format!(
                            "The property `{member}` in type `{}` can be defined with the \
                             methods `{adder}()`/`{remover}()` but the new value must be an \
                             array, `{}` given.",
                            schema.name(),
                            other.type_label(),
                        )
                        .into_boxed_str(),
                    });
                }
                other => value = other,
            }
        }

        match access.kind {
            WriteKind::Setter(name) => match schema.setter(&name) {
                Some(setter) => {
                    let actual = value.type_label();
                    setter(&mut *object.write(), value)
                        .map_err(|err| mismatch(member, actual, err))
                }
                None => Err(stale_writer(member, &name, schema.name())),
            },
            WriteKind::Field(name) => match schema.field(&name).and_then(|f| f.set_fn()) {
                Some(set) => {
                    let actual = value.type_label();
                    set(&mut *object.write(), value).map_err(|err| mismatch(member, actual, err))
                }
                None => Err(stale_writer(member, &name, schema.name())),
            },
            WriteKind::MagicSet => match schema.magic_set_fn() {
                Some(magic) => {
                    let actual = value.type_label();
                    magic(&mut *object.write(), member, value)
                        .map_err(|err| mismatch(member, actual, err))
                }
                None => Err(stale_writer(member, "magic_set", schema.name())),
            },
            WriteKind::MagicCall(name) => match schema.call_set_fn() {
                Some(call) => {
                    let actual = value.type_label();
                    call(&mut *object.write(), &name, value)
                        .map_err(|err| mismatch(member, actual, err))
                }
                None => Err(stale_writer(member, "magic_call", schema.name())),
            },
            WriteKind::NotFound(detail) => Err(AccessError::WriteAccess {
                property: member.into(),
                detail,
            }),
        }
    }

    /// Applies a collection write as the symmetric difference against the
    /// member's previous items: remove what disappeared, add what is new,
    /// leave the intersection untouched.
    fn write_collection(
        &self,
        object: &Object,
        member: &str,
        adder: &str,
        remover: &str,
        incoming: Vec<Value>,
    ) -> Result<(), AccessError> {
        let schema = object.schema();
        // The diff needs the previous items; an unreadable member is an
        // error, not an empty collection.
        let previous = match self.read_property(object, member)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        };

        let add = schema
            .setter(adder)
            .ok_or_else(|| stale_writer(member, adder, schema.name()))?;
        let remove = schema
            .setter(remover)
            .ok_or_else(|| stale_writer(member, remover, schema.name()))?;

        for item in &previous {
            if !incoming.contains(item) {
                let actual = item.type_label();
                remove(&mut *object.write(), item.clone())
                    .map_err(|err| mismatch(member, actual, err))?;
            }
        }
        for item in incoming {
            if !previous.contains(&item) {
                let actual = item.type_label();
                add(&mut *object.write(), item).map_err(|err| mismatch(member, actual, err))?;
            }
        }
        Ok(())
    }
}

/// Projects the slot addressed by `segment` out of a value-semantic host,
/// materializing missing or `Null` slots from the segment that follows.
fn slot_mut<'v>(
    host: &'v mut Value,
    segment: &Segment,
    next: &Segment,
    path: &PropertyPath,
    at: usize,
) -> Result<&'v mut Value, AccessError> {
    match host {
        Value::Array(items) => {
            if !segment.is_index() {
                return Err(write_property_to_array(segment));
            }
            let Some(i) = segment.array_index() else {
                return Err(AccessError::IndexNotFound {
                    index: segment.name().into(),
                    path: path.raw().into(),
                    available: array_indices(items.len()).into_boxed_str(),
                });
            };
            if items.len() <= i {
                items.resize(i + 1, Value::Null);
            }
            materialize(&mut items[i], next, path, at)
        }
        Value::Map(map) => {
            let slot = map.entry(segment.name().to_string()).or_insert(Value::Null);
            materialize(slot, next, path, at)
        }
        other => Err(AccessError::UnexpectedType {
            actual: other.kind(),
            path: path.raw().into(),
            offset: at,
        }),
    }
}

fn materialize<'v>(
    slot: &'v mut Value,
    next: &Segment,
    path: &PropertyPath,
    at: usize,
) -> Result<&'v mut Value, AccessError> {
    if slot.is_null() {
        *slot = empty_container_for(next);
    } else if !slot.is_container() {
        return Err(AccessError::UnexpectedType {
            actual: slot.kind(),
            path: path.raw().into(),
            offset: at + 1,
        });
    }
    Ok(slot)
}

/// A numeric index wants an array; string keys and properties want a map.
fn empty_container_for(next: &Segment) -> Value {
    if next.array_index().is_some() {
        Value::Array(Vec::new())
    } else {
        Value::Map(Map::default())
    }
}

fn write_property_to_array(segment: &Segment) -> AccessError {
    AccessError::WriteAccess {
        property: segment.name().into(),
        detail: format!(
            "Cannot write property `{0}` to an array. Maybe you should write the \
             property path as `[{0}]` instead.",
            segment.name(),
        )
        .into_boxed_str(),
    }
}

fn stale_writer(member: &str, resolved: &str, type_name: &str) -> AccessError {
    AccessError::WriteAccess {
        property: member.into(),
        detail: format!(
            "Resolved writer `{resolved}()` is not declared by type `{type_name}`.",
        )
        .into_boxed_str(),
    }
}

fn mismatch(member: &str, actual: &str, err: TypeMismatch) -> AccessError {
    AccessError::TypeMismatch {
        property: member.into(),
        expected: err.expected.as_ref().into(),
        actual: actual.into(),
    }
}
