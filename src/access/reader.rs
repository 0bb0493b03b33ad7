//! Path traversal for reads.

use crate::access::accessor::PropertyAccessor;
use crate::access::path::{PropertyPath, Segment};
use crate::access::resolver::ReadKind;
use crate::error::AccessError;
use crate::value::{Map, Object, Value};

impl PropertyAccessor {
    pub(crate) fn read_root(&self, root: &Value, path: &PropertyPath) -> Result<Value, AccessError> {
        if !root.is_container() {
            return Err(AccessError::UnexpectedType {
                actual: root.kind(),
                path: path.raw().into(),
                offset: 0,
            });
        }
        self.read_in(root, path, 0)
    }

    fn read_in(&self, host: &Value, path: &PropertyPath, at: usize) -> Result<Value, AccessError> {
        let segment = &path.segments()[at];
        // Property reads through an object detach a value; everything else
        // borrows from the host.
        let owned;
        let child: &Value = match host {
            Value::Object(object) => {
                if segment.is_index() {
                    return Err(AccessError::UnexpectedType {
                        actual: host.kind(),
                        path: path.raw().into(),
                        offset: at,
                    });
                }
                owned = self.read_property(object, segment.name())?;
                &owned
            }
            Value::Array(items) => {
                if !segment.is_index() {
                    return Err(read_property_from_array(segment));
                }
                match segment.array_index().and_then(|i| items.get(i)) {
                    Some(child) => child,
                    None if self.lenient_indices => return Ok(Value::Null),
                    None => {
                        return Err(AccessError::IndexNotFound {
                            index: segment.name().into(),
                            path: path.raw().into(),
                            available: array_indices(items.len()).into_boxed_str(),
                        });
                    }
                }
            }
            Value::Map(map) => match map.get(segment.name()) {
                Some(child) => child,
                None if segment.is_index() && self.lenient_indices => return Ok(Value::Null),
                None if segment.is_index() => {
                    return Err(AccessError::IndexNotFound {
                        index: segment.name().into(),
                        path: path.raw().into(),
                        available: map_keys(map).into_boxed_str(),
                    });
                }
                None => {
                    return Err(AccessError::PropertyNotFound {
                        property: segment.name().into(),
                        detail: format!(
                            "Cannot read property `{}` while trying to traverse path `{path}`. \
                             Available keys are {}.",
                            segment.name(),
                            map_keys(map),
                        )
                        .into_boxed_str(),
                    });
                }
            },
            other => {
                return Err(AccessError::UnexpectedType {
                    actual: other.kind(),
                    path: path.raw().into(),
                    offset: at,
                });
            }
        };

        if at + 1 == path.len() {
            return Ok(child.clone());
        }
        if !child.is_container() {
            return Err(AccessError::UnexpectedType {
                actual: child.kind(),
                path: path.raw().into(),
                offset: at + 1,
            });
        }
        self.read_in(child, path, at + 1)
    }

    /// Reads one member of an object through its resolved strategy.
    pub(crate) fn read_property(
        &self,
        object: &Object,
        member: &str,
    ) -> Result<Value, AccessError> {
        let schema = object.schema();
        match self.read_access(schema, member).kind {
            ReadKind::Getter(name) => match schema.getter(&name) {
                Some(getter) => Ok(getter(&*object.read())),
                None => Err(stale_reader(member, &name, schema.name())),
            },
            ReadKind::Field(name) => match schema.field(&name) {
                Some(field) => Ok(field.get_fn()(&*object.read())),
                None => Err(stale_reader(member, &name, schema.name())),
            },
            ReadKind::MagicGet => match schema.magic_get_fn() {
                Some(magic) => Ok(magic(&*object.read(), member)),
                None => Err(stale_reader(member, "magic_get", schema.name())),
            },
            ReadKind::MagicCall(name) => {
                let Some(call) = schema.call_get_fn() else {
                    return Err(stale_reader(member, "magic_call", schema.name()));
                };
                match call(&*object.read(), &name) {
                    Some(value) => Ok(value),
                    None => Err(AccessError::PropertyNotFound {
                        property: member.into(),
                        detail: format!(
                            "The method `{name}()` was rejected by the dynamic-call \
                             fallback of type `{}`.",
                            schema.name(),
                        )
                        .into_boxed_str(),
                    }),
                }
            }
            ReadKind::NotFound(detail) => Err(AccessError::PropertyNotFound {
                property: member.into(),
                detail,
            }),
        }
    }
}

fn read_property_from_array(segment: &Segment) -> AccessError {
    AccessError::PropertyNotFound {
        property: segment.name().into(),
        detail: format!(
            "Cannot read property `{0}` from an array. Maybe you intended to write \
             the property path as `[{0}]` instead.",
            segment.name(),
        )
        .into_boxed_str(),
    }
}

/// Comes from a strategy cached by an external layer that no longer matches
/// the schema; the member register must have changed between processes.
fn stale_reader(member: &str, resolved: &str, type_name: &str) -> AccessError {
    AccessError::PropertyNotFound {
        property: member.into(),
        detail: format!(
            "Resolved reader `{resolved}()` is not declared by type `{type_name}`.",
        )
        .into_boxed_str(),
    }
}

/// `` `0`, `1`, `2` `` for a length-3 array, `none` for an empty one.
pub(crate) fn array_indices(len: usize) -> String {
    use core::fmt::Write as _;

    if len == 0 {
        return "none".to_string();
    }
    let mut out = String::new();
    for i in 0..len {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "`{i}`");
    }
    out
}

pub(crate) fn map_keys(map: &Map) -> String {
    if map.is_empty() {
        return "none".to_string();
    }
    let mut out = String::new();
    for (i, key) in map.keys().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('`');
        out.push_str(key);
        out.push('`');
    }
    out
}
