//! Typed decoding of a parsed config document, collecting unknown keys.
//!
//! Unknown keys are not an error: config files may be shared with other
//! tools or carry keys from newer schemas. They are reported to the caller so
//! the loader can log them.
//!
//! Values of the wrong type are not fatal either. [`drop_mistyped`] removes
//! them from the document before decoding so the rest of the file still
//! applies.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::codegen::naming::to_lower_camel;
use crate::overlay::{FieldKind, Meta, ValueType};

/// A value removed from a document because it does not fit its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistypedValue {
    /// Dotted key path, with `[i]` for list elements and `.key` for map entries.
    pub path: String,
    pub expected: String,
}

/// Decode `value` into `C`, returning the dotted paths of keys `C` ignored.
///
/// `serde_ignored` reports keys under `Option` fields with a `?` segment;
/// those are dropped so paths read like config keys (`reporting.typo`).
pub fn decode_tracking_unknown<C: DeserializeOwned>(
    value: Value,
) -> Result<(C, Vec<String>), serde_json::Error> {
    let mut unknown_keys: Vec<String> = Vec::new();
    let decoded: C = serde_ignored::deserialize(value, |ignored_path| {
        unknown_keys.push(normalize_path(&ignored_path.to_string()));
    })?;
    Ok((decoded, unknown_keys))
}

/// Remove every value in `document` that cannot decode into its field of
/// `meta`, returning what was removed.
///
/// Null values are removed silently: they mean "unset" for every kind.
/// Keys `meta` does not know are left for [`decode_tracking_unknown`].
/// A non-object document is returned untouched.
pub fn drop_mistyped(document: &mut Value, meta: &Meta) -> Vec<MistypedValue> {
    let mut dropped = Vec::new();
    if let Value::Object(object) = document {
        clean_message(object, meta, "", &mut dropped);
    }
    dropped
}

fn clean_message(
    object: &mut Map<String, Value>,
    meta: &Meta,
    parent: &str,
    dropped: &mut Vec<MistypedValue>,
) {
    for field in meta.fields {
        let camel = to_lower_camel(field.name);
        let keys = if camel == field.name {
            vec![camel]
        } else {
            vec![field.name.to_string(), camel]
        };
        for key in keys {
            let Some(value) = object.get_mut(&key) else {
                continue;
            };
            if value.is_null() {
                object.remove(&key);
                continue;
            }
            let path = join(parent, &key);
            if !clean_value(value, &field.kind, &path, dropped) {
                dropped.push(MistypedValue {
                    path,
                    expected: expected(&field.kind),
                });
                object.remove(&key);
            }
        }
    }
}

/// Clean `value` in place. Returns false when the whole value must go.
fn clean_value(
    value: &mut Value,
    kind: &FieldKind,
    path: &str,
    dropped: &mut Vec<MistypedValue>,
) -> bool {
    match kind {
        FieldKind::Leaf(ty) => fits(value, ty),
        FieldKind::Nested(meta) => match value {
            Value::Object(object) => {
                clean_message(object, meta, path, dropped);
                true
            }
            _ => false,
        },
        FieldKind::List(ty) => match value {
            Value::Array(items) => {
                retain_indexed(items, path, dropped, ty.to_string(), |item| fits(item, ty));
                true
            }
            _ => false,
        },
        FieldKind::NestedList(meta) => match value {
            Value::Array(items) => {
                let mut index = 0;
                items.retain_mut(|item| {
                    let item_path = format!("{path}[{index}]");
                    index += 1;
                    match item {
                        Value::Object(object) => {
                            clean_message(object, meta, &item_path, dropped);
                            true
                        }
                        _ => {
                            dropped.push(MistypedValue {
                                path: item_path,
                                expected: meta.name.to_string(),
                            });
                            false
                        }
                    }
                });
                true
            }
            _ => false,
        },
        FieldKind::Map { key, value: ty } => match value {
            Value::Object(entries) => {
                entries.retain(|k, v| {
                    let ok = key_fits(k, key) && fits(v, ty);
                    if !ok {
                        dropped.push(MistypedValue {
                            path: join(path, k),
                            expected: format!("{key} => {ty}"),
                        });
                    }
                    ok
                });
                true
            }
            _ => false,
        },
    }
}

fn retain_indexed(
    items: &mut Vec<Value>,
    path: &str,
    dropped: &mut Vec<MistypedValue>,
    expected: String,
    keep: impl Fn(&Value) -> bool,
) {
    let mut index = 0;
    items.retain(|item| {
        let ok = keep(item);
        if !ok {
            dropped.push(MistypedValue {
                path: format!("{path}[{index}]"),
                expected: expected.clone(),
            });
        }
        index += 1;
        ok
    });
}

fn fits(value: &Value, ty: &ValueType) -> bool {
    match (ty, value) {
        (ValueType::String, Value::String(_)) => true,
        (ValueType::Bool, Value::Bool(_)) => true,
        (ValueType::Int32, Value::Number(n)) => {
            n.as_i64().is_some_and(|n| i32::try_from(n).is_ok())
        }
        (ValueType::Enum { values, .. }, Value::String(s)) => values.contains(&s.as_str()),
        _ => false,
    }
}

fn key_fits(key: &str, ty: &ValueType) -> bool {
    match ty {
        ValueType::String => true,
        ValueType::Bool => matches!(key, "true" | "false"),
        ValueType::Int32 => key.parse::<i32>().is_ok(),
        ValueType::Enum { values, .. } => values.contains(&key),
    }
}

fn expected(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Leaf(ty) => ty.to_string(),
        FieldKind::List(ty) => format!("list of {ty}"),
        FieldKind::Map { key, value } => format!("map of {key} => {value}"),
        FieldKind::Nested(meta) => meta.name.to_string(),
        FieldKind::NestedList(meta) => format!("list of {}", meta.name),
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn normalize_path(path: &str) -> String {
    path.split('.')
        .filter(|segment| *segment != "?")
        .collect::<Vec<_>>()
        .join(".")
}
