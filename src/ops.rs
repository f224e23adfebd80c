//! Config operations: env var listing, key lookup, value listing, and result types.
//!
//! Provides the logic behind `htconfig env`, `show`, `get` and `gen`, and the
//! `ConfigResult` enum that callers use to display results. Everything is
//! driven by the static [`Meta`] tables of the generated messages.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::overlay::{Field, FieldKind, Meta, Overlay};

const NOT_SET: &str = "<not set>";

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// All configuration keys with their resolved values.
    Listing { entries: Vec<(String, String)> },
    /// A key's resolved value and its doc comment.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Every environment variable the schema reads.
    EnvVars { vars: Vec<EnvVar> },
    /// The resolved config as pretty JSON.
    Json(String),
    /// Confirmation that generated code was written.
    Generated { path: PathBuf },
}

/// One environment variable derived from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub ty: String,
    pub doc: Vec<String>,
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::EnvVars { vars } => {
                for (i, var) in vars.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    for line in &var.doc {
                        writeln!(f, "# {line}")?;
                    }
                    write!(f, "{} ({})", var.name, var.ty)?;
                }
                Ok(())
            }
            ConfigResult::Json(json) => write!(f, "{json}"),
            ConfigResult::Generated { path } => {
                write!(f, "Generated code written to {}", path.display())
            }
        }
    }
}

/// Every env var read when overlaying `C` under `prefix`, in declaration order.
///
/// Maps and message lists are not settable from the environment and are
/// skipped.
pub fn env_vars<C: Overlay>(prefix: &str) -> Vec<EnvVar> {
    let mut vars = Vec::new();
    collect_env_vars(&C::META, prefix, &mut vars);
    vars
}

fn collect_env_vars(meta: &Meta, prefix: &str, out: &mut Vec<EnvVar>) {
    for field in meta.fields {
        let name = format!("{prefix}{}", field.env_suffix);
        let ty = match field.kind {
            FieldKind::Leaf(ty) => ty.to_string(),
            FieldKind::List(ty) => format!("comma-separated {ty}"),
            FieldKind::Nested(nested) => {
                collect_env_vars(nested, &format!("{name}_"), out);
                continue;
            }
            FieldKind::Map { .. } | FieldKind::NestedList(_) => continue,
        };
        out.push(EnvVar {
            name,
            ty,
            doc: doc_lines(field),
        });
    }
}

/// List every config key with its value, `<not set>` for unset leaves.
pub fn list_values<C: Overlay + Serialize>(config: &C) -> Result<ConfigResult, ConfigError> {
    let value = to_value(config)?;
    let mut entries = Vec::new();
    collect_entries(&C::META, Some(&value), "", &mut entries);
    Ok(ConfigResult::Listing { entries })
}

fn collect_entries(
    meta: &Meta,
    value: Option<&Value>,
    path: &str,
    out: &mut Vec<(String, String)>,
) {
    for field in meta.fields {
        let key = if path.is_empty() {
            field.name.to_string()
        } else {
            format!("{path}.{}", field.name)
        };
        let child = value.and_then(|v| v.get(field.name));
        match field.kind {
            FieldKind::Nested(nested) => collect_entries(nested, child, &key, out),
            _ => out.push((key, display_value(child))),
        }
    }
}

/// Get a config value by dotted key (e.g. `reporting.endpoint`), with its doc.
pub fn get_value<C: Overlay + Serialize>(
    config: &C,
    key: &str,
) -> Result<ConfigResult, ConfigError> {
    let field = lookup_field(&C::META, key).ok_or_else(|| ConfigError::KeyNotFound(key.into()))?;
    let value = to_value(config)?;

    let mut current = Some(&value);
    for segment in key.split('.') {
        current = current.and_then(|v| v.get(segment));
    }

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: display_value(current),
        doc: doc_lines(field),
    })
}

/// The resolved config as pretty JSON (set leaves only).
pub fn to_json<C: Serialize>(config: &C) -> Result<ConfigResult, ConfigError> {
    serde_json::to_string_pretty(config)
        .map(ConfigResult::Json)
        .map_err(serialize_error)
}

/// Walk the `Meta` tree to the field named by a dotted key path.
pub fn lookup_field(meta: &Meta, dotted_key: &str) -> Option<&'static Field> {
    let (head, rest) = match dotted_key.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (dotted_key, None),
    };
    let field = meta.field(head)?;
    match (rest, field.kind) {
        (None, _) => Some(field),
        (Some(rest), FieldKind::Nested(nested)) => lookup_field(nested, rest),
        (Some(_), _) => None,
    }
}

fn to_value<C: Serialize>(config: &C) -> Result<Value, ConfigError> {
    serde_json::to_value(config).map_err(serialize_error)
}

fn serialize_error(e: serde_json::Error) -> ConfigError {
    ConfigError::ParseError {
        path: "<config>".into(),
        source: e,
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_SET.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn doc_lines(field: &Field) -> Vec<String> {
    field.doc.iter().map(|s| s.to_string()).collect()
}
