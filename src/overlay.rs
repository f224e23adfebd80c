//! The overlay contract implemented by every generated message.
//!
//! [`Overlay::overlay`] fills each unset leaf of a message from the
//! environment under a prefix, then from the matching leaf of a defaults
//! message. Leaves that are already set are never touched, so running the
//! overlay after a file load gives the precedence
//! caller > file > environment > defaults.
//!
//! [`Overlay::META`] is the static field table of the message. It drives the
//! introspection operations in [`ops`](crate::ops) and carries the same names
//! the generated overlay routine uses.

use std::fmt;

use crate::env::Env;

pub trait Overlay: Default {
    /// Static description of the message and its fields.
    const META: Meta;

    /// Populate every unset leaf from `env` (names under `prefix`), then from
    /// `defaults`. Nil sub-messages are instantiated and recursed into with
    /// the prefix extended by the field's env suffix and `_`.
    fn overlay(&mut self, env: &Env, prefix: &str, defaults: Option<&Self>);
}

/// Field table of one message.
#[derive(Debug, Clone, Copy)]
pub struct Meta {
    pub name: &'static str,
    pub doc: &'static [&'static str],
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Schema name, also the key used in config files.
    pub name: &'static str,
    /// CamelCase name with `HTTP`/`RPC` acronyms preserved.
    pub public_name: &'static str,
    /// UPPER_SNAKE suffix appended to the prefix to form the env var name.
    pub env_suffix: &'static str,
    pub doc: &'static [&'static str],
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Leaf(ValueType),
    List(ValueType),
    Map { key: ValueType, value: ValueType },
    Nested(&'static Meta),
    NestedList(&'static Meta),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Bool,
    Int32,
    Enum {
        name: &'static str,
        values: &'static [&'static str],
    },
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => f.write_str("string"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int32 => f.write_str("int32"),
            ValueType::Enum { values, .. } => write!(f, "one of {}", values.join("|")),
        }
    }
}

impl Meta {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
