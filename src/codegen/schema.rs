//! Parsed form of the configuration schema consumed by the generator.
//!
//! The schema is read from a TOML description (see `schema/agent_config.toml`)
//! into a raw form, then resolved: every field type string is checked against
//! the declared messages and enums, names are validated, and message cycles
//! are rejected: the configuration tree is a strict hierarchy.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use super::CodegenError;
use super::naming;

/// A resolved schema: enums and messages in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub enums: Vec<EnumDef>,
    pub messages: Vec<MessageDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub doc: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDef {
    pub name: String,
    pub doc: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub doc: String,
}

/// Primitive leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Bool,
    Int32,
}

impl Scalar {
    fn parse(name: &str) -> Option<Scalar> {
        match name {
            "string" => Some(Scalar::String),
            "bool" => Some(Scalar::Bool),
            "int32" => Some(Scalar::Int32),
            _ => None,
        }
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            Scalar::String => "String",
            Scalar::Bool => "bool",
            Scalar::Int32 => "i32",
        }
    }
}

/// Element type of a leaf or list: a scalar or a named enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Scalar(Scalar),
    Enum(String),
}

impl Element {
    pub fn rust_type(&self) -> &str {
        match self {
            Element::Scalar(s) => s.rust_type(),
            Element::Enum(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Nullable scalar or enum.
    Leaf(Element),
    /// Sub-message slot.
    Message(String),
    /// List of scalars or enums.
    List(Element),
    /// List of sub-messages.
    MessageList(String),
    /// Map of scalar to scalar.
    Map(Scalar, Scalar),
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default)]
    enums: Vec<RawEnum>,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawEnum {
    name: String,
    #[serde(default)]
    doc: String,
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    name: String,
    #[serde(default)]
    doc: String,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    doc: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Named {
    Enum,
    Message,
}

/// Read and resolve a schema file.
pub fn load_schema(path: &Path) -> Result<Schema, CodegenError> {
    let content = std::fs::read_to_string(path).map_err(|e| CodegenError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_schema(&content, path)
}

/// Parse and resolve schema source. `path` is only used for error messages.
pub fn parse_schema(content: &str, path: &Path) -> Result<Schema, CodegenError> {
    let raw: RawSchema = toml::from_str(content).map_err(|e| CodegenError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    resolve(raw)
}

fn resolve(raw: RawSchema) -> Result<Schema, CodegenError> {
    let mut names: HashMap<&str, Named> = HashMap::new();

    for e in &raw.enums {
        if !naming::is_type_name(&e.name) {
            return Err(CodegenError::InvalidName(e.name.clone()));
        }
        if names.insert(&e.name, Named::Enum).is_some() {
            return Err(CodegenError::DuplicateName(e.name.clone()));
        }
        if e.values.is_empty() {
            return Err(CodegenError::EmptyEnum(e.name.clone()));
        }
        let mut variants = HashSet::new();
        for value in &e.values {
            if !naming::is_enum_value_name(value) {
                return Err(CodegenError::InvalidName(format!("{}.{value}", e.name)));
            }
            if !variants.insert(naming::variant_name(value)) {
                return Err(CodegenError::DuplicateName(format!("{}.{value}", e.name)));
            }
        }
    }
    for m in &raw.messages {
        if !naming::is_type_name(&m.name) {
            return Err(CodegenError::InvalidName(m.name.clone()));
        }
        if names.insert(&m.name, Named::Message).is_some() {
            return Err(CodegenError::DuplicateName(m.name.clone()));
        }
    }

    let mut messages = Vec::with_capacity(raw.messages.len());
    for m in &raw.messages {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(m.fields.len());
        for f in &m.fields {
            if !naming::is_field_name(&f.name) {
                return Err(CodegenError::InvalidName(format!("{}.{}", m.name, f.name)));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(CodegenError::DuplicateName(format!("{}.{}", m.name, f.name)));
            }
            let ty = parse_type(&f.ty, &names).ok_or_else(|| {
                if map_subtypes(&f.ty).is_some() {
                    CodegenError::InvalidMap {
                        message: m.name.clone(),
                        field: f.name.clone(),
                        ty: f.ty.clone(),
                    }
                } else {
                    CodegenError::UnknownType {
                        message: m.name.clone(),
                        field: f.name.clone(),
                        ty: f.ty.clone(),
                    }
                }
            })?;
            fields.push(FieldDef {
                name: f.name.clone(),
                ty,
                doc: f.doc.trim().to_string(),
            });
        }
        for f in &fields {
            let setter = format!("put_{}", f.name);
            if matches!(f.ty, FieldType::Map(..)) && seen.contains(setter.as_str()) {
                return Err(CodegenError::DuplicateName(format!("{}.{setter}", m.name)));
            }
        }
        messages.push(MessageDef {
            name: m.name.clone(),
            doc: m.doc.trim().to_string(),
            fields,
        });
    }

    let enums = raw
        .enums
        .into_iter()
        .map(|e| EnumDef {
            name: e.name,
            doc: e.doc.trim().to_string(),
            values: e.values,
        })
        .collect();

    let schema = Schema { enums, messages };
    check_cycles(&schema)?;
    Ok(schema)
}

/// Split `map<K, V>` into its key and value type names.
///
/// Whitespace around the type names is ignored.
pub fn map_subtypes(ty: &str) -> Option<(&str, &str)> {
    let inner = ty.trim().strip_prefix("map")?.trim_start();
    let inner = inner.strip_prefix('<')?.strip_suffix('>')?;
    let (key, value) = inner.split_once(',')?;
    Some((key.trim(), value.trim()))
}

fn parse_type(ty: &str, names: &HashMap<&str, Named>) -> Option<FieldType> {
    let ty = ty.trim();

    if let Some((key, value)) = map_subtypes(ty) {
        return Some(FieldType::Map(Scalar::parse(key)?, Scalar::parse(value)?));
    }

    if let Some(inner) = ty.strip_prefix("repeated ") {
        let inner = inner.trim();
        if let Some(s) = Scalar::parse(inner) {
            return Some(FieldType::List(Element::Scalar(s)));
        }
        return match names.get(inner)? {
            Named::Enum => Some(FieldType::List(Element::Enum(inner.to_string()))),
            Named::Message => Some(FieldType::MessageList(inner.to_string())),
        };
    }

    if let Some(s) = Scalar::parse(ty) {
        return Some(FieldType::Leaf(Element::Scalar(s)));
    }
    match names.get(ty)? {
        Named::Enum => Some(FieldType::Leaf(Element::Enum(ty.to_string()))),
        Named::Message => Some(FieldType::Message(ty.to_string())),
    }
}

/// Reject schemas where a message contains itself, directly or through lists.
fn check_cycles(schema: &Schema) -> Result<(), CodegenError> {
    let edges: HashMap<&str, Vec<&str>> = schema
        .messages
        .iter()
        .map(|m| {
            let children = m
                .fields
                .iter()
                .filter_map(|f| match &f.ty {
                    FieldType::Message(name) | FieldType::MessageList(name) => {
                        Some(name.as_str())
                    }
                    _ => None,
                })
                .collect();
            (m.name.as_str(), children)
        })
        .collect();

    let mut done: HashSet<&str> = HashSet::new();
    for m in &schema.messages {
        let mut stack = Vec::new();
        visit(&m.name, &edges, &mut stack, &mut done)?;
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), CodegenError> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(pos) = stack.iter().position(|n| *n == name) {
        let mut cycle: Vec<&str> = stack[pos..].to_vec();
        cycle.push(name);
        return Err(CodegenError::Cycle(cycle.join(" -> ")));
    }
    stack.push(name);
    if let Some(children) = edges.get(name) {
        for &child in children {
            visit(child, edges, stack, done)?;
        }
    }
    stack.pop();
    done.insert(name);
    Ok(())
}
