//! Schema code generator.
//!
//! Reads a configuration schema and emits, per message, a record type with
//! nullable leaves, accessors with zero-value fallbacks, map setters, and an
//! [`Overlay`](crate::overlay::Overlay) implementation carrying the message's
//! overlay routine and field table.
//!
//! This module is also compiled into the crate's build script, so it only
//! depends on `serde`, `toml` and `thiserror` and never on the rest of the
//! crate.

mod emit;
pub mod naming;
pub mod schema;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use schema::{EnumDef, FieldDef, FieldType, MessageDef, Schema, load_schema, parse_schema};

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Failed to read schema {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown type '{ty}' for field {message}.{field}")]
    UnknownType {
        message: String,
        field: String,
        ty: String,
    },

    #[error("Invalid map type '{ty}' for field {message}.{field}: keys and values must be scalars")]
    InvalidMap {
        message: String,
        field: String,
        ty: String,
    },

    #[error("Duplicate name '{0}' in schema")]
    DuplicateName(String),

    #[error("Invalid name '{0}' in schema")]
    InvalidName(String),

    #[error("Enum '{0}' declares no values")]
    EmptyEnum(String),

    #[error("Message cycle: {0}")]
    Cycle(String),

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Knobs for the emitted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Path under which the generated code finds `env` and `overlay`
    /// (`crate` inside this library, `::htconfig` elsewhere).
    pub runtime: String,
    /// Schema file name recorded in the generated header.
    pub source_name: Option<String>,
}

impl GenerateOptions {
    pub fn new(runtime: &str) -> Self {
        Self {
            runtime: runtime.to_string(),
            source_name: None,
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::new("::htconfig")
    }
}

/// Generate Rust source for every enum and message in `schema`.
pub fn generate(schema: &Schema, options: &GenerateOptions) -> String {
    emit::emit_schema(schema, options)
}

/// Output file name for a schema path: the input stem plus `.rs`.
pub fn output_file_name(schema_path: &Path) -> String {
    let stem = schema_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema".to_string());
    format!("{stem}.rs")
}

/// Load `schema_path`, generate code and write it into `out_dir`.
///
/// Returns the path of the written file.
pub fn generate_file(
    schema_path: &Path,
    out_dir: &Path,
    options: &GenerateOptions,
) -> Result<PathBuf, CodegenError> {
    let schema = load_schema(schema_path)?;

    let mut options = options.clone();
    if options.source_name.is_none() {
        options.source_name = schema_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
    }
    let code = generate(&schema, &options);

    let path = out_dir.join(output_file_name(schema_path));
    std::fs::create_dir_all(out_dir).map_err(|e| CodegenError::WriteError {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    std::fs::write(&path, code).map_err(|e| CodegenError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
