use std::path::PathBuf;
use thiserror::Error;

use crate::codegen::CodegenError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open {path}: {source}")]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    YamlError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Unknown config file extension for {path}: expected .json, .yaml or .yml")]
    UnknownExtension { path: PathBuf },

    #[error("Failed to resolve path {path}: {source}")]
    PathResolveError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
