//! Build script for htconfig.
//!
//! Generates the agent config types from `schema/agent_config.toml` into
//! `OUT_DIR`, where `src/config.rs` includes them.

use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "src/codegen/mod.rs"]
mod codegen;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Path::new("schema/agent_config.toml");
    println!("cargo::rerun-if-changed={}", schema.display());
    println!("cargo::rerun-if-changed=src/codegen");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    codegen::generate_file(schema, &out_dir, &codegen::GenerateOptions::new("crate"))?;

    Ok(())
}
