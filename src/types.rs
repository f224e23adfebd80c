use std::path::PathBuf;

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Show every key of the resolved config, or the whole config as JSON.
    Show { json: bool },
    /// Show one resolved key and its documentation.
    Get { key: String },
    /// List the environment variables the schema reads.
    Env,
    /// Run the code generator over a schema file.
    Gen {
        schema: PathBuf,
        output: Option<PathBuf>,
        runtime: Option<String>,
    },
}
