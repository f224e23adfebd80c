use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::codegen::{self, GenerateOptions};
use crate::config::AgentConfig;
use crate::env::Env;
use crate::error::ConfigError;
use crate::file;
use crate::ops::{self, ConfigResult, EnvVar};
use crate::overlay::Overlay;
use crate::types::ConfigAction;

/// Env prefix of the agent's root message.
pub const ROOT_PREFIX: &str = "HT_";

const CONFIG_FILE_SUFFIX: &str = "CONFIG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileSource {
    None,
    /// Path taken from `{prefix}CONFIG_FILE`.
    FromEnv,
    Path(PathBuf),
}

/// Builder for loading a config tree through its layers.
///
/// Loading starts from an empty tree, merges the config file if one is
/// configured, then overlays the environment and the defaults. File problems
/// are logged and skipped, so loading itself never fails.
pub struct Loader<'d, C> {
    prefix: String,
    file: FileSource,
    env: Option<Env>,
    defaults: Option<&'d C>,
}

impl<'d, C> Default for Loader<'d, C>
where
    C: Overlay + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, C> Loader<'d, C>
where
    C: Overlay + Serialize + DeserializeOwned,
{
    /// A loader with prefix `HT_`, no file, the process environment and no defaults.
    pub fn new() -> Self {
        Self {
            prefix: ROOT_PREFIX.to_string(),
            file: FileSource::None,
            env: None,
            defaults: None,
        }
    }

    /// Override the env var prefix of the root message (default: `HT_`).
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Fallback values for leaves no other layer sets.
    pub fn defaults(mut self, defaults: &'d C) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Read env vars from `env` instead of the process environment.
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    /// Load this file. `{prefix}CONFIG_FILE` is ignored.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = FileSource::Path(path.into());
        self
    }

    /// Load the file named by `{prefix}CONFIG_FILE`, if set.
    pub fn file_from_env(mut self) -> Self {
        self.file = FileSource::FromEnv;
        self
    }

    /// Skip the file layer.
    pub fn no_file(mut self) -> Self {
        self.file = FileSource::None;
        self
    }

    fn config_file_var(&self) -> String {
        format!("{}{CONFIG_FILE_SUFFIX}", self.prefix)
    }

    fn effective_file(&self, env: &Env) -> Option<PathBuf> {
        match &self.file {
            FileSource::None => None,
            FileSource::FromEnv => env.get_string(&self.config_file_var()).map(PathBuf::from),
            FileSource::Path(path) => Some(path.clone()),
        }
    }

    /// Load a fresh tree through all layers.
    pub fn load(&self) -> C {
        let mut tree = C::default();
        self.load_onto(&mut tree);
        tree
    }

    /// Run the layers over an existing tree. Leaves already set on `tree`
    /// are overridden only by the file.
    pub fn load_onto(&self, tree: &mut C) {
        let process_env;
        let env = match &self.env {
            Some(env) => env,
            None => {
                process_env = Env::from_process();
                &process_env
            }
        };

        if let Some(path) = self.effective_file(env) {
            load_file_logged(tree, &path);
        }
        tree.overlay(env, &self.prefix, self.defaults);
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(&self, action: &ConfigAction) -> Result<(), ConfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (show / get / env / gen).
    pub fn handle(&self, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
        match action {
            ConfigAction::Show { json: false } => ops::list_values(&self.load()),
            ConfigAction::Show { json: true } => ops::to_json(&self.load()),
            ConfigAction::Get { key } => ops::get_value(&self.load(), key),
            ConfigAction::Env => {
                let mut vars = Vec::new();
                if self.file == FileSource::FromEnv {
                    vars.push(EnvVar {
                        name: self.config_file_var(),
                        ty: "path".to_string(),
                        doc: vec!["JSON or YAML config file loaded before the environment.".to_string()],
                    });
                }
                vars.extend(ops::env_vars::<C>(&self.prefix));
                Ok(ConfigResult::EnvVars { vars })
            }
            ConfigAction::Gen {
                schema,
                output,
                runtime,
            } => {
                let mut options = GenerateOptions::default();
                if let Some(runtime) = runtime {
                    options.runtime = runtime.clone();
                }
                let out_dir = output.as_deref().unwrap_or(Path::new("."));
                std::fs::create_dir_all(out_dir).map_err(|e| ConfigError::WriteError {
                    path: out_dir.to_path_buf(),
                    source: e,
                })?;
                let path = codegen::generate_file(schema, out_dir, &options)?;
                Ok(ConfigResult::Generated { path })
            }
        }
    }
}

/// Load `path` into `tree`, logging instead of failing.
fn load_file_logged<C>(tree: &mut C, path: &Path)
where
    C: Overlay + Serialize + DeserializeOwned,
{
    let resolved = match std::path::absolute(path) {
        Ok(resolved) => resolved,
        Err(e) => {
            let error = ConfigError::PathResolveError {
                path: path.to_path_buf(),
                source: e,
            };
            warn!(%error, "skipping config file");
            return;
        }
    };

    if !resolved.is_file() {
        warn!(path = %resolved.display(), "config file does not exist, skipping");
        return;
    }

    if let Err(error) = file::load_file_into(tree, &resolved) {
        warn!(%error, "failed to load config file");
    }
}

/// Load the agent config: the file named by `HT_CONFIG_FILE` (if any), then
/// the `HT_*` environment, then the built-in defaults.
pub fn load() -> AgentConfig {
    AgentConfig::loader().load()
}

/// Like [`load`] but reads `path` and ignores `HT_CONFIG_FILE`.
pub fn load_from_file(path: impl AsRef<Path>) -> AgentConfig {
    AgentConfig::loader().file(path.as_ref()).load()
}

/// Overlay the `HT_*` environment and the defaults onto `tree`, skipping
/// the file layer. Leaves already set are kept.
pub fn load_env(tree: &mut AgentConfig) {
    AgentConfig::loader().no_file().load_onto(tree);
}
