//! The agent configuration types, generated from `schema/agent_config.toml`
//! at build time.

use crate::builder::Loader;
use crate::error::ConfigError;

include!(concat!(env!("OUT_DIR"), "/agent_config.rs"));

impl AgentConfig {
    /// A loader preconfigured for the agent: prefix `HT_`, file path taken
    /// from `HT_CONFIG_FILE`, and the built-in defaults.
    pub fn loader() -> Loader<'static, AgentConfig> {
        Loader::new()
            .prefix(crate::ROOT_PREFIX)
            .file_from_env()
            .defaults(crate::default_config())
    }

    /// Overlay the environment and defaults onto this tree. Set leaves are kept.
    pub fn load_env(&mut self) {
        crate::load_env(self);
    }

    /// Pretty-printed JSON of the leaves that are set.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<config>".into(),
            source: e,
        })
    }
}
