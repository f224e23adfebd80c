//! Process-wide agent configuration.
//!
//! The config is stored once. Components that start later read it with
//! [`get`], which loads it from the environment if nobody called [`init`].

use std::sync::OnceLock;

use tracing::info;

use crate::AgentConfig;

static CONFIG: OnceLock<AgentConfig> = OnceLock::new();

/// Store `config` as the process-wide config.
///
/// Returns `false` and keeps the existing value if one is already stored.
pub fn init(config: AgentConfig) -> bool {
    match CONFIG.set(config) {
        Ok(()) => true,
        Err(_) => {
            info!("agent config already initialized, ignoring");
            false
        }
    }
}

/// The process-wide config, loaded with [`load`](crate::load) on first use.
pub fn get() -> &'static AgentConfig {
    CONFIG.get_or_init(crate::load)
}
