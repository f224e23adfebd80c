//! Layered configuration for the telemetry agent. Load it once at startup
//! and read typed values.
//!
//! ```ignore
//! let config = htconfig::load();
//! if config.enabled() {
//!     start_reporter(config.reporting());
//! }
//! ```
//!
//! That call reads the file named by `HT_CONFIG_FILE` (JSON or YAML), fills
//! every leaf the file left unset from `HT_*` environment variables, then
//! from the built-in defaults, and hands back an [`AgentConfig`].
//!
//! # Layer precedence
//!
//! ```text
//! Built-in defaults     default_config()
//!        ↑ overridden by
//! Environment vars      HT_REPORTING_ENDPOINT, ...
//!        ↑ overridden by
//! Config file           HT_CONFIG_FILE or load_from_file(path)
//!        ↑ overridden by
//! Caller                fields set before load_env(&mut tree)
//! ```
//!
//! Every layer is sparse. A leaf that no layer sets stays unset, and the
//! accessors return the type's zero value for it (`""`, `false`, `0`).
//!
//! # Nullable leaves
//!
//! Every scalar in the tree is an `Option`, lists and maps are unset when
//! empty, and sub-messages are `Option<Sub>`. This is what lets the overlay
//! tell "the file said `false`" apart from "nobody said anything": only
//! unset leaves are ever filled.
//!
//! # Environment variables
//!
//! Names are derived from the field path: `HT_` followed by the upper-snake
//! form of each message on the path and of the leaf, joined by `_`.
//!
//! | Env var | Config key |
//! |---------|------------|
//! | `HT_SERVICE_NAME` | `service_name` |
//! | `HT_REPORTING_SECURE` | `reporting.secure` |
//! | `HT_DATA_CAPTURE_HTTP_HEADERS_REQUEST` | `data_capture.http_headers.request` |
//!
//! Booleans accept only `true` and `false`. Integers must fit in `i32`.
//! Lists are comma-separated; unknown enum names in a list are skipped.
//! Empty or malformed values are treated as absent. Maps cannot be set from
//! the environment. [`ops::env_vars`] lists every variable.
//!
//! # Errors
//!
//! Loading never fails: a missing, unreadable or malformed file is logged
//! with `tracing` at warn level and the remaining layers still apply. The
//! file loader and the introspection operations return [`ConfigError`].
//!
//! # Code generation
//!
//! The config types are generated from `schema/agent_config.toml` at build
//! time by the [`codegen`] module, which is also available to generate
//! config types for other schemas (`htconfig gen`).

pub mod codegen;
pub mod env;
pub mod error;
pub mod global;
pub mod ops;
pub mod overlay;
pub mod types;

mod builder;
#[cfg(feature = "cli")]
mod cli;
mod config;
mod defaults;
mod file;
pub(crate) mod merge;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{Loader, ROOT_PREFIX, load, load_env, load_from_file};
#[cfg(feature = "cli")]
pub use cli::{Cli, Command};
pub use config::{AgentConfig, DataCapture, Message, PropagationFormat, Reporting, TraceReporterType};
pub use defaults::default_config;
pub use env::Env;
pub use error::ConfigError;
pub use ops::ConfigResult;
pub use overlay::Overlay;
pub use types::ConfigAction;
