//! Config file loading.
//!
//! The format is picked from the lowercased extension: `.json` is parsed
//! directly, `.yaml`/`.yml` is parsed into a JSON document first so one
//! typed decoder covers both. Any other extension is rejected.
//!
//! Loading merges into an existing tree: leaves the file sets replace the
//! tree's values, leaves the file omits keep whatever the tree held. Unknown
//! keys are logged at debug level and otherwise ignored. A value of the wrong
//! type is logged at warn level and dropped; the rest of the file still
//! applies.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::merge::deep_merge;
use crate::overlay::Overlay;
use crate::validate::{decode_tracking_unknown, drop_mistyped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Load the file at `path` into `tree`.
pub fn load_file_into<C>(tree: &mut C, path: &Path) -> Result<(), ConfigError>
where
    C: Overlay + Serialize + DeserializeOwned,
{
    let format = Format::from_path(path).ok_or_else(|| ConfigError::UnknownExtension {
        path: path.to_path_buf(),
    })?;

    let mut file = File::open(path).map_err(|e| ConfigError::OpenError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    drop(file);

    let document = parse_document(&content, format, path)?;
    merge_document(tree, document, path)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(())
}

/// Parse `content` into a JSON document.
pub fn parse_document(content: &str, format: Format, path: &Path) -> Result<Value, ConfigError> {
    let value = match format {
        Format::Json => serde_json::from_str::<Value>(content).map_err(|e| {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            }
        })?,
        Format::Yaml => serde_yaml::from_str::<Value>(content).map_err(|e| {
            ConfigError::YamlError {
                path: path.to_path_buf(),
                source: e,
            }
        })?,
    };
    // An empty YAML document decodes to null.
    Ok(match value {
        Value::Null => Value::Object(Map::new()),
        other => other,
    })
}

fn merge_document<C>(tree: &mut C, mut document: Value, path: &Path) -> Result<(), ConfigError>
where
    C: Overlay + Serialize + DeserializeOwned,
{
    let to_parse_error = |e: serde_json::Error| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    };

    for value in drop_mistyped(&mut document, &C::META) {
        warn!(
            key = %value.path,
            expected = %value.expected,
            path = %path.display(),
            "ignoring config value of the wrong type"
        );
    }

    let (from_file, unknown_keys): (C, _) =
        decode_tracking_unknown(document).map_err(to_parse_error)?;
    for key in &unknown_keys {
        debug!(key = %key, path = %path.display(), "ignoring unknown config key");
    }

    let base = serde_json::to_value(&*tree).map_err(to_parse_error)?;
    let overlay = serde_json::to_value(&from_file).map_err(to_parse_error)?;
    let merged = match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(deep_merge(base, overlay)),
        (_, overlay) => overlay,
    };
    *tree = serde_json::from_value(merged).map_err(to_parse_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{SAMPLE_JSON, SAMPLE_YAML, capture_logs, write_file};
    use crate::{AgentConfig, PropagationFormat, Reporting, TraceReporterType};
    use tempfile::TempDir;

    fn load(dir: &TempDir, name: &str, content: &str) -> Result<AgentConfig, ConfigError> {
        let path = write_file(dir, name, content);
        let mut tree = AgentConfig::default();
        load_file_into(&mut tree, &path)?;
        Ok(tree)
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.Yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.toml")), None);
        assert_eq!(Format::from_path(Path::new("config")), None);
    }

    #[test]
    fn loads_json() {
        let dir = TempDir::new().unwrap();
        let tree = load(&dir, "config.json", SAMPLE_JSON).unwrap();
        assert_eq!(tree.service_name(), "checkout");
        let reporting = tree.reporting().unwrap();
        assert_eq!(reporting.endpoint(), "http://api.traceable.ai:9411/api/v2/spans");
        assert_eq!(reporting.trace_reporter_type(), TraceReporterType::Otlp);
        assert_eq!(reporting.secure, None);
        assert_eq!(tree.propagation_formats(), &[PropagationFormat::B3]);
    }

    #[test]
    fn yaml_and_json_decode_identically() {
        let dir = TempDir::new().unwrap();
        let from_json = load(&dir, "config.json", SAMPLE_JSON).unwrap();
        let from_yaml = load(&dir, "config.yaml", SAMPLE_YAML).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn omitted_leaves_stay_unset() {
        let dir = TempDir::new().unwrap();
        let tree = load(&dir, "config.yml", "enabled: true\n").unwrap();
        assert_eq!(tree.enabled, Some(true));
        assert_eq!(tree.reporting, None);
        assert_eq!(tree.service_name, None);
    }

    #[test]
    fn explicit_false_and_empty_string_are_set() {
        let dir = TempDir::new().unwrap();
        let tree = load(
            &dir,
            "config.json",
            r#"{"enabled": false, "service_name": "", "reporting": {"secure": false}}"#,
        )
        .unwrap();
        assert_eq!(tree.enabled, Some(false));
        assert_eq!(tree.service_name, Some(String::new()));
        assert_eq!(tree.reporting().unwrap().secure, Some(false));
    }

    #[test]
    fn camel_case_keys_accepted() {
        let dir = TempDir::new().unwrap();
        let tree = load(
            &dir,
            "config.yaml",
            "serviceName: svc\ndataCapture:\n  bodyMaxSizeBytes: 512\n",
        )
        .unwrap();
        assert_eq!(tree.service_name(), "svc");
        assert_eq!(tree.data_capture().unwrap().body_max_size_bytes(), 512);
    }

    #[test]
    fn unknown_keys_ignored() {
        let dir = TempDir::new().unwrap();
        let tree = load(
            &dir,
            "config.json",
            r#"{"service_name": "svc", "typo": 1, "reporting": {"extra": true}}"#,
        )
        .unwrap();
        assert_eq!(tree.service_name(), "svc");
    }

    #[test]
    fn empty_yaml_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let tree = load(&dir, "config.yaml", "").unwrap();
        assert_eq!(tree, AgentConfig::default());
    }

    #[test]
    fn merges_over_existing_tree() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.json", r#"{"reporting": {"token": "t"}}"#);
        let mut tree = AgentConfig {
            service_name: Some("preset".into()),
            reporting: Some(Reporting {
                endpoint: Some("http://preset".into()),
                token: Some("old".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        load_file_into(&mut tree, &path).unwrap();
        assert_eq!(tree.service_name(), "preset");
        let reporting = tree.reporting().unwrap();
        assert_eq!(reporting.endpoint(), "http://preset");
        assert_eq!(reporting.token(), "t");
    }

    #[test]
    fn unknown_extension() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir, "config.toml", "enabled = true").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownExtension { .. }));
    }

    #[test]
    fn missing_file_is_open_error() {
        let mut tree = AgentConfig::default();
        let err = load_file_into(&mut tree, Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::OpenError { .. }));
    }

    #[test]
    fn directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf.json");
        std::fs::create_dir(&path).unwrap();
        let mut tree = AgentConfig::default();
        let err = load_file_into(&mut tree, &path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ReadError { .. } | ConfigError::OpenError { .. }
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir, "config.json", "{\"enabled\": ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir, "config.yaml", "reporting: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::YamlError { .. }));
    }

    #[test]
    fn mistyped_leaf_keeps_the_rest_of_the_file() {
        let dir = TempDir::new().unwrap();
        let tree = load(
            &dir,
            "config.json",
            r#"{"service_name": "checkout",
                "reporting": {"endpoint": "http://api.traceable.ai:9411/api/v2/spans"},
                "data_capture": {"body_max_size_bytes": "big"}}"#,
        )
        .unwrap();
        assert_eq!(tree.service_name(), "checkout");
        assert_eq!(
            tree.reporting().unwrap().endpoint(),
            "http://api.traceable.ai:9411/api/v2/spans"
        );
        assert_eq!(tree.data_capture().unwrap().body_max_size_bytes, None);
    }

    #[test]
    fn mistyped_leaf_is_logged() {
        let dir = TempDir::new().unwrap();
        let (tree, logs) = capture_logs(|| load(&dir, "config.yaml", "enabled: maybe
service_name: svc
"));
        let tree = tree.unwrap();
        assert_eq!(tree.enabled, None);
        assert_eq!(tree.service_name(), "svc");
        assert!(logs.contains("WARN"));
        assert!(logs.contains("ignoring config value of the wrong type"));
        assert!(logs.contains("key=enabled"));
    }

    #[test]
    fn non_object_document_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir, "config.json", "[1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn failed_load_leaves_tree_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.json", "not json");
        let mut tree = AgentConfig {
            enabled: Some(true),
            ..Default::default()
        };
        assert!(load_file_into(&mut tree, &path).is_err());
        assert_eq!(tree.enabled, Some(true));
    }
}
