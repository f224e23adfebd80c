#[cfg(test)]
pub mod test {
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::env::Env;

    /// A synthetic environment.
    pub fn env(pairs: &[(&str, &str)]) -> Env {
        Env::from_pairs(pairs.iter().copied())
    }

    pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub const SAMPLE_JSON: &str = r#"{
  "service_name": "checkout",
  "reporting": {
    "endpoint": "http://api.traceable.ai:9411/api/v2/spans",
    "trace_reporter_type": "OTLP"
  },
  "data_capture": {
    "http_headers": { "response": true }
  },
  "propagation_formats": ["B3"]
}
"#;

    pub const SAMPLE_YAML: &str = "\
service_name: checkout
reporting:
  endpoint: http://api.traceable.ai:9411/api/v2/spans
  trace_reporter_type: OTLP
data_capture:
  http_headers:
    response: true
propagation_formats:
  - B3
";

    // -- Log capture -------------------------------------------------------------

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with a debug-level subscriber and return its result and the
    /// formatted log output.
    pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
        (result, logs)
    }

    #[test]
    fn capture_logs_collects_events() {
        let ((), logs) = capture_logs(|| tracing::warn!(key = "value", "something happened"));
        assert!(logs.contains("something happened"));
        assert!(logs.contains("key=\"value\"") || logs.contains("key=value"));
    }
}
