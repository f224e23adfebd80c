use std::sync::LazyLock;

use crate::{AgentConfig, DataCapture, Message, PropagationFormat, Reporting, TraceReporterType};

pub const DEFAULT_REPORTING_ENDPOINT: &str = "http://localhost:9411/api/v2/spans";
pub const DEFAULT_BODY_MAX_SIZE_BYTES: i32 = 131_072;

static DEFAULT_CONFIG: LazyLock<AgentConfig> = LazyLock::new(build);

/// The process-wide defaults tier consulted by [`load`](crate::load).
///
/// `service_name` and `enabled` have no default and stay unset unless a file
/// or the environment provides them.
pub fn default_config() -> &'static AgentConfig {
    &DEFAULT_CONFIG
}

fn capture_both() -> Option<Message> {
    Some(Message {
        request: Some(true),
        response: Some(true),
    })
}

fn build() -> AgentConfig {
    AgentConfig {
        propagation_formats: vec![PropagationFormat::Tracecontext],
        reporting: Some(Reporting {
            endpoint: Some(DEFAULT_REPORTING_ENDPOINT.to_string()),
            secure: Some(false),
            trace_reporter_type: Some(TraceReporterType::Zipkin),
            cert_file: Some(String::new()),
            ..Default::default()
        }),
        data_capture: Some(DataCapture {
            http_headers: capture_both(),
            http_body: capture_both(),
            rpc_metadata: capture_both(),
            rpc_body: capture_both(),
            body_max_size_bytes: Some(DEFAULT_BODY_MAX_SIZE_BYTES),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_values() {
        let d = default_config();
        assert_eq!(d.service_name, None);
        assert_eq!(d.enabled, None);
        assert_eq!(d.propagation_formats(), &[PropagationFormat::Tracecontext]);

        let reporting = d.reporting().unwrap();
        assert_eq!(reporting.endpoint(), DEFAULT_REPORTING_ENDPOINT);
        assert_eq!(reporting.secure, Some(false));
        assert_eq!(reporting.trace_reporter_type, Some(TraceReporterType::Zipkin));
        assert_eq!(reporting.cert_file, Some(String::new()));
        assert_eq!(reporting.token, None);
    }

    #[test]
    fn every_channel_captures_both_directions() {
        let dc = default_config().data_capture().unwrap();
        for channel in [&dc.http_headers, &dc.http_body, &dc.rpc_metadata, &dc.rpc_body] {
            assert_eq!(channel.as_ref(), capture_both().as_ref());
        }
        assert_eq!(dc.body_max_size_bytes(), 131072);
        assert!(dc.allowed_content_types().is_empty());
    }

    #[test]
    fn same_instance_every_call() {
        assert!(std::ptr::eq(default_config(), default_config()));
    }
}
