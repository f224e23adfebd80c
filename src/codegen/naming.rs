//! Name transforms between schema names, Rust identifiers and env suffixes.

/// Segments that keep their idiomatic all-caps spelling in public names.
const ACRONYMS: &[(&str, &str)] = &[("http", "HTTP"), ("rpc", "RPC")];

/// Words that need the raw-identifier prefix when used as field names.
const RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Type names the generated code refers to unqualified, plus `Self`.
const RESERVED_TYPES: &[&str] = &[
    "Self", "Option", "Some", "None", "Result", "Ok", "Err", "String", "Vec", "Box", "Default",
    "Clone", "Copy", "Send", "Sync", "Sized", "Drop", "From", "Into", "TryFrom", "TryInto",
    "Iterator", "IntoIterator", "ToString", "ToOwned", "PartialEq", "Eq", "PartialOrd", "Ord",
    "AsRef", "AsMut",
];

/// Convert a `snake_case` schema name to its public `CamelCase` form.
///
/// `http` and `rpc` segments become `HTTP` and `RPC`, so `http_headers`
/// yields `HTTPHeaders` and `rpc_body` yields `RPCBody`.
pub fn to_public_name(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            match ACRONYMS
                .iter()
                .find(|(lower, _)| segment.eq_ignore_ascii_case(lower))
            {
                Some((_, upper)) => (*upper).to_string(),
                None => capitalize(segment),
            }
        })
        .collect()
}

/// Convert a schema name to the `UPPER_SNAKE` suffix used in env var names.
///
/// Accepts both `snake_case` and `lowerCamelCase` input.
pub fn to_env_suffix(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase()
            && let Some(p) = prev
            && (p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    out
}

/// Convert a `snake_case` name to `lowerCamelCase` (the JSON name of a field).
pub fn to_lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(segment);
        } else {
            out.push_str(&capitalize(segment));
        }
    }
    out
}

/// Render a field name as a Rust identifier, escaping reserved words.
pub fn rust_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Rust variant name for an enum value such as `TRACECONTEXT` or `B3`.
pub fn variant_name(value: &str) -> String {
    to_public_name(&value.to_ascii_lowercase())
}

/// Whether `name` is a valid `snake_case` field name.
pub fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !matches!(name, "self" | "super" | "crate")
}

/// Whether `name` is a valid `CamelCase` type name that does not shadow a
/// prelude type.
pub fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
        && !RESERVED_TYPES.contains(&name)
}

/// Whether `name` is a valid `UPPER_SNAKE` enum value name.
pub fn is_enum_value_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_name_plain() {
        assert_eq!(to_public_name("service_name"), "ServiceName");
        assert_eq!(to_public_name("endpoint"), "Endpoint");
    }

    #[test]
    fn public_name_keeps_acronyms() {
        assert_eq!(to_public_name("http_headers"), "HTTPHeaders");
        assert_eq!(to_public_name("http_body"), "HTTPBody");
        assert_eq!(to_public_name("rpc_metadata"), "RPCMetadata");
        assert_eq!(to_public_name("rpc_body"), "RPCBody");
    }

    #[test]
    fn public_name_acronym_only_as_whole_segment() {
        assert_eq!(to_public_name("httpx_proxy"), "HttpxProxy");
        assert_eq!(to_public_name("grpc_port"), "GrpcPort");
    }

    #[test]
    fn env_suffix_from_snake() {
        assert_eq!(to_env_suffix("http_headers"), "HTTP_HEADERS");
        assert_eq!(to_env_suffix("rpc_body"), "RPC_BODY");
        assert_eq!(to_env_suffix("body_max_size_bytes"), "BODY_MAX_SIZE_BYTES");
    }

    #[test]
    fn env_suffix_from_camel() {
        assert_eq!(to_env_suffix("serviceName"), "SERVICE_NAME");
        assert_eq!(to_env_suffix("isSecure"), "IS_SECURE");
    }

    #[test]
    fn lower_camel() {
        assert_eq!(to_lower_camel("data_capture"), "dataCapture");
        assert_eq!(to_lower_camel("http_headers"), "httpHeaders");
        assert_eq!(to_lower_camel("enabled"), "enabled");
    }

    #[test]
    fn reserved_words_escaped() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("endpoint"), "endpoint");
    }

    #[test]
    fn variant_names() {
        assert_eq!(variant_name("TRACECONTEXT"), "Tracecontext");
        assert_eq!(variant_name("B3"), "B3");
        assert_eq!(variant_name("HTTP_JSON"), "HTTPJson");
    }

    #[test]
    fn name_validation() {
        assert!(is_field_name("http_headers"));
        assert!(!is_field_name("HttpHeaders"));
        assert!(!is_field_name("self"));
        assert!(is_type_name("AgentConfig"));
        assert!(!is_type_name("agent_config"));
        assert!(is_type_name("Options"));
        for reserved in ["Option", "Vec", "String", "Default", "Self"] {
            assert!(!is_type_name(reserved), "{reserved}");
        }
        assert!(is_enum_value_name("TRACE_CONTEXT"));
        assert!(!is_enum_value_name("TraceContext"));
    }
}
