//! Rust source emission for a resolved [`Schema`].

use super::GenerateOptions;
use super::naming;
use super::schema::{Element, EnumDef, FieldDef, FieldType, MessageDef, Scalar, Schema};

const BTREE_MAP: &str = "::std::collections::BTreeMap";

/// Line-oriented source buffer with four-space indentation.
struct CodeWriter {
    buf: String,
    indent: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn doc(&mut self, doc: &str) {
        for l in doc.lines() {
            let l = l.trim_end();
            if l.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {l}"));
            }
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

pub fn emit_schema(schema: &Schema, options: &GenerateOptions) -> String {
    let mut w = CodeWriter::new();
    match &options.source_name {
        Some(name) => w.line(&format!("// @generated by htconfig from {name}. Do not edit.")),
        None => w.line("// @generated by htconfig. Do not edit."),
    }

    for e in &schema.enums {
        w.blank();
        emit_enum(&mut w, e);
    }
    for m in &schema.messages {
        w.blank();
        emit_struct(&mut w, m);
        if !m.fields.is_empty() {
            w.blank();
            emit_accessors(&mut w, m);
        }
        w.blank();
        emit_overlay_impl(&mut w, m, &options.runtime);
    }
    w.finish()
}

fn emit_enum(w: &mut CodeWriter, e: &EnumDef) {
    w.doc(&e.doc);
    w.line(
        "#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]",
    );
    w.open(&format!("pub enum {} {{", e.name));
    for (i, value) in e.values.iter().enumerate() {
        if i == 0 {
            w.line("#[default]");
        }
        w.line(&format!("#[serde(rename = {value:?})]"));
        w.line(&format!("{},", naming::variant_name(value)));
    }
    w.close("}");
    w.blank();

    w.open(&format!("impl {} {{", e.name));
    w.line("/// Symbolic names in declaration order.");
    let names: Vec<String> = e.values.iter().map(|v| format!("{v:?}")).collect();
    w.line(&format!(
        "pub const NAMES: &'static [&'static str] = &[{}];",
        names.join(", ")
    ));
    w.blank();
    w.line("/// Symbolic name used in config files and env vars.");
    w.open("pub fn as_str_name(&self) -> &'static str {");
    w.open("match self {");
    for value in &e.values {
        w.line(&format!(
            "Self::{} => {value:?},",
            naming::variant_name(value)
        ));
    }
    w.close("}");
    w.close("}");
    w.blank();
    w.line("/// Parse a symbolic name. Unknown names yield `None`.");
    w.open("pub fn from_str_name(value: &str) -> Option<Self> {");
    w.open("match value {");
    for value in &e.values {
        w.line(&format!(
            "{value:?} => Some(Self::{}),",
            naming::variant_name(value)
        ));
    }
    w.line("_ => None,");
    w.close("}");
    w.close("}");
    w.close("}");
    w.blank();

    w.open(&format!("impl ::std::fmt::Display for {} {{", e.name));
    w.open("fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {");
    w.line("f.write_str(self.as_str_name())");
    w.close("}");
    w.close("}");
}

fn field_type(ty: &FieldType) -> String {
    match ty {
        FieldType::Leaf(e) => format!("Option<{}>", e.rust_type()),
        FieldType::Message(m) => format!("Option<{m}>"),
        FieldType::List(e) => format!("Vec<{}>", e.rust_type()),
        FieldType::MessageList(m) => format!("Vec<{m}>"),
        FieldType::Map(k, v) => format!("{BTREE_MAP}<{}, {}>", k.rust_type(), v.rust_type()),
    }
}

fn skip_predicate(ty: &FieldType) -> String {
    match ty {
        FieldType::Leaf(_) | FieldType::Message(_) => "Option::is_none".to_string(),
        FieldType::List(_) | FieldType::MessageList(_) => "Vec::is_empty".to_string(),
        FieldType::Map(..) => format!("{BTREE_MAP}::is_empty"),
    }
}

fn emit_struct(w: &mut CodeWriter, m: &MessageDef) {
    w.doc(&m.doc);
    w.line(
        "#[derive(Debug, Clone, Default, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize)]",
    );
    w.line("#[serde(default)]");
    w.open(&format!("pub struct {} {{", m.name));
    for f in &m.fields {
        w.doc(&f.doc);
        let camel = naming::to_lower_camel(&f.name);
        let skip = skip_predicate(&f.ty);
        if camel != f.name {
            w.line(&format!(
                "#[serde(alias = {camel:?}, skip_serializing_if = {skip:?})]"
            ));
        } else {
            w.line(&format!("#[serde(skip_serializing_if = {skip:?})]"));
        }
        w.line(&format!(
            "pub {}: {},",
            naming::rust_ident(&f.name),
            field_type(&f.ty)
        ));
    }
    w.close("}");
}

/// Expression producing an owned copy of a borrowed scalar named `var`.
fn owned(var: &str, scalar: Scalar) -> String {
    match scalar {
        Scalar::String => format!("{var}.clone()"),
        Scalar::Bool | Scalar::Int32 => format!("*{var}"),
    }
}

fn emit_accessors(w: &mut CodeWriter, m: &MessageDef) {
    w.open(&format!("impl {} {{", m.name));
    for (i, f) in m.fields.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        let ident = naming::rust_ident(&f.name);
        match &f.ty {
            FieldType::Leaf(Element::Scalar(Scalar::String)) => {
                w.line(&format!("/// Returns `{}`, or `\"\"` when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> &str {{"));
                w.line(&format!("self.{ident}.as_deref().unwrap_or(\"\")"));
            }
            FieldType::Leaf(Element::Scalar(Scalar::Bool)) => {
                w.line(&format!("/// Returns `{}`, or `false` when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> bool {{"));
                w.line(&format!("self.{ident}.unwrap_or(false)"));
            }
            FieldType::Leaf(Element::Scalar(Scalar::Int32)) => {
                w.line(&format!("/// Returns `{}`, or `0` when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> i32 {{"));
                w.line(&format!("self.{ident}.unwrap_or(0)"));
            }
            FieldType::Leaf(Element::Enum(name)) => {
                w.line(&format!(
                    "/// Returns `{}`, or the first `{name}` value when unset.",
                    f.name
                ));
                w.open(&format!("pub fn {ident}(&self) -> {name} {{"));
                w.line(&format!("self.{ident}.unwrap_or_default()"));
            }
            FieldType::Message(name) => {
                w.line(&format!("/// Returns the `{}` sub-message, if any.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> Option<&{name}> {{"));
                w.line(&format!("self.{ident}.as_ref()"));
            }
            FieldType::List(e) => {
                w.line(&format!("/// Returns `{}`; empty when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> &[{}] {{", e.rust_type()));
                w.line(&format!("&self.{ident}"));
            }
            FieldType::MessageList(name) => {
                w.line(&format!("/// Returns `{}`; empty when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> &[{name}] {{"));
                w.line(&format!("&self.{ident}"));
            }
            FieldType::Map(k, v) => {
                let map_ty = format!("{BTREE_MAP}<{}, {}>", k.rust_type(), v.rust_type());
                w.line(&format!("/// Returns `{}`; empty when unset.", f.name));
                w.open(&format!("pub fn {ident}(&self) -> &{map_ty} {{"));
                w.line(&format!("&self.{ident}"));
                w.close("}");
                w.blank();
                w.line(&format!(
                    "/// Copies entries from `values` into `{}` for keys not present yet.",
                    f.name
                ));
                w.open(&format!(
                    "pub fn put_{}(&mut self, values: &{map_ty}) {{",
                    f.name
                ));
                w.open("for (key, value) in values {");
                w.line(&format!(
                    "self.{ident}.entry({}).or_insert_with(|| {});",
                    owned("key", *k),
                    owned("value", *v)
                ));
                w.close("}");
            }
        }
        w.close("}");
    }
    w.close("}");
}

fn value_type(element: &Element, rt: &str) -> String {
    match element {
        Element::Scalar(s) => scalar_value_type(*s, rt),
        Element::Enum(name) => format!(
            "{rt}::overlay::ValueType::Enum {{ name: {name:?}, values: {name}::NAMES }}"
        ),
    }
}

fn scalar_value_type(scalar: Scalar, rt: &str) -> String {
    let variant = match scalar {
        Scalar::String => "String",
        Scalar::Bool => "Bool",
        Scalar::Int32 => "Int32",
    };
    format!("{rt}::overlay::ValueType::{variant}")
}

fn field_kind(ty: &FieldType, rt: &str) -> String {
    match ty {
        FieldType::Leaf(e) => format!("{rt}::overlay::FieldKind::Leaf({})", value_type(e, rt)),
        FieldType::List(e) => format!("{rt}::overlay::FieldKind::List({})", value_type(e, rt)),
        FieldType::Map(k, v) => format!(
            "{rt}::overlay::FieldKind::Map {{ key: {}, value: {} }}",
            scalar_value_type(*k, rt),
            scalar_value_type(*v, rt)
        ),
        FieldType::Message(name) => format!(
            "{rt}::overlay::FieldKind::Nested(&<{name} as {rt}::overlay::Overlay>::META)"
        ),
        FieldType::MessageList(name) => format!(
            "{rt}::overlay::FieldKind::NestedList(&<{name} as {rt}::overlay::Overlay>::META)"
        ),
    }
}

fn doc_lines(doc: &str) -> String {
    let lines: Vec<String> = doc.lines().map(|l| format!("{:?}", l.trim_end())).collect();
    format!("&[{}]", lines.join(", "))
}

fn emit_overlay_impl(w: &mut CodeWriter, m: &MessageDef, rt: &str) {
    w.open(&format!("impl {rt}::overlay::Overlay for {} {{", m.name));

    w.open(&format!("const META: {rt}::overlay::Meta = {rt}::overlay::Meta {{"));
    w.line(&format!("name: {:?},", m.name));
    w.line(&format!("doc: {},", doc_lines(&m.doc)));
    if m.fields.is_empty() {
        w.line("fields: &[],");
    } else {
        w.open("fields: &[");
        for f in &m.fields {
            w.open(&format!("{rt}::overlay::Field {{"));
            w.line(&format!("name: {:?},", f.name));
            w.line(&format!(
                "public_name: {:?},",
                naming::to_public_name(&f.name)
            ));
            w.line(&format!("env_suffix: {:?},", naming::to_env_suffix(&f.name)));
            w.line(&format!("doc: {},", doc_lines(&f.doc)));
            w.line(&format!("kind: {},", field_kind(&f.ty, rt)));
            w.close("},");
        }
        w.close("],");
    }
    w.close("};");
    w.blank();

    let uses_env = m.fields.iter().any(|f| {
        matches!(
            f.ty,
            FieldType::Leaf(_) | FieldType::List(_) | FieldType::Message(_)
        )
    });
    let uses_defaults = !m.fields.is_empty();
    let env = if uses_env { "env" } else { "_env" };
    let prefix = if uses_env { "prefix" } else { "_prefix" };
    let defaults = if uses_defaults { "defaults" } else { "_defaults" };

    w.open(&format!(
        "fn overlay(&mut self, {env}: &{rt}::env::Env, {prefix}: &str, {defaults}: Option<&Self>) {{"
    ));
    for (i, f) in m.fields.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        emit_field_overlay(w, f, rt);
    }
    w.close("}");
    w.close("}");
}

fn emit_field_overlay(w: &mut CodeWriter, f: &FieldDef, rt: &str) {
    let ident = naming::rust_ident(&f.name);
    let suffix = naming::to_env_suffix(&f.name);
    let var = format!("&format!(\"{{prefix}}{suffix}\")");

    match &f.ty {
        FieldType::Leaf(element) => {
            let (read, from_default) = match element {
                Element::Scalar(Scalar::String) => (
                    format!("env.get_string({var})"),
                    format!("defaults.and_then(|d| d.{ident}.as_ref())"),
                ),
                Element::Scalar(Scalar::Bool) => (
                    format!("env.get_bool({var})"),
                    format!("defaults.and_then(|d| d.{ident})"),
                ),
                Element::Scalar(Scalar::Int32) => (
                    format!("env.get_int32({var})"),
                    format!("defaults.and_then(|d| d.{ident})"),
                ),
                Element::Enum(name) => (
                    format!("env.get_enum({var}, {name}::from_str_name)"),
                    format!("defaults.and_then(|d| d.{ident})"),
                ),
            };
            let copy = match element {
                Element::Scalar(Scalar::String) => "value.clone()",
                _ => "value",
            };
            w.open(&format!("if self.{ident}.is_none() {{"));
            w.open(&format!("if let Some(value) = {read} {{"));
            w.line(&format!("self.{ident} = Some(value);"));
            w.close(&format!("}} else if let Some(value) = {from_default} {{"));
            w.indent += 1;
            w.line(&format!("self.{ident} = Some({copy});"));
            w.close("}");
            w.close("}");
        }
        FieldType::List(element) => {
            let read = match element {
                Element::Scalar(Scalar::String) => format!("env.get_string_list({var})"),
                Element::Scalar(Scalar::Bool) => {
                    format!("env.get_list({var}, {rt}::env::parse_bool)")
                }
                Element::Scalar(Scalar::Int32) => {
                    format!("env.get_list({var}, {rt}::env::parse_int32)")
                }
                Element::Enum(name) => format!("env.get_list({var}, {name}::from_str_name)"),
            };
            w.open(&format!("if self.{ident}.is_empty() {{"));
            w.open(&format!("if let Some(values) = {read} {{"));
            w.line(&format!("self.{ident} = values;"));
            w.close("} else if let Some(d) = defaults {");
            w.indent += 1;
            w.line(&format!("self.{ident} = d.{ident}.clone();"));
            w.close("}");
            w.close("}");
        }
        FieldType::MessageList(_) => {
            w.open(&format!("if self.{ident}.is_empty()"));
            w.line("&& let Some(d) = defaults");
            w.close("{");
            w.indent += 1;
            w.line(&format!("self.{ident} = d.{ident}.clone();"));
            w.close("}");
        }
        FieldType::Message(name) => {
            w.open(&format!("<{name} as {rt}::overlay::Overlay>::overlay("));
            w.line(&format!("self.{ident}.get_or_insert_with(Default::default),"));
            w.line("env,");
            w.line(&format!("&format!(\"{{prefix}}{suffix}_\"),"));
            w.line(&format!("defaults.and_then(|d| d.{ident}.as_ref()),"));
            w.close(");");
        }
        FieldType::Map(..) => {
            w.open("if let Some(d) = defaults {");
            w.line(&format!("self.put_{}(&d.{ident});", f.name));
            w.close("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::parse_schema;
    use std::path::Path;

    fn generate(src: &str) -> String {
        let schema = parse_schema(src, Path::new("test.toml")).unwrap();
        emit_schema(&schema, &GenerateOptions::new("crate"))
    }

    const SCHEMA: &str = r#"
[[enums]]
name = "Format"
doc = "Wire format."
values = ["B3", "TRACECONTEXT"]

[[messages]]
name = "Capture"
doc = "Capture toggles."

[[messages.fields]]
name = "request"
type = "bool"
doc = "Capture requests."

[[messages]]
name = "Root"

[[messages.fields]]
name = "service_name"
type = "string"

[[messages.fields]]
name = "http_headers"
type = "Capture"

[[messages.fields]]
name = "formats"
type = "repeated Format"

[[messages.fields]]
name = "max_bytes"
type = "int32"

[[messages.fields]]
name = "attributes"
type = "map<string, string>"

[[messages.fields]]
name = "type"
type = "Format"
"#;

    #[test]
    fn header_without_source_name() {
        let code = generate(SCHEMA);
        assert!(code.starts_with("// @generated by htconfig. Do not edit.\n"));
    }

    #[test]
    fn struct_fields_are_nullable() {
        let code = generate(SCHEMA);
        assert!(code.contains("pub struct Root {"));
        assert!(code.contains("pub service_name: Option<String>,"));
        assert!(code.contains("pub http_headers: Option<Capture>,"));
        assert!(code.contains("pub formats: Vec<Format>,"));
        assert!(code.contains("pub max_bytes: Option<i32>,"));
        assert!(code.contains("pub attributes: ::std::collections::BTreeMap<String, String>,"));
        assert!(code.contains("pub r#type: Option<Format>,"));
    }

    #[test]
    fn camel_alias_only_for_multi_word_fields() {
        let code = generate(SCHEMA);
        assert!(code.contains(
            "#[serde(alias = \"serviceName\", skip_serializing_if = \"Option::is_none\")]"
        ));
        assert!(code.contains("    #[serde(skip_serializing_if = \"Vec::is_empty\")]\n    pub formats"));
    }

    #[test]
    fn accessors_fall_back_to_zero_values() {
        let code = generate(SCHEMA);
        assert!(code.contains(
            "    pub fn service_name(&self) -> &str {\n        self.service_name.as_deref().unwrap_or(\"\")\n    }"
        ));
        assert!(code.contains("        self.request.unwrap_or(false)"));
        assert!(code.contains("        self.max_bytes.unwrap_or(0)"));
        assert!(code.contains("    pub fn http_headers(&self) -> Option<&Capture> {"));
        assert!(code.contains("    pub fn r#type(&self) -> Format {"));
    }

    #[test]
    fn map_setter_keeps_existing_keys() {
        let code = generate(SCHEMA);
        let expected = "    /// Copies entries from `values` into `attributes` for keys not present yet.
    pub fn put_attributes(&mut self, values: &::std::collections::BTreeMap<String, String>) {
        for (key, value) in values {
            self.attributes.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
";
        assert!(code.contains(expected), "{code}");
    }

    #[test]
    fn scalar_overlay_reads_env_then_defaults() {
        let code = generate(SCHEMA);
        let expected = "        if self.service_name.is_none() {
            if let Some(value) = env.get_string(&format!(\"{prefix}SERVICE_NAME\")) {
                self.service_name = Some(value);
            } else if let Some(value) = defaults.and_then(|d| d.service_name.as_ref()) {
                self.service_name = Some(value.clone());
            }
        }
";
        assert!(code.contains(expected), "{code}");
    }

    #[test]
    fn enum_list_overlay_parses_names() {
        let code = generate(SCHEMA);
        assert!(code.contains(
            "if let Some(values) = env.get_list(&format!(\"{prefix}FORMATS\"), Format::from_str_name) {"
        ));
        assert!(code.contains("self.formats = d.formats.clone();"));
    }

    #[test]
    fn nested_overlay_extends_prefix() {
        let code = generate(SCHEMA);
        let expected = "        <Capture as crate::overlay::Overlay>::overlay(
            self.http_headers.get_or_insert_with(Default::default),
            env,
            &format!(\"{prefix}HTTP_HEADERS_\"),
            defaults.and_then(|d| d.http_headers.as_ref()),
        );
";
        assert!(code.contains(expected), "{code}");
    }

    #[test]
    fn map_overlay_uses_setter_only() {
        let code = generate(SCHEMA);
        assert!(code.contains(
            "        if let Some(d) = defaults {\n            self.put_attributes(&d.attributes);\n        }"
        ));
        assert!(!code.contains("{prefix}ATTRIBUTES"));
    }

    #[test]
    fn meta_table_carries_public_names() {
        let code = generate(SCHEMA);
        assert!(code.contains("name: \"http_headers\","));
        assert!(code.contains("public_name: \"HTTPHeaders\","));
        assert!(code.contains("env_suffix: \"HTTP_HEADERS\","));
        assert!(code.contains(
            "kind: crate::overlay::FieldKind::Nested(&<Capture as crate::overlay::Overlay>::META),"
        ));
        assert!(code.contains(
            "kind: crate::overlay::FieldKind::List(crate::overlay::ValueType::Enum { name: \"Format\", values: Format::NAMES }),"
        ));
    }

    #[test]
    fn enum_emits_name_conversions() {
        let code = generate(SCHEMA);
        assert!(code.contains("    #[default]\n    #[serde(rename = \"B3\")]\n    B3,"));
        assert!(code.contains("    #[serde(rename = \"TRACECONTEXT\")]\n    Tracecontext,"));
        assert!(code.contains("            Self::Tracecontext => \"TRACECONTEXT\","));
        assert!(code.contains("            \"B3\" => Some(Self::B3),"));
        assert!(code.contains("pub const NAMES: &'static [&'static str] = &[\"B3\", \"TRACECONTEXT\"];"));
    }

    #[test]
    fn runtime_path_is_configurable() {
        let schema = parse_schema(SCHEMA, Path::new("test.toml")).unwrap();
        let code = emit_schema(&schema, &GenerateOptions::new("::htconfig"));
        assert!(code.contains("impl ::htconfig::overlay::Overlay for Root {"));
        assert!(!code.contains("crate::"));
    }

    #[test]
    fn unused_overlay_params_are_underscored() {
        let src = r#"
[[messages]]
name = "Empty"

[[messages]]
name = "Labels"
[[messages.fields]]
name = "values"
type = "map<string, int32>"
"#;
        let code = generate(src);
        assert!(code.contains(
            "fn overlay(&mut self, _env: &crate::env::Env, _prefix: &str, _defaults: Option<&Self>) {"
        ));
        assert!(code.contains(
            "fn overlay(&mut self, _env: &crate::env::Env, _prefix: &str, defaults: Option<&Self>) {"
        ));
        assert!(code.contains("self.values.entry(key.clone()).or_insert_with(|| *value);"));
    }
}
