//! Parameter and feature interface synthesis.

use serde_json::Value;

use crate::ir::{parse_parameters, ModuleSchema, ParamKind, ParamSpec};
use super::ts_types::{render_interface, TsInterface, TsProperty, TsType};

/// Maps a parameter kind to its TypeScript type.
pub fn param_type(kind: &ParamKind) -> TsType {
    match kind {
        ParamKind::String { options } if !options.is_empty() => {
            TsType::Union(options.iter().map(literal).collect())
        }
        ParamKind::String { .. } => TsType::String,
        ParamKind::Number => TsType::Number,
        ParamKind::Boolean => TsType::Boolean,
        ParamKind::Array { items } => array_type(items.as_deref()),
        ParamKind::Object => TsType::Record(Box::new(TsType::Any)),
        ParamKind::Features(features) => {
            TsType::Object(features.iter().map(param_property).collect())
        }
        ParamKind::Unknown => TsType::Any,
    }
}

fn array_type(items: Option<&ParamKind>) -> TsType {
    match items {
        Some(ParamKind::String { options }) if !options.is_empty() => {
            TsType::GenericArray(Box::new(TsType::Union(options.iter().map(literal).collect())))
        }
        Some(ParamKind::Number) => TsType::Array(Box::new(TsType::Number)),
        Some(ParamKind::Boolean) => TsType::Array(Box::new(TsType::Boolean)),
        Some(ParamKind::Object) => TsType::Array(Box::new(TsType::Record(Box::new(TsType::Any)))),
        _ => TsType::Array(Box::new(TsType::String)),
    }
}

/// A literal type for an option value. Strings are quoted; numbers and
/// booleans keep their JSON spelling.
fn literal(value: &Value) -> TsType {
    match value {
        Value::String(s) => TsType::StringLiteral(s.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Null => TsType::RawLiteral(value.to_string()),
        _ => TsType::Any,
    }
}

/// One interface property for a parameter or feature flag.
pub fn param_property(spec: &ParamSpec) -> TsProperty {
    TsProperty::new(spec.name.clone(), param_type(&spec.kind))
        .optional(spec.is_optional())
        .doc(spec.description.clone())
}

/// The `XParams` interface of a module.
pub fn params_interface(name: &str, schema: &ModuleSchema) -> TsInterface {
    TsInterface {
        name: name.to_string(),
        properties: schema.parameters.iter().map(param_property).collect(),
        doc: schema.description.clone(),
    }
}

/// The `XFeatures` interface of a module: its feature flags at top level.
pub fn features_interface(name: &str, schema: &ModuleSchema) -> TsInterface {
    TsInterface {
        name: name.to_string(),
        properties: schema.features().iter().map(param_property).collect(),
        doc: None,
    }
}

/// Renders an interface straight from a raw `parameters` JSON block.
pub fn synthesize_interface(name: &str, parameters: &Value) -> String {
    let schema = ModuleSchema {
        parameters: parse_parameters(parameters),
        ..ModuleSchema::default()
    };
    render_interface(&params_interface(name, &schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_parameters() {
        assert_eq!(synthesize_interface("XParams", &json!({})), "export interface XParams {}\n");
        assert_eq!(synthesize_interface("XParams", &json!(null)), "export interface XParams {}\n");
    }

    #[test]
    fn test_options_become_ordered_union() {
        let out = synthesize_interface(
            "XParams",
            &json!({ "provider": { "type": "string", "options": ["supabase", "neon", "local"] } }),
        );
        assert!(out.contains("  provider?: 'supabase' | 'neon' | 'local';\n"));
    }

    #[test]
    fn test_hyphenated_names_are_quoted() {
        let out = synthesize_interface(
            "XParams",
            &json!({
                "my-prop": { "type": "boolean" },
                "plain": { "type": "boolean" }
            }),
        );
        assert!(out.contains("  'my-prop'?: boolean;\n"));
        assert!(out.contains("  plain?: boolean;\n"));
    }

    #[test]
    fn test_type_mapping() {
        let out = synthesize_interface(
            "XParams",
            &json!({
                "name": { "type": "string", "required": true },
                "port": { "type": "number", "default": 3000 },
                "locales": { "type": "array", "items": { "type": "string", "options": ["en", "fr"] } },
                "tags": { "type": "array", "items": { "type": "string" } },
                "retries": { "type": "array", "items": { "type": "number" } },
                "meta": { "type": "object" },
                "mystery": { "type": "date" },
                "level": { "type": "string", "enum": [1, 2] }
            }),
        );
        assert_eq!(
            out,
            "export interface XParams {\n  name: string;\n  port?: number;\n  locales?: Array<'en' | 'fr'>;\n  tags?: string[];\n  retries?: number[];\n  meta?: Record<string, any>;\n  mystery?: any;\n  level?: 1 | 2;\n}\n"
        );
    }

    #[test]
    fn test_nested_features() {
        let out = synthesize_interface(
            "DatabaseDrizzleParams",
            &json!({
                "provider": { "type": "string", "options": ["neon", "supabase"] },
                "features": { "migrations": { "type": "boolean" }, "studio": {} }
            }),
        );
        assert_eq!(
            out,
            "export interface DatabaseDrizzleParams {\n  provider?: 'neon' | 'supabase';\n  features?: {\n    migrations?: boolean;\n    studio?: boolean;\n  };\n}\n"
        );
    }

    #[test]
    fn test_features_parameter_spec_keys_stay_out_of_type() {
        let out = synthesize_interface(
            "XParams",
            &json!({
                "features": {
                    "type": "object",
                    "required": false,
                    "default": { "migrations": true },
                    "migrations": { "type": "boolean" }
                }
            }),
        );
        assert_eq!(
            out,
            "export interface XParams {\n  features?: {\n    migrations?: boolean;\n  };\n}\n"
        );
    }

    #[test]
    fn test_descriptions_become_doc_comments() {
        let out = synthesize_interface(
            "XParams",
            &json!({ "apiKey": { "type": "string", "description": "Provider API key" } }),
        );
        assert!(out.contains("  /** Provider API key */\n  apiKey?: string;\n"));
    }

    #[test]
    fn test_features_interface() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": { "features": { "mfa": { "default": false } } }
        }));
        let rendered = render_interface(&features_interface("AuthFeatures", &schema));
        assert_eq!(rendered, "export interface AuthFeatures {\n  mfa?: boolean;\n}\n");

        let none = render_interface(&features_interface("NoFeatures", &ModuleSchema::default()));
        assert_eq!(none, "export interface NoFeatures {}\n");
    }
}
