//! Typed module schemas.
//!
//! Manifests are loose JSON. They are converted once into these types so the
//! synthesizer never branches on untyped values. Conversion is tolerant:
//! shapes it does not recognize become [`ParamKind::Unknown`] instead of
//! failing the module.

use serde_json::{Map, Value};

/// Name of the parameter that carries a module's feature flags.
pub const FEATURES_PARAM: &str = "features";

/// Keys describing a parameter itself rather than one of its features.
const SPEC_KEYS: &[&str] = &["type", "description", "required", "default", "properties", "options", "enum"];

/// A module manifest (`adapter.json`, `connector.json`, `feature.json`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSchema {
    /// Explicit module ID overriding the directory-derived one.
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub category: Option<String>,
    /// Capabilities from `capabilities` and `provides`, in source order.
    pub capabilities: Vec<String>,
    /// Parameters in source order.
    pub parameters: Vec<ParamSpec>,
}

/// One parameter (or one feature flag).
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: Option<bool>,
    pub default: Option<Value>,
    pub description: Option<String>,
}

/// The shape of a parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// `type: 'string'`, optionally restricted by `options`/`enum`.
    String { options: Vec<Value> },
    Number,
    Boolean,
    /// `type: 'array'` with the shape of its `items`, if declared.
    Array { items: Option<Box<ParamKind>> },
    Object,
    /// The special `features` parameter: one nested flag per entry.
    Features(Vec<ParamSpec>),
    /// Missing or unrecognized type.
    Unknown,
}

impl ParamSpec {
    /// Optional unless explicitly required with no default.
    pub fn is_optional(&self) -> bool {
        !(self.required == Some(true) && self.default.is_none())
    }
}

impl ModuleSchema {
    /// Converts a manifest JSON value. Non-object input yields an empty schema.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut capabilities = Vec::new();
        for key in ["capabilities", "provides"] {
            match obj.get(key) {
                Some(Value::Array(items)) => {
                    capabilities.extend(items.iter().filter_map(capability_name));
                }
                Some(Value::Object(map)) => capabilities.extend(map.keys().cloned()),
                Some(Value::String(s)) => capabilities.push(s.clone()),
                _ => {}
            }
        }
        capabilities.dedup();

        Self {
            id: string_field(obj, "id"),
            name: string_field(obj, "name"),
            description: string_field(obj, "description"),
            version: string_field(obj, "version"),
            category: string_field(obj, "category"),
            capabilities,
            parameters: obj.get("parameters").map(parse_parameters).unwrap_or_default(),
        }
    }

    /// Feature flags declared through the `features` parameter.
    pub fn features(&self) -> &[ParamSpec] {
        self.parameters
            .iter()
            .find_map(|p| match &p.kind {
                ParamKind::Features(features) if p.name == FEATURES_PARAM => Some(features.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Parses a `parameters` block. Accepts the usual object form and an array of
/// `{ name, ... }` entries.
pub fn parse_parameters(value: &Value) -> Vec<ParamSpec> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(name, spec)| parse_param(name, spec))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?;
                Some(parse_param(name, item))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_param(name: &str, spec: &Value) -> ParamSpec {
    let Some(obj) = spec.as_object() else {
        return ParamSpec {
            name: name.to_string(),
            kind: ParamKind::Unknown,
            required: None,
            default: None,
            description: None,
        };
    };

    let kind = if name == FEATURES_PARAM {
        ParamKind::Features(parse_features(obj))
    } else {
        parse_kind(obj)
    };

    ParamSpec {
        name: name.to_string(),
        kind,
        required: obj.get("required").and_then(Value::as_bool),
        default: obj.get("default").cloned(),
        description: string_field(obj, "description"),
    }
}

/// Reads the flags of a `features` parameter, from its `properties` map when
/// present and from its own entries otherwise, minus the parameter's own
/// spec keys.
fn parse_features(obj: &Map<String, Value>) -> Vec<ParamSpec> {
    let properties = obj.get("properties").and_then(Value::as_object);
    let entries = properties.unwrap_or(obj);

    entries
        .iter()
        .filter(|(name, _)| properties.is_some() || !SPEC_KEYS.contains(&name.as_str()))
        .filter_map(|(name, spec)| match spec {
            Value::Object(feature) => Some(parse_feature(name, feature)),
            Value::Bool(enabled) => Some(ParamSpec {
                name: name.clone(),
                kind: ParamKind::Boolean,
                required: None,
                default: Some(Value::Bool(*enabled)),
                description: None,
            }),
            _ => None,
        })
        .collect()
}

fn parse_feature(name: &str, obj: &Map<String, Value>) -> ParamSpec {
    let typed = obj.contains_key("type") || options_of(obj).is_some();
    ParamSpec {
        name: name.to_string(),
        kind: if typed { parse_kind(obj) } else { ParamKind::Boolean },
        required: obj.get("required").and_then(Value::as_bool),
        default: obj.get("default").cloned(),
        description: string_field(obj, "description"),
    }
}

fn parse_kind(obj: &Map<String, Value>) -> ParamKind {
    let options = options_of(obj);
    match obj.get("type").and_then(Value::as_str) {
        Some("string") => ParamKind::String {
            options: options.cloned().unwrap_or_default(),
        },
        Some("number") | Some("integer") => ParamKind::Number,
        Some("boolean") => ParamKind::Boolean,
        Some("array") => ParamKind::Array {
            items: obj
                .get("items")
                .and_then(Value::as_object)
                .map(|items| Box::new(parse_kind(items))),
        },
        Some("object") => ParamKind::Object,
        None if options.is_some() => ParamKind::String {
            options: options.cloned().unwrap_or_default(),
        },
        _ => ParamKind::Unknown,
    }
}

fn options_of(obj: &Map<String, Value>) -> Option<&Vec<Value>> {
    obj.get("options")
        .or_else(|| obj.get("enum"))
        .and_then(Value::as_array)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn capability_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => string_field(obj, "id").or_else(|| string_field(obj, "name")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameters_keep_source_order() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number" },
                "mid": { "type": "boolean" }
            }
        }));
        let names: Vec<_> = schema.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_string_options_and_enum() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "provider": { "type": "string", "options": ["neon", "supabase"] },
                "mode": { "enum": ["a", "b"] }
            }
        }));
        assert_eq!(
            schema.parameters[0].kind,
            ParamKind::String { options: vec![json!("neon"), json!("supabase")] }
        );
        assert_eq!(
            schema.parameters[1].kind,
            ParamKind::String { options: vec![json!("a"), json!("b")] }
        );
    }

    #[test]
    fn test_array_items() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "locales": { "type": "array", "items": { "type": "string", "enum": ["en", "fr"] } },
                "tags": { "type": "array" }
            }
        }));
        assert_eq!(
            schema.parameters[0].kind,
            ParamKind::Array {
                items: Some(Box::new(ParamKind::String { options: vec![json!("en"), json!("fr")] }))
            }
        );
        assert_eq!(schema.parameters[1].kind, ParamKind::Array { items: None });
    }

    #[test]
    fn test_features_default_to_boolean() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "features": {
                    "migrations": { "type": "boolean" },
                    "studio": { "description": "Drizzle Studio" },
                    "seeding": true,
                    "description": "not a feature"
                }
            }
        }));
        let features = schema.features();
        let names: Vec<_> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["migrations", "studio", "seeding"]);
        assert!(features.iter().all(|f| f.kind == ParamKind::Boolean));
        assert_eq!(features[1].description.as_deref(), Some("Drizzle Studio"));
    }

    #[test]
    fn test_features_skip_own_spec_keys() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "features": {
                    "type": "object",
                    "required": false,
                    "default": { "migrations": true },
                    "migrations": { "type": "boolean" }
                }
            }
        }));
        let names: Vec<_> = schema.features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["migrations"]);
        assert_eq!(schema.parameters[0].default, Some(json!({ "migrations": true })));
    }

    #[test]
    fn test_features_properties_form() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "features": {
                    "type": "object",
                    "properties": { "mfa": {}, "social": { "type": "array", "items": { "enum": ["github"] } } }
                }
            }
        }));
        let features = schema.features();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].kind, ParamKind::Boolean);
        assert!(matches!(features[1].kind, ParamKind::Array { .. }));
    }

    #[test]
    fn test_malformed_values_degrade_to_unknown() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "weird": { "type": 42 },
                "bare": "string",
                "custom": { "type": "date" }
            }
        }));
        assert!(schema.parameters.iter().all(|p| p.kind == ParamKind::Unknown));
    }

    #[test]
    fn test_non_object_manifest_is_empty() {
        assert_eq!(ModuleSchema::from_value(&json!([1, 2])), ModuleSchema::default());
    }

    #[test]
    fn test_optionality() {
        let schema = ModuleSchema::from_value(&json!({
            "parameters": {
                "a": { "type": "string" },
                "b": { "type": "string", "required": true },
                "c": { "type": "string", "required": true, "default": "x" },
                "d": { "type": "string", "required": false }
            }
        }));
        let optional: Vec<_> = schema.parameters.iter().map(|p| p.is_optional()).collect();
        assert_eq!(optional, vec![true, false, true, true]);
    }

    #[test]
    fn test_capabilities() {
        let schema = ModuleSchema::from_value(&json!({
            "id": "database/drizzle",
            "capabilities": ["database", { "id": "orm" }],
            "provides": "migrations"
        }));
        assert_eq!(schema.id.as_deref(), Some("database/drizzle"));
        assert_eq!(schema.capabilities, vec!["database", "orm", "migrations"]);
    }
}
