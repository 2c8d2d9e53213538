//! Module manifest loading.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::diagnostic::GeneratorError;
use crate::ir::{ModuleSchema, ModuleType};

/// Finds the manifest for a module directory, honoring the lookup order of
/// the module type.
pub fn find_manifest(dir: &Path, module_type: ModuleType) -> Option<PathBuf> {
    module_type
        .manifest_names()
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Reads a manifest as raw JSON.
///
/// Any read or parse failure yields an empty object, which callers treat as
/// "no parameters".
pub fn load_constitutional_schema(path: &Path) -> Value {
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "falling back to empty schema");
            Value::Object(Default::default())
        }
    }
}

/// Reads and converts a manifest, reporting why it could not be used.
pub fn try_load_schema(path: &Path) -> Result<ModuleSchema, GeneratorError> {
    let value = read_json(path)?;
    if !value.is_object() {
        return Err(GeneratorError::ManifestInvalid {
            path: path.to_path_buf(),
            message: "expected a JSON object".to_string(),
        });
    }
    if let Some(params) = value.get("parameters") {
        if !(params.is_object() || params.is_array()) {
            return Err(GeneratorError::ManifestInvalid {
                path: path.to_path_buf(),
                message: "'parameters' must be an object".to_string(),
            });
        }
    }
    Ok(ModuleSchema::from_value(&value))
}

fn read_json(path: &Path) -> Result<Value, GeneratorError> {
    let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| GeneratorError::ManifestInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_json_loads_as_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adapter.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_constitutional_schema(&path), serde_json::json!({}));
        assert!(matches!(
            try_load_schema(&path),
            Err(GeneratorError::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn test_missing_file_loads_as_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feature.json");

        assert_eq!(load_constitutional_schema(&path), serde_json::json!({}));
        assert!(matches!(try_load_schema(&path), Err(GeneratorError::IoError { .. })));
    }

    #[test]
    fn test_parameters_must_be_structured() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adapter.json");
        std::fs::write(&path, r#"{ "parameters": "nope" }"#).unwrap();

        assert!(matches!(
            try_load_schema(&path),
            Err(GeneratorError::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn test_connector_manifest_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("integration.json"), "{}").unwrap();

        let found = find_manifest(dir.path(), ModuleType::Connector).unwrap();
        assert!(found.ends_with("integration.json"));

        std::fs::write(dir.path().join("connector.json"), "{}").unwrap();
        let found = find_manifest(dir.path(), ModuleType::Connector).unwrap();
        assert!(found.ends_with("connector.json"));

        assert!(find_manifest(dir.path(), ModuleType::Adapter).is_none());
    }
}
