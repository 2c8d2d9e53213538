//! Per-module declaration files.

use crate::ir::{ModuleEntry, ModuleType};
use super::artifacts::format_artifacts;
use super::params::{features_interface, params_interface};
use super::ts_types::{render_decl, render_interface, to_pascal_case, TsDecl, TsType};
use super::HEADER;

/// Exported type names for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTypeNames {
    pub params: String,
    pub features: String,
    pub artifacts: String,
    pub id: String,
}

impl ModuleTypeNames {
    pub fn for_id(module_id: &str) -> Self {
        let base = to_pascal_case(module_id);
        Self {
            params: format!("{}Params", base),
            features: format!("{}Features", base),
            artifacts: format!("{}Artifacts", base),
            id: format!("{}Id", base),
        }
    }
}

/// Output directory of a module, relative to the output root.
///
/// `database/drizzle` lands in `adapters/database/drizzle`,
/// `features/auth/frontend/shadcn` in `features/auth/frontend/shadcn`.
pub fn module_dir(module_id: &str, module_type: ModuleType) -> String {
    format!("{}/{}", module_type.dir_name(), module_type.relative_dir(module_id))
}

/// ESM import specifier for a module's declarations, relative to the output root.
pub fn module_specifier(module: &ModuleEntry) -> String {
    format!("./{}/index.js", module_dir(&module.id, module.module_type))
}

/// Generates `<type-dir>/<id>/index.d.ts` for one module.
pub fn generate_module_types(module: &ModuleEntry) -> String {
    let names = ModuleTypeNames::for_id(&module.id);
    let mut code = String::new();

    code.push_str(HEADER);
    code.push_str(&format!("// {} ({})\n\n", module.id, module.module_type));

    code.push_str(&render_interface(&params_interface(&names.params, &module.schema)));
    code.push('\n');
    code.push_str(&render_interface(&features_interface(&names.features, &module.schema)));
    code.push('\n');
    code.push_str(&format_artifacts(&names.artifacts, &module.artifacts));
    code.push('\n');
    code.push_str(&render_decl(&TsDecl::TypeAlias {
        name: names.id,
        ty: TsType::StringLiteral(module.id.clone()),
        doc: module.schema.name.clone(),
    }));

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ModuleArtifacts, ModuleSchema};
    use serde_json::json;
    use std::path::PathBuf;

    fn drizzle() -> ModuleEntry {
        ModuleEntry {
            id: "database/drizzle".to_string(),
            module_type: ModuleType::Adapter,
            schema: ModuleSchema::from_value(&json!({
                "name": "Drizzle ORM",
                "parameters": {
                    "provider": { "type": "string", "options": ["neon", "supabase"] },
                    "features": { "migrations": { "type": "boolean" } }
                }
            })),
            artifacts: ModuleArtifacts::default(),
            source_dir: PathBuf::from("adapters/database/drizzle"),
        }
    }

    #[test]
    fn test_type_names() {
        let names = ModuleTypeNames::for_id("features/auth/frontend/shadcn");
        assert_eq!(names.params, "FeaturesAuthFrontendShadcnParams");
        assert_eq!(names.features, "FeaturesAuthFrontendShadcnFeatures");
        assert_eq!(names.artifacts, "FeaturesAuthFrontendShadcnArtifacts");
        assert_eq!(names.id, "FeaturesAuthFrontendShadcnId");
    }

    #[test]
    fn test_module_dirs() {
        assert_eq!(module_dir("database/drizzle", ModuleType::Adapter), "adapters/database/drizzle");
        assert_eq!(
            module_dir("connectors/better-auth-nextjs", ModuleType::Connector),
            "connectors/better-auth-nextjs"
        );
        assert_eq!(
            module_dir("features/auth/frontend/shadcn", ModuleType::Feature),
            "features/auth/frontend/shadcn"
        );
    }

    #[test]
    fn test_module_file() {
        let code = generate_module_types(&drizzle());

        assert!(code.starts_with(HEADER));
        assert!(code.contains("// database/drizzle (adapter)\n"));
        assert!(code.contains("export interface DatabaseDrizzleParams {\n  provider?: 'neon' | 'supabase';\n"));
        assert!(code.contains("  features?: {\n    migrations?: boolean;\n  };\n"));
        assert!(code.contains("export interface DatabaseDrizzleFeatures {\n  migrations?: boolean;\n}\n"));
        assert!(code.contains("export declare const DatabaseDrizzleArtifacts: {\n"));
        assert!(code.contains("/** Drizzle ORM */\nexport type DatabaseDrizzleId = 'database/drizzle';\n"));
    }
}
