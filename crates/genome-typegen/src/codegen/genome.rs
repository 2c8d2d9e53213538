//! Genome-level aggregate types.
//!
//! `genome-types.d.ts` maps every module ID to its parameter and feature
//! types and defines the discriminated `TypedGenomeModule` union that
//! `defineGenome` checks genomes against. `blueprint-config-types.d.ts` gives
//! blueprints a typed view of their own configuration.

use crate::ir::{GenerationContext, ModuleEntry, ModuleType};
use super::module::{module_specifier, ModuleTypeNames};
use super::ts_types::{
    render_decl, render_imports, TsDecl, TsImport, TsInterface, TsProperty, TsType,
};
use super::HEADER;

/// Runtime body of `defineGenome`.
pub const DEFINE_GENOME_TS: &str = include_str!("../../runtime/define-genome.ts");
/// Declaration of `defineGenome`.
pub const DEFINE_GENOME_DTS: &str = include_str!("../../runtime/define-genome.d.ts");

/// `import type { XParams, XFeatures } from './<dir>/index.js';` per module.
pub(super) fn module_imports<'a>(modules: impl IntoIterator<Item = &'a ModuleEntry>) -> Vec<TsImport> {
    modules
        .into_iter()
        .map(|module| {
            let names = ModuleTypeNames::for_id(&module.id);
            TsImport {
                names: vec![names.params, names.features],
                from: module_specifier(module),
            }
        })
        .collect()
}

fn id_union<'a>(ids: impl IntoIterator<Item = &'a str>) -> TsType {
    let variants: Vec<TsType> = ids
        .into_iter()
        .map(|id| TsType::StringLiteral(id.to_string()))
        .collect();
    if variants.is_empty() {
        TsType::Never
    } else {
        TsType::Union(variants)
    }
}

fn id_alias(ctx: &GenerationContext, module_type: ModuleType) -> TsDecl {
    let name = match module_type {
        ModuleType::Adapter => "AdapterId",
        ModuleType::Connector => "ConnectorId",
        ModuleType::Feature => "FeatureId",
    };
    TsDecl::TypeAlias {
        name: name.to_string(),
        ty: id_union(ctx.modules_of(module_type).map(|m| m.id.as_str())),
        doc: None,
    }
}

/// An interface keyed by module ID, one property per module.
fn module_map(
    name: &str,
    ctx: &GenerationContext,
    value: impl Fn(&ModuleTypeNames) -> TsType,
) -> TsDecl {
    TsDecl::Interface(TsInterface {
        name: name.to_string(),
        properties: ctx
            .modules
            .values()
            .map(|m| TsProperty::new(m.id.clone(), value(&ModuleTypeNames::for_id(&m.id))))
            .collect(),
        doc: None,
    })
}

fn genome_module_variant(module: &ModuleEntry) -> TsType {
    let names = ModuleTypeNames::for_id(&module.id);
    TsType::Object(vec![
        TsProperty::new("id", TsType::StringLiteral(module.id.clone())),
        TsProperty::new("parameters", TsType::Reference(names.params)).optional(true),
        TsProperty::new("features", TsType::Reference(names.features)).optional(true),
    ])
}

fn genome_project() -> TsDecl {
    TsDecl::Interface(TsInterface {
        name: "GenomeProject".to_string(),
        properties: vec![
            TsProperty::new("name", TsType::String),
            TsProperty::new("description", TsType::String).optional(true),
            TsProperty::new("version", TsType::String).optional(true),
            TsProperty::new("framework", TsType::String).optional(true),
            TsProperty::new("path", TsType::String).optional(true),
        ],
        doc: None,
    })
}

fn typed_genome() -> TsDecl {
    TsDecl::Interface(TsInterface {
        name: "TypedGenome".to_string(),
        properties: vec![
            TsProperty::new("version", TsType::String).optional(true),
            TsProperty::new("project", TsType::Reference("GenomeProject".to_string())),
            TsProperty::new(
                "modules",
                TsType::Array(Box::new(TsType::Reference("TypedGenomeModule".to_string()))),
            ),
        ],
        doc: Some("A genome whose modules are checked against the marketplace.".to_string()),
    })
}

fn render_all(decls: &[TsDecl]) -> String {
    decls
        .iter()
        .map(render_decl)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generates `genome-types.d.ts`.
pub fn generate_genome_types(ctx: &GenerationContext) -> String {
    let mut code = String::new();
    code.push_str(HEADER);

    let imports = render_imports(&module_imports(ctx.modules.values()));
    if !imports.is_empty() {
        code.push('\n');
        code.push_str(&imports);
    }

    let variants: Vec<TsType> = ctx.modules.values().map(genome_module_variant).collect();
    let typed_module = if variants.is_empty() {
        TsType::Never
    } else {
        TsType::Union(variants)
    };

    let decls = vec![
        id_alias(ctx, ModuleType::Adapter),
        id_alias(ctx, ModuleType::Connector),
        id_alias(ctx, ModuleType::Feature),
        TsDecl::TypeAlias {
            name: "ModuleId".to_string(),
            ty: TsType::Union(vec![
                TsType::Reference("AdapterId".to_string()),
                TsType::Reference("ConnectorId".to_string()),
                TsType::Reference("FeatureId".to_string()),
            ]),
            doc: None,
        },
        module_map("ModuleParameters", ctx, |n| TsType::Reference(n.params.clone())),
        module_map("ModuleFeatures", ctx, |n| TsType::Reference(n.features.clone())),
        TsDecl::TypeAlias {
            name: "TypedGenomeModule".to_string(),
            ty: typed_module,
            doc: Some("One module entry of a genome, discriminated by `id`.".to_string()),
        },
        genome_project(),
        typed_genome(),
    ];

    code.push('\n');
    code.push_str(&render_all(&decls));
    code
}

/// Generates `blueprint-config-types.d.ts`.
pub fn generate_blueprint_config_types(ctx: &GenerationContext) -> String {
    let mut code = String::new();
    code.push_str(HEADER);

    let imports = render_imports(&module_imports(ctx.modules.values()));
    if !imports.is_empty() {
        code.push('\n');
        code.push_str(&imports);
    }

    let config_map = TsDecl::Interface(TsInterface {
        name: "BlueprintConfigMap".to_string(),
        properties: ctx
            .modules
            .values()
            .map(|m| {
                let names = ModuleTypeNames::for_id(&m.id);
                TsProperty::new(
                    m.id.clone(),
                    TsType::Object(vec![
                        TsProperty::new("id", TsType::StringLiteral(m.id.clone())),
                        TsProperty::new("parameters", TsType::Reference(names.params)),
                        TsProperty::new("features", TsType::Reference(names.features)),
                    ]),
                )
            })
            .collect(),
        doc: None,
    });

    let decls = vec![
        config_map,
        TsDecl::TypeAlias {
            name: "BlueprintModuleId".to_string(),
            ty: TsType::Reference("keyof BlueprintConfigMap".to_string()),
            doc: None,
        },
        TsDecl::TypeAlias {
            name: "BlueprintConfig<K extends BlueprintModuleId>".to_string(),
            ty: TsType::Object(vec![TsProperty::new(
                "module",
                TsType::Reference("BlueprintConfigMap[K]".to_string()),
            )]),
            doc: Some("Configuration a blueprint receives for module `K`.".to_string()),
        },
    ];

    code.push('\n');
    code.push_str(&render_all(&decls));
    code
}

/// Generates `define-genome.ts` and `define-genome.d.ts`.
pub fn generate_define_genome() -> [(String, String); 2] {
    [
        ("define-genome.ts".to_string(), format!("{}\n{}", HEADER, DEFINE_GENOME_TS)),
        ("define-genome.d.ts".to_string(), format!("{}\n{}", HEADER, DEFINE_GENOME_DTS)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ModuleArtifacts, ModuleSchema};
    use std::path::PathBuf;

    fn entry(id: &str, module_type: ModuleType) -> ModuleEntry {
        ModuleEntry {
            id: id.to_string(),
            module_type,
            schema: ModuleSchema::default(),
            artifacts: ModuleArtifacts::default(),
            source_dir: PathBuf::new(),
        }
    }

    fn context() -> GenerationContext {
        let mut ctx = GenerationContext::new(PathBuf::from("."));
        ctx.insert_module(entry("database/drizzle", ModuleType::Adapter));
        ctx.insert_module(entry("connectors/better-auth-nextjs", ModuleType::Connector));
        ctx.insert_module(entry("features/auth/frontend/shadcn", ModuleType::Feature));
        ctx
    }

    #[test]
    fn test_genome_types() {
        let code = generate_genome_types(&context());

        assert!(code.contains(
            "import type { DatabaseDrizzleParams, DatabaseDrizzleFeatures } from './adapters/database/drizzle/index.js';\n"
        ));
        assert!(code.contains("export type AdapterId = 'database/drizzle';\n"));
        assert!(code.contains("export type ConnectorId = 'connectors/better-auth-nextjs';\n"));
        assert!(code.contains("export type ModuleId =\n  | AdapterId\n  | ConnectorId\n  | FeatureId;\n"));
        assert!(code.contains("  'database/drizzle': DatabaseDrizzleParams;\n"));
        assert!(code.contains("  'features/auth/frontend/shadcn': FeaturesAuthFrontendShadcnFeatures;\n"));
        assert!(code.contains(
            "  | {\n    id: 'database/drizzle';\n    parameters?: DatabaseDrizzleParams;\n    features?: DatabaseDrizzleFeatures;\n  }\n"
        ));
        assert!(code.contains("  modules: TypedGenomeModule[];\n"));
    }

    #[test]
    fn test_empty_marketplace() {
        let code = generate_genome_types(&GenerationContext::default());

        assert!(!code.contains("import type"));
        assert!(code.contains("export type AdapterId = never;\n"));
        assert!(code.contains("export interface ModuleParameters {}\n"));
        assert!(code.contains("export type TypedGenomeModule = never;\n"));
    }

    #[test]
    fn test_blueprint_config_types() {
        let code = generate_blueprint_config_types(&context());

        assert!(code.contains("export interface BlueprintConfigMap {\n  'connectors/better-auth-nextjs': {\n"));
        assert!(code.contains("  'database/drizzle': {\n    id: 'database/drizzle';\n    parameters: DatabaseDrizzleParams;\n"));
        assert!(code.contains("export type BlueprintModuleId = keyof BlueprintConfigMap;\n"));
        assert!(code.contains(
            "export type BlueprintConfig<K extends BlueprintModuleId> = {\n  module: BlueprintConfigMap[K];\n};\n"
        ));
    }

    #[test]
    fn test_define_genome() {
        let [(ts_name, ts), (dts_name, dts)] = generate_define_genome();
        assert_eq!(ts_name, "define-genome.ts");
        assert!(ts.contains("export function defineGenome<T extends TypedGenome>(genome: T): T {"));
        assert_eq!(dts_name, "define-genome.d.ts");
        assert!(dts.contains("export declare function defineGenome<T extends TypedGenome>(genome: T): T;"));
    }
}
