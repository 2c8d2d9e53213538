//! TypeScript declaration generation from the marketplace IR.
//!
//! Generates, relative to the output root:
//! - `<type-dir>/<id>/index.d.ts` per module (params, features, artifacts)
//! - `genome-types.d.ts`, `define-genome.ts`/`.d.ts`
//! - `capability-types.ts`/`.d.ts`
//! - `blueprint-config-types.d.ts`
//! - `index.ts`/`index.d.ts` re-exporting everything
//! - `contracts/<feature>.d.ts`, copied from each feature's `contract.ts`
//! - empty `.js` companions for declaration-only files
//!
//! Output is a pure function of the context: same input, same bytes.

pub mod artifacts;
pub mod capability;
pub mod genome;
pub mod index;
pub mod module;
pub mod params;
pub mod runtime;
pub mod ts_types;

use crate::ir::GenerationContext;

/// First line of every generated file.
pub const HEADER: &str = "// Generated by genome-typegen. Do not edit by hand.\n";

/// Generated TypeScript code.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCode {
    /// Map of path (relative to the output root) to content.
    pub files: Vec<(String, String)>,
}

/// Generates every output file for the context.
pub fn generate(ctx: &GenerationContext) -> GeneratedCode {
    let mut files = Vec::new();

    for module in ctx.modules.values() {
        files.push((
            format!("{}/index.d.ts", module::module_dir(&module.id, module.module_type)),
            module::generate_module_types(module),
        ));
    }

    files.push(("genome-types.d.ts".to_string(), genome::generate_genome_types(ctx)));
    files.extend(genome::generate_define_genome());
    files.push((
        "capability-types.ts".to_string(),
        capability::generate_capability_types_ts(ctx),
    ));
    files.push((
        "capability-types.d.ts".to_string(),
        capability::generate_capability_types_dts(ctx),
    ));
    files.push((
        "blueprint-config-types.d.ts".to_string(),
        genome::generate_blueprint_config_types(ctx),
    ));

    let index_code = index::generate_index(ctx);
    files.push(("index.d.ts".to_string(), index_code.clone()));
    files.push(("index.ts".to_string(), index_code));

    for contract in &ctx.contracts {
        files.push((format!("contracts/{}.d.ts", contract.name), contract.content.clone()));
    }

    files.extend(runtime::get_runtime_shims(ctx));

    GeneratedCode { files }
}
