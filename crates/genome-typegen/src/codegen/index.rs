//! Master index re-exporting every generated declaration.

use crate::ir::GenerationContext;
use super::module::module_specifier;
use super::HEADER;

/// Aggregate files re-exported from the index, in order.
const AGGREGATES: [&str; 4] = [
    "./genome-types.js",
    "./define-genome.js",
    "./capability-types.js",
    "./blueprint-config-types.js",
];

/// Generates the master index. The same text serves as `index.ts` and
/// `index.d.ts`.
pub fn generate_index(ctx: &GenerationContext) -> String {
    let mut code = String::from(HEADER);
    code.push('\n');
    for specifier in AGGREGATES {
        code.push_str(&format!("export * from '{}';\n", specifier));
    }

    if !ctx.modules.is_empty() {
        code.push('\n');
    }
    for module in ctx.modules.values() {
        code.push_str(&format!("export * from '{}';\n", module_specifier(module)));
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ModuleArtifacts, ModuleEntry, ModuleSchema, ModuleType};
    use std::path::PathBuf;

    #[test]
    fn test_index_reexports_every_module() {
        let mut ctx = GenerationContext::new(PathBuf::from("."));
        for (id, module_type) in [
            ("features/payments/backend/stripe", ModuleType::Feature),
            ("database/drizzle", ModuleType::Adapter),
        ] {
            ctx.insert_module(ModuleEntry {
                id: id.to_string(),
                module_type,
                schema: ModuleSchema::default(),
                artifacts: ModuleArtifacts::default(),
                source_dir: PathBuf::new(),
            });
        }

        let code = generate_index(&ctx);
        let adapter = code.find("export * from './adapters/database/drizzle/index.js';\n").unwrap();
        let feature = code
            .find("export * from './features/payments/backend/stripe/index.js';\n")
            .unwrap();
        assert!(adapter < feature);
        assert!(code.contains("export * from './genome-types.js';\n"));
    }
}
