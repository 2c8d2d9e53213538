//! Runtime companions for declaration-only outputs.
//!
//! Several outputs exist only as `.d.ts`. Node's ESM resolver still needs a
//! file behind every `.js` specifier that reaches runtime, so each gets an
//! empty module.

use crate::ir::GenerationContext;
use super::module::module_dir;
use super::HEADER;

/// Body of every runtime shim.
pub fn shim() -> String {
    format!("{}export {{}};\n", HEADER)
}

/// Paths (relative to the output root) that need a runtime shim.
pub fn shim_paths(ctx: &GenerationContext) -> Vec<String> {
    let mut paths = vec![
        "genome-types.js".to_string(),
        "blueprint-config-types.js".to_string(),
    ];
    paths.extend(
        ctx.modules
            .values()
            .map(|m| format!("{}/index.js", module_dir(&m.id, m.module_type))),
    );
    paths
}

/// Returns all runtime shims as (filename, content) pairs.
pub fn get_runtime_shims(ctx: &GenerationContext) -> Vec<(String, String)> {
    let body = shim();
    shim_paths(ctx)
        .into_iter()
        .map(|path| (path, body.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ModuleArtifacts, ModuleEntry, ModuleSchema, ModuleType};
    use std::path::PathBuf;

    #[test]
    fn test_shims_cover_declaration_only_outputs() {
        let mut ctx = GenerationContext::new(PathBuf::from("."));
        ctx.insert_module(ModuleEntry {
            id: "connectors/better-auth-nextjs".to_string(),
            module_type: ModuleType::Connector,
            schema: ModuleSchema::default(),
            artifacts: ModuleArtifacts::default(),
            source_dir: PathBuf::new(),
        });

        let shims = get_runtime_shims(&ctx);
        let paths: Vec<&str> = shims.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "genome-types.js",
                "blueprint-config-types.js",
                "connectors/better-auth-nextjs/index.js",
            ]
        );
        assert!(shims.iter().all(|(_, c)| c.ends_with("export {};\n")));
    }
}
