//! Artifact literal types.

use crate::ir::{EnvVarArtifact, ModuleArtifacts, PackageArtifact};
use super::ts_types::{render_decl, TsDecl, TsProperty, TsType};

/// The literal type describing what a module's blueprint produces.
pub fn artifacts_type(artifacts: &ModuleArtifacts) -> TsType {
    let creates = artifacts.creates.iter().map(|f| path_literal(&f.path)).collect();
    let enhances = artifacts.enhances.iter().map(|f| path_literal(&f.path)).collect();
    let installs = artifacts.installs.iter().map(install_type).collect();
    let env_vars = artifacts.env_vars.iter().map(env_var_type).collect();

    TsType::Object(vec![
        TsProperty::new("creates", TsType::ReadonlyTuple(creates)).readonly(),
        TsProperty::new("enhances", TsType::ReadonlyTuple(enhances)).readonly(),
        TsProperty::new("installs", TsType::ReadonlyTuple(installs)).readonly(),
        TsProperty::new("envVars", TsType::ReadonlyTuple(env_vars)).readonly(),
    ])
}

fn path_literal(path: &str) -> TsType {
    TsType::StringLiteral(path.to_string())
}

fn install_type(install: &PackageArtifact) -> TsType {
    let packages = install
        .packages
        .iter()
        .map(|p| TsType::StringLiteral(p.clone()))
        .collect();
    TsType::Object(vec![
        TsProperty::new("packages", TsType::ReadonlyTuple(packages)).readonly(),
        TsProperty::new("isDev", TsType::RawLiteral(install.is_dev.to_string())).readonly(),
    ])
}

fn env_var_type(env: &EnvVarArtifact) -> TsType {
    let mut properties = vec![
        TsProperty::new("key", TsType::StringLiteral(env.key.clone())).readonly(),
        TsProperty::new("value", TsType::StringLiteral(env.value.clone())).readonly(),
    ];
    if let Some(description) = &env.description {
        properties.push(
            TsProperty::new("description", TsType::StringLiteral(description.clone())).readonly(),
        );
    }
    TsType::Object(properties)
}

/// Renders `export declare const <name>: { ... };`.
pub fn format_artifacts(name: &str, artifacts: &ModuleArtifacts) -> String {
    render_decl(&TsDecl::DeclareConst {
        name: name.to_string(),
        ty: artifacts_type(artifacts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_artifacts() {
        let out = format_artifacts("XArtifacts", &ModuleArtifacts::default());
        assert_eq!(
            out,
            "export declare const XArtifacts: {\n  readonly creates: readonly [];\n  readonly enhances: readonly [];\n  readonly installs: readonly [];\n  readonly envVars: readonly [];\n};\n"
        );
    }

    #[test]
    fn test_populated_artifacts() {
        let mut artifacts = ModuleArtifacts::default();
        artifacts.add_create("src/db/index.ts".to_string());
        artifacts.add_enhance("package.json".to_string(), Some("json-merger".to_string()));
        artifacts.add_install(vec!["drizzle-kit".to_string()], true);
        artifacts.add_env_var("DATABASE_URL".to_string(), "postgres://".to_string(), None);

        let out = format_artifacts("DatabaseDrizzleArtifacts", &artifacts);

        assert!(out.contains("  readonly creates: readonly ['src/db/index.ts'];\n"));
        assert!(out.contains("  readonly enhances: readonly ['package.json'];\n"));
        assert!(out.contains(
            "  readonly installs: readonly [\n    {\n      readonly packages: readonly ['drizzle-kit'];\n      readonly isDev: true;\n    },\n  ];\n"
        ));
        assert!(out.contains("      readonly key: 'DATABASE_URL';\n      readonly value: 'postgres://';\n    },\n"));
        assert!(!out.contains("description"));
    }
}
