//! Capability types.
//!
//! One provider-discriminated union per capability, plus a runtime table of
//! providers. The `.ts` file carries the table as an `as const` value; the
//! `.d.ts` file only declares it.

use std::collections::BTreeSet;

use crate::ir::{CapabilityProvider, GenerationContext};
use super::genome::module_imports;
use super::module::ModuleTypeNames;
use super::ts_types::{
    property_name, quote_string, render_decl, render_imports, to_pascal_case, TsDecl, TsInterface,
    TsProperty, TsType,
};
use super::HEADER;

/// Name of the union type for a capability: `database` -> `DatabaseCapability`.
pub fn capability_type_name(capability: &str) -> String {
    format!("{}Capability", to_pascal_case(capability))
}

fn provider_variant(provider: &CapabilityProvider) -> TsType {
    let names = ModuleTypeNames::for_id(&provider.module_id);
    TsType::Object(vec![
        TsProperty::new("provider", TsType::StringLiteral(provider.provider.clone())),
        TsProperty::new("module", TsType::StringLiteral(provider.module_id.clone())),
        TsProperty::new("parameters", TsType::Reference(names.params)).optional(true),
    ])
}

/// Distinct provider names of a capability, in sorted order.
fn provider_names(providers: &[CapabilityProvider]) -> Vec<&str> {
    providers
        .iter()
        .map(|p| p.provider.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn capability_decls(ctx: &GenerationContext) -> Vec<TsDecl> {
    let index = &ctx.capabilities;
    let mut decls: Vec<TsDecl> = index
        .capabilities
        .iter()
        .map(|(name, providers)| TsDecl::TypeAlias {
            name: capability_type_name(name),
            ty: TsType::Union(providers.iter().map(provider_variant).collect()),
            doc: None,
        })
        .collect();

    decls.push(TsDecl::Interface(TsInterface {
        name: "CapabilitySchema".to_string(),
        properties: index
            .capabilities
            .keys()
            .map(|name| TsProperty::new(name.clone(), TsType::Reference(capability_type_name(name))))
            .collect(),
        doc: None,
    }));
    decls.push(TsDecl::TypeAlias {
        name: "CapabilityName".to_string(),
        ty: TsType::Reference("keyof CapabilitySchema".to_string()),
        doc: None,
    });
    decls
}

fn header_and_imports(ctx: &GenerationContext) -> String {
    let mut code = String::from(HEADER);
    let modules = ctx
        .capabilities
        .capabilities
        .values()
        .flatten()
        .map(|p| p.module_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|id| ctx.modules.get(id));
    let imports = render_imports(&module_imports(modules));
    if !imports.is_empty() {
        code.push('\n');
        code.push_str(&imports);
    }
    code
}

fn providers_table_type(ctx: &GenerationContext) -> TsType {
    TsType::Object(
        ctx.capabilities
            .capabilities
            .iter()
            .map(|(name, providers)| {
                let literals = provider_names(providers)
                    .into_iter()
                    .map(|p| TsType::StringLiteral(p.to_string()))
                    .collect();
                TsProperty::new(name.clone(), TsType::ReadonlyTuple(literals)).readonly()
            })
            .collect(),
    )
}

fn providers_table_value(ctx: &GenerationContext) -> String {
    let mut code = String::from("export const CAPABILITY_PROVIDERS = {");
    if ctx.capabilities.is_empty() {
        code.push_str("} as const;\n");
        return code;
    }
    code.push('\n');
    for (name, providers) in &ctx.capabilities.capabilities {
        let quoted: Vec<String> = provider_names(providers).into_iter().map(quote_string).collect();
        code.push_str(&format!("  {}: [{}],\n", property_name(name), quoted.join(", ")));
    }
    code.push_str("} as const;\n");
    code
}

fn body(ctx: &GenerationContext) -> String {
    let mut code = String::new();
    for decl in capability_decls(ctx) {
        code.push('\n');
        code.push_str(&render_decl(&decl));
    }
    code
}

/// Generates `capability-types.ts`.
pub fn generate_capability_types_ts(ctx: &GenerationContext) -> String {
    let mut code = header_and_imports(ctx);
    code.push_str(&body(ctx));
    code.push('\n');
    code.push_str(&providers_table_value(ctx));
    code
}

/// Generates `capability-types.d.ts`.
pub fn generate_capability_types_dts(ctx: &GenerationContext) -> String {
    let mut code = header_and_imports(ctx);
    code.push_str(&body(ctx));
    code.push('\n');
    code.push_str(&render_decl(&TsDecl::DeclareConst {
        name: "CAPABILITY_PROVIDERS".to_string(),
        ty: providers_table_type(ctx),
    }));
    code
}
