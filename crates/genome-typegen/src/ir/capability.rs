//! Capability analysis.
//!
//! Groups modules by the capability they provide so code generation can emit
//! one provider-discriminated union per capability.

use std::collections::BTreeMap;

use super::{ModuleEntry, ModuleType};

/// One module able to provide a capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CapabilityProvider {
    pub provider: String,
    pub module_id: String,
    pub module_type: ModuleType,
}

/// Capabilities keyed by name, each with its providers sorted by provider name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityIndex {
    pub capabilities: BTreeMap<String, Vec<CapabilityProvider>>,
}

impl CapabilityIndex {
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn providers(&self, capability: &str) -> &[CapabilityProvider] {
        self.capabilities
            .get(capability)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Builds the capability index.
///
/// Explicit `capabilities`/`provides` entries win. Otherwise an adapter
/// `database/drizzle` provides `database`, and a feature
/// `features/auth/frontend/shadcn` provides `auth`. Connectors only provide
/// what they declare.
pub fn analyze_capabilities<'a>(modules: impl IntoIterator<Item = &'a ModuleEntry>) -> CapabilityIndex {
    let mut capabilities: BTreeMap<String, Vec<CapabilityProvider>> = BTreeMap::new();

    for module in modules {
        let names = if module.schema.capabilities.is_empty() {
            inferred_capability(&module.id, module.module_type)
                .into_iter()
                .collect()
        } else {
            module.schema.capabilities.clone()
        };

        for name in names {
            let providers = capabilities.entry(name).or_default();
            if providers.iter().any(|p| p.module_id == module.id) {
                continue;
            }
            providers.push(CapabilityProvider {
                provider: provider_name(&module.id),
                module_id: module.id.clone(),
                module_type: module.module_type,
            });
        }
    }

    for providers in capabilities.values_mut() {
        providers.sort();
    }

    CapabilityIndex { capabilities }
}

fn inferred_capability(id: &str, module_type: ModuleType) -> Option<String> {
    let rel = module_type.relative_dir(id);
    let segments: Vec<&str> = rel
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match module_type {
        ModuleType::Adapter | ModuleType::Feature if segments.len() >= 2 => {
            Some(segments[0].to_string())
        }
        _ => None,
    }
}

/// The provider name of a module: the last segment of its ID.
pub fn provider_name(id: &str) -> String {
    id.rsplit('/').next().unwrap_or(id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ModuleArtifacts, ModuleSchema};
    use std::path::PathBuf;

    fn module(id: &str, module_type: ModuleType, capabilities: &[&str]) -> ModuleEntry {
        ModuleEntry {
            id: id.to_string(),
            module_type,
            schema: ModuleSchema {
                capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
                ..ModuleSchema::default()
            },
            artifacts: ModuleArtifacts::default(),
            source_dir: PathBuf::new(),
        }
    }

    #[test]
    fn test_inferred_capabilities() {
        let modules = vec![
            module("database/prisma", ModuleType::Adapter, &[]),
            module("database/drizzle", ModuleType::Adapter, &[]),
            module("features/auth/frontend/shadcn", ModuleType::Feature, &[]),
            module("connectors/better-auth-nextjs", ModuleType::Connector, &[]),
            module("standalone", ModuleType::Adapter, &[]),
        ];
        let index = analyze_capabilities(&modules);

        assert_eq!(index.capabilities.keys().collect::<Vec<_>>(), vec!["auth", "database"]);
        let providers: Vec<_> = index.providers("database").iter().map(|p| p.provider.as_str()).collect();
        assert_eq!(providers, vec!["drizzle", "prisma"]);
        assert_eq!(index.providers("auth")[0].provider, "shadcn");
    }

    #[test]
    fn test_explicit_capabilities_win() {
        let modules = vec![
            module("connectors/stripe-nextjs", ModuleType::Connector, &["payments"]),
            module("database/drizzle", ModuleType::Adapter, &["orm", "database"]),
        ];
        let index = analyze_capabilities(&modules);

        assert_eq!(index.providers("payments")[0].module_id, "connectors/stripe-nextjs");
        assert_eq!(index.providers("orm")[0].provider, "drizzle");
        assert_eq!(index.providers("database").len(), 1);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider_name("features/auth/frontend/shadcn"), "shadcn");
        assert_eq!(provider_name("stripe"), "stripe");
    }
}
