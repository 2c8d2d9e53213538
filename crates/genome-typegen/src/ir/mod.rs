//! Marketplace intermediate representation.
//!
//! The scanner produces these types from manifests and blueprints; code
//! generators consume them. Nothing here knows about TypeScript syntax.

mod artifacts;
mod capability;
mod schema;

pub use artifacts::{
    EnhancedFileArtifact, EnvVarArtifact, FileArtifact, ModuleArtifacts, PackageArtifact,
};
pub use capability::{analyze_capabilities, provider_name, CapabilityIndex, CapabilityProvider};
pub use schema::{parse_parameters, ModuleSchema, ParamKind, ParamSpec};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::diagnostic::Span;

/// The three kinds of marketplace module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleType {
    Adapter,
    Connector,
    Feature,
}

impl ModuleType {
    /// All module types in generation order.
    pub const ALL: [ModuleType; 3] = [ModuleType::Adapter, ModuleType::Connector, ModuleType::Feature];

    /// Top-level marketplace directory holding modules of this type.
    pub fn dir_name(self) -> &'static str {
        match self {
            ModuleType::Adapter => "adapters",
            ModuleType::Connector => "connectors",
            ModuleType::Feature => "features",
        }
    }

    /// Manifest file names, in lookup order.
    pub fn manifest_names(self) -> &'static [&'static str] {
        match self {
            ModuleType::Adapter => &["adapter.json"],
            ModuleType::Connector => &["connector.json", "integration.json"],
            ModuleType::Feature => &["feature.json"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleType::Adapter => "adapter",
            ModuleType::Connector => "connector",
            ModuleType::Feature => "feature",
        }
    }

    /// Normalizes a raw module identifier into its canonical form.
    ///
    /// Adapters carry no prefix (`database/drizzle`); connectors and features
    /// keep theirs (`connectors/x`, `features/auth/frontend/shadcn`).
    pub fn canonical_id(self, raw: &str) -> String {
        let cleaned = raw.replace('\\', "/");
        let trimmed = cleaned.trim_matches('/');
        let prefix = format!("{}/", self.dir_name());
        let bare = trimmed.strip_prefix(&prefix).unwrap_or(trimmed);
        match self {
            ModuleType::Adapter => bare.to_string(),
            ModuleType::Connector | ModuleType::Feature => format!("{}{}", prefix, bare),
        }
    }

    /// The module's directory below the type directory.
    pub fn relative_dir(self, canonical_id: &str) -> String {
        let prefix = format!("{}/", self.dir_name());
        canonical_id
            .strip_prefix(&prefix)
            .unwrap_or(canonical_id)
            .to_string()
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `template: '...'` reference found in a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRef {
    pub template: String,
    pub span: Span,
}

/// What static analysis of one blueprint produced.
#[derive(Debug, Clone)]
pub struct BlueprintAnalysisResult {
    pub module_id: String,
    pub module_type: ModuleType,
    pub artifacts: ModuleArtifacts,
    pub templates: Vec<TemplateRef>,
    /// The parser recovered from syntax errors in this file.
    pub has_syntax_errors: bool,
}

/// A module directory found while scanning the marketplace.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    /// Canonical ID derived from the directory path.
    pub path_id: String,
    pub module_type: ModuleType,
    pub dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub blueprint: Option<PathBuf>,
    pub analysis: Option<BlueprintAnalysisResult>,
}

/// A feature contract copied verbatim into the output.
#[derive(Debug, Clone)]
pub struct ContractFile {
    /// Feature path below `features/`, e.g. `auth` or `payments/stripe`.
    pub name: String,
    pub source: PathBuf,
    pub content: String,
}

/// A module that made it through schema loading.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub id: String,
    pub module_type: ModuleType,
    pub schema: ModuleSchema,
    pub artifacts: ModuleArtifacts,
    pub source_dir: PathBuf,
}

/// A recoverable per-module problem.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationWarning {
    pub module: String,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.module, self.path.display(), self.message)
    }
}

/// State threaded through the generation pipeline.
///
/// Each stage takes the context by value and hands it back, so stages can be
/// exercised one at a time.
#[derive(Debug, Default)]
pub struct GenerationContext {
    pub marketplace_dir: PathBuf,
    /// Modules keyed by canonical ID. A later insert with the same ID replaces
    /// the earlier module.
    pub modules: BTreeMap<String, ModuleEntry>,
    pub capabilities: CapabilityIndex,
    pub contracts: Vec<ContractFile>,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationContext {
    pub fn new(marketplace_dir: PathBuf) -> Self {
        Self {
            marketplace_dir,
            ..Self::default()
        }
    }

    /// Inserts a module, returning the one it replaced on an ID collision.
    pub fn insert_module(&mut self, entry: ModuleEntry) -> Option<ModuleEntry> {
        self.modules.insert(entry.id.clone(), entry)
    }

    pub fn warn(&mut self, module: impl Into<String>, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.warnings.push(GenerationWarning {
            module: module.into(),
            path: path.into(),
            message: message.into(),
        });
    }

    /// Modules of one type, in ID order.
    pub fn modules_of(&self, module_type: ModuleType) -> impl Iterator<Item = &ModuleEntry> {
        self.modules
            .values()
            .filter(move |m| m.module_type == module_type)
    }

    /// Every module ID, in ID order.
    pub fn module_ids(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    pub fn count(&self, module_type: ModuleType) -> usize {
        self.modules_of(module_type).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ids() {
        assert_eq!(ModuleType::Adapter.canonical_id("database/drizzle"), "database/drizzle");
        assert_eq!(ModuleType::Adapter.canonical_id("adapters/database/drizzle"), "database/drizzle");
        assert_eq!(ModuleType::Connector.canonical_id("better-auth-nextjs"), "connectors/better-auth-nextjs");
        assert_eq!(ModuleType::Connector.canonical_id("connectors/better-auth-nextjs"), "connectors/better-auth-nextjs");
        assert_eq!(
            ModuleType::Feature.canonical_id("auth\\frontend\\shadcn"),
            "features/auth/frontend/shadcn"
        );
    }

    #[test]
    fn test_relative_dir() {
        assert_eq!(ModuleType::Adapter.relative_dir("database/drizzle"), "database/drizzle");
        assert_eq!(ModuleType::Feature.relative_dir("features/auth/frontend/shadcn"), "auth/frontend/shadcn");
    }

    #[test]
    fn test_collision_replaces_earlier_module() {
        let mut ctx = GenerationContext::new(PathBuf::from("."));
        let entry = |dir: &str| ModuleEntry {
            id: "database/drizzle".to_string(),
            module_type: ModuleType::Adapter,
            schema: ModuleSchema::default(),
            artifacts: ModuleArtifacts::default(),
            source_dir: PathBuf::from(dir),
        };

        assert!(ctx.insert_module(entry("first")).is_none());
        let replaced = ctx.insert_module(entry("second")).unwrap();

        assert_eq!(replaced.source_dir, PathBuf::from("first"));
        assert_eq!(ctx.modules.len(), 1);
        assert_eq!(ctx.modules["database/drizzle"].source_dir, PathBuf::from("second"));
    }
}
