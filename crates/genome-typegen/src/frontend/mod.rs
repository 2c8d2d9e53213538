//! Marketplace scanning.
//!
//! Walks `adapters/`, `connectors/` and `features/`, pairs each module
//! directory's manifest with its blueprint, and analyzes the blueprint.
//! Missing type directories are not an error; they contribute no modules.

pub mod blueprint;
pub mod manifest;

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::diagnostic::GeneratorError;
use crate::ir::{BlueprintAnalysisResult, ContractFile, DiscoveredModule, ModuleType};
use blueprint::BlueprintParser;

pub use manifest::{find_manifest, load_constitutional_schema, try_load_schema};

/// Blueprint file name.
pub const BLUEPRINT_FILE: &str = "blueprint.ts";

/// Feature contract file name.
pub const CONTRACT_FILE: &str = "contract.ts";

/// Directories never treated as modules.
const IGNORED_DIRS: &[&str] = &["node_modules", "templates", "dist"];

/// Everything found in one pass over the marketplace.
#[derive(Debug)]
pub struct MarketplaceScan {
    pub root: PathBuf,
    /// Modules in (type, path) order.
    pub modules: Vec<DiscoveredModule>,
    pub contracts: Vec<ContractFile>,
}

/// Scans a marketplace directory tree.
pub struct MarketplaceScanner {
    parser: BlueprintParser,
}

impl MarketplaceScanner {
    pub fn new() -> Result<Self, GeneratorError> {
        Ok(Self {
            parser: BlueprintParser::new()?,
        })
    }

    /// Scans every module type below `root`.
    pub fn scan(&mut self, root: &Path) -> Result<MarketplaceScan, GeneratorError> {
        if !root.is_dir() {
            return Err(GeneratorError::MarketplaceNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut modules = Vec::new();
        for module_type in ModuleType::ALL {
            modules.extend(self.scan_type(root, module_type));
        }

        Ok(MarketplaceScan {
            root: root.to_path_buf(),
            modules,
            contracts: collect_contracts(root),
        })
    }

    fn scan_type(&mut self, root: &Path, module_type: ModuleType) -> Vec<DiscoveredModule> {
        let type_dir = root.join(module_type.dir_name());
        if !type_dir.is_dir() {
            tracing::debug!(dir = %type_dir.display(), "no {} directory", module_type.dir_name());
            return Vec::new();
        }

        let mut modules = Vec::new();
        for entry in walk(&type_dir) {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            let dir = entry.path();
            let manifest = find_manifest(dir, module_type);
            let blueprint = Some(dir.join(BLUEPRINT_FILE)).filter(|p| p.is_file());
            if manifest.is_none() && blueprint.is_none() {
                continue;
            }

            let path_id = module_type.canonical_id(&relative_id(&type_dir, dir));
            let analysis = blueprint
                .as_deref()
                .and_then(|path| self.analyze(path, &path_id, module_type));

            modules.push(DiscoveredModule {
                path_id,
                module_type,
                dir: dir.to_path_buf(),
                manifest,
                blueprint,
                analysis,
            });
        }
        modules
    }

    fn analyze(&mut self, path: &Path, module_id: &str, module_type: ModuleType) -> Option<BlueprintAnalysisResult> {
        match self.parser.parse_file(path) {
            Ok(facts) => {
                if facts.has_syntax_errors {
                    tracing::debug!(module = module_id, "blueprint has syntax errors; artifacts may be partial");
                }
                Some(BlueprintAnalysisResult {
                    module_id: module_id.to_string(),
                    module_type,
                    artifacts: facts.artifacts,
                    templates: facts.templates,
                    has_syntax_errors: facts.has_syntax_errors,
                })
            }
            Err(e) => {
                tracing::warn!(module = module_id, error = %e, "could not analyze blueprint");
                None
            }
        }
    }
}

/// Sorted, filtered walk below `dir`.
pub(crate) fn walk(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e))
        .filter_map(|e| e.ok())
}

fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref())
}

/// `base/a/b` relative to `base`, as `a/b`.
fn relative_id(base: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(base).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collects every `features/**/contract.ts`.
fn collect_contracts(root: &Path) -> Vec<ContractFile> {
    let features_dir = root.join(ModuleType::Feature.dir_name());
    if !features_dir.is_dir() {
        return Vec::new();
    }

    let mut contracts = Vec::new();
    for entry in walk(&features_dir) {
        if !entry.file_type().is_file() || entry.file_name() != CONTRACT_FILE {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let name = relative_id(&features_dir, dir);
        if name.is_empty() {
            continue;
        }
        match std::fs::read_to_string(entry.path()) {
            Ok(content) => contracts.push(ContractFile {
                name,
                source: entry.path().to_path_buf(),
                content,
            }),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "could not read contract");
            }
        }
    }
    contracts
}
