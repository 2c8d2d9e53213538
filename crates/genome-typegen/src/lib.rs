//! # Genome Type Generator
//!
//! Scans a blueprint marketplace (adapters, connectors, features) and emits
//! TypeScript declarations that give genome authors autocomplete and
//! compile-time validation of module IDs, parameters and features.
//!
//! ## Architecture
//!
//! ```text
//! Marketplace (manifests + blueprint.ts)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Manifest loading, blueprint parsing (tree-sitter)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │      IR      │  GenerationContext: modules, capabilities, contracts
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  TS model → rendered .d.ts / .ts / .js
//! └──────────────┘
//! ```
//!
//! The `validate` module holds the lint-style checks (dead templates,
//! comprehensive compliance) that run over the same marketplace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use genome_typegen::{GeneratorConfig, TypeGenerator};
//!
//! let generator = TypeGenerator::new(GeneratorConfig::for_marketplace("marketplace"));
//! let report = generator.generate_all_types()?;
//! println!("{} modules", report.modules());
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod validate;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use codegen::params::synthesize_interface;
pub use config::{GeneratorConfig, ValidatorConfig};
pub use diagnostic::GeneratorError;
pub use frontend::load_constitutional_schema;
pub use ir::{GenerationContext, GenerationWarning, ModuleType};

use codegen::module::ModuleTypeNames;
use codegen::GeneratedCode;
use frontend::{MarketplaceScan, MarketplaceScanner};
use ir::{analyze_capabilities, DiscoveredModule, ModuleEntry};

/// The main generator struct that orchestrates the generation pipeline.
pub struct TypeGenerator {
    config: GeneratorConfig,
}

/// Result of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Number of adapters generated.
    pub adapters: usize,
    /// Number of connectors generated.
    pub connectors: usize,
    /// Number of features generated.
    pub features: usize,
    /// Number of capabilities found.
    pub capabilities: usize,
    /// Files whose content changed, relative to the output directory.
    pub files_written: Vec<PathBuf>,
    /// Files left untouched because their content was already current.
    pub files_unchanged: usize,
    /// Modules skipped or degraded during generation.
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationReport {
    pub fn modules(&self) -> usize {
        self.adapters + self.connectors + self.features
    }
}

impl TypeGenerator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs every stage up to code generation without touching the output
    /// directory.
    ///
    /// 1. Scan the marketplace and analyze blueprints
    /// 2. Load each module's schema (warn and skip on failure)
    /// 3. Warn about modules whose exported type names collide
    /// 4. Group modules by capability
    /// 5. Attach feature contracts
    /// 6. Generate all files
    pub fn plan(&self) -> Result<(GenerationContext, GeneratedCode), GeneratorError> {
        let root = &self.config.marketplace_dir;
        let mut scanner = MarketplaceScanner::new()?;
        let scan = scanner.scan(root)?;

        let ctx = GenerationContext::new(root.clone());
        let ctx = collect_modules(ctx, &scan);
        let ctx = check_type_names(ctx);
        let ctx = analyze(ctx);
        let ctx = attach_contracts(ctx, scan);

        let generated = codegen::generate(&ctx);
        Ok((ctx, generated))
    }

    /// Regenerates every declaration file.
    ///
    /// Always a full regeneration. Files whose content is already current are
    /// not rewritten, and outputs of removed modules are left in place.
    pub fn generate_all_types(&self) -> Result<GenerationReport, GeneratorError> {
        let (ctx, generated) = self.plan()?;
        let (files_written, files_unchanged) = self.write_output(&generated)?;

        let report = GenerationReport {
            adapters: ctx.count(ModuleType::Adapter),
            connectors: ctx.count(ModuleType::Connector),
            features: ctx.count(ModuleType::Feature),
            capabilities: ctx.capabilities.capabilities.len(),
            files_written,
            files_unchanged,
            warnings: ctx.warnings,
        };

        tracing::info!(
            adapters = report.adapters,
            connectors = report.connectors,
            features = report.features,
            written = report.files_written.len(),
            unchanged = report.files_unchanged,
            warnings = report.warnings.len(),
            "generated constitutional types"
        );
        Ok(report)
    }

    /// Lists the output files a generation run would create or change.
    pub fn check(&self) -> Result<Vec<PathBuf>, GeneratorError> {
        let (_, generated) = self.plan()?;
        Ok(generated
            .files
            .iter()
            .filter(|(filename, content)| !is_current(&self.config.out_dir.join(filename), content))
            .map(|(filename, _)| PathBuf::from(filename))
            .collect())
    }

    /// Writes generated code to the output directory.
    fn write_output(&self, generated: &GeneratedCode) -> Result<(Vec<PathBuf>, usize), GeneratorError> {
        std::fs::create_dir_all(&self.config.out_dir)
            .map_err(|e| GeneratorError::io(&self.config.out_dir, e.to_string()))?;

        let mut written = Vec::new();
        let mut unchanged = 0;
        for (filename, content) in &generated.files {
            let path = self.config.out_dir.join(filename);
            if is_current(&path, content) {
                unchanged += 1;
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GeneratorError::io(parent, e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| GeneratorError::io(&path, e.to_string()))?;
            tracing::debug!(file = %filename, "wrote");
            written.push(PathBuf::from(filename));
        }

        Ok((written, unchanged))
    }
}

fn is_current(path: &Path, content: &str) -> bool {
    std::fs::read_to_string(path).is_ok_and(|existing| existing == content)
}

/// Loads the schema of every discovered module into the context.
///
/// A module without a usable manifest is recorded as a warning and skipped.
/// A manifest `id` overrides the directory-derived ID. Modules are visited in
/// sorted path order, so on an ID collision the last one wins.
pub fn collect_modules(mut ctx: GenerationContext, scan: &MarketplaceScan) -> GenerationContext {
    for discovered in &scan.modules {
        match load_module(discovered) {
            Ok(entry) => {
                tracing::debug!(module = %entry.id, kind = %entry.module_type, "loaded module");
                if let Some(replaced) = ctx.insert_module(entry) {
                    tracing::debug!(
                        module = %replaced.id,
                        dir = %replaced.source_dir.display(),
                        "module replaced by a later module with the same ID"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(module = %discovered.path_id, error = %e, "skipping module");
                let path = discovered.manifest.clone().unwrap_or_else(|| discovered.dir.clone());
                ctx.warn(discovered.path_id.clone(), path, e.to_string());
            }
        }
    }
    ctx
}

fn load_module(discovered: &DiscoveredModule) -> Result<ModuleEntry, GeneratorError> {
    let manifest = discovered
        .manifest
        .as_deref()
        .ok_or_else(|| GeneratorError::ManifestMissing {
            module: discovered.path_id.clone(),
            dir: discovered.dir.clone(),
        })?;
    let schema = frontend::try_load_schema(manifest)?;

    let id = match schema.id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => discovered.module_type.canonical_id(raw),
        _ => discovered.path_id.clone(),
    };
    let artifacts = discovered
        .analysis
        .as_ref()
        .map(|a| a.artifacts.clone())
        .unwrap_or_default();

    Ok(ModuleEntry {
        id,
        module_type: discovered.module_type,
        schema,
        artifacts,
        source_dir: discovered.dir.clone(),
    })
}

/// Records a warning for every module whose exported type names match an
/// earlier module's (`auth/better-auth` and `auth/betterAuth` both export
/// `AuthBetterAuthParams`). Both modules are still generated.
pub fn check_type_names(mut ctx: GenerationContext) -> GenerationContext {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut collisions = Vec::new();
    for module in ctx.modules.values() {
        let names = ModuleTypeNames::for_id(&module.id);
        if let Some(first) = seen.get(&names.params) {
            collisions.push((module.id.clone(), module.source_dir.clone(), first.clone(), names.params));
        } else {
            seen.insert(names.params, module.id.clone());
        }
    }

    for (module, dir, first, type_name) in collisions {
        tracing::warn!(module = %module, other = %first, type_name = %type_name, "exported type names collide");
        ctx.warn(
            module,
            dir,
            format!("exports the same type names as '{}' ({})", first, type_name),
        );
    }
    ctx
}

/// Builds the capability index from the loaded modules.
pub fn analyze(mut ctx: GenerationContext) -> GenerationContext {
    ctx.capabilities = analyze_capabilities(ctx.modules.values());
    tracing::debug!(capabilities = ctx.capabilities.capabilities.len(), "analyzed capabilities");
    ctx
}

/// Moves the scanned feature contracts into the context.
pub fn attach_contracts(mut ctx: GenerationContext, scan: MarketplaceScan) -> GenerationContext {
    ctx.contracts = scan.contracts;
    ctx
}
