//! Dead template detection.
//!
//! Cross-references every `template: '...'` literal in the marketplace's
//! blueprints with the `.tpl` files on disk.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostic::{GeneratorError, Span};
use crate::frontend::{MarketplaceScan, MarketplaceScanner};

/// Template file extension.
pub const TEMPLATE_EXTENSION: &str = "tpl";

/// A template literal with no file behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingTemplate {
    pub module: String,
    pub template: String,
    pub span: Span,
}

/// Outcome of a dead template scan. Paths are relative to the marketplace root.
#[derive(Debug, Clone, Default)]
pub struct TemplateReport {
    /// Number of template literals found in blueprints.
    pub references: usize,
    pub missing: Vec<MissingTemplate>,
    /// Template files no blueprint refers to.
    pub dead: Vec<PathBuf>,
    pub templates_on_disk: usize,
}

impl TemplateReport {
    /// No missing references, and with `strict` no dead templates either.
    pub fn is_clean(&self, strict: bool) -> bool {
        self.missing.is_empty() && (!strict || self.dead.is_empty())
    }
}

/// Scans the marketplace at `root` for missing and dead templates.
pub fn detect_dead_templates(root: &Path) -> Result<TemplateReport, GeneratorError> {
    let scan = MarketplaceScanner::new()?.scan(root)?;
    Ok(analyze_templates(&scan))
}

/// Builds a template report from an existing scan.
pub fn analyze_templates(scan: &MarketplaceScan) -> TemplateReport {
    let root = &scan.root;
    let mut report = TemplateReport::default();
    let mut referenced = BTreeSet::new();

    for module in &scan.modules {
        let Some(analysis) = &module.analysis else {
            continue;
        };
        for reference in &analysis.templates {
            report.references += 1;
            match resolve_template(root, &module.dir, &reference.template) {
                Some(path) => {
                    referenced.insert(path);
                }
                None => report.missing.push(MissingTemplate {
                    module: module.path_id.clone(),
                    template: reference.template.clone(),
                    span: reference.span.clone(),
                }),
            }
        }
    }

    for path in template_files(root) {
        report.templates_on_disk += 1;
        if !referenced.contains(&path) {
            report.dead.push(relative_to(root, &path));
        }
    }

    tracing::debug!(
        references = report.references,
        missing = report.missing.len(),
        dead = report.dead.len(),
        "template scan complete"
    );
    report
}

/// Resolves a template literal against the module directory, its
/// `templates/` directory, then the marketplace root.
fn resolve_template(root: &Path, module_dir: &Path, template: &str) -> Option<PathBuf> {
    let template = template.trim_start_matches("./");
    [
        module_dir.join(template),
        module_dir.join("templates").join(template),
        root.join(template),
    ]
    .into_iter()
    .map(|candidate| normalize(&candidate))
    .find(|candidate| candidate.is_file())
}

/// Every `.tpl` file below the module type directories, in sorted order.
fn template_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for module_type in crate::ir::ModuleType::ALL {
        let dir = root.join(module_type.dir_name());
        if !dir.is_dir() {
            continue;
        }
        let entries = WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || !(name.starts_with('.') || name == "node_modules")
            })
            .filter_map(|e| e.ok());
        for entry in entries {
            let is_template = entry.path().extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION);
            if entry.file_type().is_file() && is_template {
                files.push(normalize(entry.path()));
            }
        }
    }
    files
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, normalize(root)).unwrap_or_else(|| path.to_path_buf())
}
