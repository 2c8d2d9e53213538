//! Comprehensive marketplace validation.
//!
//! Runs every check, scores the share of modules that pass all per-module
//! checks, and compares that score with the previous run's `manifest.json`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;
use crate::diagnostic::GeneratorError;
use crate::frontend::{self, MarketplaceScan, MarketplaceScanner};
use super::templates::analyze_templates;

/// Compliance manifest format version.
pub const MANIFEST_VERSION: &str = "1.0";

/// Bytes of subprocess output kept in a failed contract check.
const OUTPUT_TAIL: usize = 2000;

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Vec<String>,
}

impl ValidationResult {
    fn new(name: &str, failures: Vec<String>, ok: &str) -> Self {
        let passed = failures.is_empty();
        Self {
            name: name.to_string(),
            passed,
            message: if passed {
                ok.to_string()
            } else {
                format!("{} problem(s)", failures.len())
            },
            details: failures,
        }
    }
}

/// The persisted compliance record, compared between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceManifest {
    pub version: String,

    /// Percentage of modules passing every per-module check.
    pub score: f64,

    pub modules: usize,

    pub passing: usize,

    /// Check name to pass/fail.
    pub checks: BTreeMap<String, bool>,

    /// Modules failing at least one check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failing: Vec<String>,
}

impl ComplianceManifest {
    /// Loads a manifest. Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, GeneratorError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| GeneratorError::io(path, e.to_string()))?;

        let manifest: Self = serde_json::from_str(&content).map_err(|e| {
            GeneratorError::io(path, format!("Failed to parse compliance manifest: {}", e))
        })?;

        Ok(Some(manifest))
    }

    /// Saves the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), GeneratorError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GeneratorError::io(parent, e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            GeneratorError::io(path, format!("Failed to serialize compliance manifest: {}", e))
        })?;

        std::fs::write(path, content + "\n").map_err(|e| GeneratorError::io(path, e.to_string()))
    }
}

/// Everything one validation run found.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
    pub manifest: ComplianceManifest,
    pub previous_score: Option<f64>,
}

impl ValidationReport {
    pub fn score(&self) -> f64 {
        self.manifest.score
    }

    /// The score dropped compared with the previous run.
    pub fn regressed(&self) -> bool {
        self.previous_score
            .is_some_and(|previous| self.manifest.score + f64::EPSILON < previous)
    }

    pub fn failed(&self) -> Vec<&ValidationResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    pub fn passed(&self) -> bool {
        self.failed().is_empty() && !self.regressed()
    }

    /// Converts the outcome into an error when the run should fail.
    pub fn into_result(self) -> Result<Self, GeneratorError> {
        let failed = self.failed();
        if !failed.is_empty() {
            return Err(GeneratorError::ValidationFailed {
                failed: failed.len(),
                checks: failed.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", "),
            });
        }
        if let Some(previous) = self.previous_score.filter(|_| self.regressed()) {
            return Err(GeneratorError::ComplianceRegression {
                previous,
                current: self.manifest.score,
            });
        }
        Ok(self)
    }
}

/// Per-module failures collected across checks.
#[derive(Default)]
struct ModuleFailures {
    failing: BTreeSet<String>,
}

impl ModuleFailures {
    fn record(&mut self, module: &str) {
        self.failing.insert(module.to_string());
    }
}

/// Runs every check and records the new compliance manifest.
pub fn validate_comprehensive(config: &ValidatorConfig) -> Result<ValidationReport, GeneratorError> {
    let root = config.root();
    let scan = MarketplaceScanner::new()?.scan(root)?;
    let mut failures = ModuleFailures::default();
    let mut results = Vec::new();

    match &config.contracts_command {
        Some(command) if !command.is_empty() => results.push(check_contracts(root, command)),
        _ => tracing::info!("contract check skipped"),
    }
    results.push(check_manifests(&scan, &mut failures));
    results.push(check_blueprints(&scan, &mut failures));
    results.push(check_templates(&scan, &mut failures));
    results.push(check_schemas(&scan, &mut failures));

    for result in &results {
        if result.passed {
            tracing::debug!(check = %result.name, "passed");
        } else {
            tracing::warn!(check = %result.name, problems = result.details.len(), "failed");
        }
    }

    let modules = scan.modules.len();
    let passing = modules - failures.failing.len().min(modules);
    let score = if modules == 0 {
        100.0
    } else {
        (passing as f64 / modules as f64 * 1000.0).round() / 10.0
    };

    let manifest = ComplianceManifest {
        version: MANIFEST_VERSION.to_string(),
        score,
        modules,
        passing,
        checks: results.iter().map(|r| (r.name.clone(), r.passed)).collect(),
        failing: failures.failing.into_iter().collect(),
    };

    let previous_score = match ComplianceManifest::load(&config.manifest_path) {
        Ok(previous) => previous.map(|m| m.score),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable compliance manifest");
            None
        }
    };
    manifest.save(&config.manifest_path)?;

    Ok(ValidationReport {
        results,
        manifest,
        previous_score,
    })
}

/// Runs the external contract validation command in the marketplace root.
fn check_contracts(root: &Path, command: &[String]) -> ValidationResult {
    let name = "contracts";
    let display = command.join(" ");
    let output = Command::new(&command[0])
        .args(&command[1..])
        .current_dir(root)
        .output();

    match output {
        Ok(output) if output.status.success() => ValidationResult::new(name, Vec::new(), "contracts valid"),
        Ok(output) => {
            let mut details = vec![format!("`{}` exited with {}", display, output.status)];
            for stream in [&output.stdout, &output.stderr] {
                let text = String::from_utf8_lossy(stream);
                let text = text.trim();
                if !text.is_empty() {
                    details.push(tail(text, OUTPUT_TAIL).to_string());
                }
            }
            ValidationResult {
                name: name.to_string(),
                passed: false,
                message: "contract validation failed".to_string(),
                details,
            }
        }
        Err(e) => ValidationResult {
            name: name.to_string(),
            passed: false,
            message: format!("could not run `{}`", display),
            details: vec![e.to_string()],
        },
    }
}

fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Every `*.json` in a module directory parses.
fn check_manifests(scan: &MarketplaceScan, failures: &mut ModuleFailures) -> ValidationResult {
    let mut problems = Vec::new();
    for module in &scan.modules {
        for path in json_files(&module.dir) {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).map_err(|e| e.to_string()));
            if let Err(e) = parsed {
                failures.record(&module.path_id);
                problems.push(format!("{}: {}", display_path(scan, &path), e));
            }
        }
    }
    ValidationResult::new("manifests", problems, "all JSON files parse")
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Every module with a manifest has a blueprint that parses cleanly.
fn check_blueprints(scan: &MarketplaceScan, failures: &mut ModuleFailures) -> ValidationResult {
    let mut problems = Vec::new();
    for module in &scan.modules {
        let problem = match (&module.manifest, &module.blueprint, &module.analysis) {
            (Some(_), None, _) => Some("missing blueprint.ts".to_string()),
            (_, Some(path), None) => Some(format!("{}: could not be parsed", display_path(scan, path))),
            (_, Some(path), Some(analysis)) if analysis.has_syntax_errors => {
                Some(format!("{}: syntax errors", display_path(scan, path)))
            }
            _ => None,
        };
        if let Some(problem) = problem {
            failures.record(&module.path_id);
            problems.push(format!("{}: {}", module.path_id, problem));
        }
    }
    ValidationResult::new("blueprints", problems, "all blueprints parse")
}

/// No blueprint refers to a missing template.
fn check_templates(scan: &MarketplaceScan, failures: &mut ModuleFailures) -> ValidationResult {
    let report = analyze_templates(scan);
    let problems = report
        .missing
        .iter()
        .map(|missing| {
            failures.record(&missing.module);
            format!("{}: template '{}' not found", missing.span, missing.template)
        })
        .collect();
    ValidationResult::new(
        "templates",
        problems,
        &format!("{} template reference(s) resolve", report.references),
    )
}

/// Every manifest converts into a module schema.
fn check_schemas(scan: &MarketplaceScan, failures: &mut ModuleFailures) -> ValidationResult {
    let mut problems = Vec::new();
    for module in &scan.modules {
        let Some(manifest) = &module.manifest else {
            failures.record(&module.path_id);
            problems.push(format!("{}: no manifest", module.path_id));
            continue;
        };
        if let Err(e) = frontend::try_load_schema(manifest) {
            failures.record(&module.path_id);
            problems.push(format!("{}: {}", module.path_id, e));
        }
    }
    ValidationResult::new("schemas", problems, "all manifests load")
}

fn display_path(scan: &MarketplaceScan, path: &Path) -> String {
    pathdiff::diff_paths(path, &scan.root)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn config(root: &Path) -> ValidatorConfig {
        ValidatorConfig {
            contracts_command: None,
            ..ValidatorConfig::for_marketplace(root)
        }
    }

    fn healthy(root: &Path) {
        write(root, "adapters/database/drizzle/adapter.json", r#"{ "parameters": {} }"#);
        write(root, "adapters/database/drizzle/blueprint.ts", "export default { actions: [] };");
        write(root, "features/auth/feature.json", "{}");
        write(root, "features/auth/blueprint.ts", "export default { actions: [] };");
    }

    #[test]
    fn test_healthy_marketplace() {
        let dir = TempDir::new().unwrap();
        healthy(dir.path());

        let report = validate_comprehensive(&config(dir.path())).unwrap();

        assert!(report.passed(), "{:?}", report.failed());
        assert_eq!(report.score(), 100.0);
        assert_eq!(report.manifest.modules, 2);
        assert!(dir.path().join("manifest.json").is_file());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_regression_detected() {
        let dir = TempDir::new().unwrap();
        healthy(dir.path());
        validate_comprehensive(&config(dir.path())).unwrap();

        write(dir.path(), "features/auth/feature.json", "{ broken");
        let report = validate_comprehensive(&config(dir.path())).unwrap();

        assert_eq!(report.previous_score, Some(100.0));
        assert_eq!(report.score(), 50.0);
        assert!(report.regressed());
        assert_eq!(report.manifest.failing, vec!["features/auth".to_string()]);

        let failed: Vec<_> = report.failed().iter().map(|r| r.name.clone()).collect();
        assert_eq!(failed, vec!["manifests", "schemas"]);
        assert!(matches!(
            report.into_result(),
            Err(GeneratorError::ValidationFailed { failed: 2, .. })
        ));
    }

    #[test]
    fn test_missing_blueprint_and_template() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "adapters/cache/redis/adapter.json", "{}");
        write(dir.path(), "adapters/ui/shadcn/adapter.json", "{}");
        write(
            dir.path(),
            "adapters/ui/shadcn/blueprint.ts",
            "export default { actions: [{ type: 'CREATE_FILE', path: 'a', template: 'templates/a.tpl' }] };",
        );

        let report = validate_comprehensive(&config(dir.path())).unwrap();
        let by_name: BTreeMap<_, _> = report.results.iter().map(|r| (r.name.as_str(), r)).collect();

        assert!(!by_name["blueprints"].passed);
        assert_eq!(by_name["blueprints"].details, vec!["cache/redis: missing blueprint.ts"]);
        assert!(!by_name["templates"].passed);
        assert_eq!(report.score(), 0.0);
    }

    #[test]
    fn test_contract_command_failure_is_a_result() {
        let dir = TempDir::new().unwrap();
        healthy(dir.path());
        let config = ValidatorConfig {
            contracts_command: Some(vec!["definitely-not-a-real-command-4821".to_string()]),
            ..ValidatorConfig::for_marketplace(dir.path())
        };

        let report = validate_comprehensive(&config).unwrap();

        let contracts = &report.results[0];
        assert_eq!(contracts.name, "contracts");
        assert!(!contracts.passed);
        assert!(contracts.message.starts_with("could not run"));
        assert!(report.results[1..].iter().all(|r| r.passed));
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("héllo", 4), "llo");
    }
}
