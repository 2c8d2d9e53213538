//! Generator and validator configuration.

use std::path::{Path, PathBuf};

/// Default output location, relative to the marketplace root.
pub const DEFAULT_OUTPUT_DIR: &str = "types/generated";

/// Default command for the contract validation check.
pub const DEFAULT_CONTRACTS_COMMAND: &[&str] = &["npm", "run", "validate:contracts"];

/// Configuration for the type generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Marketplace root containing adapters/, connectors/ and features/.
    pub marketplace_dir: PathBuf,

    /// Directory to write generated declarations into.
    pub out_dir: PathBuf,
}

impl GeneratorConfig {
    /// Configuration rooted at `marketplace_dir` with the default output location.
    pub fn for_marketplace(marketplace_dir: impl Into<PathBuf>) -> Self {
        let marketplace_dir = marketplace_dir.into();
        let out_dir = marketplace_dir.join(DEFAULT_OUTPUT_DIR);
        Self {
            marketplace_dir,
            out_dir,
        }
    }

    /// Overrides the output directory.
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::for_marketplace(".")
    }
}

/// Configuration for the comprehensive validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Marketplace root.
    pub marketplace_dir: PathBuf,

    /// Compliance manifest, compared against and rewritten on every run.
    pub manifest_path: PathBuf,

    /// External contract check. `None` skips it.
    pub contracts_command: Option<Vec<String>>,
}

impl ValidatorConfig {
    pub fn for_marketplace(marketplace_dir: impl Into<PathBuf>) -> Self {
        let marketplace_dir = marketplace_dir.into();
        let manifest_path = marketplace_dir.join("manifest.json");
        Self {
            marketplace_dir,
            manifest_path,
            contracts_command: Some(
                DEFAULT_CONTRACTS_COMMAND.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    /// Marketplace root as a path.
    pub fn root(&self) -> &Path {
        &self.marketplace_dir
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::for_marketplace(".")
    }
}
