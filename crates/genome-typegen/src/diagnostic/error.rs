//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while scanning, generating, or validating.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("I/O failure on '{}': {message}", path.display())]
    #[diagnostic(code(typegen::io::error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Marketplace directory not found: {}", path.display())]
    #[diagnostic(
        code(typegen::io::marketplace_not_found),
        help("Pass the marketplace root (the directory containing adapters/, connectors/ and features/)")
    )]
    MarketplaceNotFound {
        path: PathBuf,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Module '{module}' has no manifest")]
    #[diagnostic(
        code(typegen::schema::missing_manifest),
        help("Add an adapter.json, connector.json or feature.json next to the blueprint")
    )]
    ManifestMissing {
        module: String,
        dir: PathBuf,
    },

    #[error("Invalid manifest '{}': {message}", path.display())]
    #[diagnostic(
        code(typegen::schema::invalid_manifest),
        help("Manifests must be JSON objects with an optional 'parameters' object")
    )]
    ManifestInvalid {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to initialize parser")]
    #[diagnostic(code(typegen::parse::init_failed))]
    ParserInitFailed,

    #[error("Failed to parse blueprint: {}", path.display())]
    #[diagnostic(code(typegen::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("{failed} validation check(s) failed: {checks}")]
    #[diagnostic(
        code(typegen::validate::checks_failed),
        help("Fix the reported problems and run the validator again")
    )]
    ValidationFailed {
        failed: usize,
        checks: String,
    },

    #[error("Compliance regressed from {previous:.1}% to {current:.1}%")]
    #[diagnostic(
        code(typegen::validate::compliance_regression),
        help("A module that used to pass now fails; see the validation details above")
    )]
    ComplianceRegression {
        previous: f64,
        current: f64,
    },

    #[error("{count} blueprint template reference(s) point at missing files")]
    #[diagnostic(code(typegen::validate::missing_templates))]
    MissingTemplates {
        count: usize,
    },
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}
