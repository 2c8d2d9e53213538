//! Lint-style marketplace checks.
//!
//! - `templates`: blueprint template references versus `.tpl` files on disk
//! - `compliance`: the full check suite with a persisted compliance score

pub mod compliance;
pub mod templates;

pub use compliance::{validate_comprehensive, ComplianceManifest, ValidationReport, ValidationResult};
pub use templates::{detect_dead_templates, MissingTemplate, TemplateReport};
