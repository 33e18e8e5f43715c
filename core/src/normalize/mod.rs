#![deny(missing_docs)]

//! # Document Normalization
//!
//! Turns an arbitrary input value into a document satisfying the graph's input
//! contract:
//!
//! - **upgrade**: Swagger 2.0 documents are rewritten into the target 3.0 shape.
//! - **validation**: the (upgraded) document is checked against the document grammar.
//!
//! The graph only depends on the [`DocumentNormalizer`] trait, so callers may plug in
//! a different collaborator.

mod upgrade;
mod validation;

pub use validation::{collect_issues, validate_document, ValidationIssue};

use crate::error::{AppError, AppResult};
use serde_json::Value;
use tracing::debug;

/// Accepts an arbitrary value and returns a well-typed document or a failure.
pub trait DocumentNormalizer {
    /// Normalizes `input`, upgrading and validating it.
    fn normalize(&self, input: Value) -> AppResult<Value>;
}

/// Options for the [`StandardNormalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Version written into upgraded documents.
    pub target_version: String,
    /// Whether Swagger 2.0 input is upgraded (otherwise it is rejected).
    pub upgrade_legacy: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target_version: "3.0.0".to_string(),
            upgrade_legacy: true,
        }
    }
}

/// The built-in normalizer: version detection, legacy upgrade, grammar validation.
#[derive(Debug, Clone, Default)]
pub struct StandardNormalizer {
    options: NormalizeOptions,
}

impl StandardNormalizer {
    /// Creates a normalizer with explicit options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }
}

/// The grammar family a raw document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceVersion {
    Swagger2,
    OpenApi3,
}

fn detect_version(doc: &serde_json::Map<String, Value>) -> AppResult<SourceVersion> {
    if let Some(version) = doc.get("openapi") {
        return match version.as_str() {
            Some(v) if v.starts_with("3.") => Ok(SourceVersion::OpenApi3),
            _ => Err(AppError::InvalidInput(format!(
                "Unsupported OpenAPI version: {}. Only 3.x is supported.",
                version
            ))),
        };
    }

    match doc.get("swagger").and_then(Value::as_str) {
        Some("2.0") => Ok(SourceVersion::Swagger2),
        Some(other) => Err(AppError::InvalidInput(format!(
            "Unsupported Swagger version: {}. Only 2.0 can be upgraded.",
            other
        ))),
        None => Err(AppError::InvalidInput(
            "missing 'openapi' or 'swagger' version field".into(),
        )),
    }
}

impl DocumentNormalizer for StandardNormalizer {
    fn normalize(&self, input: Value) -> AppResult<Value> {
        let doc = match input {
            Value::Object(map) => map,
            _ => return Err(AppError::InvalidInput("document must be an object".into())),
        };

        let normalized = match detect_version(&doc)? {
            SourceVersion::OpenApi3 => Value::Object(doc),
            SourceVersion::Swagger2 if self.options.upgrade_legacy => {
                debug!(target_version = %self.options.target_version, "upgrading Swagger 2.0 document");
                upgrade::upgrade_swagger2(doc, &self.options.target_version)
            }
            SourceVersion::Swagger2 => {
                return Err(AppError::InvalidInput(
                    "Swagger 2.0 input rejected: legacy upgrade is disabled".into(),
                ))
            }
        };

        validate_document(&normalized)?;
        Ok(normalized)
    }
}
