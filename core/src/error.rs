//! # Error Handling
//!
//! Provides the `AppError` enum shared by every stage of document graph construction.
//!
//! All variants describe document-authoring defects. None of them is transient, so
//! callers surface the message and abort rather than retry.

use derive_more::Display;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate. Every variant carries a human readable
/// location (a reference pointer or a schema position) so the caller can point the
/// author at the offending fragment.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The input is not an object, or it fails document grammar validation.
    #[display("Invalid input: {_0}")]
    InvalidInput(String),

    /// Input text could not be decoded as YAML or JSON.
    #[display("Parse error: {_0}")]
    Parse(String),

    /// A reference chain or composition chain revisits an already visited node.
    #[display("Cyclic reference detected at '{_0}'")]
    CyclicReference(String),

    /// A reference pointer cannot be fully walked.
    #[display("Dangling reference '{_0}'")]
    DanglingReference(String),

    /// A schema position resolves to nothing usable.
    #[display("Schema at '{_0}' is not defined")]
    UndefinedSchema(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
