//! Reads an API description from disk and builds its graph.

use crate::error::{CliError, CliResult};
use oapi_graph_core::Document;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads `path` (YAML or JSON) into a document graph.
pub fn load_document(path: &Path) -> CliResult<Document> {
    if !path.exists() {
        return Err(CliError::General(format!(
            "API description not found: {:?}",
            path
        )));
    }

    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "read API description");
    Ok(Document::from_yaml_str(&text)?)
}
