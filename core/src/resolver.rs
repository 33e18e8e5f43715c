#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Follows `{ "$ref": "<pointer>" }` tokens inside a single document until a
//! concrete fragment is reached.
//!
//! The resolver holds no cache. Each top-level call starts a fresh visited stack of
//! pointer key lists; revisiting a key list is a cycle.

use crate::error::{AppError, AppResult};
use crate::pointer::{get_segments, is_local_pointer, parse_pointer};
use serde_json::Value;
use tracing::trace;

/// Returns the pointer string if `value` is a reference token.
pub fn reference_target(value: &Value) -> Option<&str> {
    value.as_object()?.get("$ref")?.as_str()
}

/// Resolves reference tokens against the root of one document.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    /// Creates a resolver over the given document root.
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The document root this resolver walks.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Returns the concrete fragment `value` ultimately designates.
    ///
    /// Non-reference inputs are returned unchanged. Chains of references are
    /// followed transparently.
    ///
    /// # Errors
    ///
    /// * `CyclicReference` if a pointer's key list repeats within this chain.
    /// * `DanglingReference` if a pointer cannot be walked to the end, or targets
    ///   another document.
    pub fn resolve(&self, value: &'a Value) -> AppResult<&'a Value> {
        let mut visited: Vec<Vec<String>> = Vec::new();
        let mut current = value;

        while let Some(pointer) = reference_target(current) {
            if !is_local_pointer(pointer) {
                return Err(AppError::DanglingReference(pointer.to_string()));
            }

            let keys = parse_pointer(pointer);
            if visited.contains(&keys) {
                return Err(AppError::CyclicReference(pointer.to_string()));
            }

            trace!(pointer, depth = visited.len(), "following reference");
            current = get_segments(self.root, &keys)
                .ok_or_else(|| AppError::DanglingReference(pointer.to_string()))?;
            visited.push(keys);
        }

        Ok(current)
    }

    /// Resolves a bare pointer string, as if it were wrapped in a reference token.
    pub fn resolve_pointer(&self, pointer: &str) -> AppResult<&'a Value> {
        if !is_local_pointer(pointer) {
            return Err(AppError::DanglingReference(pointer.to_string()));
        }
        let keys = parse_pointer(pointer);
        let target = get_segments(self.root, &keys)
            .ok_or_else(|| AppError::DanglingReference(pointer.to_string()))?;
        self.resolve(target)
    }
}
