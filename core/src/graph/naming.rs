#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Derives snake_case handler names for operations, for generators that emit one
//! function per operation.

use super::Method;

/// Converts `operationId`-style text (camelCase, PascalCase, kebab-case, dotted)
/// into snake_case. Non-alphanumeric runs collapse into a single `_`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;

    for c in s.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() {
                if prev_lower_or_digit && !out.ends_with('_') {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
                prev_lower_or_digit = false;
            } else {
                out.push(c);
                prev_lower_or_digit = true;
            }
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    out.trim_end_matches('_').to_string()
}

/// Name for an operation: its `operationId` in snake_case, otherwise
/// `<method>_<static path>` with `/` replaced by `_`.
pub fn handler_name(method: Method, operation_id: Option<&str>, static_path: &str) -> String {
    match operation_id.map(to_snake_case).filter(|name| !name.is_empty()) {
        Some(name) => name,
        None if static_path.is_empty() => format!("{}_root", method.as_str()),
        None => format!("{}_{}", method.as_str(), to_snake_case(static_path)),
    }
}
