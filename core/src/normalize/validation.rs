#![deny(missing_docs)]

//! # Document Validation
//!
//! Structural checks of a 3.0 document before the graph is built. Unlike the graph
//! builder, which stops at the first fault, validation walks the whole document
//! and reports every issue it finds in one error.
//!
//! Checks performed:
//! - Root: `openapi` version string, `info` with `title`/`version`, `paths` object.
//! - Operations: `responses` object, well-formed parameters, response keys.
//! - References: `$ref` must be a string pointer.
//! - Schemas: objects only (except under a media type), keyword types,
//!   non-negative bounds, compilable `pattern`.

use crate::error::{AppError, AppResult};
use crate::graph::ResponseStatus;
use crate::pointer::child_location;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

const OPERATION_KEYS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];
const PARAM_LOCATIONS: [&str; 4] = ["query", "header", "path", "cookie"];
const SCHEMA_TYPES: [&str; 7] = ["null", "array", "object", "string", "number", "boolean", "integer"];
const NON_NEGATIVE_BOUNDS: [&str; 6] = [
    "maxLength",
    "minLength",
    "maxItems",
    "minItems",
    "maxProperties",
    "minProperties",
];

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value.
    pub pointer: String,
    /// What is wrong there.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// Validates `doc`, failing with one `InvalidInput` listing every issue.
pub fn validate_document(doc: &Value) -> AppResult<()> {
    let issues = collect_issues(doc);
    if issues.is_empty() {
        return Ok(());
    }

    let listing = issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::InvalidInput(format!(
        "document failed validation with {} issue(s): {}",
        issues.len(),
        listing
    )))
}

/// Returns every issue found in `doc` (empty when the document is valid).
pub fn collect_issues(doc: &Value) -> Vec<ValidationIssue> {
    let mut validator = Validator::default();
    validator.root(doc);
    validator.issues
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn report(&mut self, pointer: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            pointer: pointer.to_string(),
            message: message.into(),
        });
    }

    fn root(&mut self, doc: &Value) {
        let Some(root) = doc.as_object() else {
            self.report("#", "document must be an object");
            return;
        };

        match root.get("openapi").and_then(Value::as_str) {
            Some(v) if v.starts_with("3.") => {}
            Some(v) => self.report("#/openapi", format!("unsupported version '{}'", v)),
            None => self.report("#/openapi", "required string is missing"),
        }

        match root.get("info") {
            Some(Value::Object(info)) => {
                for field in ["title", "version"] {
                    if !info.get(field).map_or(false, Value::is_string) {
                        self.report(&child_location("#/info", field), "required string is missing");
                    }
                }
            }
            Some(_) => self.report("#/info", "must be an object"),
            None => self.report("#/info", "required object is missing"),
        }

        match root.get("paths") {
            Some(Value::Object(paths)) => {
                for (path, item) in paths {
                    self.path_item(item, &child_location("#/paths", path));
                }
            }
            Some(_) => self.report("#/paths", "must be an object"),
            None => self.report("#/paths", "required object is missing"),
        }

        if let Some(components) = root.get("components") {
            self.components(components);
        }
    }

    fn components(&mut self, components: &Value) {
        let Some(components) = components.as_object() else {
            self.report("#/components", "must be an object");
            return;
        };

        if let Some(Value::Object(schemas)) = components.get("schemas") {
            for (name, schema) in schemas {
                self.schema(schema, &child_location("#/components/schemas", name));
            }
        }
        if let Some(Value::Object(params)) = components.get("parameters") {
            for (name, param) in params {
                self.parameter(param, &child_location("#/components/parameters", name));
            }
        }
        if let Some(Value::Object(responses)) = components.get("responses") {
            for (name, response) in responses {
                self.response(response, &child_location("#/components/responses", name));
            }
        }
        if let Some(Value::Object(bodies)) = components.get("requestBodies") {
            for (name, body) in bodies {
                self.request_body(body, &child_location("#/components/requestBodies", name));
            }
        }
    }

    fn path_item(&mut self, item: &Value, location: &str) {
        let Some(item) = item.as_object() else {
            self.report(location, "path item must be an object");
            return;
        };
        if self.reference(item, location) {
            return;
        }

        self.parameters(item, location);
        for method in OPERATION_KEYS {
            if let Some(op) = item.get(method) {
                self.operation(op, &child_location(location, method));
            }
        }
    }

    fn operation(&mut self, op: &Value, location: &str) {
        let Some(op) = op.as_object() else {
            self.report(location, "operation must be an object");
            return;
        };

        self.parameters(op, location);

        if let Some(body) = op.get("requestBody") {
            self.request_body(body, &child_location(location, "requestBody"));
        }

        let responses_at = child_location(location, "responses");
        match op.get("responses") {
            Some(Value::Object(responses)) => {
                for (key, response) in responses {
                    let at = child_location(&responses_at, key);
                    if ResponseStatus::parse(key).is_none() {
                        self.report(&at, format!("invalid response key '{}'", key));
                    }
                    self.response(response, &at);
                }
            }
            Some(_) => self.report(&responses_at, "must be an object"),
            None => self.report(&responses_at, "required object is missing"),
        }
    }

    fn parameters(&mut self, owner: &Map<String, Value>, location: &str) {
        let at = child_location(location, "parameters");
        match owner.get("parameters") {
            None => {}
            Some(Value::Array(params)) => {
                for (idx, param) in params.iter().enumerate() {
                    self.parameter(param, &child_location(&at, &idx.to_string()));
                }
            }
            Some(_) => self.report(&at, "must be an array"),
        }
    }

    fn parameter(&mut self, param: &Value, location: &str) {
        let Some(param) = param.as_object() else {
            self.report(location, "parameter must be an object");
            return;
        };
        if self.reference(param, location) {
            return;
        }

        if !param.get("name").map_or(false, Value::is_string) {
            self.report(&child_location(location, "name"), "required string is missing");
        }
        match param.get("in").and_then(Value::as_str) {
            Some(loc) if PARAM_LOCATIONS.contains(&loc) => {
                if loc == "path" && param.get("required").and_then(Value::as_bool) != Some(true) {
                    self.report(
                        &child_location(location, "required"),
                        "path parameters must be required",
                    );
                }
            }
            Some(loc) => self.report(
                &child_location(location, "in"),
                format!("unknown parameter location '{}'", loc),
            ),
            None => self.report(&child_location(location, "in"), "required string is missing"),
        }

        if let Some(schema) = param.get("schema") {
            self.schema(schema, &child_location(location, "schema"));
        }
        self.content(param, location);
    }

    fn request_body(&mut self, body: &Value, location: &str) {
        let Some(body) = body.as_object() else {
            self.report(location, "request body must be an object");
            return;
        };
        if self.reference(body, location) {
            return;
        }
        if !matches!(body.get("content"), Some(Value::Object(_))) {
            self.report(&child_location(location, "content"), "required object is missing");
        }
        self.content(body, location);
    }

    fn response(&mut self, response: &Value, location: &str) {
        let Some(response) = response.as_object() else {
            self.report(location, "response must be an object");
            return;
        };
        if self.reference(response, location) {
            return;
        }
        if !response.get("description").map_or(false, Value::is_string) {
            self.report(&child_location(location, "description"), "required string is missing");
        }
        self.content(response, location);
    }

    fn content(&mut self, owner: &Map<String, Value>, location: &str) {
        let at = child_location(location, "content");
        match owner.get("content") {
            None => {}
            Some(Value::Object(content)) => {
                for (mime, media) in content {
                    let media_at = child_location(&at, mime);
                    match media {
                        Value::Object(media) => {
                            // scalar media schemas mean "no schema"
                            if let Some(schema @ Value::Object(_)) = media.get("schema") {
                                self.schema(schema, &child_location(&media_at, "schema"));
                            }
                        }
                        _ => self.report(&media_at, "media type must be an object"),
                    }
                }
            }
            Some(_) => self.report(&at, "must be an object"),
        }
    }

    /// Checks a `$ref` entry if present. Returns whether `map` is a reference.
    fn reference(&mut self, map: &Map<String, Value>, location: &str) -> bool {
        let Some(target) = map.get("$ref") else {
            return false;
        };
        match target.as_str() {
            Some(t) if t.starts_with('#') || t.starts_with('/') => {}
            Some(t) => self.report(
                &child_location(location, "$ref"),
                format!("unsupported reference '{}'", t),
            ),
            None => self.report(&child_location(location, "$ref"), "must be a string"),
        }
        true
    }

    fn schema(&mut self, schema: &Value, location: &str) {
        let Some(schema) = schema.as_object() else {
            self.report(location, "schema must be an object");
            return;
        };
        if self.reference(schema, location) {
            return;
        }

        if let Some(ty) = schema.get("type") {
            match ty.as_str() {
                Some(t) if SCHEMA_TYPES.contains(&t) => {}
                _ => self.report(&child_location(location, "type"), format!("invalid type {}", ty)),
            }
        }

        for key in ["allOf", "oneOf", "anyOf"] {
            match schema.get(key) {
                None => {}
                Some(Value::Array(members)) => {
                    let at = child_location(location, key);
                    for (idx, member) in members.iter().enumerate() {
                        self.schema(member, &child_location(&at, &idx.to_string()));
                    }
                }
                Some(_) => self.report(&child_location(location, key), "must be an array"),
            }
        }

        for key in ["not", "items"] {
            if let Some(child) = schema.get(key) {
                self.schema(child, &child_location(location, key));
            }
        }
        if let Some(child @ Value::Object(_)) = schema.get("additionalProperties") {
            self.schema(child, &child_location(location, "additionalProperties"));
        }

        match schema.get("properties") {
            None => {}
            Some(Value::Object(properties)) => {
                let at = child_location(location, "properties");
                for (name, property) in properties {
                    self.schema(property, &child_location(&at, name));
                }
            }
            Some(_) => self.report(&child_location(location, "properties"), "must be an object"),
        }

        match schema.get("required") {
            None => {}
            Some(Value::Array(names)) if names.iter().all(Value::is_string) => {}
            Some(_) => self.report(&child_location(location, "required"), "must be an array of strings"),
        }

        match schema.get("enum") {
            None => {}
            Some(Value::Array(values)) if !values.is_empty() => {}
            Some(_) => self.report(&child_location(location, "enum"), "must be a non-empty array"),
        }

        if let Some(multiple_of) = schema.get("multipleOf") {
            if !multiple_of.as_f64().map_or(false, |m| m > 0.0) {
                self.report(&child_location(location, "multipleOf"), "must be a number greater than 0");
            }
        }

        for key in NON_NEGATIVE_BOUNDS {
            if let Some(bound) = schema.get(key) {
                if bound.as_u64().is_none() {
                    self.report(&child_location(location, key), "must be a non-negative integer");
                }
            }
        }

        if let Some(pattern) = schema.get("pattern") {
            match pattern.as_str() {
                Some(p) => {
                    if let Err(e) = Regex::new(p) {
                        self.report(
                            &child_location(location, "pattern"),
                            format!("invalid regular expression: {}", e),
                        );
                    }
                }
                None => self.report(&child_location(location, "pattern"), "must be a string"),
            }
        }
    }
}
