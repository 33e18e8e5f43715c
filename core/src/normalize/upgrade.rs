//! # Swagger 2.0 Upgrade
//!
//! Rewrites a Swagger 2.0 document into the OpenAPI 3.0 shape. Only the parts the
//! document graph reads are carried over structurally; unknown keys are kept as-is.

use crate::resolver::reference_target;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::warn;
use url::Url;

const DEFAULT_MIME: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Keywords a 2.0 non-body parameter carries inline that belong under `schema` in 3.0.
const PARAM_SCHEMA_KEYS: [&str; 16] = [
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "multipleOf",
];

const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

struct UpgradeContext {
    produces: Vec<String>,
    consumes: Vec<String>,
    /// Shared `in: body` parameters, now under `components.requestBodies`.
    body_params: HashSet<String>,
    /// Shared `in: formData` parameters. 3.0 has no form parameters, so these are
    /// inlined into each referencing operation's request body.
    form_params: HashMap<String, Value>,
}

/// Where the request body of an operation comes from.
#[derive(Clone)]
enum BodySource {
    Shared(String),
    Inline(Value),
}

impl BodySource {
    fn into_request_body(self, consumes: &[String]) -> Value {
        match self {
            BodySource::Shared(name) => json!({ "$ref": format!("#/components/requestBodies/{}", name) }),
            BodySource::Inline(param) => body_to_request_body(param, consumes),
        }
    }
}

/// A 2.0 parameter list split by where each entry lands in 3.0.
#[derive(Default)]
struct SortedParams {
    plain: Vec<Value>,
    body: Option<BodySource>,
    form: Vec<Value>,
}

fn sort_params(params: Vec<Value>, ctx: &UpgradeContext) -> SortedParams {
    let mut sorted = SortedParams::default();
    for param in params {
        if let Some(name) = reference_target(&param).and_then(|t| t.strip_prefix("#/parameters/")) {
            if ctx.body_params.contains(name) {
                sorted.body = Some(BodySource::Shared(name.to_string()));
                continue;
            }
            if let Some(field) = ctx.form_params.get(name) {
                sorted.form.push(field.clone());
                continue;
            }
        }

        let location = location_of(&param).map(str::to_owned);
        match location.as_deref() {
            Some("body") => sorted.body = Some(BodySource::Inline(param)),
            Some("formData") => sorted.form.push(param),
            _ => sorted.plain.push(convert_parameter(param)),
        }
    }
    sorted
}

pub(crate) fn upgrade_swagger2(mut doc: Map<String, Value>, target_version: &str) -> Value {
    doc.remove("swagger");
    let produces = take_mime_list(&mut doc, "produces").unwrap_or_default();
    let consumes = take_mime_list(&mut doc, "consumes").unwrap_or_default();
    let servers = build_servers(doc.remove("host"), doc.remove("basePath"), doc.remove("schemes"));

    let mut components = Map::new();
    if let Some(definitions) = doc.remove("definitions") {
        components.insert("schemas".into(), definitions);
    }

    let mut body_params = HashSet::new();
    let mut form_params = HashMap::new();
    if let Some(Value::Object(params)) = doc.remove("parameters") {
        let mut parameters = Map::new();
        let mut request_bodies = Map::new();
        for (name, param) in params {
            let location = location_of(&param).map(str::to_owned);
            match location.as_deref() {
                Some("body") => {
                    body_params.insert(name.clone());
                    request_bodies.insert(name, body_to_request_body(param, &consumes));
                }
                Some("formData") => {
                    form_params.insert(name, param);
                }
                _ => {
                    parameters.insert(name, convert_parameter(param));
                }
            }
        }
        if !parameters.is_empty() {
            components.insert("parameters".into(), Value::Object(parameters));
        }
        if !request_bodies.is_empty() {
            components.insert("requestBodies".into(), Value::Object(request_bodies));
        }
    }

    if let Some(Value::Object(responses)) = doc.remove("responses") {
        let converted = responses
            .into_iter()
            .map(|(name, r)| (name, convert_response(r, &effective(&produces))))
            .collect();
        components.insert("responses".into(), Value::Object(converted));
    }

    if let Some(schemes) = doc.remove("securityDefinitions") {
        components.insert("securitySchemes".into(), schemes);
    }

    let ctx = UpgradeContext {
        produces,
        consumes,
        body_params,
        form_params,
    };

    if let Some(Value::Object(paths)) = doc.get_mut("paths") {
        for item in paths.values_mut() {
            if let Value::Object(item) = item {
                upgrade_path_item(item, &ctx);
            }
        }
    }

    let mut out = Map::new();
    out.insert("openapi".into(), Value::String(target_version.to_string()));
    for (key, value) in doc {
        out.insert(key, value);
    }
    if !servers.is_empty() {
        out.insert("servers".into(), Value::Array(servers));
    }
    if !components.is_empty() {
        out.insert("components".into(), Value::Object(components));
    }

    let mut value = Value::Object(out);
    rewrite_legacy_keywords(&mut value);
    value
}

fn upgrade_path_item(item: &mut Map<String, Value>, ctx: &UpgradeContext) {
    let mut shared = match item.remove("parameters") {
        Some(Value::Array(params)) => sort_params(params, ctx),
        _ => SortedParams::default(),
    };
    let plain = std::mem::take(&mut shared.plain);
    if !plain.is_empty() {
        item.insert("parameters".into(), Value::Array(plain));
    }

    for method in METHODS {
        if let Some(Value::Object(op)) = item.get_mut(method) {
            upgrade_operation(op, &shared, ctx);
        }
    }
}

/// Upgrades one operation. Route-level body and form parameters in `shared` apply
/// unless the operation declares its own; form fields merge by name.
fn upgrade_operation(op: &mut Map<String, Value>, shared: &SortedParams, ctx: &UpgradeContext) {
    let produces = take_mime_list(op, "produces").unwrap_or_else(|| ctx.produces.clone());
    let consumes = take_mime_list(op, "consumes").unwrap_or_else(|| ctx.consumes.clone());

    let own = match op.remove("parameters") {
        Some(Value::Array(params)) => sort_params(params, ctx),
        _ => SortedParams::default(),
    };
    if !own.plain.is_empty() {
        op.insert("parameters".into(), Value::Array(own.plain));
    }

    let mut form = own.form;
    for field in &shared.form {
        if !form.iter().any(|f| f.get("name") == field.get("name")) {
            form.push(field.clone());
        }
    }

    let request_body = match own.body {
        Some(body) => Some(body.into_request_body(&consumes)),
        None if !form.is_empty() => Some(form_request_body(form, &consumes)),
        None => shared.body.clone().map(|body| body.into_request_body(&consumes)),
    };
    if let Some(body) = request_body {
        op.insert("requestBody".into(), body);
    }

    if let Some(Value::Object(responses)) = op.get_mut("responses") {
        let mimes = effective(&produces);
        for response in responses.values_mut() {
            let taken = std::mem::take(response);
            *response = convert_response(taken, &mimes);
        }
    }
}

/// Moves inline type keywords of a non-body parameter under `schema`.
fn convert_parameter(param: Value) -> Value {
    let mut map = match param {
        Value::Object(map) if !map.contains_key("$ref") => map,
        other => return other,
    };

    let mut schema = Map::new();
    for key in PARAM_SCHEMA_KEYS {
        if let Some(value) = map.remove(key) {
            schema.insert(key.to_string(), value);
        }
    }

    match map.remove("collectionFormat").as_ref().and_then(Value::as_str) {
        Some("multi") => {
            map.insert("explode".into(), Value::Bool(true));
        }
        Some("csv") => {
            map.insert("explode".into(), Value::Bool(false));
        }
        _ => {}
    }

    if !schema.is_empty() {
        map.insert("schema".into(), Value::Object(schema));
    }
    Value::Object(map)
}

fn body_to_request_body(param: Value, consumes: &[String]) -> Value {
    let mut map = match param {
        Value::Object(map) => map,
        other => return other,
    };

    let schema = map.remove("schema").unwrap_or_else(|| json!({}));
    let content: Map<String, Value> = effective(consumes)
        .into_iter()
        .map(|mime| (mime, json!({ "schema": schema.clone() })))
        .collect();

    let mut body = Map::new();
    if let Some(description) = map.remove("description") {
        body.insert("description".into(), description);
    }
    if let Some(required) = map.remove("required") {
        body.insert("required".into(), required);
    }
    body.insert("content".into(), Value::Object(content));
    Value::Object(body)
}

fn form_request_body(fields: Vec<Value>, consumes: &[String]) -> Value {
    let mime = if consumes.iter().any(|m| m == MULTIPART) {
        MULTIPART
    } else {
        FORM_URLENCODED
    };

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        let mut field = match field {
            Value::Object(map) => map,
            _ => continue,
        };
        let name = match field.remove("name").and_then(|n| n.as_str().map(String::from)) {
            Some(name) => name,
            None => continue,
        };
        if field.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(Value::String(name.clone()));
        }

        let mut schema = Map::new();
        for key in PARAM_SCHEMA_KEYS {
            if let Some(value) = field.remove(key) {
                schema.insert(key.to_string(), value);
            }
        }
        if schema.get("type").and_then(Value::as_str) == Some("file") {
            schema.insert("type".into(), json!("string"));
            schema.insert("format".into(), json!("binary"));
        }
        if let Some(description) = field.remove("description") {
            schema.insert("description".into(), description);
        }
        properties.insert(name, Value::Object(schema));
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    json!({ "content": { mime: { "schema": schema } } })
}

fn convert_response(response: Value, produces: &[String]) -> Value {
    let mut map = match response {
        Value::Object(map) if !map.contains_key("$ref") => map,
        other => return other,
    };

    let examples = map.remove("examples");
    if let Some(schema) = map.remove("schema") {
        let content: Map<String, Value> = produces
            .iter()
            .map(|mime| {
                let mut media = json!({ "schema": schema.clone() });
                if let Some(example) = examples.as_ref().and_then(|e| e.get(mime)) {
                    media["example"] = example.clone();
                }
                (mime.clone(), media)
            })
            .collect();
        map.insert("content".into(), Value::Object(content));
    }

    if let Some(Value::Object(headers)) = map.get_mut("headers") {
        for header in headers.values_mut() {
            let taken = std::mem::take(header);
            *header = convert_parameter(taken);
        }
    }

    Value::Object(map)
}

/// Builds `servers` from `host`, `basePath` and `schemes`.
fn build_servers(host: Option<Value>, base_path: Option<Value>, schemes: Option<Value>) -> Vec<Value> {
    let base_path = base_path
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let host = match host.as_ref().and_then(Value::as_str) {
        Some(host) => host,
        None if base_path.is_empty() => return Vec::new(),
        None => return vec![json!({ "url": base_path })],
    };

    let schemes: Vec<String> = schemes
        .as_ref()
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).map(String::from).collect())
        .filter(|list: &Vec<String>| !list.is_empty())
        .unwrap_or_else(|| vec!["https".to_string()]);

    schemes
        .iter()
        .filter_map(|scheme| {
            let candidate = format!("{}://{}{}", scheme, host, base_path);
            match Url::parse(&candidate) {
                Ok(url) => Some(json!({ "url": url.as_str().trim_end_matches('/') })),
                Err(e) => {
                    warn!(url = %candidate, error = %e, "skipping invalid server url");
                    None
                }
            }
        })
        .collect()
}

/// Rewrites 2.0 reference prefixes and `x-nullable` everywhere in the document.
fn rewrite_legacy_keywords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get_mut("$ref") {
                if let Some(rewritten) = rewrite_pointer(target) {
                    *target = rewritten;
                }
            }
            if let Some(flag) = map.remove("x-nullable") {
                map.entry("nullable").or_insert(flag);
            }
            for child in map.values_mut() {
                rewrite_legacy_keywords(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                rewrite_legacy_keywords(item);
            }
        }
        _ => {}
    }
}

fn rewrite_pointer(target: &str) -> Option<String> {
    [
        ("#/definitions/", "#/components/schemas/"),
        ("#/parameters/", "#/components/parameters/"),
        ("#/responses/", "#/components/responses/"),
    ]
    .iter()
    .find_map(|(from, to)| target.strip_prefix(from).map(|rest| format!("{}{}", to, rest)))
}

fn take_mime_list(map: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let list = map.remove(key)?;
    let mimes: Vec<String> = list
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect();
    (!mimes.is_empty()).then_some(mimes)
}

fn effective(mimes: &[String]) -> Vec<String> {
    if mimes.is_empty() {
        vec![DEFAULT_MIME.to_string()]
    } else {
        mimes.to_vec()
    }
}

fn location_of(param: &Value) -> Option<&str> {
    param.get("in").and_then(Value::as_str)
}
