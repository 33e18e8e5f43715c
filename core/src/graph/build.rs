//! Eager construction of the document graph.
//!
//! Walks `paths` in document order and fills the arena bottom-up. Raw fragments are
//! borrowed from the document root for the duration of the build only; everything
//! stored in the arena is owned.

use super::operation::{Method, Operation, Param, ParamLocation, RequestBody, Response, ResponseStatus};
use super::route::RouteNode;
use super::{Arena, BodyId, OpId, ParamId, ResponseId, RouteId};
use crate::error::{AppError, AppResult};
use crate::pointer::{child_location, get_segments};
use crate::resolver::RefResolver;
use crate::schema::{SchemaResolver, TypeSchema};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, trace};

/// The scalar part of a parameter object.
#[derive(Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "in")]
    location: ParamLocation,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    description: Option<String>,
}

/// A parameter read from a list, before it is attached to an operation.
struct PendingParam<'a> {
    raw: RawParameter,
    schema: Option<&'a Value>,
    location: String,
}

pub(crate) struct GraphBuilder<'a> {
    refs: RefResolver<'a>,
    arena: Arena,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(root: &'a Value) -> Self {
        Self {
            refs: RefResolver::new(root),
            arena: Arena::default(),
        }
    }

    pub(crate) fn build(mut self) -> AppResult<Arena> {
        let paths = match self.refs.root().get("paths") {
            None => return Ok(self.arena),
            Some(paths) => as_object(paths, "#/paths")?,
        };

        for (path, raw_item) in paths {
            self.add_route(path, raw_item)?;
        }

        Ok(self.arena)
    }

    fn add_route(&mut self, path: &str, raw_item: &'a Value) -> AppResult<()> {
        let location = child_location("#/paths", path);
        let item = as_object(self.refs.resolve(raw_item)?, &location)?;

        let id = RouteId(self.arena.routes.len());
        let mut route = RouteNode::new(id, path);
        let shared = self.read_params(item.get("parameters"), &child_location(&location, "parameters"))?;

        for method in Method::ALL {
            if let Some(raw_op) = item.get(method.as_str()) {
                let op_location = child_location(&location, method.as_str());
                let op = self.add_operation(id, method, raw_op, &shared, &op_location)?;
                route.operations.push(op);
            }
        }

        debug!(path, operations = route.operations.len(), "route built");
        self.arena.routes.push(route);
        Ok(())
    }

    fn add_operation(
        &mut self,
        route: RouteId,
        method: Method,
        raw_op: &'a Value,
        shared: &[PendingParam<'a>],
        location: &str,
    ) -> AppResult<OpId> {
        let op = as_object(self.refs.resolve(raw_op)?, location)?;
        let id = OpId(self.arena.operations.len());

        let own = self.read_params(op.get("parameters"), &child_location(location, "parameters"))?;
        let overridden: HashSet<(&str, ParamLocation)> = own
            .iter()
            .map(|p| (p.raw.name.as_str(), p.raw.location))
            .collect();
        let inherited = shared
            .iter()
            .filter(|p| !overridden.contains(&(p.raw.name.as_str(), p.raw.location)));

        let mut params = Vec::new();
        for pending in own.iter().chain(inherited) {
            params.push(self.add_param(id, pending)?);
        }

        let responses = match op.get("responses") {
            Some(raw) => self.add_responses(id, raw, &child_location(location, "responses"))?,
            None => Vec::new(),
        };

        let request_bodies = match op.get("requestBody") {
            Some(raw) => self.add_request_bodies(id, raw, &child_location(location, "requestBody"))?,
            None => Vec::new(),
        };

        trace!(location, params = params.len(), responses = responses.len(), "operation built");
        self.arena.operations.push(Operation {
            id,
            route,
            method,
            operation_id: string_field(op, "operationId"),
            summary: string_field(op, "summary"),
            description: string_field(op, "description"),
            tags: op
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| tags.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default(),
            deprecated: op.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
            params,
            responses,
            request_bodies,
        });
        Ok(id)
    }

    fn read_params(&self, raw: Option<&'a Value>, location: &str) -> AppResult<Vec<PendingParam<'a>>> {
        let list = match raw {
            None => return Ok(Vec::new()),
            Some(Value::Array(list)) => list,
            Some(_) => return Err(AppError::InvalidInput(format!("{}: expected array", location))),
        };

        let mut seen = HashSet::new();
        let mut pending = Vec::with_capacity(list.len());
        for (idx, raw_param) in list.iter().enumerate() {
            let param_location = child_location(location, &idx.to_string());
            let resolved = self.refs.resolve(raw_param)?;
            let param = RawParameter::deserialize(resolved)
                .map_err(|e| AppError::InvalidInput(format!("{}: {}", param_location, e)))?;

            if !seen.insert((param.name.clone(), param.location)) {
                return Err(AppError::InvalidInput(format!(
                    "{}: duplicate parameter '{}' in '{}'",
                    param_location, param.name, param.location
                )));
            }

            pending.push(PendingParam {
                raw: param,
                schema: resolved.get("schema"),
                location: param_location,
            });
        }
        Ok(pending)
    }

    fn add_param(&mut self, operation: OpId, pending: &PendingParam<'a>) -> AppResult<ParamId> {
        let schema = pending
            .schema
            .map(|raw| self.schemas().resolve(raw, &child_location(&pending.location, "schema")))
            .transpose()?;

        let id = ParamId(self.arena.params.len());
        self.arena.params.push(Param {
            operation,
            name: pending.raw.name.clone(),
            location: pending.raw.location,
            required: pending.raw.required,
            deprecated: pending.raw.deprecated,
            description: pending.raw.description.clone(),
            schema,
        });
        Ok(id)
    }

    /// One response per declared content type per status key.
    fn add_responses(&mut self, operation: OpId, raw: &'a Value, location: &str) -> AppResult<Vec<ResponseId>> {
        let mut ids = Vec::new();
        for (key, raw_response) in as_object(raw, location)? {
            let entry_location = child_location(location, key);
            let status = ResponseStatus::parse(key).ok_or_else(|| {
                AppError::InvalidInput(format!("{}: invalid response key '{}'", location, key))
            })?;
            let response = self.refs.resolve(raw_response)?;
            let description = response.get("description").and_then(Value::as_str).map(String::from);

            for mime_type in content_types(response) {
                let schema = self.media_schema(response, mime_type, &entry_location)?;
                ids.push(ResponseId(self.arena.responses.len()));
                self.arena.responses.push(Response {
                    operation,
                    status,
                    mime_type: mime_type.to_string(),
                    description: description.clone(),
                    schema,
                });
            }
        }
        Ok(ids)
    }

    fn add_request_bodies(&mut self, operation: OpId, raw: &'a Value, location: &str) -> AppResult<Vec<BodyId>> {
        let body = self.refs.resolve(raw)?;
        let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
        let description = body.get("description").and_then(Value::as_str).map(String::from);

        let mut ids = Vec::new();
        for mime_type in content_types(body) {
            let schema = self.media_schema(body, mime_type, location)?;
            ids.push(BodyId(self.arena.request_bodies.len()));
            self.arena.request_bodies.push(RequestBody {
                operation,
                mime_type: mime_type.to_string(),
                required,
                description: description.clone(),
                schema,
            });
        }
        Ok(ids)
    }

    /// Resolves `content.<mime>.schema`; absent or empty schemas yield `None`.
    fn media_schema(&self, owner: &'a Value, mime_type: &str, location: &str) -> AppResult<Option<TypeSchema>> {
        let raw = match get_segments(owner, &["content", mime_type, "schema"]) {
            Some(raw) => self.refs.resolve(raw)?,
            None => return Ok(None),
        };

        match raw.as_object() {
            Some(map) if !map.is_empty() => {
                let schema_location = format!(
                    "{}/content/{}/schema",
                    location,
                    crate::pointer::encode_pointer_segment(mime_type)
                );
                self.schemas().resolve(raw, &schema_location).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn schemas(&self) -> SchemaResolver<'_, 'a> {
        SchemaResolver::new(&self.refs)
    }
}

fn content_types(owner: &Value) -> impl Iterator<Item = &str> {
    owner
        .get("content")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|content| content.keys().map(String::as_str))
}

fn as_object<'v>(value: &'v Value, location: &str) -> AppResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| AppError::InvalidInput(format!("{}: expected object", location)))
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(doc: &Value) -> AppResult<Arena> {
        GraphBuilder::new(doc).build()
    }

    #[test]
    fn test_route_level_params_are_inherited_and_overridable() {
        let doc = json!({"paths": {"/users/{id}": {
            "parameters": [
                {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                {"name": "trace", "in": "header"}
            ],
            "get": {
                "parameters": [
                    {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}
                ],
                "responses": {}
            }
        }}});
        let arena = build(&doc).unwrap();
        let names: Vec<&str> = arena.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "trace"]);
        let id_schema = arena.params[0].schema.as_ref().unwrap();
        assert_eq!(id_schema.schema_type, Some(crate::schema::SchemaType::Integer));
    }

    #[test]
    fn test_duplicate_params_rejected() {
        let doc = json!({"paths": {"/a": {"get": {
            "parameters": [
                {"name": "q", "in": "query"},
                {"name": "q", "in": "query"}
            ],
            "responses": {}
        }}}});
        assert!(matches!(build(&doc), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_same_name_different_location_allowed() {
        let doc = json!({"paths": {"/a": {"get": {
            "parameters": [
                {"name": "q", "in": "query"},
                {"name": "q", "in": "header"}
            ],
            "responses": {}
        }}}});
        assert_eq!(build(&doc).unwrap().params.len(), 2);
    }

    #[test]
    fn test_response_without_content_yields_no_entity() {
        let doc = json!({"paths": {"/a": {"delete": {"responses": {
            "204": {"description": "gone"}
        }}}}});
        let arena = build(&doc).unwrap();
        assert!(arena.responses.is_empty());
        assert_eq!(arena.operations.len(), 1);
    }

    #[test]
    fn test_empty_media_schema_is_dropped() {
        let doc = json!({"paths": {"/a": {"get": {"responses": {
            "200": {"description": "ok", "content": {"application/json": {"schema": {}}}}
        }}}}});
        let arena = build(&doc).unwrap();
        assert_eq!(arena.responses.len(), 1);
        assert!(arena.responses[0].schema.is_none());
    }

    #[test]
    fn test_invalid_response_key() {
        let doc = json!({"paths": {"/a": {"get": {"responses": {
            "ok": {"description": "ok"}
        }}}}});
        assert!(matches!(build(&doc), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_request_body_fan_out() {
        let doc = json!({
            "components": {"requestBodies": {"Pet": {
                "required": true,
                "content": {
                    "application/json": {"schema": {"type": "object"}},
                    "application/xml": {"schema": {"type": "object"}}
                }
            }}},
            "paths": {"/pets": {"post": {
                "requestBody": {"$ref": "#/components/requestBodies/Pet"},
                "responses": {}
            }}}
        });
        let arena = build(&doc).unwrap();
        let mimes: Vec<&str> = arena.request_bodies.iter().map(|b| b.mime_type.as_str()).collect();
        assert_eq!(mimes, vec!["application/json", "application/xml"]);
        assert!(arena.request_bodies.iter().all(|b| b.required));
    }

    #[test]
    fn test_path_item_reference_is_followed() {
        let doc = json!({
            "x-shared": {"ping": {"get": {"responses": {}}}},
            "paths": {"/ping": {"$ref": "#/x-shared/ping"}}
        });
        let arena = build(&doc).unwrap();
        assert_eq!(arena.routes[0].operations.len(), 1);
    }

    #[test]
    fn test_failure_aborts_whole_build() {
        let doc = json!({"paths": {
            "/ok": {"get": {"responses": {}}},
            "/bad": {"get": {"responses": {
                "200": {"description": "x", "content": {"application/json": {
                    "schema": {"$ref": "#/components/schemas/Missing"}
                }}}
            }}}
        }});
        assert_eq!(
            build(&doc).unwrap_err(),
            AppError::DanglingReference("#/components/schemas/Missing".into())
        );
    }
}
