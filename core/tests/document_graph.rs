use oapi_graph_core::{
    AppError, Document, Method, ParamLocation, ResponseStatus, SchemaType, TypeSchema,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const ORGS_API: &str = r##"
openapi: 3.0.3
info:
  title: Orgs
  version: "1.0"
paths:
  /orgs/{orgId}/repos:
    parameters:
      - name: orgId
        in: path
        required: true
        schema:
          type: string
    get:
      operationId: listOrgRepos
      tags: [repos]
      responses:
        "200":
          description: repository names
          content:
            application/json:
              schema:
                type: array
                items:
                  type: string
        default:
          description: error
          content:
            application/json:
              schema:
                type: object
  /orgs/{orgId}/members/{memberId}:
    get:
      parameters:
        - name: orgId
          in: path
          required: true
          schema:
            type: string
        - name: memberId
          in: path
          required: true
          schema:
            type: integer
            format: int64
      responses:
        "404":
          description: missing
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Error"
            application/xml:
              schema:
                $ref: "#/components/schemas/Error"
components:
  schemas:
    Error:
      type: object
      required: [message]
      properties:
        message:
          type: string
"##;

fn orgs() -> Document {
    Document::from_yaml_str(ORGS_API).unwrap()
}

#[test]
fn test_orgs_repos_scenario() {
    let doc = orgs();
    assert_eq!(doc.title(), Some("Orgs"));

    let route = doc.route_by_static_segments(&["orgs", "repos"]).unwrap();
    assert_eq!(route.static_path(), "orgs/repos");
    assert_eq!(route.segments_as_text(), vec!["orgs", "{orgId}", "repos"]);
    assert_eq!(route.level(), 2);

    let ops: Vec<_> = doc.operations_of(route).collect();
    assert_eq!(ops.len(), 1);
    let op = ops[0];
    assert_eq!(op.method(), Method::Get);
    assert_eq!(doc.responses_of(op).count(), 2);
    assert_eq!(doc.handler_name(op), "list_org_repos");

    let ok = doc.response_for_status(op, 200).unwrap();
    assert_eq!(ok.status(), 200);
    assert_eq!(ok.schema().map(TypeSchema::summary), Some("array<string>".to_string()));

    let fallback = doc.response_for_status(op, 500).unwrap();
    assert!(fallback.is_default());
    assert_eq!(fallback.schema().unwrap().schema_type, Some(SchemaType::Object));
}

#[test]
fn test_route_level_parameters_are_inherited() {
    let doc = orgs();
    let route = doc.route_by_static_segments(&["orgs", "repos"]).unwrap();
    let op = doc.operation_for(route, Method::Get).unwrap();
    let params: Vec<_> = doc.params_of(op).collect();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name(), "orgId");
    assert_eq!(params[0].location(), ParamLocation::Path);
    assert!(params[0].is_required());
}

#[test]
fn test_status_fan_out_per_content_type() {
    let doc = orgs();
    let route = doc.route_by_static_segments(&["orgs", "members"]).unwrap();
    let op = doc.operation_for(route, Method::Get).unwrap();

    let not_found: Vec<_> = doc.responses_of(op).filter(|r| r.status() == 404).collect();
    assert_eq!(not_found.len(), 2);
    assert_eq!(not_found[0].mime_type(), "application/json");
    assert_eq!(not_found[1].mime_type(), "application/xml");

    let selected = doc.response_for_status(op, 404).unwrap();
    assert_eq!(selected.mime_type(), "application/json");
    assert!(selected.schema().unwrap().is_required("message"));
}

#[test]
fn test_unknown_status_without_default_is_not_found() {
    let doc = orgs();
    let route = doc.route_by_static_segments(&["orgs", "members"]).unwrap();
    let op = doc.operation_for(route, Method::Get).unwrap();
    assert!(doc.response_for_status(op, 999).is_none());
    assert!(doc.response_for_status(op, 200).is_none());
}

#[test]
fn test_all_of_members_are_not_merged() {
    let doc = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/things": {"get": {"responses": {"200": {
            "description": "ok",
            "content": {"application/json": {"schema": {"allOf": [
                {"type": "object", "properties": {"a": {"type": "string"}}},
                {"type": "object", "properties": {"b": {"type": "number"}}}
            ]}}}
        }}}}}
    }))
    .unwrap();

    let op = &doc.operations()[0];
    let schema = doc.response_for_status(op, 200).unwrap().schema().unwrap();
    assert_eq!(schema.all_of.len(), 2);
    assert!(schema.properties.is_none());

    let first = schema.all_of[0].properties.as_ref().unwrap();
    let second = schema.all_of[1].properties.as_ref().unwrap();
    assert_eq!(first.keys().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(second.keys().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(second["b"].schema_type, Some(SchemaType::Number));
}

#[test]
fn test_self_referencing_property_is_cyclic() {
    let result = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/nodes": {"get": {"responses": {"200": {
            "description": "ok",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Node"}}}
        }}}}},
        "components": {"schemas": {
            "Node": {"type": "object", "properties": {"self": {"$ref": "#/components/schemas/Node"}}}
        }}
    }));
    assert!(matches!(result, Err(AppError::CyclicReference(_))));
}

#[test]
fn test_self_reference_through_all_of_is_cyclic() {
    let result = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/nodes": {"get": {"responses": {"200": {
            "description": "ok",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Node"}}}
        }}}}},
        "components": {"schemas": {
            "Node": {"type": "object", "properties": {"self": {"allOf": [{"$ref": "#/components/schemas/Node"}]}}}
        }}
    }));
    assert!(matches!(result, Err(AppError::CyclicReference(_))));
}

#[test]
fn test_dangling_reference_aborts_construction() {
    let result = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/a": {"get": {"responses": {"200": {"$ref": "#/components/responses/Missing"}}}}}
    }));
    assert!(matches!(result, Err(AppError::DanglingReference(_))));
}

#[test]
fn test_invalid_documents_are_rejected_before_building() {
    assert!(matches!(Document::load(json!("nope")), Err(AppError::InvalidInput(_))));
    let result = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/a/{id}": {"get": {
            "parameters": [{"name": "id", "in": "path"}],
            "responses": {}
        }}}
    }));
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn test_levels_partition_routes() {
    let doc = orgs();
    let buckets: usize = (0..=4).map(|level| doc.routes_at_level(level).len()).sum();
    assert_eq!(buckets, doc.routes().len());
    assert_eq!(doc.root_segment_texts(), vec!["orgs"]);
    assert_eq!(
        doc.segment_texts_at_next_level(&["orgs", "{orgId}"]),
        vec!["repos", "members"]
    );
}

#[test]
fn test_resolving_twice_is_deterministic() {
    let doc = orgs();
    let token = json!({"$ref": "#/components/schemas/Error"});
    let first = doc.resolve_ref(&token).unwrap().clone();
    let second = doc.resolve_ref(&token).unwrap().clone();
    assert_eq!(first, second);
}

#[test]
fn test_swagger2_document_is_upgraded_end_to_end() {
    let doc = Document::from_yaml_str(
        r##"
swagger: "2.0"
info:
  title: Pets
  version: "1"
host: pets.example.com
basePath: /v2
produces: [application/json]
paths:
  /pets/{petId}:
    get:
      operationId: getPet
      parameters:
        - name: petId
          in: path
          required: true
          type: integer
          format: int64
      responses:
        200:
          description: a pet
          schema:
            $ref: "#/definitions/Pet"
        4XX:
          description: client error
    put:
      parameters:
        - name: petId
          in: path
          required: true
          type: integer
        - name: body
          in: body
          required: true
          schema:
            $ref: "#/definitions/Pet"
      responses:
        204:
          description: updated
definitions:
  Pet:
    type: object
    properties:
      name:
        type: string
      tag:
        type: string
        x-nullable: true
"##,
    )
    .unwrap();

    assert_eq!(doc.openapi_version(), Some("3.0.0"));
    assert_eq!(doc.raw()["servers"][0]["url"], json!("https://pets.example.com/v2"));

    let route = doc.route_by_static_segments(&["pets"]).unwrap();
    let get = doc.operation_for(route, Method::Get).unwrap();
    assert_eq!(doc.handler_name(get), "get_pet");

    let id = doc.params_of(get).next().unwrap();
    assert_eq!(id.schema().unwrap().format.as_deref(), Some("int64"));

    let ok = doc.response_for_status(get, 200).unwrap();
    let pet = ok.schema().unwrap();
    assert!(pet.properties.as_ref().unwrap()["tag"].nullable);

    // no content, so no entity; selection falls back to nothing
    assert!(doc.response_for_status(get, 404).is_none());

    let put = doc.operation_for(route, Method::Put).unwrap();
    let bodies: Vec<_> = doc.request_bodies_of(put).collect();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].mime_type(), "application/json");
    assert!(bodies[0].is_required());
    assert_eq!(doc.responses_of(put).count(), 0);
}

#[test]
fn test_class_keys_never_shadow_default() {
    let doc = Document::load(json!({
        "openapi": "3.0.0",
        "info": {"title": "T", "version": "1"},
        "paths": {"/a": {"get": {"responses": {
            "4XX": {"description": "client", "content": {"text/plain": {"schema": {"type": "string"}}}},
            "409": {"description": "conflict", "content": {"application/json": {"schema": {"type": "object"}}}},
            "default": {"description": "other", "content": {"application/json": {"schema": {}}}}
        }}}}
    }))
    .unwrap();

    let op = &doc.operations()[0];
    assert_eq!(doc.response_for_status(op, 409).unwrap().status(), 409);

    let not_found = doc.response_for_status(op, 404).unwrap();
    assert!(not_found.is_default());
    assert_eq!(not_found.mime_type(), "application/json");
    assert!(not_found.schema().is_none());

    let client: Vec<_> = doc
        .responses_of(op)
        .filter(|r| r.status_key().matches_class(404))
        .collect();
    assert_eq!(client.len(), 1);
    assert_eq!(client[0].status_key(), ResponseStatus::Range(4));
    assert_eq!(client[0].status(), 0);
}
