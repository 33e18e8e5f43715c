#![deny(missing_docs)]

//! # OpenAPI Graph Core
//!
//! Turns an OpenAPI (or Swagger 2.0) description into an immutable, fully resolved
//! object graph: routes split into segments, operations per HTTP method, parameters,
//! responses and request bodies per content type, each with a resolved type schema.
//!
//! ```no_run
//! use oapi_graph_core::{Document, Method};
//!
//! let text = std::fs::read_to_string("api.yaml").unwrap();
//! let doc = Document::from_yaml_str(&text).unwrap();
//! for route in doc.routes() {
//!     if let Some(op) = doc.operation_for(route, Method::Get) {
//!         println!("{} -> {}", route.path(), doc.handler_name(op));
//!     }
//! }
//! ```

/// Shared error types.
pub mod error;

/// JSON pointer helpers.
pub mod pointer;

/// `$ref` resolution.
pub mod resolver;

/// Type schema resolution.
pub mod schema;

/// The document object graph.
pub mod graph;

/// Version upgrade and grammar validation.
pub mod normalize;

/// YAML/JSON text decoding.
pub mod input;

pub use error::{AppError, AppResult};
pub use graph::{
    BodyId, Document, Method, OpId, Operation, Param, ParamId, ParamLocation, RequestBody,
    Response, ResponseId, ResponseStatus, RouteId, RouteNode, Segment,
};
pub use input::decode_document;
pub use normalize::{DocumentNormalizer, NormalizeOptions, StandardNormalizer};
pub use resolver::RefResolver;
pub use schema::{AdditionalProperties, ExclusiveBound, SchemaResolver, SchemaType, TypeSchema};
