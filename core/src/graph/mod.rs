#![deny(missing_docs)]

//! # Document Graph
//!
//! The root `Document` owns the normalized raw document and flat arenas of every
//! descendant entity. Descendants refer to their owners by handle (`RouteId`,
//! `OpId`, ...), never by reference, so the whole graph is plain owned data:
//! immutable after construction and freely shareable across threads.
//!
//! Construction is eager and atomic. Every route, operation, parameter, response and
//! schema is resolved up front; the first error aborts and no partial graph escapes.

mod build;
pub mod naming;
pub mod operation;
mod paths;
pub mod route;

pub use operation::{Method, Operation, Param, ParamLocation, RequestBody, Response, ResponseStatus};
pub use route::{RouteNode, Segment};

use crate::error::{AppError, AppResult};
use crate::input::decode_document;
use crate::normalize::{DocumentNormalizer, StandardNormalizer};
use crate::resolver::RefResolver;
use build::GraphBuilder;
use serde_json::Value;
use tracing::debug;

/// Handle of a `RouteNode` within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

/// Handle of an `Operation` within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) usize);

/// Handle of a `Param` within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub(crate) usize);

/// Handle of a `Response` within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseId(pub(crate) usize);

/// Handle of a `RequestBody` within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) usize);

/// Flat storage for every entity of one document.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    pub(crate) routes: Vec<RouteNode>,
    pub(crate) operations: Vec<Operation>,
    pub(crate) params: Vec<Param>,
    pub(crate) responses: Vec<Response>,
    pub(crate) request_bodies: Vec<RequestBody>,
}

/// The resolved object graph of one API description document.
#[derive(Debug)]
pub struct Document {
    raw: Value,
    arena: Arena,
}

impl Document {
    /// Normalizes `input` with the [`StandardNormalizer`] and builds the graph.
    pub fn load(input: Value) -> AppResult<Self> {
        Self::load_with(input, &StandardNormalizer::default())
    }

    /// Normalizes `input` with the given collaborator and builds the graph.
    ///
    /// Normalization errors propagate unchanged.
    pub fn load_with<N: DocumentNormalizer + ?Sized>(input: Value, normalizer: &N) -> AppResult<Self> {
        let normalized = normalizer.normalize(input)?;
        Self::from_normalized(normalized)
    }

    /// Decodes YAML or JSON text, then behaves like [`Document::load`].
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        Self::load(decode_document(text)?)
    }

    /// Builds the graph from a document already satisfying the input contract.
    pub fn from_normalized(raw: Value) -> AppResult<Self> {
        if !raw.is_object() {
            return Err(AppError::InvalidInput("document must be an object".into()));
        }

        let arena = GraphBuilder::new(&raw).build()?;
        debug!(
            routes = arena.routes.len(),
            operations = arena.operations.len(),
            responses = arena.responses.len(),
            "document graph built"
        );

        Ok(Self { raw, arena })
    }

    /// The normalized raw document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// A reference resolver over this document.
    pub fn resolver(&self) -> RefResolver<'_> {
        RefResolver::new(&self.raw)
    }

    /// Resolves a fragment of this document that may be a reference token.
    pub fn resolve_ref<'s>(&'s self, value: &'s Value) -> AppResult<&'s Value> {
        self.resolver().resolve(value)
    }

    /// The `openapi` version string.
    pub fn openapi_version(&self) -> Option<&str> {
        self.raw.get("openapi").and_then(Value::as_str)
    }

    /// The `info.title` string.
    pub fn title(&self) -> Option<&str> {
        self.raw.pointer("/info/title").and_then(Value::as_str)
    }

    /// Every route, in document order.
    pub fn routes(&self) -> &[RouteNode] {
        &self.arena.routes
    }

    /// Every operation, in construction order.
    pub fn operations(&self) -> &[Operation] {
        &self.arena.operations
    }

    /// Looks up a route by handle.
    pub fn route(&self, id: RouteId) -> Option<&RouteNode> {
        self.arena.routes.get(id.0)
    }

    /// Looks up an operation by handle.
    pub fn operation(&self, id: OpId) -> Option<&Operation> {
        self.arena.operations.get(id.0)
    }

    /// Looks up a parameter by handle.
    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.arena.params.get(id.0)
    }

    /// Looks up a response by handle.
    pub fn response(&self, id: ResponseId) -> Option<&Response> {
        self.arena.responses.get(id.0)
    }

    /// Looks up a request body by handle.
    pub fn request_body(&self, id: BodyId) -> Option<&RequestBody> {
        self.arena.request_bodies.get(id.0)
    }

    /// The operations of a route.
    pub fn operations_of<'s>(&'s self, route: &'s RouteNode) -> impl Iterator<Item = &'s Operation> + 's {
        route.operations.iter().filter_map(move |id| self.operation(*id))
    }

    /// The operation of `route` for `method`, if declared.
    pub fn operation_for<'s>(&'s self, route: &'s RouteNode, method: Method) -> Option<&'s Operation> {
        self.operations_of(route).find(|op| op.method == method)
    }

    /// The parameters of an operation.
    pub fn params_of<'s>(&'s self, op: &'s Operation) -> impl Iterator<Item = &'s Param> + 's {
        op.params.iter().filter_map(move |id| self.param(*id))
    }

    /// The responses of an operation, in declaration order.
    pub fn responses_of<'s>(&'s self, op: &'s Operation) -> impl Iterator<Item = &'s Response> + 's {
        op.responses.iter().filter_map(move |id| self.response(*id))
    }

    /// The request bodies of an operation.
    pub fn request_bodies_of<'s>(&'s self, op: &'s Operation) -> impl Iterator<Item = &'s RequestBody> + 's {
        op.request_bodies.iter().filter_map(move |id| self.request_body(*id))
    }

    /// The route owning an operation.
    pub fn route_of(&self, op: &Operation) -> Option<&RouteNode> {
        self.route(op.route)
    }

    /// The response of `op` for `status`.
    ///
    /// Exact code match first (first in declaration order when several content
    /// types share the code), then the `default` entry, otherwise `None`. Class
    /// keys (`4XX`) are never selected; see [`ResponseStatus::matches_class`].
    pub fn response_for_status<'s>(&'s self, op: &'s Operation, status: u16) -> Option<&'s Response> {
        let responses: Vec<&Response> = self.responses_of(op).collect();
        operation::select_response(&responses, status)
    }

    /// A snake_case function name for `op`.
    pub fn handler_name(&self, op: &Operation) -> String {
        let static_path = self.route_of(op).map(RouteNode::static_path).unwrap_or_default();
        naming::handler_name(op.method, op.operation_id(), static_path)
    }
}
