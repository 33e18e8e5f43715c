#![deny(missing_docs)]

//! # Operations, Params and Responses
//!
//! One `Operation` exists per HTTP method present on a route. Its responses are
//! fanned out per declared content type per status key, so a status with two
//! content types yields two `Response` entities sharing that status.

use super::{BodyId, OpId, ParamId, ResponseId, RouteId};
use crate::schema::TypeSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods a route item may declare, in document grammar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl Method {
    /// Every method, in the order operations are built.
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    /// The lowercase key used in route items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// `?name=value`
    Query,
    /// Request header.
    Header,
    /// `{name}` in the route.
    Path,
    /// Cookie.
    Cookie,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Path => "path",
            ParamLocation::Cookie => "cookie",
        })
    }
}

/// The key a response is declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// An explicit status code (`200`).
    Code(u16),
    /// A status class (`2XX`), holding the class digit.
    Range(u8),
    /// The `default` fallback.
    Default,
}

impl ResponseStatus {
    /// Parses a responses-map key. Returns `None` for anything but `default`,
    /// a code in 100–599, or a class `1XX`–`5XX`.
    pub fn parse(key: &str) -> Option<Self> {
        if key == "default" {
            return Some(ResponseStatus::Default);
        }
        let bytes = key.as_bytes();
        if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
            return None;
        }
        if key[1..].eq_ignore_ascii_case("XX") {
            return Some(ResponseStatus::Range(bytes[0] - b'0'));
        }
        key.parse::<u16>().ok().map(ResponseStatus::Code)
    }

    fn matches_exactly(&self, status: u16) -> bool {
        matches!(self, ResponseStatus::Code(code) if *code == status)
    }

    /// True if a `1XX`-`5XX` class key covers `status`. Not used by
    /// [`Document::response_for_status`](super::Document::response_for_status),
    /// which only knows exact codes and `default`.
    pub fn matches_class(&self, status: u16) -> bool {
        matches!(self, ResponseStatus::Range(class) if u16::from(*class) == status / 100)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Code(code) => write!(f, "{}", code),
            ResponseStatus::Range(class) => write!(f, "{}XX", class),
            ResponseStatus::Default => f.write_str("default"),
        }
    }
}

/// One method on a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(skip)]
    pub(crate) id: OpId,
    #[serde(skip)]
    pub(crate) route: RouteId,
    pub(crate) method: Method,
    pub(crate) operation_id: Option<String>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) deprecated: bool,
    #[serde(skip)]
    pub(crate) params: Vec<ParamId>,
    #[serde(skip)]
    pub(crate) responses: Vec<ResponseId>,
    #[serde(skip)]
    pub(crate) request_bodies: Vec<BodyId>,
}

impl Operation {
    /// This operation's handle.
    pub fn id(&self) -> OpId {
        self.id
    }

    /// The owning route.
    pub fn route(&self) -> RouteId {
        self.route
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Declared `operationId`.
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Declared summary.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Declared description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the operation is deprecated.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Parameter handles; operation-level first, then inherited route-level ones.
    pub fn params(&self) -> &[ParamId] {
        &self.params
    }

    /// Response handles in declaration order.
    pub fn responses(&self) -> &[ResponseId] {
        &self.responses
    }

    /// Request body handles, one per declared content type.
    pub fn request_bodies(&self) -> &[BodyId] {
        &self.request_bodies
    }
}

/// Picks the response for `status` from `responses` (declaration order):
/// exact code, then `default`. Class keys never match.
pub(crate) fn select_response<'d>(responses: &[&'d Response], status: u16) -> Option<&'d Response> {
    responses
        .iter()
        .find(|r| r.status.matches_exactly(status))
        .or_else(|| responses.iter().find(|r| r.is_default()))
        .copied()
}

/// One operation input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    #[serde(skip)]
    pub(crate) operation: OpId,
    pub(crate) name: String,
    #[serde(rename = "in")]
    pub(crate) location: ParamLocation,
    pub(crate) required: bool,
    pub(crate) deprecated: bool,
    pub(crate) description: Option<String>,
    pub(crate) schema: Option<TypeSchema>,
}

impl Param {
    /// The owning operation.
    pub fn operation(&self) -> OpId {
        self.operation
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the parameter is carried (`in`).
    pub fn location(&self) -> ParamLocation {
        self.location
    }

    /// Whether the parameter must be supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the parameter is deprecated.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Declared description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resolved type, if declared.
    pub fn schema(&self) -> Option<&TypeSchema> {
        self.schema.as_ref()
    }
}

/// One (status, content type) pair of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip)]
    pub(crate) operation: OpId,
    pub(crate) status: ResponseStatus,
    pub(crate) mime_type: String,
    pub(crate) description: Option<String>,
    pub(crate) schema: Option<TypeSchema>,
}

impl Response {
    /// The owning operation.
    pub fn operation(&self) -> OpId {
        self.operation
    }

    /// Integer view of the status: the code, or `0` for `default` and class keys.
    /// Use [`Response::status_key`] to tell those apart.
    pub fn status(&self) -> u16 {
        match self.status {
            ResponseStatus::Code(code) => code,
            ResponseStatus::Range(_) | ResponseStatus::Default => 0,
        }
    }

    /// The key this response was declared under.
    pub fn status_key(&self) -> ResponseStatus {
        self.status
    }

    /// True for the `default` fallback entry.
    pub fn is_default(&self) -> bool {
        self.status == ResponseStatus::Default
    }

    /// Content type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Declared description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resolved body type, if declared and non-empty.
    pub fn schema(&self) -> Option<&TypeSchema> {
        self.schema.as_ref()
    }
}

/// One content type of an operation's request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip)]
    pub(crate) operation: OpId,
    pub(crate) mime_type: String,
    pub(crate) required: bool,
    pub(crate) description: Option<String>,
    pub(crate) schema: Option<TypeSchema>,
}

impl RequestBody {
    /// The owning operation.
    pub fn operation(&self) -> OpId {
        self.operation
    }

    /// Content type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the body must be supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Declared description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resolved body type, if declared and non-empty.
    pub fn schema(&self) -> Option<&TypeSchema> {
        self.schema.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: ResponseStatus, mime: &str) -> Response {
        Response {
            operation: OpId(0),
            status,
            mime_type: mime.to_string(),
            description: None,
            schema: None,
        }
    }

    #[test]
    fn test_parse_status_keys() {
        assert_eq!(ResponseStatus::parse("200"), Some(ResponseStatus::Code(200)));
        assert_eq!(ResponseStatus::parse("default"), Some(ResponseStatus::Default));
        assert_eq!(ResponseStatus::parse("4XX"), Some(ResponseStatus::Range(4)));
        assert_eq!(ResponseStatus::parse("5xx"), Some(ResponseStatus::Range(5)));
        assert_eq!(ResponseStatus::parse("0"), None);
        assert_eq!(ResponseStatus::parse("600"), None);
        assert_eq!(ResponseStatus::parse("20"), None);
        assert_eq!(ResponseStatus::parse("2X0"), None);
    }

    #[test]
    fn test_default_uses_sentinel() {
        let fallback = response(ResponseStatus::Default, "application/json");
        assert_eq!(fallback.status(), 0);
        assert!(fallback.is_default());

        let range = response(ResponseStatus::Range(5), "application/json");
        assert_eq!(range.status(), 0);
        assert!(!range.is_default());
    }

    #[test]
    fn test_select_prefers_first_exact_match() {
        let json = response(ResponseStatus::Code(404), "application/json");
        let xml = response(ResponseStatus::Code(404), "application/xml");
        let fallback = response(ResponseStatus::Default, "application/json");
        let all = vec![&fallback, &json, &xml];

        let found = select_response(&all, 404).unwrap();
        assert_eq!(found.mime_type(), "application/json");
        assert!(!found.is_default());
    }

    #[test]
    fn test_select_skips_class_keys_for_default() {
        let ok = response(ResponseStatus::Code(200), "application/json");
        let client = response(ResponseStatus::Range(4), "text/plain");
        let fallback = response(ResponseStatus::Default, "application/json");
        let all = vec![&ok, &client, &fallback];

        let found = select_response(&all, 404).unwrap();
        assert!(found.is_default());
        assert_eq!(found.mime_type(), "application/json");
        assert!(select_response(&all, 500).unwrap().is_default());

        let without_default = vec![&ok, &client];
        assert!(select_response(&without_default, 404).is_none());
    }

    #[test]
    fn test_class_keys_cover_their_codes() {
        assert!(ResponseStatus::Range(4).matches_class(404));
        assert!(!ResponseStatus::Range(4).matches_class(500));
        assert!(!ResponseStatus::Code(404).matches_class(404));
        assert!(!ResponseStatus::Default.matches_class(404));
    }

    #[test]
    fn test_select_not_found() {
        let ok = response(ResponseStatus::Code(200), "application/json");
        let all = vec![&ok];
        assert!(select_response(&all, 999).is_none());
    }

    #[test]
    fn test_method_order() {
        let keys: Vec<&str> = Method::ALL.iter().map(Method::as_str).collect();
        assert_eq!(
            keys,
            vec!["get", "put", "post", "delete", "options", "head", "patch", "trace"]
        );
    }
}
