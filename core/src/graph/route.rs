#![deny(missing_docs)]

//! # Routes and Segments
//!
//! A `RouteNode` is one entry of the document's `paths` map, split into ordered
//! `Segment`s. Parameter placeholders (`{id}`) are segments too; the static path is
//! what remains once they are dropped.

use super::{OpId, RouteId};
use serde::Serialize;

/// One token of a route string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    text: String,
    #[serde(skip)]
    route: RouteId,
    #[serde(skip)]
    position: usize,
    #[serde(skip)]
    last: bool,
}

impl Segment {
    fn new(route: RouteId, position: usize, last: bool, text: &str) -> Self {
        Self {
            text: text.to_string(),
            route,
            position,
            last,
        }
    }

    /// Raw segment text, delimiters included (`users`, `{id}`).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True iff the text is wrapped in brace delimiters.
    pub fn is_parameter(&self) -> bool {
        self.text.len() >= 2 && self.text.starts_with('{') && self.text.ends_with('}')
    }

    /// The placeholder name without delimiters, for parameter segments.
    pub fn parameter_name(&self) -> Option<&str> {
        if self.is_parameter() {
            Some(&self.text[1..self.text.len() - 1])
        } else {
            None
        }
    }

    /// The owning route.
    pub fn route(&self) -> RouteId {
        self.route
    }

    /// Zero-based position within the owning route.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether this segment closes its route.
    pub fn is_last(&self) -> bool {
        self.last
    }
}

/// One route of the document with its operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteNode {
    #[serde(skip)]
    id: RouteId,
    path: String,
    segments: Vec<Segment>,
    static_path: String,
    #[serde(skip)]
    pub(crate) operations: Vec<OpId>,
}

impl RouteNode {
    pub(crate) fn new(id: RouteId, path: &str) -> Self {
        let texts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let segments: Vec<Segment> = texts
            .iter()
            .enumerate()
            .map(|(position, text)| Segment::new(id, position, position + 1 == texts.len(), text))
            .collect();

        let static_path = segments
            .iter()
            .filter(|s| !s.is_parameter())
            .map(Segment::text)
            .collect::<Vec<_>>()
            .join("/");

        Self {
            id,
            path: path.to_string(),
            segments,
            static_path,
            operations: Vec::new(),
        }
    }

    /// This route's handle within its document.
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The route string as written in the document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Ordered segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Non-parameter segment texts joined with `/`, order preserved.
    pub fn static_path(&self) -> &str {
        &self.static_path
    }

    /// Handles of this route's operations, in method order.
    pub fn operations(&self) -> &[OpId] {
        &self.operations
    }

    /// Texts of every segment.
    pub fn segments_as_text(&self) -> Vec<&str> {
        self.segments.iter().map(Segment::text).collect()
    }

    /// Texts of the non-parameter segments.
    pub fn static_segments(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|s| !s.is_parameter())
            .map(Segment::text)
            .collect()
    }

    /// Number of non-parameter segments; the route's level in the hierarchy.
    pub fn level(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_parameter()).count()
    }

    /// True if `prefix` is a literal-text prefix of this route's segments.
    pub fn starts_with_segments<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        self.segments.len() >= prefix.len()
            && self
                .segments
                .iter()
                .zip(prefix)
                .all(|(segment, text)| segment.text == text.as_ref())
    }

    /// True if the static segments equal `segments` exactly.
    pub fn equal_static_segments<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        let own = self.static_segments();
        own.len() == segments.len() && own.iter().zip(segments).all(|(a, b)| *a == b.as_ref())
    }

    /// True if `other`'s full segment sequence is a prefix of this route's.
    pub fn starts_with(&self, other: &RouteNode) -> bool {
        self.starts_with_segments(&other.segments_as_text())
    }

    /// True if both routes reduce to the same static segments.
    pub fn equal_static(&self, other: &RouteNode) -> bool {
        self.equal_static_segments(&other.static_segments())
    }
}
