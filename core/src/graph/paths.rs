//! # Path Segmentation Queries
//!
//! Hierarchical lookups over the document's routes, used by generators to lay out
//! nested namespaces level by level without re-parsing route strings.
//!
//! Segment comparison is exact text equality everywhere. Parameter segments are
//! compared by their raw text (`{id}` only matches `{id}`).

use super::{Document, RouteNode};
use indexmap::IndexSet;

impl Document {
    /// Routes whose static-segment count equals `level` exactly.
    pub fn routes_at_level(&self, level: usize) -> Vec<&RouteNode> {
        self.routes().iter().filter(|r| r.level() == level).collect()
    }

    /// Distinct first-segment texts across all routes, first occurrence order.
    pub fn root_segment_texts(&self) -> Vec<&str> {
        let roots: IndexSet<&str> = self
            .routes()
            .iter()
            .filter_map(|r| r.segments().first())
            .map(|s| s.text())
            .collect();
        roots.into_iter().collect()
    }

    /// Routes whose segment sequence has `prefix` as a literal-text prefix.
    pub fn routes_starting_with<S: AsRef<str>>(&self, prefix: &[S]) -> Vec<&RouteNode> {
        self.routes()
            .iter()
            .filter(|r| r.starts_with_segments(prefix))
            .collect()
    }

    /// Distinct texts of the segment right after `prefix`, parameters included.
    pub fn segment_texts_at_next_level<S: AsRef<str>>(&self, prefix: &[S]) -> Vec<&str> {
        self.next_segment_texts(prefix, true)
    }

    /// Distinct texts of the segment right after `prefix`, parameters excluded.
    pub fn static_segment_texts_at_next_level<S: AsRef<str>>(&self, prefix: &[S]) -> Vec<&str> {
        self.next_segment_texts(prefix, false)
    }

    /// The first route (document order) whose static segments equal `segments`.
    pub fn route_by_static_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&RouteNode> {
        self.routes()
            .iter()
            .find(|r| r.equal_static_segments(segments))
    }

    /// Routes strictly extending `route`'s full segment sequence.
    pub fn routes_nested_under(&self, route: &RouteNode) -> Vec<&RouteNode> {
        self.routes()
            .iter()
            .filter(|r| r.segments().len() > route.segments().len() && r.starts_with(route))
            .collect()
    }

    fn next_segment_texts<S: AsRef<str>>(&self, prefix: &[S], include_parameters: bool) -> Vec<&str> {
        let texts: IndexSet<&str> = self
            .routes_starting_with(prefix)
            .into_iter()
            .filter_map(|r| r.segments().get(prefix.len()))
            .filter(|s| include_parameters || !s.is_parameter())
            .map(|s| s.text())
            .collect();
        texts.into_iter().collect()
    }
}
