#![deny(missing_docs)]

//! # Pointer Utilities
//!
//! Small helpers for walking a raw document by a list of keys and for converting
//! reference pointers (`#/components/schemas/Widget`) into such key lists.
//!
//! Lookups fail fast: the first missing key yields `None`.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Walks `target` through successive key lookups.
///
/// Objects are indexed by key, arrays by a decimal index. Returns `None` as soon as
/// an intermediate key is absent or the current node cannot be indexed.
pub fn get_segments<'a, S: AsRef<str>>(target: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(target, |node, segment| step(node, segment.as_ref()))
}

fn step<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

/// Splits a reference pointer into its ordered, decoded keys.
///
/// The leading anchor token (`#` or the empty string before a leading `/`) is
/// discarded, so `#/components/schemas/User` yields `["components", "schemas", "User"]`
/// and `#` yields an empty list (the document root).
pub fn parse_pointer(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(decode_pointer_segment)
        .collect()
}

/// Returns true if the pointer designates a location inside the current document.
pub fn is_local_pointer(pointer: &str) -> bool {
    pointer.starts_with('#') || pointer.starts_with('/')
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let unescaped = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&unescaped)
        .decode_utf8_lossy()
        .into_owned()
}

/// Escapes a key for use inside a JSON Pointer.
pub fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Appends a key to a pointer location, escaping it.
pub(crate) fn child_location(base: &str, key: &str) -> String {
    format!("{}/{}", base, encode_pointer_segment(key))
}
