#![deny(missing_docs)]

//! # Tree Command
//!
//! Prints the namespace hierarchy of a document, one segment per line, with the
//! methods declared on each route next to its final segment.

use crate::error::CliResult;
use crate::source::load_document;
use oapi_graph_core::Document;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the tree command.
#[derive(clap::Args, Debug, Clone)]
pub struct TreeArgs {
    /// Path to the API description (YAML or JSON).
    #[clap(env = "OAPI_GRAPH_INPUT")]
    pub file: PathBuf,
}

/// Executes the tree command, writing to `out`.
pub fn execute(args: &TreeArgs, out: &mut impl Write) -> CliResult<()> {
    let doc = load_document(&args.file)?;
    out.write_all(render(&doc).as_bytes())?;
    Ok(())
}

/// Renders the hierarchy of `doc`.
pub fn render(doc: &Document) -> String {
    let mut text = format!(
        "{} ({})\n",
        doc.title().unwrap_or("untitled"),
        doc.openapi_version().unwrap_or("?")
    );
    let root_methods = methods_of_routes(doc, &[]);
    if !root_methods.is_empty() {
        text.push_str(&format!("/  {}\n", root_methods.join(" ")));
    }

    let mut prefix = Vec::new();
    for root in doc.root_segment_texts() {
        render_level(doc, root, &mut prefix, &mut text);
    }
    text
}

fn render_level<'d>(doc: &'d Document, segment: &'d str, prefix: &mut Vec<&'d str>, text: &mut String) {
    prefix.push(segment);

    let indent = "  ".repeat(prefix.len() - 1);
    let methods = methods_of_routes(doc, prefix);

    if methods.is_empty() {
        text.push_str(&format!("{}{}\n", indent, segment));
    } else {
        text.push_str(&format!("{}{}  {}\n", indent, segment, methods.join(" ")));
    }

    for child in doc.segment_texts_at_next_level(prefix.as_slice()) {
        render_level(doc, child, prefix, text);
    }
    prefix.pop();
}

/// Upper-case methods of the routes whose segments are exactly `segments`.
fn methods_of_routes(doc: &Document, segments: &[&str]) -> Vec<String> {
    doc.routes_starting_with(segments)
        .into_iter()
        .filter(|route| route.segments().len() == segments.len())
        .flat_map(|route| doc.operations_of(route))
        .map(|op| op.method().as_str().to_uppercase())
        .collect()
}
