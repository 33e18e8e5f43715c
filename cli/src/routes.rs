#![deny(missing_docs)]

//! # Routes Command
//!
//! Lists routes with their operations, parameters and responses, as text or JSON.

use crate::error::CliResult;
use crate::source::load_document;
use oapi_graph_core::{Document, Operation, RouteNode, TypeSchema};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the routes command.
#[derive(clap::Args, Debug, Clone)]
pub struct RoutesArgs {
    /// Path to the API description (YAML or JSON).
    #[clap(env = "OAPI_GRAPH_INPUT")]
    pub file: PathBuf,

    /// Only list routes with exactly this many static segments.
    #[clap(long)]
    pub level: Option<usize>,

    /// Emit JSON instead of text.
    #[clap(long)]
    pub json: bool,
}

/// Summary of one route.
#[derive(Debug, Serialize)]
pub struct RouteSummary {
    path: String,
    static_path: String,
    level: usize,
    operations: Vec<OperationSummary>,
}

#[derive(Debug, Serialize)]
struct OperationSummary {
    method: &'static str,
    handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    params: Vec<ParamSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    request_bodies: Vec<ContentSummary>,
    responses: Vec<ResponseSummary>,
}

#[derive(Debug, Serialize)]
struct ParamSummary {
    name: String,
    #[serde(rename = "in")]
    location: String,
    required: bool,
    schema: Option<String>,
}

#[derive(Debug, Serialize)]
struct ContentSummary {
    mime_type: String,
    schema: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseSummary {
    status: String,
    mime_type: String,
    schema: Option<String>,
}

/// Executes the routes command, writing to `out`.
pub fn execute(args: &RoutesArgs, out: &mut impl Write) -> CliResult<()> {
    let doc = load_document(&args.file)?;
    let summaries = summarize(&doc, args.level);

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &summaries)?;
        writeln!(out)?;
    } else {
        out.write_all(render_text(&summaries).as_bytes())?;
    }
    Ok(())
}

/// Summarizes every route of `doc`, or only those at `level`.
pub fn summarize(doc: &Document, level: Option<usize>) -> Vec<RouteSummary> {
    let routes: Vec<&RouteNode> = match level {
        Some(level) => doc.routes_at_level(level),
        None => doc.routes().iter().collect(),
    };

    routes
        .into_iter()
        .map(|route| RouteSummary {
            path: route.path().to_string(),
            static_path: route.static_path().to_string(),
            level: route.level(),
            operations: doc.operations_of(route).map(|op| summarize_operation(doc, op)).collect(),
        })
        .collect()
}

fn summarize_operation(doc: &Document, op: &Operation) -> OperationSummary {
    OperationSummary {
        method: op.method().as_str(),
        handler: doc.handler_name(op),
        operation_id: op.operation_id().map(String::from),
        tags: op.tags().to_vec(),
        params: doc
            .params_of(op)
            .map(|p| ParamSummary {
                name: p.name().to_string(),
                location: p.location().to_string(),
                required: p.is_required(),
                schema: p.schema().map(TypeSchema::summary),
            })
            .collect(),
        request_bodies: doc
            .request_bodies_of(op)
            .map(|b| ContentSummary {
                mime_type: b.mime_type().to_string(),
                schema: b.schema().map(TypeSchema::summary),
            })
            .collect(),
        responses: doc
            .responses_of(op)
            .map(|r| ResponseSummary {
                status: r.status_key().to_string(),
                mime_type: r.mime_type().to_string(),
                schema: r.schema().map(TypeSchema::summary),
            })
            .collect(),
    }
}

fn render_text(routes: &[RouteSummary]) -> String {
    let mut text = String::new();
    for route in routes {
        if route.operations.is_empty() {
            text.push_str(&format!("{}  (no operations)\n", route.path));
        }
        for op in &route.operations {
            text.push_str(&format!(
                "{} {}  {}\n",
                op.method.to_uppercase(),
                route.path,
                op.handler
            ));
            for p in &op.params {
                let required = if p.required { " (required)" } else { "" };
                text.push_str(&format!(
                    "    param {} {}{}: {}\n",
                    p.location,
                    p.name,
                    required,
                    p.schema.as_deref().unwrap_or("-")
                ));
            }
            for b in &op.request_bodies {
                text.push_str(&format!(
                    "    body {}: {}\n",
                    b.mime_type,
                    b.schema.as_deref().unwrap_or("-")
                ));
            }
            for r in &op.responses {
                text.push_str(&format!(
                    "    {} {}: {}\n",
                    r.status,
                    r.mime_type,
                    r.schema.as_deref().unwrap_or("-")
                ));
            }
        }
    }
    text
}
