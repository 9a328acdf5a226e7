//! Serialization Adapter
//!
//! Converts a [`ProcessGraph`] to and from a plain nested value
//! (`serde_json::Value`), so it can be stored as JSON or YAML.
//!
//! # Document Layout
//!
//! ```json
//! {
//!   "generator": "procmap",
//!   "version": "0.1.0",
//!   "saved_at": "2026-01-01T00:00:00Z",
//!   "core": { "name": "...", "why": "...", "roles": ["..."] },
//!   "answers": { "goal": "..." },
//!   "steps": [ { "id": "S1", "name": "...", "kind": "start", "pool": "...", "lane": "..." } ],
//!   "edges": [ { "from": "S1", "to": "S2" } ],
//!   "layout": { ... }
//! }
//! ```
//!
//! `generator`, `version`, `saved_at` and `layout` are informational. On load
//! they are ignored; the layout is recomputed from the graph.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProcessError;
use crate::layout::LayoutResult;
use crate::process::{Edge, ProcessCore, ProcessGraph, Step};
use crate::{APP_NAME, VERSION};

/// Borrowed view used for writing.
#[derive(Serialize)]
struct DocumentOut<'a> {
    generator: &'a str,
    version: &'a str,
    saved_at: DateTime<Utc>,
    core: &'a ProcessCore,
    answers: &'a BTreeMap<String, String>,
    steps: &'a [Step],
    edges: &'a [Edge],
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a LayoutResult>,
}

/// Owned form used for reading. Unknown fields are ignored.
#[derive(Deserialize)]
struct DocumentIn {
    core: ProcessCore,
    #[serde(default)]
    answers: BTreeMap<String, String>,
    steps: Vec<Step>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// Serializes a graph, and optionally its layout, into a nested value.
pub fn to_document(
    graph: &ProcessGraph,
    layout: Option<&LayoutResult>,
) -> Result<Value, ProcessError> {
    let document = DocumentOut {
        generator: APP_NAME,
        version: VERSION,
        saved_at: Utc::now(),
        core: graph.core(),
        answers: graph.answers(),
        steps: graph.steps(),
        edges: graph.edges(),
        layout,
    };
    Ok(serde_json::to_value(document)?)
}

/// Restores a graph from a nested value, validating it again.
///
/// # Errors
///
/// * `ProcessError::MalformedRecord` - A required field is missing, empty or
///   of the wrong type
/// * `ProcessError::Invalid` - The restored graph fails validation
pub fn from_document(document: &Value) -> Result<ProcessGraph, ProcessError> {
    let parsed = DocumentIn::deserialize(document)
        .map_err(|e| ProcessError::MalformedRecord(e.to_string()))?;

    check_required(&parsed)?;
    debug!(
        "Restoring '{}': {} steps, {} edges",
        parsed.core.name,
        parsed.steps.len(),
        parsed.edges.len()
    );

    ProcessGraph::from_parts(parsed.core, parsed.steps, parsed.edges, parsed.answers)
}

/// Rejects required fields that are present but blank.
fn check_required(document: &DocumentIn) -> Result<(), ProcessError> {
    if document.core.name.trim().is_empty() {
        return Err(ProcessError::MalformedRecord(
            "core.name must not be empty".to_string(),
        ));
    }

    for (index, step) in document.steps.iter().enumerate() {
        let blank = [
            ("id", &step.id),
            ("name", &step.name),
            ("pool", &step.pool),
            ("lane", &step.lane),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = blank {
            return Err(ProcessError::MalformedRecord(format!(
                "steps[{}].{} must not be empty",
                index, field
            )));
        }
    }

    for (index, edge) in document.edges.iter().enumerate() {
        if edge.from.trim().is_empty() || edge.to.trim().is_empty() {
            return Err(ProcessError::MalformedRecord(format!(
                "edges[{}] needs both endpoints",
                index
            )));
        }
    }

    Ok(())
}
