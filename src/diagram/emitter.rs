//! Diagram Description Emitter
//!
//! Combines a validated graph with its layout into a render-agnostic
//! description. Renderers pick shapes from [`ShapeKind`]; nothing here knows
//! about a drawing library.

use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ProcessError;
use crate::layout::{LayoutResult, Point, Rect};
use crate::process::{ProcessGraph, StepKind};

/// Footer text is cut to this many characters.
pub const FOOTER_LIMIT: usize = 50;

/// Abstract node shape.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Start and end events
    Terminal,
    /// Decisions
    Branch,
    /// Tasks and subprocesses
    Block,
}

impl From<StepKind> for ShapeKind {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Start | StepKind::End => Self::Terminal,
            StepKind::Decision => Self::Branch,
            StepKind::Task | StepKind::Subprocess => Self::Block,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeDescription {
    pub id: String,
    pub label: String,
    pub shape: ShapeKind,
    pub kind: StepKind,
    /// Center of the node
    pub position: Point,
    pub lane_id: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EdgeDescription {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LaneDescription {
    pub lane_id: String,
    pub pool: String,
    pub lane: String,
    pub rect: Rect,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PoolDescription {
    pub pool_id: String,
    pub name: String,
    pub rect: Rect,
}

/// Everything a renderer needs to draw the swimlane diagram.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DiagramDescription {
    /// Process name
    pub title: String,
    /// Shortened process purpose
    pub footer: String,
    pub nodes: Vec<NodeDescription>,
    pub edges: Vec<EdgeDescription>,
    pub lanes: Vec<LaneDescription>,
    pub pools: Vec<PoolDescription>,
    pub width: f64,
    pub height: f64,
}

impl DiagramDescription {
    pub fn node(&self, id: &str) -> Option<&NodeDescription> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Builds the diagram description for a graph and its layout.
///
/// Nodes follow step order, edges follow edge order and lanes follow the
/// layout's top-to-bottom order.
///
/// # Errors
///
/// Returns `ProcessError::Internal` when the layout does not belong to the
/// graph: a step without a placement, or an edge whose endpoint has no node.
pub fn emit_diagram(
    graph: &ProcessGraph,
    layout: &LayoutResult,
) -> Result<DiagramDescription, ProcessError> {
    let mut nodes = Vec::with_capacity(graph.len());
    for step in graph.steps() {
        let placement = layout.placement(&step.id).ok_or_else(|| {
            ProcessError::Internal(format!("Step '{}' has no layout position", step.id))
        })?;
        nodes.push(NodeDescription {
            id: step.id.clone(),
            label: step.label(),
            shape: ShapeKind::from(step.kind),
            kind: step.kind,
            position: placement.position,
            lane_id: placement.lane_id.clone(),
            width: placement.cell.width,
            height: placement.cell.height,
        });
    }

    let drawn: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut edges = Vec::with_capacity(graph.edges().len());
    for edge in graph.edges() {
        if let Some(missing) = [&edge.from, &edge.to]
            .into_iter()
            .find(|id| !drawn.contains(id.as_str()))
        {
            return Err(ProcessError::Internal(format!(
                "Edge {} -> {} points at undrawn step '{}'",
                edge.from, edge.to, missing
            )));
        }
        edges.push(EdgeDescription {
            from: edge.from.clone(),
            to: edge.to.clone(),
            label: edge.label.clone(),
        });
    }

    let lanes = layout
        .lanes()
        .iter()
        .map(|l| LaneDescription {
            lane_id: l.lane_id.clone(),
            pool: l.pool.clone(),
            lane: l.lane.clone(),
            rect: l.rect,
        })
        .collect();

    let pools = layout
        .pools()
        .iter()
        .map(|p| PoolDescription {
            pool_id: p.pool_id.clone(),
            name: p.pool.clone(),
            rect: p.rect,
        })
        .collect();

    let bounds = layout.bounds();
    let diagram = DiagramDescription {
        title: graph.name().to_string(),
        footer: footer_text(&graph.core().why),
        nodes,
        edges,
        lanes,
        pools,
        width: bounds.right(),
        height: bounds.bottom(),
    };

    info!(
        "Emitted diagram '{}': {} nodes, {} edges, {} lanes",
        diagram.title,
        diagram.nodes.len(),
        diagram.edges.len(),
        diagram.lanes.len()
    );
    Ok(diagram)
}

/// Cuts the purpose to [`FOOTER_LIMIT`] characters, marking the cut.
pub fn footer_text(why: &str) -> String {
    let why = why.trim();
    if why.chars().count() <= FOOTER_LIMIT {
        return why.to_string();
    }
    let mut footer: String = why.chars().take(FOOTER_LIMIT).collect();
    footer.push_str("...");
    footer
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::layout::{compute_layout, LayoutConfig};
    use crate::process::{Edge, ProcessCore, Step};

    fn graph() -> ProcessGraph {
        let steps = vec![
            Step::new("S1", "Job Req", StepKind::Start).in_lane("HR", "HR"),
            Step::new("S2", "Screen?", StepKind::Decision)
                .in_lane("HR", "Recruiter")
                .with_duration(30),
            Step::new("S3", "Interview", StepKind::Subprocess)
                .in_lane("HR", "Manager")
                .with_tool("Zoom"),
            Step::new("S4", "Hired", StepKind::End).in_lane("HR", "HR"),
        ];
        let edges = vec![
            Edge::new("S1", "S2"),
            Edge::new("S2", "S3").with_label("pass"),
            Edge::new("S2", "S4").with_label("reject"),
            Edge::new("S3", "S4"),
        ];
        let core = ProcessCore::new("Hiring").with_why("Fill open roles");
        ProcessGraph::from_parts(core, steps, edges, BTreeMap::new()).unwrap()
    }

    #[test]
    fn test_shapes_follow_kinds() {
        assert_eq!(ShapeKind::from(StepKind::Start), ShapeKind::Terminal);
        assert_eq!(ShapeKind::from(StepKind::End), ShapeKind::Terminal);
        assert_eq!(ShapeKind::from(StepKind::Decision), ShapeKind::Branch);
        assert_eq!(ShapeKind::from(StepKind::Task), ShapeKind::Block);
        assert_eq!(ShapeKind::from(StepKind::Subprocess), ShapeKind::Block);
    }

    #[test]
    fn test_emit_diagram() {
        let graph = graph();
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let diagram = emit_diagram(&graph, &layout).unwrap();

        assert_eq!(diagram.title, "Hiring");
        assert_eq!(diagram.footer, "Fill open roles");
        assert_eq!(diagram.nodes.len(), 4);
        assert_eq!(diagram.edges.len(), 4);
        assert_eq!(diagram.lanes.len(), 3);
        assert_eq!(diagram.pools.len(), 1);

        let screen = diagram.node("S2").unwrap();
        assert_eq!(screen.shape, ShapeKind::Branch);
        assert_eq!(screen.label, "Screen?\n30 min");
        assert_eq!(screen.position, layout.position("S2").unwrap());
        assert_eq!(diagram.node("S3").unwrap().label, "Interview\nZoom");

        assert_eq!(diagram.edges[2].label.as_deref(), Some("reject"));
        assert_eq!(diagram.width, layout.bounds().right());
        assert_eq!(diagram.height, layout.bounds().bottom());
    }

    #[test]
    fn test_layout_from_other_graph_is_internal_fault() {
        let graph = graph();
        let other = ProcessGraph::from_parts(
            ProcessCore::new("Tiny"),
            vec![
                Step::new("A", "Go", StepKind::Start).in_lane("T", "T"),
                Step::new("B", "Stop", StepKind::End).in_lane("T", "T"),
            ],
            vec![Edge::new("A", "B")],
            BTreeMap::new(),
        )
        .unwrap();
        let layout = compute_layout(&other, &LayoutConfig::default()).unwrap();

        let result = emit_diagram(&graph, &layout);
        assert!(matches!(result, Err(ProcessError::Internal(_))));
    }

    #[test]
    fn test_footer_truncation() {
        assert_eq!(footer_text("Short purpose"), "Short purpose");
        assert_eq!(footer_text(""), "");

        let long = "x".repeat(60);
        let footer = footer_text(&long);
        assert_eq!(footer, format!("{}...", "x".repeat(50)));

        let exact = "y".repeat(50);
        assert_eq!(footer_text(&exact), exact);
    }

    #[test]
    fn test_footer_counts_characters() {
        let text = "é".repeat(55);
        let footer = footer_text(&text);
        assert_eq!(footer.chars().count(), 53);
    }

    #[test]
    fn test_shape_serializes_lowercase() {
        let json = serde_json::to_string(&ShapeKind::Branch).unwrap();
        assert_eq!(json, "\"branch\"");
    }
}
