//! Process Mapper
//!
//! Runs the whole pipeline for one process record:
//! - ingests steps and resolves lanes
//! - parses connections under the configured policy
//! - validates the graph
//! - computes the swimlane layout
//! - emits the diagram description
//!
//! Each call is independent; the mapper only holds configuration.

use log::info;
use serde::Serialize;

use crate::config::MapperConfig;
use crate::diagram::{emit_diagram, DiagramDescription};
use crate::error::ProcessError;
use crate::layout::{compute_layout, LayoutConfig, LayoutResult};
use crate::process::{build_graph, ConnectionPolicy, ProcessGraph, ProcessRecord};

/// Everything produced for one process.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProcessMap {
    #[serde(skip)]
    pub graph: ProcessGraph,
    pub layout: LayoutResult,
    pub diagram: DiagramDescription,
}

/// Turns process records into validated graphs and diagrams.
///
/// # Example
///
/// ```
/// use procmap::{Mapper, MapperConfig};
/// use procmap::process::{ProcessCore, ProcessRecord, StepRecord};
///
/// let record = ProcessRecord::new(ProcessCore::new("HR"))
///     .with_step(StepRecord::new("Start", "start", "HR"))
///     .with_step(StepRecord::new("Review", "task", "HR"))
///     .with_step(StepRecord::new("End", "end", "HR"));
///
/// let map = Mapper::new(MapperConfig::default()).map(record)?;
/// assert_eq!(map.diagram.nodes.len(), 3);
/// assert_eq!(map.diagram.edges.len(), 2);
/// # Ok::<(), procmap::ProcessError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Sets how malformed connection tokens are handled.
    pub fn set_connection_policy(&mut self, policy: ConnectionPolicy) {
        self.config.connection_policy = policy;
    }

    pub fn set_layout_config(&mut self, layout: LayoutConfig) {
        self.config.layout = layout;
    }

    /// Builds and validates the graph for a record.
    pub fn build(&self, record: ProcessRecord) -> Result<ProcessGraph, ProcessError> {
        build_graph(
            record,
            self.config.connection_policy,
            &self.config.default_lane,
        )
    }

    /// Recomputes the layout for an existing graph.
    pub fn layout(&self, graph: &ProcessGraph) -> Result<LayoutResult, ProcessError> {
        compute_layout(graph, &self.config.layout)
    }

    /// Runs the full pipeline for a record.
    pub fn map(&self, record: ProcessRecord) -> Result<ProcessMap, ProcessError> {
        // Fail on bad layout settings before doing any work
        self.config.validate()?;

        let graph = self.build(record)?;
        let layout = self.layout(&graph)?;
        let diagram = emit_diagram(&graph, &layout)?;

        info!(
            "Mapped '{}': {} steps, {} edges, {} lanes",
            graph.name(),
            graph.len(),
            graph.edges().len(),
            graph.lanes().lane_count()
        );

        Ok(ProcessMap {
            graph,
            layout,
            diagram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::ShapeKind;
    use crate::process::{ProcessCore, StepKind, StepRecord, Violation};

    fn hr_record() -> ProcessRecord {
        ProcessRecord::new(ProcessCore::new("HR").with_why("Hire people"))
            .with_step(StepRecord::new("Start", "start", "HR").with_id("S1"))
            .with_step(StepRecord::new("Review", "task", "HR").with_id("S2"))
            .with_step(StepRecord::new("End", "end", "HR").with_id("S3"))
    }

    #[test]
    fn test_hr_scenario() {
        let map = Mapper::default().map(hr_record()).unwrap();

        assert_eq!(map.diagram.nodes.len(), 3);
        assert_eq!(map.diagram.edges.len(), 2);
        assert_eq!(map.diagram.lanes.len(), 1);
        assert_eq!(map.diagram.lanes[0].pool, "HR");
        assert_eq!(map.diagram.lanes[0].lane, "HR");

        let xs: Vec<f64> = ["S1", "S2", "S3"]
            .iter()
            .map(|id| map.layout.position(id).unwrap().x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(map.diagram.node("S1").unwrap().shape, ShapeKind::Terminal);
    }

    #[test]
    fn test_branching_record() {
        let record = ProcessRecord::new(ProcessCore::new("Support"))
            .with_step(StepRecord::new("Ticket", "start", "Desk"))
            .with_step(StepRecord::new("Known issue?", "decision", "Desk"))
            .with_step(StepRecord::new("Fix", "task", "Eng/Backend"))
            .with_step(StepRecord::new("Reply", "end", "Desk"))
            .with_connections("S1->S2,S2->S3:no|S2->S4:yes,S3->S4");

        let map = Mapper::default().map(record).unwrap();
        assert_eq!(map.graph.edges().len(), 4);
        assert_eq!(map.graph.lanes().pool_count(), 2);
        assert_eq!(map.diagram.node("S2").unwrap().shape, ShapeKind::Branch);
    }

    #[test]
    fn test_malformed_connections_abort() {
        let record = hr_record().with_connections("S1->S9");
        let err = Mapper::default().map(record).unwrap_err();

        assert_eq!(err.connection_errors().len(), 1);
        assert!(err.to_string().contains("S9"));
    }

    #[test]
    fn test_drop_policy_recovers() {
        let record = hr_record().with_connections("S1->S2,S2->S9,S2->S3");
        let mut mapper = Mapper::default();
        mapper.set_connection_policy(ConnectionPolicy::Drop);

        let map = mapper.map(record).unwrap();
        assert_eq!(map.graph.edges().len(), 2);
    }

    #[test]
    fn test_all_violations_reported() {
        let record = ProcessRecord::new(ProcessCore::new("Broken"))
            .with_step(StepRecord::new("Go", "start", "T"))
            .with_step(StepRecord::new("Work", "task", "T"))
            .with_connections("S2->S1");

        let err = Mapper::default().map(record).unwrap_err();
        let violations = err.violations();
        assert!(violations.contains(&Violation::MissingTerminal(StepKind::End)));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::UnreachableStep(ids) if ids == &vec!["S2".to_string()])));
    }

    #[test]
    fn test_bad_layout_config_fails_early() {
        let mut mapper = Mapper::default();
        mapper.set_layout_config(LayoutConfig {
            node_height: 500.0,
            ..LayoutConfig::default()
        });

        let result = mapper.map(hr_record());
        assert!(matches!(result, Err(ProcessError::Config(_))));
    }

    #[test]
    fn test_relayout_matches_map() {
        let mapper = Mapper::default();
        let map = mapper.map(hr_record()).unwrap();
        assert_eq!(mapper.layout(&map.graph).unwrap(), map.layout);
    }
}
