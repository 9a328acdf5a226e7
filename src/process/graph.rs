//! Process Graph
//!
//! The validated aggregate of steps, edges and lanes. A `ProcessGraph` can
//! only be obtained through validation, and exposes read-only access after
//! that.

use std::collections::BTreeMap;

use super::model::{Edge, ProcessCore, Step, StepKind};
use super::registry::LaneRegistry;
use super::validator::validate_process;
use crate::error::ProcessError;

/// A validated business process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessGraph {
    core: ProcessCore,
    steps: Vec<Step>,
    edges: Vec<Edge>,
    lanes: LaneRegistry,
    answers: BTreeMap<String, String>,
}

impl ProcessGraph {
    /// Assembles and validates a graph from resolved parts.
    ///
    /// Steps must already carry their pool and lane names. Every problem,
    /// self-edges included, is reported as [`ProcessError::Invalid`] with the
    /// full violation list.
    pub fn from_parts(
        core: ProcessCore,
        steps: Vec<Step>,
        edges: Vec<Edge>,
        answers: BTreeMap<String, String>,
    ) -> Result<Self, ProcessError> {
        validate_process(&steps, &edges)?;
        let lanes = LaneRegistry::from_steps(&steps);

        Ok(Self {
            core,
            steps,
            edges,
            lanes,
            answers,
        })
    }

    /// Process name (also the default pool name).
    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn core(&self) -> &ProcessCore {
        &self.core
    }

    /// Steps in input order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn lanes(&self) -> &LaneRegistry {
        &self.lanes
    }

    /// Questionnaire answers attached to the process.
    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Gets a step by ID.
    pub fn get_step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Steps directly following `id`, in edge order.
    pub fn successors(&self, id: &str) -> Vec<&Step> {
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .filter_map(|e| self.get_step(&e.to))
            .collect()
    }

    /// Steps of the given kind, in input order.
    pub fn steps_of_kind(&self, kind: StepKind) -> Vec<&Step> {
        self.steps.iter().filter(|s| s.kind == kind).collect()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
