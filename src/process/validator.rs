//! Process Validation
//!
//! Structural checks for an assembled process graph:
//! - Edge endpoints reference existing steps and differ from each other
//! - At least one start and one end step
//! - Every step is reachable from a start
//! - Every step can reach an end
//! - Step ids are unique
//!
//! All checks always run, so callers receive the complete list of findings.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, info};

use super::model::{Edge, Step, StepKind};
use crate::error::ProcessError;

/// A single structural problem found in a process graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DanglingEdgeReference {
        from: String,
        to: String,
        missing: String,
    },
    MissingTerminal(StepKind),
    UnreachableStep(Vec<String>),
    DeadEndStep(Vec<String>),
    DuplicateStepId(String),
    SelfEdge(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingEdgeReference { from, to, missing } => write!(
                f,
                "Edge {} -> {} references unknown step '{}'",
                from, to, missing
            ),
            Self::MissingTerminal(kind) => write!(f, "Process has no {} step", kind),
            Self::UnreachableStep(ids) => write!(
                f,
                "Steps not reachable from any start step: {}",
                ids.join(", ")
            ),
            Self::DeadEndStep(ids) => {
                write!(f, "Steps that cannot reach any end step: {}", ids.join(", "))
            }
            Self::DuplicateStepId(id) => write!(f, "Duplicate step ID: '{}'", id),
            Self::SelfEdge(id) => write!(f, "Edge {} -> {} connects a step to itself", id, id),
        }
    }
}

/// Runs every check and returns all findings, in check order.
pub fn find_violations(steps: &[Step], edges: &[Edge]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let step_ids: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();

    // 1. Dangling references and self-edges
    for edge in edges {
        let self_edge = edge.from == edge.to;
        if self_edge {
            violations.push(Violation::SelfEdge(edge.from.clone()));
        }
        let endpoints = if self_edge { 1 } else { 2 };
        for endpoint in [&edge.from, &edge.to].into_iter().take(endpoints) {
            if !step_ids.contains(endpoint.as_str()) {
                violations.push(Violation::DanglingEdgeReference {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    // 2. Terminals
    for kind in [StepKind::Start, StepKind::End] {
        if !steps.iter().any(|s| s.kind == kind) {
            violations.push(Violation::MissingTerminal(kind));
        }
    }

    // Only edges between known steps take part in reachability
    let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut backward: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        if step_ids.contains(edge.from.as_str()) && step_ids.contains(edge.to.as_str()) {
            forward
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
            backward
                .entry(edge.to.as_str())
                .or_default()
                .push(edge.from.as_str());
        }
    }

    // 3. Reachable from a start
    let reached = traverse(steps, StepKind::Start, &forward);
    let unreachable = collect_unmarked(steps, StepKind::Start, &reached);
    if !unreachable.is_empty() {
        violations.push(Violation::UnreachableStep(unreachable));
    }

    // 4. Can reach an end
    let reaches_end = traverse(steps, StepKind::End, &backward);
    let dead_ends = collect_unmarked(steps, StepKind::End, &reaches_end);
    if !dead_ends.is_empty() {
        violations.push(Violation::DeadEndStep(dead_ends));
    }

    // 5. Duplicate ids
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    for step in steps {
        let id = step.id.as_str();
        if !seen.insert(id) && reported.insert(id) {
            violations.push(Violation::DuplicateStepId(id.to_string()));
        }
    }

    violations
}

/// Validates a set of steps and edges.
///
/// # Returns
///
/// * `Ok(())` - No violations
/// * `Err(ProcessError::Invalid)` - Every violation found
pub fn validate_process(steps: &[Step], edges: &[Edge]) -> Result<(), ProcessError> {
    info!(
        "Validating process with {} steps, {} edges",
        steps.len(),
        edges.len()
    );

    let violations = find_violations(steps, edges);
    if !violations.is_empty() {
        info!("Validation found {} violation(s)", violations.len());
        return Err(ProcessError::Invalid(violations));
    }

    info!("Process validated");
    Ok(())
}

/// Breadth-first walk from every step of `seed_kind` along `adjacency`.
fn traverse<'a>(
    steps: &'a [Step],
    seed_kind: StepKind,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
) -> HashSet<&'a str> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = steps
        .iter()
        .filter(|s| s.kind == seed_kind)
        .map(|s| s.id.as_str())
        .collect();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(neighbors) = adjacency.get(current) {
            queue.extend(neighbors.iter().copied().filter(|n| !visited.contains(n)));
        }
    }

    debug!("Walk from {} steps visited {} steps", seed_kind, visited.len());
    visited
}

/// Step ids (in step order, once each) that are not `exempt` and not marked.
fn collect_unmarked(steps: &[Step], exempt: StepKind, marked: &HashSet<&str>) -> Vec<String> {
    let mut listed: HashSet<&str> = HashSet::new();
    steps
        .iter()
        .filter(|s| s.kind != exempt && !marked.contains(s.id.as_str()))
        .filter(|s| listed.insert(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect()
}
