//! Process Builder
//!
//! Turns a collaborator-supplied [`ProcessRecord`] into a validated
//! [`ProcessGraph`]:
//! 1. Assigns missing step ids (`S1`, `S2`, ...)
//! 2. Normalizes kinds and resolves pool/lane names
//! 3. Resolves connections under the configured policy
//! 4. Validates and registers lanes

use std::collections::HashSet;

use log::{debug, info};

use super::connections::{resolve_connections, ConnectionPolicy};
use super::graph::ProcessGraph;
use super::model::{ProcessCore, ProcessRecord, Step, StepKind, StepRecord};
use super::registry::resolve_lane;
use crate::error::ProcessError;

/// Lane used when a step names none.
pub const DEFAULT_LANE: &str = "Team";

/// Builds a validated graph from an input record.
///
/// # Example
///
/// ```
/// use procmap::process::{build_graph, ConnectionPolicy, ProcessCore, ProcessRecord, StepRecord};
///
/// let record = ProcessRecord::new(ProcessCore::new("HR"))
///     .with_step(StepRecord::new("Start", "start", "HR"))
///     .with_step(StepRecord::new("Review", "task", "HR"))
///     .with_step(StepRecord::new("End", "end", "HR"));
///
/// let graph = build_graph(record, ConnectionPolicy::Abort, "Team").unwrap();
/// assert_eq!(graph.edges().len(), 2);
/// ```
pub fn build_graph(
    record: ProcessRecord,
    policy: ConnectionPolicy,
    default_lane: &str,
) -> Result<ProcessGraph, ProcessError> {
    let ProcessRecord {
        mut core,
        steps,
        connections,
        answers,
    } = record;

    // The name doubles as the default pool, so it can never be blank
    if core.name.trim().is_empty() {
        core.name = ProcessCore::default().name;
        debug!("Process has no name, using '{}'", core.name);
    }
    let default_lane = match default_lane.trim() {
        "" => DEFAULT_LANE,
        lane => lane,
    };

    info!("Building process '{}' from {} steps", core.name, steps.len());

    let steps = ingest_steps(&steps, &core.name, default_lane);
    let edges = resolve_connections(&steps, &connections, policy)?;

    ProcessGraph::from_parts(core, steps, edges, answers)
}

/// Resolves ids, kinds and lanes for every step record, keeping order.
pub fn ingest_steps(records: &[StepRecord], process_name: &str, default_lane: &str) -> Vec<Step> {
    let ids = assign_ids(records);

    records
        .iter()
        .zip(ids)
        .map(|(record, id)| {
            let kind = StepKind::from_token(&record.kind).unwrap_or_else(|| {
                debug!(
                    "Step '{}': unknown kind '{}', using task",
                    id, record.kind
                );
                StepKind::Task
            });

            let (pool, lane) = resolve_lane(
                &record.lane,
                record.pool.as_deref(),
                process_name,
                default_lane,
            );

            let name = match record.name.trim() {
                "" => format!("Step {}", id),
                name => name.to_string(),
            };

            let mut step = Step::new(id, name, kind).in_lane(pool, lane);
            step.duration_minutes = record.duration_minutes;
            step.tool = record
                .tool
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from);
            step
        })
        .collect()
}

/// Keeps explicit ids and numbers the rest `S<position>`, skipping any id
/// that is already taken.
fn assign_ids(records: &[StepRecord]) -> Vec<String> {
    let explicit = |record: &StepRecord| {
        record
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
    };

    let claimed: HashSet<String> = records.iter().filter_map(explicit).collect();
    let mut assigned: HashSet<String> = HashSet::new();

    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            if let Some(id) = explicit(record) {
                return id;
            }

            let mut number = position + 1;
            let mut candidate = format!("S{}", number);
            while claimed.contains(&candidate) || assigned.contains(&candidate) {
                number += 1;
                candidate = format!("S{}", number);
            }
            assigned.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::connections::ConnectionError;
    use crate::process::validator::Violation;
    use crate::record::{from_document, to_document};

    fn hr_record() -> ProcessRecord {
        ProcessRecord::new(ProcessCore::new("HR"))
            .with_step(StepRecord::new("Start", "start", "HR").with_id("S1"))
            .with_step(StepRecord::new("Review", "task", "HR").with_id("S2"))
            .with_step(StepRecord::new("End", "end", "HR").with_id("S3"))
    }

    #[test]
    fn test_build_linear_process() {
        let graph = build_graph(hr_record(), ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.lanes().lane_count(), 1);
        let lane = graph.lanes().lane("HR", "HR").unwrap();
        assert_eq!(lane.steps, vec!["S1", "S2", "S3"]);
        assert!(graph.edges()[0].connects("S1", "S2"));
        assert!(graph.edges()[1].connects("S2", "S3"));
    }

    #[test]
    fn test_assign_ids_sequentially() {
        let records = vec![
            StepRecord::new("a", "start", "L"),
            StepRecord::new("b", "task", "L"),
            StepRecord::new("c", "end", "L"),
        ];
        assert_eq!(assign_ids(&records), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_assign_ids_skips_claimed() {
        let records = vec![
            StepRecord::new("a", "start", "L"),
            StepRecord::new("b", "task", "L").with_id("S1"),
            StepRecord::new("c", "end", "L"),
        ];
        assert_eq!(assign_ids(&records), vec!["S2", "S1", "S3"]);
    }

    #[test]
    fn test_ingest_normalizes_kind_and_lane() {
        let records = vec![
            StepRecord::new("Check", "Gateway", "Acme/Ops"),
            StepRecord::new(" ", "DECISION", "").with_pool("Vendor"),
            StepRecord::new("Ship", "task", "Ops").with_tool("  ").with_duration(5),
        ];
        let steps = ingest_steps(&records, "Proc", "Team");

        assert_eq!(steps[0].kind, StepKind::Task);
        assert_eq!((steps[0].pool.as_str(), steps[0].lane.as_str()), ("Acme", "Ops"));
        assert_eq!(steps[1].kind, StepKind::Decision);
        assert_eq!(steps[1].name, "Step S2");
        assert_eq!((steps[1].pool.as_str(), steps[1].lane.as_str()), ("Vendor", "Team"));
        assert_eq!((steps[2].pool.as_str(), steps[2].lane.as_str()), ("Proc", "Ops"));
        assert_eq!(steps[2].tool, None);
        assert_eq!(steps[2].duration_minutes, Some(5));
    }

    #[test]
    fn test_build_with_decision_branch() {
        let record = ProcessRecord::new(ProcessCore::new("Claims"))
            .with_step(StepRecord::new("Receive", "start", "Intake"))
            .with_step(StepRecord::new("Valid?", "decision", "Intake"))
            .with_step(StepRecord::new("Pay", "task", "Finance"))
            .with_step(StepRecord::new("Closed", "end", "Finance"))
            .with_connections("S1->S2,S2->S3:yes|S2->S4:no,S3->S4");

        let graph = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();
        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.successors("S2").len(), 2);
        assert_eq!(graph.lanes().pools()[0].name, "Claims");
    }

    #[test]
    fn test_build_reports_unknown_connection() {
        let record = hr_record().with_connections("S1->S9");
        let err = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap_err();

        assert!(err.connection_errors().iter().any(|e| matches!(
            e,
            ConnectionError::UnknownStep { id, .. } if id == "S9"
        )));
    }

    #[test]
    fn test_build_drop_policy_then_validation_fails() {
        let record = hr_record().with_connections("S1->S2,S2->S9");
        let err = build_graph(record, ConnectionPolicy::Drop, DEFAULT_LANE).unwrap_err();

        assert!(err.violations().contains(&Violation::DeadEndStep(vec![
            "S1".to_string(),
            "S2".to_string()
        ])));
    }

    #[test]
    fn test_build_duplicate_ids_fail() {
        let record = ProcessRecord::new(ProcessCore::new("Dup"))
            .with_step(StepRecord::new("a", "start", "L").with_id("X"))
            .with_step(StepRecord::new("b", "end", "L").with_id("X"));

        let err = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap_err();
        assert!(err
            .violations()
            .contains(&Violation::DuplicateStepId("X".to_string())));
    }

    #[test]
    fn test_blank_name_falls_back_and_reloads() {
        let record = ProcessRecord::new(ProcessCore::new(""))
            .with_step(StepRecord::new("Open", "start", "Desk"))
            .with_step(StepRecord::new("Close", "end", "Desk"));

        let graph = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();
        assert_eq!(graph.name(), "Business Process");
        assert!(graph.steps().iter().all(|s| s.pool == "Business Process"));

        let document = to_document(&graph, None).unwrap();
        assert_eq!(from_document(&document).unwrap(), graph);
    }

    #[test]
    fn test_blank_default_lane_falls_back() {
        let record = ProcessRecord::new(ProcessCore::new("Intake"))
            .with_step(StepRecord::new("Open", "start", ""))
            .with_step(StepRecord::new("Close", "end", ""));

        let graph = build_graph(record, ConnectionPolicy::Abort, "  ").unwrap();
        assert!(graph.steps().iter().all(|s| s.lane == DEFAULT_LANE));
    }

    #[test]
    fn test_build_keeps_answers() {
        let record = hr_record().with_answer("pain", "manual paperwork");
        let graph = build_graph(record, ConnectionPolicy::Abort, DEFAULT_LANE).unwrap();
        assert_eq!(graph.answers()["pain"], "manual paperwork");
    }
}
