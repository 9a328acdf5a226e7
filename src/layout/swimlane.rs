//! Swimlane Layout Engine
//!
//! Places every step of a validated graph on a fixed grid:
//! - lanes are horizontal bands stacked top to bottom in first-seen order
//! - steps sit left to right in the order they joined their lane
//! - every step is vertically centered in its lane
//!
//! The result depends only on the graph and the config, so repeated runs
//! produce identical output. Lanes that grow past `max_row_width` are still
//! laid out in a single row and reported in
//! [`LayoutResult::overflowing_lanes`].

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::Serialize;

use super::config::LayoutConfig;
use super::geometry::{Point, Rect, Size};
use crate::error::ProcessError;
use crate::process::{ProcessGraph, StepKind};

/// Where a single step ended up.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StepPlacement {
    pub step_id: String,
    pub lane_id: String,
    /// Position within the lane, starting at 0
    pub column: usize,
    /// Center of the step's cell
    pub position: Point,
    pub cell: Size,
    /// Render the cell as a diamond instead of a rectangle
    pub diamond: bool,
}

impl StepPlacement {
    /// The cell rectangle around the step.
    pub fn footprint(&self) -> Rect {
        Rect::centered(self.position, self.cell)
    }
}

/// Bounding band of a lane.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LaneBounds {
    pub lane_id: String,
    pub pool_id: String,
    pub pool: String,
    pub lane: String,
    pub rect: Rect,
}

/// Bounding box of a pool: the union of its lanes.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PoolBounds {
    pub pool_id: String,
    pub pool: String,
    pub rect: Rect,
}

/// Positions for every step and bounds for every lane and pool.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayoutResult {
    placements: Vec<StepPlacement>,
    lanes: Vec<LaneBounds>,
    pools: Vec<PoolBounds>,
    bounds: Rect,
    overflowing_lanes: Vec<String>,
}

impl LayoutResult {
    /// Placements in graph step order.
    pub fn placements(&self) -> &[StepPlacement] {
        &self.placements
    }

    pub fn placement(&self, step_id: &str) -> Option<&StepPlacement> {
        self.placements.iter().find(|p| p.step_id == step_id)
    }

    /// Center position of a step.
    pub fn position(&self, step_id: &str) -> Option<Point> {
        self.placement(step_id).map(|p| p.position)
    }

    /// Lane bands, top to bottom.
    pub fn lanes(&self) -> &[LaneBounds] {
        &self.lanes
    }

    pub fn lane(&self, lane_id: &str) -> Option<&LaneBounds> {
        self.lanes.iter().find(|l| l.lane_id == lane_id)
    }

    pub fn pools(&self) -> &[PoolBounds] {
        &self.pools
    }

    /// Union of all lane bands.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Ids of lanes wider than the configured maximum row width.
    pub fn overflowing_lanes(&self) -> &[String] {
        &self.overflowing_lanes
    }
}

/// Computes the swimlane layout for a validated graph.
///
/// # Errors
///
/// * `ProcessError::Config` - The layout settings are unusable
/// * `ProcessError::Internal` - Steps and lanes disagree, which a validated
///   graph never produces
pub fn compute_layout(
    graph: &ProcessGraph,
    config: &LayoutConfig,
) -> Result<LayoutResult, ProcessError> {
    config.validate()?;

    let registry = graph.lanes();
    let kinds: HashMap<&str, StepKind> = graph
        .steps()
        .iter()
        .map(|s| (s.id.as_str(), s.kind))
        .collect();

    let cell = Size::new(config.node_width, config.node_height);
    let widest = registry.lanes().map(|l| l.steps.len()).max().unwrap_or(0);
    let lane_width = lane_width(config, widest);

    let mut by_step: HashMap<&str, StepPlacement> = HashMap::new();
    let mut lanes = Vec::with_capacity(registry.lane_count());
    let mut pools = Vec::with_capacity(registry.pool_count());
    let mut overflowing_lanes = Vec::new();
    let mut lane_index = 0usize;

    for pool in registry.pools() {
        let mut pool_rect: Option<Rect> = None;

        for lane in &pool.lanes {
            let top = lane_index as f64 * config.lane_pitch();
            let rect = Rect::new(config.lane_x, top, lane_width, config.lane_height);
            let center_y = rect.center().y;

            for (column, step_id) in lane.steps.iter().enumerate() {
                let kind = kinds.get(step_id.as_str()).ok_or_else(|| {
                    ProcessError::Internal(format!(
                        "Lane '{}' references unknown step '{}'",
                        lane.id, step_id
                    ))
                })?;

                let placement = StepPlacement {
                    step_id: step_id.clone(),
                    lane_id: lane.id.clone(),
                    column,
                    position: Point::new(column_x(config, column), center_y),
                    cell,
                    diamond: *kind == StepKind::Decision,
                };
                if by_step.insert(step_id.as_str(), placement).is_some() {
                    return Err(ProcessError::Internal(format!(
                        "Step '{}' appears in more than one lane slot",
                        step_id
                    )));
                }
            }

            if let Some(last) = lane.steps.len().checked_sub(1) {
                let right_edge = column_x(config, last) + config.node_width / 2.0;
                if right_edge > config.lane_x + config.max_row_width {
                    warn!(
                        "Lane '{}/{}' needs width {} beyond max row width {}; steps are not wrapped",
                        lane.pool,
                        lane.name,
                        right_edge - config.lane_x,
                        config.max_row_width
                    );
                    overflowing_lanes.push(lane.id.clone());
                }
            }

            debug!(
                "Lane {} '{}/{}': {} steps at y={}",
                lane.id,
                lane.pool,
                lane.name,
                lane.steps.len(),
                center_y
            );

            pool_rect = Some(match pool_rect {
                Some(acc) => acc.union(&rect),
                None => rect,
            });
            lanes.push(LaneBounds {
                lane_id: lane.id.clone(),
                pool_id: pool.id.clone(),
                pool: pool.name.clone(),
                lane: lane.name.clone(),
                rect,
            });
            lane_index += 1;
        }

        if let Some(rect) = pool_rect {
            pools.push(PoolBounds {
                pool_id: pool.id.clone(),
                pool: pool.name.clone(),
                rect,
            });
        }
    }

    let mut placements = Vec::with_capacity(graph.len());
    for step in graph.steps() {
        let placement = by_step.remove(step.id.as_str()).ok_or_else(|| {
            ProcessError::Internal(format!("Step '{}' was not assigned to a lane", step.id))
        })?;
        placements.push(placement);
    }

    let bounds = lanes
        .iter()
        .map(|l| l.rect)
        .reduce(|acc, rect| acc.union(&rect))
        .unwrap_or_default();

    info!(
        "Laid out {} steps in {} lanes ({} x {})",
        placements.len(),
        lanes.len(),
        bounds.width,
        bounds.height
    );

    Ok(LayoutResult {
        placements,
        lanes,
        pools,
        bounds,
        overflowing_lanes,
    })
}

/// Center x of the step in `column`.
fn column_x(config: &LayoutConfig, column: usize) -> f64 {
    config.x_base + column as f64 * config.x_spacing
}

/// Common width for all lanes, sized to the lane with the most steps.
fn lane_width(config: &LayoutConfig, widest: usize) -> f64 {
    let last_column = widest.saturating_sub(1);
    column_x(config, last_column) + config.node_width / 2.0 + config.lane_padding - config.lane_x
}
