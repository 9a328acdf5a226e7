//! Layout Configuration
//!
//! Fixed pitches and sizes for the swimlane grid. Every field has a default,
//! so partial YAML sections are accepted.

use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Geometry settings for the swimlane layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of every lane band
    pub lane_height: f64,

    /// Lane pitch as a multiple of `lane_height`; must exceed 1
    pub row_spacing: f64,

    /// Center x of the first step in each lane
    pub x_base: f64,

    /// Horizontal pitch between consecutive steps in a lane
    pub x_spacing: f64,

    /// Cell footprint of a step
    pub node_width: f64,
    pub node_height: f64,

    /// Left edge of every lane band
    pub lane_x: f64,

    /// Space kept right of the last step in the widest lane
    pub lane_padding: f64,

    /// Width after which a lane is reported as overflowing
    pub max_row_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_height: 120.0,
            row_spacing: 1.2,
            x_base: 160.0,
            x_spacing: 180.0,
            node_width: 140.0,
            node_height: 70.0,
            lane_x: 0.0,
            lane_padding: 40.0,
            max_row_width: 1800.0,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance between the tops of consecutive lanes.
    pub fn lane_pitch(&self) -> f64 {
        self.lane_height * self.row_spacing
    }

    /// Checks that the settings keep cells inside lanes and apart from each
    /// other.
    pub fn validate(&self) -> Result<(), ProcessError> {
        let values = [
            ("lane_height", self.lane_height),
            ("row_spacing", self.row_spacing),
            ("x_base", self.x_base),
            ("x_spacing", self.x_spacing),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("lane_x", self.lane_x),
            ("lane_padding", self.lane_padding),
            ("max_row_width", self.max_row_width),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ProcessError::Config(format!("{} must be a finite number", name)));
        }

        let positive = [
            ("lane_height", self.lane_height),
            ("x_spacing", self.x_spacing),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("max_row_width", self.max_row_width),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ProcessError::Config(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }

        if self.row_spacing <= 1.0 {
            return Err(ProcessError::Config(format!(
                "row_spacing must be greater than 1, got {}",
                self.row_spacing
            )));
        }
        if self.x_spacing < self.node_width {
            return Err(ProcessError::Config(format!(
                "x_spacing ({}) is smaller than node_width ({})",
                self.x_spacing, self.node_width
            )));
        }
        if self.node_height > self.lane_height {
            return Err(ProcessError::Config(format!(
                "node_height ({}) exceeds lane_height ({})",
                self.node_height, self.lane_height
            )));
        }
        if self.x_base - self.node_width / 2.0 < self.lane_x {
            return Err(ProcessError::Config(format!(
                "x_base ({}) places the first step left of the lane edge ({})",
                self.x_base, self.lane_x
            )));
        }
        if self.lane_padding < 0.0 {
            return Err(ProcessError::Config("lane_padding must not be negative".to_string()));
        }

        Ok(())
    }
}
