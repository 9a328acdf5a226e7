//! Layout Module
//!
//! Assigns 2-D coordinates to a validated process graph.
//!
//! # Structure
//!
//! - [`geometry`]: Point, Size and Rect primitives
//! - [`config`]: Grid pitches and cell sizes
//! - [`swimlane`]: The swimlane layout engine

pub mod config;
pub mod geometry;
pub mod swimlane;

pub use config::LayoutConfig;
pub use geometry::{Point, Rect, Size};
pub use swimlane::{compute_layout, LaneBounds, LayoutResult, PoolBounds, StepPlacement};
