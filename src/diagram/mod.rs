//! Diagram Module
//!
//! Render-agnostic description of a laid-out process.

pub mod emitter;

pub use emitter::{
    emit_diagram, footer_text, DiagramDescription, EdgeDescription, LaneDescription,
    NodeDescription, PoolDescription, ShapeKind,
};
