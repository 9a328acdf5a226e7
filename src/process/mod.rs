//! Process Definition Module
//!
//! Data structures and passes that turn a described business process into a
//! validated flow graph.
//!
//! # Structure
//!
//! - [`model`]: Core records (Step, Edge, ProcessRecord)
//! - [`connections`]: Connection mini-language parsing
//! - [`registry`]: Pool and lane deduplication
//! - [`validator`]: Structural validation
//! - [`graph`]: The validated ProcessGraph aggregate
//! - [`builder`]: Record ingestion

pub mod builder;
pub mod connections;
pub mod graph;
pub mod model;
pub mod registry;
pub mod validator;

pub use builder::{build_graph, ingest_steps, DEFAULT_LANE};
pub use connections::{
    linear_chain, parse_connections, resolve_connections, scan_connections, ConnectionError,
    ConnectionPolicy,
};
pub use graph::ProcessGraph;
pub use model::{Edge, ProcessCore, ProcessRecord, Step, StepKind, StepRecord};
pub use registry::{resolve_lane, split_lane_token, Lane, LaneRegistry, Pool};
pub use validator::{find_violations, validate_process, Violation};
