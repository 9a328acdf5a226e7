//! procmap - Business Process Swimlane Mapper
//!
//! Turns a described business process (steps, roles and a compact
//! connection string) into a validated flow graph, a deterministic swimlane
//! layout and a render-agnostic diagram description.
//!
//! # Architecture
//!
//! - [`process`]: Step records, connection parsing, lane registry and validation
//! - [`layout`]: Swimlane layout engine and its geometry
//! - [`diagram`]: Diagram description emitter
//! - [`record`]: Serialization to and from nested values
//! - [`mapper`]: The end-to-end pipeline
//! - [`store`]: File input and document persistence used by the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use procmap::{load_input, Mapper, MapperConfig};
//!
//! fn main() -> Result<(), procmap::ProcessError> {
//!     let record = load_input("process.txt")?;
//!
//!     let mapper = Mapper::new(MapperConfig::load("procmap.yaml")?);
//!     let map = mapper.map(record)?;
//!
//!     println!("{} nodes in {} lanes", map.diagram.nodes.len(), map.diagram.lanes.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod diagram;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod process;
pub mod record;
pub mod store;

// Re-export commonly used types
pub use config::MapperConfig;
pub use diagram::{emit_diagram, DiagramDescription};
pub use error::ProcessError;
pub use layout::{compute_layout, LayoutConfig, LayoutResult};
pub use mapper::{Mapper, ProcessMap};
pub use process::{build_graph, ProcessGraph, ProcessRecord, Step, StepKind};
pub use record::{from_document, to_document};
pub use store::load_input;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "procmap";
