//! Application layer of the propagation core
//!
//! - `engine`: solver state and the API offered to collaborators
//! - `driver`: one analysis run from a set of root entities
//! - `active_part`: cooperative cancellation
//! - `stats`: run counters

pub mod active_part;
pub mod driver;
pub mod engine;
pub mod stats;

pub use active_part::ActivePart;
pub use driver::{AnalysisDriver, AnalysisOutcome, Completion};
pub use engine::{DeferredTask, EngineState, FlowEngine};
pub use stats::SolverStats;
