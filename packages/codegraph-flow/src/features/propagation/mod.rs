//! # Propagation Core
//!
//! Context-sensitive, worklist-driven fixpoint solver computing, for every
//! tracked entity, the set of abstract values ("tokens") that may reach it:
//! - **Flow graph**: arena of nodes with lazy, diff-based token propagation
//! - **Variants**: one record per canonical (entity, context) index,
//!   created on demand while a run is in progress
//! - **Scheduler**: double-buffered work bags with delta coalescing
//! - **SCC optimizer**: online collapsing of propagation cycles
//!
//! ## References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)
//! - Pearce et al. "Efficient Field-Sensitive Pointer Analysis" (CC 2004)
//!
//! ## Usage
//! ```text
//! use codegraph_flow::features::propagation::{AnalysisDriver, Context};
//!
//! let mut driver = AnalysisDriver::new(SolverConfig::default())?
//!     .with_processor(Rc::new(processor));
//! driver.analyze(Rc::new(environment), vec![main])?;
//! let values = driver.get_values_for(&local, &Context::for_entry(main));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use application::{
    ActivePart, AnalysisDriver, AnalysisOutcome, Completion, EngineState, FlowEngine, SolverStats,
};
pub use domain::{
    Context, Index, IndexRef, ListenerId, NodeId, NodeLabel, NodeRole, Sensitivity, Symbol,
    SymbolSet, TaskId, Variant, VariantId, VariantKind, VariantShape, WorkItem,
};
pub use ports::{
    Entity, EntityProcessor, Environment, FilterRef, HasLabel, HasSuccessors, HasTokens,
    TokenFilter, TokenListener, TokenManager, TokenSet,
};
// Re-export infrastructure (internal use - prefer application layer)
#[doc(hidden)]
pub use infrastructure::{FlowGraph, IndexManager, Scheduler, VariantManager, WorkBag};
pub use infrastructure::{SccPassStats, TypedTokenManager};
