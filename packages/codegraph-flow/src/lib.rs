/*
 * Codegraph Flow - Token Propagation Core
 *
 * Feature-First Hexagonal Architecture:
 * - config/      : Solver configuration (presets, YAML)
 * - errors       : Crate error type
 * - features/    : Vertical slices (propagation: domain → ports → infrastructure → application)
 *
 * Execution model:
 * - Single-threaded, cooperative worklist solving
 * - Double-buffered work bags with per-node delta coalescing
 * - Online SCC collapsing of propagation cycles
 */

#![allow(clippy::type_complexity)] // Callback-heavy collaborator types
#![allow(clippy::new_without_default)] // Default impl not always needed

pub mod config;
pub mod errors;
pub mod features;

pub use config::{BagOrder, ConfigError, IndexStrategy, Preset, SolverConfig};
pub use errors::{FlowError, FlowResult};
pub use features::propagation::{
    ActivePart, AnalysisDriver, AnalysisOutcome, Completion, Context, EntityProcessor, Environment,
    FlowEngine, NodeId, Sensitivity, SolverStats, SymbolSet, TokenListener, TokenManager, TokenSet,
    TypedTokenManager, VariantId, VariantShape,
};
