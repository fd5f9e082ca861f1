//! Infrastructure of the propagation core
//!
//! - `flow_graph`: arena of nodes with lazy token propagation
//! - `work_bag` / `scheduler`: double-buffered work queues
//! - `index_manager` / `variant_manager`: (entity, context) memoization
//! - `scc_optimizer`: online cycle collapsing
//! - `typed_tokens`: symbol-based token manager with type filters

pub mod flow_graph;
pub mod index_manager;
pub mod scc_optimizer;
pub mod scheduler;
pub mod typed_tokens;
pub mod variant_manager;
pub mod work_bag;

pub use flow_graph::{FlowGraph, FlowNode, SccData};
pub use index_manager::{
    IndexCanonicalizer, IndexManager, MemoryIntensiveCanonicalizer, ProcessorIntensiveCanonicalizer,
};
pub use scc_optimizer::{optimize, SccPassStats};
pub use scheduler::Scheduler;
pub use typed_tokens::TypedTokenManager;
pub use variant_manager::VariantManager;
pub use work_bag::WorkBag;
