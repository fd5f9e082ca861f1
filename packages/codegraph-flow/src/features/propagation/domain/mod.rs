//! Domain models for the propagation core
//!
//! Algorithm-independent abstractions:
//! - Context: sensitivity under which an entity is analyzed
//! - Index: canonical (entity, context) key
//! - Variant: per-(entity, context) record owning flow graph nodes
//! - WorkItem and handles: deferred propagation work
//! - SymbolSet: default token set over interned symbols

pub mod context;
pub mod index;
pub mod symbol_set;
pub mod variant;
pub mod work;

pub use context::{Context, Sensitivity};
pub use index::{Index, IndexRef};
pub use symbol_set::{Symbol, SymbolSet};
pub use variant::{NodeLabel, NodeRole, Variant, VariantKind, VariantShape};
pub use work::{ListenerId, NodeId, TaskId, VariantId, WorkItem};
