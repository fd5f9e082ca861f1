//! Handles and work items
//!
//! Nodes, variants, listeners and tasks live in append-only arenas and are
//! addressed by small copyable handles. Edges are handle-to-handle, so the
//! graph may be cyclic without any ownership between nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a flow graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Handle of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub u32);

impl VariantId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a registered token listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

impl ListenerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a deferred task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

/// A unit of deferred propagation work
///
/// Token-carrying items are keys into the scheduler's delta table: adding
/// work for a key that is already pending merges the deltas instead of
/// queueing a second item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkItem {
    /// Inject the pending delta into `node`
    SendTokens { node: NodeId },

    /// Hand the pending delta of `node` to a listener
    NotifyListener { node: NodeId, listener: ListenerId },

    /// Run a deferred task
    Task(TaskId),
}

impl WorkItem {
    /// Whether the item carries a token delta
    #[inline]
    pub fn carries_tokens(&self) -> bool {
        !matches!(self, WorkItem::Task(_))
    }
}
