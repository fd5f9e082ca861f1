//! Variants
//!
//! A variant is the per-(entity, context) analysis record. Instead of a
//! class hierarchy, the node layout is a tagged enum chosen by the entity
//! processor through [`VariantShape`].

use super::context::Context;
use super::work::{NodeId, VariantId};
use serde::{Deserialize, Serialize};

/// Node layout requested for a new variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantShape {
    /// A single value-carrying node (locals, fields, expressions, arrays)
    Value,

    /// Parameter, receiver, return and exception-summary nodes
    Method {
        params: usize,
        has_this: bool,
        returns_value: bool,
    },

    /// A call site: result node plus the exceptions escaping the call
    Invocation,
}

/// Node layout of a created variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantKind {
    Value {
        node: NodeId,
    },
    Method {
        this: Option<NodeId>,
        params: Vec<NodeId>,
        ret: Option<NodeId>,
        thrown: NodeId,
    },
    Invocation {
        node: NodeId,
        thrown: NodeId,
    },
}

/// Role of a node inside its variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Value,
    This,
    Param(usize),
    Return,
    Thrown,
    /// Auxiliary node created by an analysis
    Auxiliary,
}

/// Where a node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLabel {
    pub variant: Option<VariantId>,
    pub role: NodeRole,
}

impl NodeLabel {
    pub fn new(variant: VariantId, role: NodeRole) -> Self {
        Self {
            variant: Some(variant),
            role,
        }
    }

    /// Label for a node not owned by any variant
    pub fn auxiliary() -> Self {
        Self {
            variant: None,
            role: NodeRole::Auxiliary,
        }
    }
}

/// Per-(entity, context) analysis record
#[derive(Debug, Clone)]
pub struct Variant<E> {
    entity: E,
    context: Context<E>,
    kind: VariantKind,
}

impl<E> Variant<E> {
    pub fn new(entity: E, context: Context<E>, kind: VariantKind) -> Self {
        Self {
            entity,
            context,
            kind,
        }
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Context the variant was created under (projected)
    pub fn context(&self) -> &Context<E> {
        &self.context
    }

    pub fn kind(&self) -> &VariantKind {
        &self.kind
    }

    /// The node carrying the variant's value
    ///
    /// For methods this is the return node.
    pub fn node(&self) -> Option<NodeId> {
        match &self.kind {
            VariantKind::Value { node } | VariantKind::Invocation { node, .. } => Some(*node),
            VariantKind::Method { ret, .. } => *ret,
        }
    }

    pub fn param_node(&self, index: usize) -> Option<NodeId> {
        match &self.kind {
            VariantKind::Method { params, .. } => params.get(index).copied(),
            _ => None,
        }
    }

    pub fn this_node(&self) -> Option<NodeId> {
        match &self.kind {
            VariantKind::Method { this, .. } => *this,
            _ => None,
        }
    }

    pub fn return_node(&self) -> Option<NodeId> {
        match &self.kind {
            VariantKind::Method { ret, .. } => *ret,
            _ => None,
        }
    }

    /// Exception summary node (methods and call sites)
    pub fn thrown_node(&self) -> Option<NodeId> {
        match &self.kind {
            VariantKind::Method { thrown, .. } | VariantKind::Invocation { thrown, .. } => {
                Some(*thrown)
            }
            VariantKind::Value { .. } => None,
        }
    }

    /// Every node owned by the variant
    pub fn nodes(&self) -> Vec<NodeId> {
        match &self.kind {
            VariantKind::Value { node } => vec![*node],
            VariantKind::Method {
                this,
                params,
                ret,
                thrown,
            } => this
                .iter()
                .chain(params.iter())
                .chain(ret.iter())
                .chain(std::iter::once(thrown))
                .copied()
                .collect(),
            VariantKind::Invocation { node, thrown } => vec![*node, *thrown],
        }
    }
}
