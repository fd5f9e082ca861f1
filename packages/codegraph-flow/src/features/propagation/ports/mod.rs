//! Ports (Interfaces) for the propagation core
//!
//! Boundaries towards the excluded layers:
//! - **TokenSet / TokenFilter / TokenManager**: the abstract value representation
//! - **EntityProcessor**: discovery callback walking a newly created variant
//! - **TokenListener**: reaction to values arriving at a node
//! - **Environment**: read-only view of the analyzed program
//!
//! plus the capability traits the flow graph exposes to its clients.
//!
//! Callbacks receive `&mut FlowEngine` as their collaborator handle, so this
//! module refers to that one application type. Everything else here depends
//! only on the domain layer.

use crate::errors::FlowResult;
use crate::features::propagation::application::engine::FlowEngine;
use crate::features::propagation::domain::{
    context::Sensitivity,
    variant::{NodeLabel, VariantShape},
    work::{NodeId, VariantId},
};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

// ============================================================================
// Token representation
// ============================================================================

/// Mergeable collection of abstract values
///
/// Instances only grow during a run: the solver never removes tokens.
pub trait TokenSet: Clone + Default + Debug {
    type Token: Clone + Eq + Hash + Debug;

    /// Union `other` into `self`
    fn add_all(&mut self, other: &Self);

    /// Elements of `self` absent from `other`
    fn diff(&self, other: &Self) -> Self;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    fn contains(&self, token: &Self::Token) -> bool;

    /// Insert one token, returns whether it was new
    fn insert(&mut self, token: Self::Token) -> bool;

    /// Snapshot of the contained tokens
    fn values(&self) -> Vec<Self::Token>;

    fn from_tokens(tokens: impl IntoIterator<Item = Self::Token>) -> Self {
        let mut set = Self::default();
        for token in tokens {
            set.insert(token);
        }
        set
    }
}

impl<K> TokenSet for BTreeSet<K>
where
    K: Clone + Ord + Hash + Debug,
{
    type Token = K;

    fn add_all(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }

    fn diff(&self, other: &Self) -> Self {
        self.difference(other).cloned().collect()
    }

    fn is_empty(&self) -> bool {
        BTreeSet::is_empty(self)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn contains(&self, token: &K) -> bool {
        BTreeSet::contains(self, token)
    }

    fn insert(&mut self, token: K) -> bool {
        BTreeSet::insert(self, token)
    }

    fn values(&self) -> Vec<K> {
        self.iter().cloned().collect()
    }
}

/// Transform applied to token flow entering and leaving a node
///
/// Implementations must be monotone and distribute over union (keep a
/// subset of the input chosen per token), otherwise incremental
/// propagation diverges from the batch fixpoint.
pub trait TokenFilter<T> {
    fn apply(&self, tokens: T) -> T;
}

impl<T, F> TokenFilter<T> for F
where
    F: Fn(T) -> T,
{
    fn apply(&self, tokens: T) -> T {
        self(tokens)
    }
}

/// Shared filter handle
pub type FilterRef<T> = Arc<dyn TokenFilter<T>>;

/// Token manager boundary
pub trait TokenManager<T: TokenSet> {
    /// Fresh empty token set
    fn new_token_set(&self) -> T {
        T::default()
    }

    /// Token set holding exactly `values`
    fn tokens_for(&self, values: &[T::Token]) -> T {
        T::from_tokens(values.iter().cloned())
    }

    /// Filter admitting tokens compatible with the named program type
    fn type_filter(&self, type_name: &str) -> Option<FilterRef<T>>;

    /// Internal representation of a program type
    fn analysis_type(&self, type_name: &str) -> Option<u32>;

    /// Forget per-run state
    fn reset(&self) {}
}

// ============================================================================
// Program representation
// ============================================================================

/// Program construct whose flow is tracked
pub trait Entity: Clone + Eq + Hash + Debug + 'static {}

impl<E> Entity for E where E: Clone + Eq + Hash + Debug + 'static {}

/// Read-only view of the analyzed program
pub trait Environment {
    /// Whether the named class exists
    fn has_class(&self, name: &str) -> bool;

    /// Resolve a class name to its canonical form
    fn resolve_class(&self, name: &str) -> Option<String> {
        self.has_class(name).then(|| name.to_string())
    }
}

/// Discovery callback invoked once per created variant
///
/// `process` walks the entity's body and calls back into the engine to
/// select sub-entities and connect their nodes. The variant is registered
/// before `process` runs, so recursive selection of the same entity
/// returns the existing variant.
pub trait EntityProcessor<E, T: TokenSet> {
    /// Node layout for a new variant of `entity`
    fn shape(&self, entity: &E) -> VariantShape;

    /// Context components that distinguish variants of `entity`
    fn sensitivity(&self, _entity: &E) -> Sensitivity {
        Sensitivity::FULL
    }

    fn process(&self, engine: &mut FlowEngine<E, T>, variant: VariantId) -> FlowResult<()>;
}

/// Callback notified with every new-token delta reaching a node
pub trait TokenListener<E, T: TokenSet> {
    fn on_new_tokens(&self, engine: &mut FlowEngine<E, T>, node: NodeId, tokens: &T) -> FlowResult<()>;
}

// ============================================================================
// Capability traits
// ============================================================================

/// Node holding a token set
pub trait HasTokens {
    type Tokens: TokenSet;

    fn tokens(&self) -> &Self::Tokens;
}

/// Node with outgoing edges
pub trait HasSuccessors {
    fn successors(&self) -> &[NodeId];
}

/// Node attributed to a variant
pub trait HasLabel {
    fn label(&self) -> Option<&NodeLabel>;
}
