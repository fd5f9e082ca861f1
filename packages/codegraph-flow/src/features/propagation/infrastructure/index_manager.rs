//! Index Manager
//!
//! Builds `(entity, context)` indices and canonicalizes them through a
//! strategy chosen at construction:
//! - **Memory-intensive**: every index is kept as built (no lookup cost)
//! - **Processor-intensive**: equal indices share the first-seen allocation
//!
//! Either way, variant lookup by a value-equal index finds the same variant,
//! since the variant map compares indices structurally.

use crate::config::IndexStrategy;
use crate::features::propagation::domain::{Context, Index, IndexRef};
use rustc_hash::FxHashSet;
use std::hash::Hash;
use std::rc::Rc;

/// Canonicalization strategy
pub trait IndexCanonicalizer<E> {
    fn canonicalize(&mut self, index: IndexRef<E>) -> IndexRef<E>;

    /// Number of indices retained for reuse
    fn canonical_count(&self) -> usize;

    fn reset(&mut self);
}

/// Identity strategy
#[derive(Debug, Default)]
pub struct MemoryIntensiveCanonicalizer;

impl<E> IndexCanonicalizer<E> for MemoryIntensiveCanonicalizer {
    #[inline]
    fn canonicalize(&mut self, index: IndexRef<E>) -> IndexRef<E> {
        index
    }

    fn canonical_count(&self) -> usize {
        0
    }

    fn reset(&mut self) {}
}

/// First-seen strategy
#[derive(Debug)]
pub struct ProcessorIntensiveCanonicalizer<E> {
    seen: FxHashSet<IndexRef<E>>,
}

impl<E> Default for ProcessorIntensiveCanonicalizer<E> {
    fn default() -> Self {
        Self {
            seen: FxHashSet::default(),
        }
    }
}

impl<E: Eq + Hash> IndexCanonicalizer<E> for ProcessorIntensiveCanonicalizer<E> {
    fn canonicalize(&mut self, index: IndexRef<E>) -> IndexRef<E> {
        if let Some(existing) = self.seen.get(&index) {
            return Rc::clone(existing);
        }
        self.seen.insert(Rc::clone(&index));
        index
    }

    fn canonical_count(&self) -> usize {
        self.seen.len()
    }

    fn reset(&mut self) {
        self.seen.clear();
    }
}

/// Builds canonical indices
pub struct IndexManager<E> {
    strategy: IndexStrategy,
    canonicalizer: Box<dyn IndexCanonicalizer<E>>,
}

impl<E: Clone + Eq + Hash + 'static> IndexManager<E> {
    pub fn new(strategy: IndexStrategy) -> Self {
        let canonicalizer: Box<dyn IndexCanonicalizer<E>> = match strategy {
            IndexStrategy::MemoryIntensive => Box::new(MemoryIntensiveCanonicalizer),
            IndexStrategy::ProcessorIntensive => Box::<ProcessorIntensiveCanonicalizer<E>>::default(),
        };
        Self {
            strategy,
            canonicalizer,
        }
    }

    /// Index for `entity` under `context`
    pub fn get_index(&mut self, entity: &E, context: &Context<E>) -> IndexRef<E> {
        let raw = Rc::new(Index::new(entity.clone(), context.clone()));
        self.canonicalizer.canonicalize(raw)
    }

    pub fn strategy(&self) -> IndexStrategy {
        self.strategy
    }

    pub fn canonical_count(&self) -> usize {
        self.canonicalizer.canonical_count()
    }

    pub fn reset(&mut self) {
        self.canonicalizer.reset();
    }
}

impl<E> std::fmt::Debug for IndexManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager")
            .field("strategy", &self.strategy)
            .field("canonical_count", &self.canonicalizer.canonical_count())
            .finish()
    }
}
