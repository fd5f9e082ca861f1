//! Variant Manager
//!
//! Memoizes one variant per canonical index. Variants live in an
//! append-only arena addressed by [`VariantId`]; only `reset` releases them.
//! The create-or-reuse policy (stable gating, `process` hook) sits in the
//! engine, which owns the graph the new nodes go into.

use super::index_manager::IndexManager;
use crate::config::IndexStrategy;
use crate::features::propagation::domain::{Context, Index, IndexRef, Variant, VariantId, VariantKind};
use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct VariantManager<E> {
    indices: IndexManager<E>,
    by_index: FxHashMap<IndexRef<E>, VariantId>,
    variants: Vec<Variant<E>>,
}

impl<E: Clone + Eq + Hash + 'static> VariantManager<E> {
    pub fn new(strategy: IndexStrategy) -> Self {
        Self {
            indices: IndexManager::new(strategy),
            by_index: FxHashMap::default(),
            variants: Vec::new(),
        }
    }

    /// Variant registered for `entity` under the (already projected) context
    pub fn lookup(&self, entity: &E, context: &Context<E>) -> Option<VariantId> {
        let key = Index::new(entity.clone(), context.clone());
        self.by_index.get(&key).copied()
    }

    /// Handle the next registered variant will receive
    pub fn next_id(&self) -> VariantId {
        VariantId(self.variants.len() as u32)
    }

    /// Register a variant under its canonical index
    pub fn register(&mut self, entity: E, context: Context<E>, kind: VariantKind) -> VariantId {
        let index = self.indices.get_index(&entity, &context);
        if let Some(&existing) = self.by_index.get(&index) {
            return existing;
        }

        let id = self.next_id();
        self.variants.push(Variant::new(entity, context, kind));
        self.by_index.insert(index, id);
        id
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant<E>> {
        self.variants.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantId, &Variant<E>)> {
        self.variants
            .iter()
            .enumerate()
            .map(|(i, v)| (VariantId(i as u32), v))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn indices(&self) -> &IndexManager<E> {
        &self.indices
    }

    /// Forget every variant and canonical index
    pub fn reset(&mut self) {
        self.by_index.clear();
        self.variants.clear();
        self.indices.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::propagation::domain::NodeId;

    fn value(n: u32) -> VariantKind {
        VariantKind::Value { node: NodeId(n) }
    }

    #[test]
    fn test_register_and_lookup() {
        for strategy in [IndexStrategy::MemoryIntensive, IndexStrategy::ProcessorIntensive] {
            let mut manager = VariantManager::new(strategy);
            let ctx = Context::for_entry("main");

            assert_eq!(manager.lookup(&"x", &ctx), None);
            let id = manager.register("x", ctx.clone(), value(0));
            assert_eq!(manager.lookup(&"x", &ctx), Some(id));
            assert_eq!(manager.lookup(&"x", &Context::new()), None);
            assert_eq!(manager.variant(id).unwrap().node(), Some(NodeId(0)));
        }
    }

    #[test]
    fn test_register_is_idempotent_per_index() {
        let mut manager = VariantManager::new(IndexStrategy::ProcessorIntensive);
        let first = manager.register("x", Context::new(), value(0));
        let second = manager.register("x", Context::new(), value(1));
        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut manager = VariantManager::new(IndexStrategy::ProcessorIntensive);
        manager.register("x", Context::new(), value(0));
        manager.reset();

        assert!(manager.is_empty());
        assert_eq!(manager.lookup(&"x", &Context::new()), None);
        assert_eq!(manager.indices().canonical_count(), 0);
        assert_eq!(manager.next_id(), VariantId(0));
    }
}
