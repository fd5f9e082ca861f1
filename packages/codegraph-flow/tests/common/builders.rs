//! Test data builders

use std::collections::BTreeMap;

/// Directed graph of `u32` entities with seed tokens and filters
///
/// Every entity becomes a single-node variant. Discovery follows the edges
/// from the roots, so unreachable entities never get a variant.
#[derive(Debug, Clone, Default)]
pub struct GraphProgram {
    pub node_count: u32,
    pub edges: Vec<(u32, u32)>,
    pub seeds: BTreeMap<u32, Vec<u32>>,
    /// Node -> modulus; the node drops tokens divisible by it
    pub filters: BTreeMap<u32, u32>,
    /// Discover successors through deferred tasks instead of recursion
    pub lazy_discovery: bool,
}

impl GraphProgram {
    pub fn new(node_count: u32) -> Self {
        Self {
            node_count,
            ..Self::default()
        }
    }

    pub fn with_edge(mut self, from: u32, to: u32) -> Self {
        self.edges.push((from, to));
        self
    }

    pub fn with_edges(mut self, edges: &[(u32, u32)]) -> Self {
        self.edges.extend_from_slice(edges);
        self
    }

    pub fn with_seed(mut self, node: u32, tokens: &[u32]) -> Self {
        self.seeds.entry(node).or_default().extend_from_slice(tokens);
        self
    }

    pub fn with_filter(mut self, node: u32, modulus: u32) -> Self {
        self.filters.insert(node, modulus);
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy_discovery = true;
        self
    }

    pub fn successors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        self.edges
            .iter()
            .filter(move |(from, _)| *from == node)
            .map(|(_, to)| *to)
    }
}
