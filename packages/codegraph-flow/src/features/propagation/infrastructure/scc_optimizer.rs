//! SCC Optimizer
//!
//! Detects cycles in the live flow graph and collapses them. Every member
//! of a cycle converges to the same token set, so after collapsing, a
//! component holds one shared set and one pending send item instead of
//! re-propagating tokens around the cycle edge by edge.
//!
//! # Algorithm
//! Tarjan's algorithm driven by an explicit stack of
//! `(node, successors, next_child)` frames:
//! - `dfs_num` counts down from the node count (0 = unvisited)
//! - `high` is the highest on-stack `dfs_num` reachable from the node
//! - a node is on the Tarjan stack iff visited and `component_num == 0`
//! - `high == dfs_num` closes a component
//!
//! All counters live in one [`TarjanPass`], so independent engines never
//! share traversal state.
//!
//! Filtered nodes are propagation barriers and never participate:
//! merging across a filter would let unfiltered tokens leak through it.
//!
//! # References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)

use super::flow_graph::{FlowGraph, SccData};
use super::scheduler::Scheduler;
use crate::features::propagation::domain::NodeId;
use crate::features::propagation::ports::TokenSet;
use serde::Serialize;

/// Statistics of one optimizer pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SccPassStats {
    pub nodes_visited: usize,
    pub components: usize,
    /// Components with more than one member
    pub multi_node_components: usize,
    /// Representatives merged into another one
    pub nodes_collapsed: usize,
    pub largest_component: usize,
}

struct Frame {
    node: NodeId,
    successors: Vec<NodeId>,
    next: usize,
}

/// Traversal state of a single pass
struct TarjanPass {
    counter: u32,
    next_component: u32,
    stack: Vec<NodeId>,
    components: Vec<Vec<NodeId>>,
}

impl TarjanPass {
    fn new(node_count: usize) -> Self {
        Self {
            counter: node_count as u32,
            next_component: 1,
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn enter<T: TokenSet>(&mut self, graph: &mut FlowGraph<T>, node: NodeId) -> Frame {
        let num = self.counter;
        self.counter -= 1;
        *graph.scc_data_mut(node) = SccData {
            dfs_num: num,
            high: num,
            component_num: 0,
        };
        self.stack.push(node);
        Frame {
            node,
            successors: graph.logical_successors(node),
            next: 0,
        }
    }

    fn visit<T: TokenSet>(&mut self, graph: &mut FlowGraph<T>, start: NodeId) {
        let mut frames = vec![self.enter(graph, start)];

        while let Some(frame) = frames.last_mut() {
            let node = frame.node;
            let child = frame.successors.get(frame.next).copied();

            if let Some(child) = child {
                frame.next += 1;
                let data = graph.scc_data(child);
                if data.dfs_num == 0 {
                    let child_frame = self.enter(graph, child);
                    frames.push(child_frame);
                } else if data.component_num == 0 {
                    let current = graph.scc_data_mut(node);
                    current.high = current.high.max(data.dfs_num);
                }
                continue;
            }

            frames.pop();
            let data = graph.scc_data(node);
            if data.high == data.dfs_num {
                self.close_component(graph, node);
            }
            if let Some(parent) = frames.last() {
                let parent_data = graph.scc_data_mut(parent.node);
                parent_data.high = parent_data.high.max(data.high);
            }
        }
    }

    fn close_component<T: TokenSet>(&mut self, graph: &mut FlowGraph<T>, root: NodeId) {
        let component_num = self.next_component;
        self.next_component += 1;

        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            graph.scc_data_mut(member).component_num = component_num;
            component.push(member);
            if member == root {
                break;
            }
        }
        self.components.push(component);
    }
}

/// Run one SCC pass over the graph reachable from `roots`
///
/// Collapses every multi-node component; single-node components are left
/// untouched. Final token sets are unaffected.
pub fn optimize<T: TokenSet>(
    graph: &mut FlowGraph<T>,
    sched: &mut Scheduler<T>,
    roots: &[NodeId],
) -> SccPassStats {
    graph.reset_scc_data();
    let mut pass = TarjanPass::new(graph.len());

    for &root in roots {
        if !graph.contains(root) {
            continue;
        }
        let root = graph.representative(root);
        if graph.is_collapsible(root) && graph.scc_data(root).dfs_num == 0 {
            pass.visit(graph, root);
        }
    }

    let mut stats = SccPassStats {
        nodes_visited: graph.len() - pass.counter as usize,
        components: pass.components.len(),
        ..SccPassStats::default()
    };

    for component in &pass.components {
        stats.largest_component = stats.largest_component.max(component.len());
        if component.len() < 2 {
            continue;
        }
        if graph.collapse(component, sched).is_some() {
            stats.multi_node_components += 1;
            stats.nodes_collapsed += component.len() - 1;
        }
    }

    stats
}
