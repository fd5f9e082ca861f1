//! Flow Graph
//!
//! Arena of propagation nodes addressed by [`NodeId`]. Each node owns a
//! token set, an ordered successor list, an optional filter, listeners and
//! SCC scratch data. Nodes never own each other, so cycles are plain
//! handle references.
//!
//! # Propagation
//! - `inject`: add the (filtered) new part of a token set and forward it
//! - `absorb_lazily`: queue the new part as a `SendTokens` work item,
//!   merging into pending work for the same node
//! - `add_successor`: register an edge and immediately push the current
//!   tokens across it
//!
//! # Collapsed components
//! The SCC optimizer merges cyclic clusters of unfiltered nodes. Members
//! point at a representative that holds the shared token set and the
//! single pending send item of the whole component. Forwarding from a
//! representative walks the successors of every member.

use super::scheduler::Scheduler;
use crate::errors::{FlowError, FlowResult};
use crate::features::propagation::domain::{ListenerId, NodeId, NodeLabel, WorkItem};
use crate::features::propagation::ports::{
    FilterRef, HasLabel, HasSuccessors, HasTokens, TokenSet,
};
use rustc_hash::FxHashSet;
use std::fmt;
use std::mem;

/// Per-node scratch data of the SCC pass (zero = unvisited)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SccData {
    pub dfs_num: u32,
    pub high: u32,
    pub component_num: u32,
}

/// Propagation unit
pub struct FlowNode<T> {
    tokens: T,
    successors: Vec<NodeId>,
    successor_set: FxHashSet<NodeId>,
    filter: Option<FilterRef<T>>,
    listeners: Vec<ListenerId>,
    label: Option<NodeLabel>,
    scc: SccData,
    in_multi_node_scc: bool,
    representative: NodeId,
    /// Members of the component (representatives of multi-node SCCs only)
    members: Vec<NodeId>,
}

impl<T: TokenSet> FlowNode<T> {
    fn new(id: NodeId, label: Option<NodeLabel>) -> Self {
        Self {
            tokens: T::default(),
            successors: Vec::new(),
            successor_set: FxHashSet::default(),
            filter: None,
            listeners: Vec::new(),
            label,
            scc: SccData::default(),
            in_multi_node_scc: false,
            representative: id,
            members: Vec::new(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn scc(&self) -> SccData {
        self.scc
    }

    pub fn in_multi_node_scc(&self) -> bool {
        self.in_multi_node_scc
    }

    pub fn representative(&self) -> NodeId {
        self.representative
    }
}

impl<T: TokenSet> HasTokens for FlowNode<T> {
    type Tokens = T;

    /// Physically stored set; collapsed members keep theirs on the representative
    fn tokens(&self) -> &T {
        &self.tokens
    }
}

impl<T> HasSuccessors for FlowNode<T> {
    fn successors(&self) -> &[NodeId] {
        &self.successors
    }
}

impl<T> HasLabel for FlowNode<T> {
    fn label(&self) -> Option<&NodeLabel> {
        self.label.as_ref()
    }
}

impl<T: fmt::Debug> fmt::Debug for FlowNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowNode")
            .field("tokens", &self.tokens)
            .field("successors", &self.successors)
            .field("filtered", &self.filter.is_some())
            .field("listeners", &self.listeners)
            .field("label", &self.label)
            .field("scc", &self.scc)
            .field("representative", &self.representative)
            .finish()
    }
}

/// Arena of flow graph nodes
#[derive(Debug)]
pub struct FlowGraph<T> {
    nodes: Vec<FlowNode<T>>,
}

impl<T: TokenSet> Default for FlowGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TokenSet> FlowGraph<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add_node(&mut self, label: Option<NodeLabel>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(FlowNode::new(id, label));
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&FlowNode<T>> {
        self.nodes.get(id.index())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Node holding the tokens of `id`'s component
    #[inline]
    pub(crate) fn representative(&self, id: NodeId) -> NodeId {
        self.nodes[id.index()].representative
    }

    /// Current token set of `id`
    pub(crate) fn tokens(&self, id: NodeId) -> &T {
        &self.nodes[self.representative(id).index()].tokens
    }

    pub fn filter(&self, id: NodeId) -> Option<&FilterRef<T>> {
        self.nodes.get(id.index())?.filter.as_ref()
    }

    /// Members of the component represented by `rep`
    pub(crate) fn component_members(&self, rep: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[rep.index()];
        if node.members.is_empty() {
            vec![rep]
        } else {
            node.members.clone()
        }
    }

    /// Add the new part of `tokens` to the node and forward it
    ///
    /// Returns whether the node's token set grew.
    pub fn inject(&mut self, id: NodeId, tokens: T, sched: &mut Scheduler<T>) -> bool {
        let rep = self.representative(id);
        let node = &mut self.nodes[rep.index()];

        let mut diff = tokens.diff(&node.tokens);
        if let Some(filter) = &node.filter {
            diff = filter.apply(diff);
        }
        if diff.is_empty() {
            return false;
        }

        node.tokens.add_all(&diff);
        self.on_new_tokens(rep, &diff, sched);
        true
    }

    /// Queue the new part of `tokens` for later injection
    ///
    /// Returns whether anything new was absorbed.
    pub fn absorb_lazily(&mut self, id: NodeId, tokens: &T, sched: &mut Scheduler<T>) -> bool {
        let rep = self.representative(id);
        let diff = tokens.diff(&self.nodes[rep.index()].tokens);
        if diff.is_empty() {
            return false;
        }
        sched.absorb(WorkItem::SendTokens { node: rep }, diff);
        true
    }

    /// Register `from -> to` and push the current tokens of `from` across it
    pub fn add_successor(&mut self, from: NodeId, to: NodeId, sched: &mut Scheduler<T>) -> bool {
        let node = &mut self.nodes[from.index()];
        if !node.successor_set.insert(to) {
            return false;
        }
        node.successors.push(to);

        let rep = self.representative(from);
        let current = self.outbound(rep, self.nodes[rep.index()].tokens.clone());
        if !current.is_empty() {
            self.absorb_lazily(to, &current, sched);
        }
        true
    }

    /// Install a filter on inbound and outbound token flow
    ///
    /// Tokens already present are not filtered retroactively.
    pub fn set_filter(&mut self, id: NodeId, filter: FilterRef<T>) -> FlowResult<()> {
        let node = &mut self.nodes[id.index()];
        if node.in_multi_node_scc {
            return Err(FlowError::invalid_usage(format!(
                "cannot install a filter on {}: node is part of a collapsed SCC",
                id
            )));
        }
        node.filter = Some(filter);
        Ok(())
    }

    /// Attach a listener, scheduling a notification for tokens already present
    pub fn add_listener(&mut self, id: NodeId, listener: ListenerId, sched: &mut Scheduler<T>) {
        self.nodes[id.index()].listeners.push(listener);

        let rep = self.representative(id);
        let current = self.outbound(rep, self.nodes[rep.index()].tokens.clone());
        sched.absorb(WorkItem::NotifyListener { node: id, listener }, current);
    }

    /// Apply the outbound filter of `rep`
    fn outbound(&self, rep: NodeId, tokens: T) -> T {
        match &self.nodes[rep.index()].filter {
            Some(filter) if !tokens.is_empty() => filter.apply(tokens),
            _ => tokens,
        }
    }

    fn on_new_tokens(&mut self, rep: NodeId, diff: &T, sched: &mut Scheduler<T>) {
        let outbound = self.outbound(rep, diff.clone());
        if outbound.is_empty() {
            return;
        }
        let count = self.nodes[rep.index()].members.len();
        if count == 0 {
            self.forward_from_member(rep, &outbound, sched);
            return;
        }
        // Forwarding never changes membership
        for i in 0..count {
            let member = self.nodes[rep.index()].members[i];
            self.forward_from_member(member, &outbound, sched);
        }
    }

    /// Forward `delta` along the edges and listeners of one member
    fn forward_from_member(&mut self, member: NodeId, delta: &T, sched: &mut Scheduler<T>) {
        // absorb_lazily never touches successor lists, so indices stay valid
        for i in 0..self.nodes[member.index()].successors.len() {
            let succ = self.nodes[member.index()].successors[i];
            self.absorb_lazily(succ, delta, sched);
        }
        for i in 0..self.nodes[member.index()].listeners.len() {
            let listener = self.nodes[member.index()].listeners[i];
            sched.absorb(
                WorkItem::NotifyListener {
                    node: member,
                    listener,
                },
                delta.clone(),
            );
        }
    }

    // ------------------------------------------------------------------------
    // SCC support
    // ------------------------------------------------------------------------

    pub(crate) fn reset_scc_data(&mut self) {
        for node in &mut self.nodes {
            node.scc = SccData::default();
        }
    }

    pub(crate) fn scc_data(&self, id: NodeId) -> SccData {
        self.nodes[id.index()].scc
    }

    pub(crate) fn scc_data_mut(&mut self, id: NodeId) -> &mut SccData {
        &mut self.nodes[id.index()].scc
    }

    /// Unfiltered representatives are the only nodes the optimizer may merge
    pub(crate) fn is_collapsible(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.index()];
        node.representative == id && node.filter.is_none()
    }

    /// Collapsible successors of the component represented by `rep`
    pub(crate) fn logical_successors(&self, rep: NodeId) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for member in self.component_members(rep) {
            for &succ in self.nodes[member.index()].successors() {
                let target = self.representative(succ);
                if target != rep && self.is_collapsible(target) && seen.insert(target) {
                    out.push(target);
                }
            }
        }
        out
    }

    /// Merge the components represented by `reps` into one
    ///
    /// The smallest handle becomes the representative. Pending send work
    /// of the merged components is moved onto it, and every former
    /// component forwards the tokens it was missing to its successors and
    /// listeners. Returns the new representative.
    pub(crate) fn collapse(&mut self, reps: &[NodeId], sched: &mut Scheduler<T>) -> Option<NodeId> {
        if reps.len() < 2 {
            return None;
        }
        let target = *reps.iter().min()?;

        let mut union = T::default();
        let mut previous: Vec<(Vec<NodeId>, T)> = Vec::with_capacity(reps.len());
        for &rep in reps {
            let node = &mut self.nodes[rep.index()];
            let tokens = mem::take(&mut node.tokens);
            let members = if node.members.is_empty() {
                vec![rep]
            } else {
                mem::take(&mut node.members)
            };
            union.add_all(&tokens);
            previous.push((members, tokens));
        }

        let all_members: Vec<NodeId> = previous
            .iter()
            .flat_map(|(members, _)| members.iter().copied())
            .collect();
        for &member in &all_members {
            let node = &mut self.nodes[member.index()];
            node.representative = target;
            node.in_multi_node_scc = true;
        }

        let node = &mut self.nodes[target.index()];
        node.tokens = union.clone();
        node.members = all_members;

        // One pending send item for the whole component, minus what the union covers
        for &rep in reps {
            if let Some(delta) = sched.withdraw(&WorkItem::SendTokens { node: rep }) {
                self.absorb_lazily(target, &delta, sched);
            }
        }

        for (members, old) in previous {
            let delta = union.diff(&old);
            if delta.is_empty() {
                continue;
            }
            for member in members {
                self.forward_from_member(member, &delta, sched);
            }
        }

        Some(target)
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
